//! Interpolation and easing helpers shared by curve sampling and fades.

pub mod functions;

pub use functions::{easing_sin, lerp_f32};
