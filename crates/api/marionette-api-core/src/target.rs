//! Addresses of the values a frame can report.
//!
//! Grammar:
//!   "parameter/<id>"  -> a parameter value
//!   "part/<id>"       -> a part opacity
//!   "model/opacity"   -> the model-level opacity
//!
//! Ids may contain any character except whitespace; everything after the
//! first '/' is the id.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WriteTarget {
    Parameter(String),
    Part(String),
    ModelOpacity,
}

impl WriteTarget {
    pub fn parse(s: &str) -> Result<Self, String> {
        if s == "model/opacity" {
            return Ok(WriteTarget::ModelOpacity);
        }
        let (kind, id) = s
            .split_once('/')
            .ok_or_else(|| format!("invalid write target '{s}': missing '/'"))?;
        if id.is_empty() {
            return Err(format!("invalid write target '{s}': empty id"));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(format!("invalid write target '{s}': id contains whitespace"));
        }
        match kind {
            "parameter" => Ok(WriteTarget::Parameter(id.to_string())),
            "part" => Ok(WriteTarget::Part(id.to_string())),
            other => Err(format!("invalid write target '{s}': unknown kind '{other}'")),
        }
    }
}

impl fmt::Display for WriteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteTarget::Parameter(id) => write!(f, "parameter/{id}"),
            WriteTarget::Part(id) => write!(f, "part/{id}"),
            WriteTarget::ModelOpacity => f.write_str("model/opacity"),
        }
    }
}

impl FromStr for WriteTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WriteTarget::parse(s)
    }
}

impl Serialize for WriteTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WriteTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        WriteTarget::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_kinds() {
        assert_eq!(
            WriteTarget::parse("parameter/ParamAngleX").unwrap(),
            WriteTarget::Parameter("ParamAngleX".into())
        );
        assert_eq!(
            WriteTarget::parse("part/PartArmA").unwrap(),
            WriteTarget::Part("PartArmA".into())
        );
        assert_eq!(
            WriteTarget::parse("model/opacity").unwrap(),
            WriteTarget::ModelOpacity
        );
    }

    #[test]
    fn rejects_malformed() {
        assert!(WriteTarget::parse("ParamAngleX").is_err());
        assert!(WriteTarget::parse("parameter/").is_err());
        assert!(WriteTarget::parse("bone/Arm").is_err());
        assert!(WriteTarget::parse("part/a b").is_err());
    }

    #[test]
    fn display_matches_parse() {
        let t = WriteTarget::Part("Hair/Front".into());
        assert_eq!(t.to_string(), "part/Hair/Front");
        assert_eq!(WriteTarget::parse(&t.to_string()).unwrap(), t);
    }
}
