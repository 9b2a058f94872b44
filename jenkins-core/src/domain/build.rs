//! Build domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permalink to the most recent build
pub const LAST_BUILD: &str = "lastBuild";
pub const LAST_COMPLETED_BUILD: &str = "lastCompletedBuild";
pub const LAST_SUCCESSFUL_BUILD: &str = "lastSuccessfulBuild";
pub const LAST_STABLE_BUILD: &str = "lastStableBuild";
pub const LAST_FAILED_BUILD: &str = "lastFailedBuild";
pub const LAST_UNSUCCESSFUL_BUILD: &str = "lastUnsuccessfulBuild";

/// Address of one build of a job: its number or a permalink such as `lastBuild`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildNumber {
    Number(u64),
    Permalink(String),
}

impl BuildNumber {
    pub fn last() -> Self {
        BuildNumber::Permalink(LAST_BUILD.to_string())
    }

    pub fn last_successful() -> Self {
        BuildNumber::Permalink(LAST_SUCCESSFUL_BUILD.to_string())
    }

    pub fn last_failed() -> Self {
        BuildNumber::Permalink(LAST_FAILED_BUILD.to_string())
    }

    /// Builds are numbered from 1; a permalink must be non-blank
    pub fn is_valid(&self) -> bool {
        match self {
            BuildNumber::Number(number) => *number > 0,
            BuildNumber::Permalink(name) => !name.trim().is_empty(),
        }
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildNumber::Number(number) => write!(f, "{number}"),
            BuildNumber::Permalink(name) => write!(f, "{name}"),
        }
    }
}

impl From<u64> for BuildNumber {
    fn from(number: u64) -> Self {
        BuildNumber::Number(number)
    }
}

impl From<u32> for BuildNumber {
    fn from(number: u32) -> Self {
        BuildNumber::Number(number.into())
    }
}

/// Negative numbers map to 0, which is never a valid build
impl From<i32> for BuildNumber {
    fn from(number: i32) -> Self {
        BuildNumber::Number(u64::try_from(number).unwrap_or(0))
    }
}

/// Numeric strings address a build number; anything else is a permalink
impl From<&str> for BuildNumber {
    fn from(value: &str) -> Self {
        match value.parse::<u64>() {
            Ok(number) => BuildNumber::Number(number),
            Err(_) => BuildNumber::Permalink(value.to_string()),
        }
    }
}

impl From<String> for BuildNumber {
    fn from(value: String) -> Self {
        match value.parse::<u64>() {
            Ok(number) => BuildNumber::Number(number),
            Err(_) => BuildNumber::Permalink(value),
        }
    }
}

impl From<&String> for BuildNumber {
    fn from(value: &String) -> Self {
        BuildNumber::from(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(BuildNumber::from(7), BuildNumber::Number(7));
        assert_eq!(BuildNumber::from("12"), BuildNumber::Number(12));
        assert_eq!(
            BuildNumber::from("lastBuild"),
            BuildNumber::Permalink("lastBuild".to_string())
        );
        assert_eq!(BuildNumber::from(-1), BuildNumber::Number(0));
        assert_eq!(BuildNumber::last_successful().to_string(), "lastSuccessfulBuild");
    }

    #[test]
    fn test_validity() {
        assert!(BuildNumber::from(1).is_valid());
        assert!(BuildNumber::last().is_valid());
        assert!(!BuildNumber::from(0).is_valid());
        assert!(!BuildNumber::from("").is_valid());
        assert!(!BuildNumber::from(" ").is_valid());
    }
}
