use std::fmt;

use serde::Serialize;

use crate::error::CompilationError;

/// A `major.minor.patch` version triple, matching `^\d+\.\d+\.\d+$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64
}

impl SemVer {
    pub fn parse(raw: &str) -> Result<Self, CompilationError> {
        let parts: Vec<&str> = raw.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(CompilationError::new(format!(
                "invalid version '{}': expected major.minor.patch",
                raw
            )));
        };

        let parse_part = |part: &str| {
            part.parse::<u64>().map_err(|_| {
                CompilationError::new(format!("invalid version '{}': non-numeric component", raw))
            })
        };

        Ok(Self {
            major: parse_part(major)?,
            minor: parse_part(minor)?,
            patch: parse_part(patch)?
        })
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zero_version() {
        let v = SemVer::parse("0.0.0").unwrap();
        assert_eq!(v, SemVer { major: 0, minor: 0, patch: 0 });
    }

    #[test]
    fn rejects_non_numeric_component() {
        assert!(SemVer::parse("1.x.0").is_err());
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(SemVer::parse("1.0").is_err());
        assert!(SemVer::parse("1.0.0.0").is_err());
    }
}
