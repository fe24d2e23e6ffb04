//! OSGi-style version values: `major.minor.micro.qualifier`.

use std::fmt;
use std::str::FromStr;

/// A parsed version. Ordering is numeric on the three segments, then
/// lexicographic on the qualifier (the empty qualifier sorts first).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub qualifier: String,
}

impl FromStr for Version {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err("empty version".to_string());
        }

        let mut segments = value.splitn(4, '.');
        let major = parse_segment(segments.next(), value)?;
        let minor = match segments.next() {
            Some(segment) => parse_segment(Some(segment), value)?,
            None => 0,
        };
        let micro = match segments.next() {
            Some(segment) => parse_segment(Some(segment), value)?,
            None => 0,
        };
        let qualifier = match segments.next() {
            Some("") => return Err(format!("invalid version: {value}")),
            Some(qualifier) => qualifier.to_string(),
            None => String::new(),
        };

        Ok(Version {
            major,
            minor,
            micro,
            qualifier,
        })
    }
}

fn parse_segment(segment: Option<&str>, value: &str) -> Result<u32, String> {
    segment
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| format!("invalid version: {value}"))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}
