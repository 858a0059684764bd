//! Version string parsing and ordering
//!
//! Declared module versions are 3-segment dot-separated strings where each
//! segment is a non-negative integer or the literal wildcard `x`
//! (`1.2.3`, `11.1.x`).

use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during version parsing
#[derive(Debug, Error)]
pub enum VersionError {
    /// Invalid version format
    #[error("Invalid version format: {0}")]
    Format(String),
}

/// A single version segment: a number or the wildcard `x`
#[derive(Debug, Clone, Copy)]
enum Segment {
    Number(u64),
    Wildcard,
}

impl Segment {
    fn parse(s: &str) -> Option<Self> {
        if s == "x" {
            return Some(Segment::Wildcard);
        }
        // Must be all digits; a plain u64 parse would also accept "+1"
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s.parse().ok().map(Segment::Number);
        }
        None
    }

    /// Ordering value; the wildcard orders as 0
    fn order_value(&self) -> u64 {
        match self {
            Segment::Number(n) => *n,
            Segment::Wildcard => 0,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Number(n) => write!(f, "{}", n),
            Segment::Wildcard => write!(f, "x"),
        }
    }
}

/// Validated module version (MAJOR.MINOR.PATCH, segments may be `x`)
#[derive(Debug, Clone)]
pub struct Version {
    segments: [Segment; 3],
}

impl Version {
    /// Parse a version string
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::Format(format!(
                "Expected 3 dot-separated segments, got '{}'",
                s
            )));
        }

        let mut segments = [Segment::Number(0); 3];
        for (i, part) in parts.iter().enumerate() {
            segments[i] = Segment::parse(part).ok_or_else(|| {
                VersionError::Format(format!(
                    "Invalid segment '{}' in version '{}'",
                    part, s
                ))
            })?;
        }

        Ok(Version { segments })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.segments[0], self.segments[1], self.segments[2]
        )
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            match a.order_value().cmp(&b.order_value()) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality must agree with `cmp`, so `1.x.0 == 1.0.0`.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

/// Compare two version strings
///
/// Usable directly as an ascending sort comparator. Fails if either string
/// is not a valid version.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}

/// Validate and sort a list of version strings in ascending order
///
/// The sort is stable, so equal versions keep their relative order and
/// sorting twice gives the same result.
pub fn sort_versions(versions: &mut Vec<String>) -> Result<(), VersionError> {
    let mut parsed: Vec<(Version, String)> = Vec::with_capacity(versions.len());
    for v in versions.drain(..) {
        let parsed_version = Version::parse(&v)?;
        parsed.push((parsed_version, v));
    }

    parsed.sort_by(|a, b| a.0.cmp(&b.0));
    *versions = parsed.into_iter().map(|(_, s)| s).collect();
    Ok(())
}
