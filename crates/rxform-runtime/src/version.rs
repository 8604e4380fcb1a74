#![forbid(unsafe_code)]

//! Advisory version probe for the numeric kernel backend.
//!
//! At startup the dispatch layer compares the linked kernel backend's
//! version string against a minimum supported release and emits a non-fatal
//! warning when it is older. The probe is advisory: parsing never aborts
//! startup, and a mismatch surfaces as a [`StartupWarning`] value rather
//! than an error.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parsed `major.minor.patch` version of the kernel backend.
///
/// Release suffixes (`1.5.1rc1`) are tolerated by trimming each component at
/// the first non-digit; the patch component is optional and defaults to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BackendVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl BackendVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Display for BackendVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable backend version string `{raw}`")]
pub struct VersionParseError {
    pub raw: String,
}

impl FromStr for BackendVersion {
    type Err = VersionParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split('.');
        let major = parse_component(parts.next())
            .ok_or_else(|| VersionParseError { raw: raw.into() })?;
        let minor = parse_component(parts.next())
            .ok_or_else(|| VersionParseError { raw: raw.into() })?;
        let patch = parse_component(parts.next()).unwrap_or(0);
        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}

fn parse_component(part: Option<&str>) -> Option<u32> {
    let digits: String = part?.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Non-fatal startup advisory about the detected backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupWarning {
    pub message: String,
}

/// Outcome of comparing the detected backend version against the minimum
/// supported release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionCheck {
    Supported {
        detected: BackendVersion,
    },
    TooOld {
        detected: BackendVersion,
        minimum: BackendVersion,
    },
    Unparseable {
        raw: String,
    },
}

impl VersionCheck {
    /// The advisory warning for this outcome, if any. Never an error: the
    /// probe is a recommendation, not a dependency gate.
    #[must_use]
    pub fn warning(&self) -> Option<StartupWarning> {
        match self {
            Self::Supported { .. } => None,
            Self::TooOld { detected, minimum } => Some(StartupWarning {
                message: format!(
                    "backend version {minimum} or above is recommended (detected version {detected})"
                ),
            }),
            Self::Unparseable { raw } => Some(StartupWarning {
                message: format!("could not parse backend version string `{raw}`"),
            }),
        }
    }
}

/// Compare a detected backend version string against a minimum supported one.
#[must_use]
pub fn check_backend_version(detected: &str, minimum: &str) -> VersionCheck {
    let Ok(minimum) = minimum.parse::<BackendVersion>() else {
        return VersionCheck::Unparseable { raw: minimum.into() };
    };
    match detected.parse::<BackendVersion>() {
        Ok(found) if found < minimum => VersionCheck::TooOld {
            detected: found,
            minimum,
        },
        Ok(found) => VersionCheck::Supported { detected: found },
        Err(err) => VersionCheck::Unparseable { raw: err.raw },
    }
}
