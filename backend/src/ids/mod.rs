//! Monitoring plan identifiers and site codes.
//!
//! - Plan ID: `M-{MM}{YYYY}-V{major}.{minor}-{REGION}`, e.g. `M-052023-V1.2-KSL`
//! - Site code: `[HH][SS][YYMMDD]-[NNNN]`, e.g. `KOKH230524-0001`

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SITE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[A-Z]{2}[0-9]{6}-[0-9]{4}$").expect("valid site code pattern"));

static PERIOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{2})([0-9]{4})$").expect("valid period pattern"));

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^V([0-9]+)\.([0-9]+)$").expect("valid version pattern"));

/// Plan version, bumped on every re-upload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The parts of a plan ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanId {
    pub month: u32,
    pub year: u32,
    pub version: Version,
    pub region: String,
}

/// Build a plan ID. Month is zero-padded to 2 digits, year to 4.
pub fn generate_id(month: u32, year: u32, version_major: u32, version_minor: u32, region: &str) -> String {
    format!(
        "M-{:02}{:04}-V{}.{}-{}",
        month, year, version_major, version_minor, region
    )
}

/// Split a plan ID back into its parts. `None` on any malformed input.
pub fn parse_id(id: &str) -> Option<PlanId> {
    let parts: Vec<&str> = id.split('-').collect();
    if parts.len() != 4 || parts[0] != "M" {
        return None;
    }

    let period = PERIOD_RE.captures(parts[1])?;
    let month = period[1].parse().ok()?;
    let year = period[2].parse().ok()?;

    let caps = VERSION_RE.captures(parts[2])?;
    let major = caps[1].parse().ok()?;
    let minor = caps[2].parse().ok()?;

    Some(PlanId {
        month,
        year,
        version: Version::new(major, minor),
        region: parts[3].to_string(),
    })
}

/// Append a sequence number, zero-padded to 5 digits, to a code prefix.
pub fn generate_site_code_from_prefix(prefix: &str, sequence: u32) -> String {
    format!("{}{:05}", prefix, sequence)
}

/// `[HH][SS][YYMMDD]-` from the first two letters of hub and state.
pub fn site_code_prefix(hub: &str, state: &str, date: NaiveDate) -> String {
    format!(
        "{}{}{}-",
        two_letters(hub),
        two_letters(state),
        date.format("%y%m%d")
    )
}

/// A complete site code with a 4-digit sequence.
pub fn generate_site_code(hub: &str, state: &str, date: NaiveDate, sequence: u32) -> String {
    format!("{}{:04}", site_code_prefix(hub, state, date), sequence)
}

fn two_letters(name: &str) -> String {
    let mut letters: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(2)
        .collect::<String>()
        .to_ascii_uppercase();
    while letters.len() < 2 {
        letters.push('X');
    }
    letters
}

/// True if `code`, trimmed, is a well-formed site code.
pub fn validate_site_code(code: &str) -> bool {
    SITE_CODE_RE.is_match(code.trim())
}

/// Next version: a major bump resets minor to 0.
pub fn increment_version(current: Version, bump_major: bool) -> Version {
    if bump_major {
        Version::new(current.major + 1, 0)
    } else {
        Version::new(current.major, current.minor + 1)
    }
}
