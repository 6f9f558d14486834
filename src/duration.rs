//! Duration strings used by rule files (`interval`, `for`, `keep_firing_for`).
//!
//! Accepted form: `[Ny][Nw][Nd][Nh][Nm][Ns][Nms]`, units in descending order,
//! at least one unit present. The bare string `0` is also accepted.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_WEEK: u64 = 604_800;
const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(\d+)y)?(?:(\d+)w)?(?:(\d+)d)?(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?(?:(\d+)ms)?$",
    )
    .expect("duration regex must compile")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not a valid duration string: {0:?}")]
pub struct InvalidDuration(pub String);

/// Parse a rule-file duration string.
///
/// # Errors
/// Returns [`InvalidDuration`] when the string is empty, has no unit, uses
/// units out of order, or overflows.
pub fn parse_duration(input: &str) -> Result<Duration, InvalidDuration> {
    if input == "0" {
        return Ok(Duration::ZERO);
    }
    if input.is_empty() {
        return Err(InvalidDuration(input.to_string()));
    }
    let caps = DURATION_RE
        .captures(input)
        .ok_or_else(|| InvalidDuration(input.to_string()))?;

    let multipliers = [
        SECONDS_PER_YEAR * 1000,
        SECONDS_PER_WEEK * 1000,
        SECONDS_PER_DAY * 1000,
        SECONDS_PER_HOUR * 1000,
        SECONDS_PER_MINUTE * 1000,
        1000,
        1,
    ];
    let mut millis: u64 = 0;
    for (i, mult) in multipliers.iter().enumerate() {
        if let Some(m) = caps.get(i + 1) {
            let n: u64 = m
                .as_str()
                .parse()
                .map_err(|_| InvalidDuration(input.to_string()))?;
            millis = n
                .checked_mul(*mult)
                .and_then(|v| millis.checked_add(v))
                .ok_or_else(|| InvalidDuration(input.to_string()))?;
        }
    }
    Ok(Duration::from_millis(millis))
}

/// A duration field deserialized from its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleDuration(pub Duration);

impl RuleDuration {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for RuleDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl<'de> Deserialize<'de> for RuleDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s)
            .map(RuleDuration)
            .map_err(serde::de::Error::custom)
    }
}
