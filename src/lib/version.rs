//! Firmware version parsing and feature gating.
//!
//! FortiOS reports its version as a free-form string such as `"v6.4.1"` or
//! `"7.0.12-build1234"`. Probes only ever need the leading
//! `(major, minor)` pair to decide between API shapes, so everything after
//! the second numeric group is ignored.

use std::fmt;

/// A parsed `(major, minor)` firmware version, ordered lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SystemVersion {
    pub major: u32,
    pub minor: u32,
}

impl SystemVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Extract `(major, minor)` from a firmware string.
    ///
    /// Accepts `"<major>.<minor>[.<patch>][-suffix]"` with an optional
    /// leading `v`. Returns `None` when either of the first two
    /// dot-separated groups is missing or not a leading integer. Trailing
    /// groups and suffixes are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.strip_prefix('v').unwrap_or(s);
        let mut groups = s.split('.');
        let major = leading_u32(groups.next()?)?;
        let minor = leading_u32(groups.next()?)?;
        Some(Self { major, minor })
    }

    /// Binary feature gate: `(major, minor) >= (want_major, want_minor)`
    /// under standard integer ordering.
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        *self >= SystemVersion::new(major, minor)
    }
}

impl fmt::Display for SystemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parse the leading decimal digits of a group. The minor group may carry a
/// suffix (e.g. `"4-beta"`), which is ignorable; a group with no leading
/// digit is an error.
fn leading_u32(group: &str) -> Option<u32> {
    let digits: &str = group
        .split_once(|c: char| !c.is_ascii_digit())
        .map(|(head, _)| head)
        .unwrap_or(group);
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
