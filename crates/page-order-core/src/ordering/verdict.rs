use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Relative-order judgment for an ordered pair (a, b).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// `a` precedes `b`.
    First,
    /// `b` precedes `a`.
    Second,
    /// No determinable order.
    Unknown,
}

impl Verdict {
    /// Verdict for the reversed pair (b, a).
    pub fn inverse(self) -> Self {
        match self {
            Verdict::First => Verdict::Second,
            Verdict::Second => Verdict::First,
            Verdict::Unknown => Verdict::Unknown,
        }
    }

    pub fn as_ordering(self) -> Ordering {
        match self {
            Verdict::First => Ordering::Less,
            Verdict::Second => Ordering::Greater,
            Verdict::Unknown => Ordering::Equal,
        }
    }

    /// -1 / 0 / 1 convention: negative means `a` first.
    pub fn from_signum(value: i64) -> Self {
        match value.signum() {
            -1 => Verdict::First,
            1 => Verdict::Second,
            _ => Verdict::Unknown,
        }
    }

    pub fn signum(self) -> i64 {
        match self {
            Verdict::First => -1,
            Verdict::Second => 1,
            Verdict::Unknown => 0,
        }
    }

    /// Interpret a free-text oracle reply using the -1 / 0 / 1 convention.
    /// `-1` anywhere wins, then any `1`; everything else is Unknown.
    pub fn parse_response(text: &str) -> Self {
        let text = text.trim();
        if text.contains("-1") {
            Verdict::First
        } else if text.contains('1') {
            Verdict::Second
        } else {
            Verdict::Unknown
        }
    }
}
