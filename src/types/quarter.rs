//! Fiscal quarter identifier.
//!
//! Quarters travel over the wire as `YYYYQn` tokens (`2025Q3`). Internally
//! they are a `(year, index)` pair so ordering is chronological and never
//! depends on the token's string layout.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors produced when parsing a quarter token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuarterParseError {
    #[error("quarter token '{0}' is not of the form YYYYQn")]
    Malformed(String),
    #[error("quarter token '{token}' has a quarter index of {index}, expected 1-4")]
    IndexOutOfRange { token: String, index: u32 },
}

/// A fiscal quarter: `year` plus a quarter index in `1..=4`.
///
/// Field order matters: the derived `Ord` compares year first, then index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quarter {
    year: u16,
    index: u8,
}

impl Quarter {
    /// Build a quarter, returning `None` when `index` is outside `1..=4`
    /// or the year does not fit the four-digit token form.
    pub const fn new(year: u16, index: u8) -> Option<Self> {
        if index < 1 || index > 4 || year < 1000 || year > 9999 {
            return None;
        }
        Some(Self { year, index })
    }

    pub const fn year(self) -> u16 {
        self.year
    }

    pub const fn index(self) -> u8 {
        self.index
    }

    /// The quarter after this one, or `None` past `9999Q4`.
    pub const fn checked_next(self) -> Option<Self> {
        if self.index < 4 {
            Some(Self { year: self.year, index: self.index + 1 })
        } else if self.year < 9999 {
            Some(Self { year: self.year + 1, index: 1 })
        } else {
            None
        }
    }

    /// The quarter before this one, or `None` before `1000Q1`.
    pub const fn checked_prev(self) -> Option<Self> {
        if self.index > 1 {
            Some(Self { year: self.year, index: self.index - 1 })
        } else if self.year > 1000 {
            Some(Self { year: self.year - 1, index: 4 })
        } else {
            None
        }
    }

    /// The quarter immediately after this one (`2025Q4` → `2026Q1`).
    /// Saturates at `9999Q4`.
    pub const fn next(self) -> Self {
        match self.checked_next() {
            Some(q) => q,
            None => self,
        }
    }

    /// The quarter immediately before this one (`2026Q1` → `2025Q4`).
    /// Saturates at `1000Q1`.
    pub const fn prev(self) -> Self {
        match self.checked_prev() {
            Some(q) => q,
            None => self,
        }
    }

    /// Up to `count` consecutive quarters starting at `self`; shorter when
    /// the sequence reaches `9999Q4`.
    pub fn range(self, count: usize) -> Vec<Self> {
        let mut out = Vec::with_capacity(count);
        let mut next = Some(self);
        while let Some(q) = next {
            if out.len() == count {
                break;
            }
            out.push(q);
            next = q.checked_next();
        }
        out
    }

    /// Quarter containing the given calendar date.
    pub fn from_date(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        let year = u16::try_from(date.year()).unwrap_or(1970).clamp(1000, 9999);
        // month0 is 0..=11, so the index is always 1..=4
        let index = u8::try_from(date.month0() / 3 + 1).unwrap_or(1);
        Self { year, index }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}Q{}", self.year, self.index)
    }
}

impl FromStr for Quarter {
    type Err = QuarterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let malformed = || QuarterParseError::Malformed(s.to_string());

        let (year_part, index_part) = token
            .split_once(['Q', 'q'])
            .ok_or_else(malformed)?;

        if year_part.len() != 4 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if index_part.is_empty() || !index_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let year: u16 = year_part.parse().map_err(|_| malformed())?;
        let index: u32 = index_part.parse().map_err(|_| malformed())?;

        u8::try_from(index)
            .ok()
            .and_then(|i| Self::new(year, i))
            .ok_or_else(|| QuarterParseError::IndexOutOfRange {
                token: s.to_string(),
                index,
            })
    }
}

impl Serialize for Quarter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quarter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}
