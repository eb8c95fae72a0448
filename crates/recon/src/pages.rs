//! Exact page counts.
//!
//! Quantities and printed page counts arrive as free text ("1,200", " 5 ",
//! "n/a"). They are coerced once, at load time, into [`Pages`]: an integer
//! number of thousandths of a page. All sums and diffs downstream are plain
//! integer arithmetic, so `diff == 0` is an exact comparison.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

use serde::{Serialize, Serializer};

const SCALE: i64 = 1000;

/// Largest magnitude accepted from text; beyond this the f64 → i64 scaling
/// would no longer be exact.
const MAX_SCALED: f64 = 9.0e15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pages(i64);

impl Pages {
    pub const ZERO: Pages = Pages(0);

    pub fn from_whole(pages: i64) -> Self {
        Self(pages.saturating_mul(SCALE))
    }

    /// Convert a float, rounding to the nearest thousandth of a page.
    /// Returns `None` for NaN, infinities and out-of-range magnitudes.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let exact = value * SCALE as f64;
        let scaled = exact.round();
        if scaled.abs() > MAX_SCALED {
            return None;
        }
        let pages = Self(scaled as i64);
        if finer_than_thousandth(exact, scaled) {
            log::debug!("page count {value} rounded to {pages}");
        }
        Some(pages)
    }

    /// Parse a numeric cell: strip thousands separators and whitespace,
    /// then read what remains as a number.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        if cleaned.is_empty() {
            return None;
        }

        cleaned.parse::<f64>().ok().and_then(Self::from_f64)
    }

    /// Like [`Pages::parse`], but anything unparseable counts as zero.
    pub fn coerce(raw: &str) -> Self {
        match Self::parse(raw) {
            Some(pages) => pages,
            None => {
                if !raw.trim().is_empty() {
                    log::debug!("non-numeric page value {raw:?} coerced to 0");
                }
                Self::ZERO
            }
        }
    }

    pub fn doubled(self) -> Self {
        Self(self.0.saturating_mul(2))
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    fn split(self) -> (bool, u64, u64) {
        let magnitude = self.0.unsigned_abs();
        (self.0 < 0, magnitude / SCALE as u64, magnitude % SCALE as u64)
    }
}

impl fmt::Display for Pages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (negative, whole, frac) = self.split();
        let sign = if negative { "-" } else { "" };
        if frac == 0 {
            write!(f, "{sign}{whole}")
        } else {
            let digits = format!("{frac:03}");
            write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
        }
    }
}

impl Serialize for Pages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (negative, whole, frac) = self.split();
        if frac == 0 {
            let whole = whole as i64;
            serializer.serialize_i64(if negative { -whole } else { whole })
        } else {
            serializer.serialize_f64(self.to_f64())
        }
    }
}

impl Add for Pages {
    type Output = Pages;

    fn add(self, rhs: Pages) -> Pages {
        Pages(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Pages {
    fn add_assign(&mut self, rhs: Pages) {
        *self = *self + rhs;
    }
}

impl Sub for Pages {
    type Output = Pages;

    fn sub(self, rhs: Pages) -> Pages {
        Pages(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Pages {
    type Output = Pages;

    fn neg(self) -> Pages {
        Pages(self.0.saturating_neg())
    }
}

impl Sum for Pages {
    fn sum<I: Iterator<Item = Pages>>(iter: I) -> Pages {
        iter.fold(Pages::ZERO, Add::add)
    }
}

/// True when rounding dropped more than float noise, e.g. 0.0004 but not
/// 1.001 (which scales to 1000.9999999999999).
fn finer_than_thousandth(exact: f64, scaled: f64) -> bool {
    (exact - scaled).abs() > 1e-6
}
