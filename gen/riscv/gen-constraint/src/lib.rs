//! # Address Constraint Sets
//!
//! A [`ConstraintSet`] is an ordered collection of disjoint, **inclusive**
//! `u64` ranges. It describes which addresses are still usable, e.g. the
//! physical window a page table may be placed into, or the free ranges of a
//! memory bank.
//!
//! ## Invariants
//!
//! - Ranges are sorted by their lower bound.
//! - Ranges never overlap and are never adjacent; touching ranges are
//!   coalesced on insertion.
//! - Every [`Constraint`] satisfies `lower <= upper`.
//!
//! ## Text form
//!
//! Sets parse from and print to a comma separated list of values and
//! `lower-upper` ranges. Numbers are hexadecimal with a `0x` prefix or
//! decimal:
//!
//! ```rust
//! # use gen_constraint::ConstraintSet;
//! let mut usable: ConstraintSet = "0x1000-0x4fff, 0x8000-0x8fff".parse().unwrap();
//! usable.apply(&ConstraintSet::new(0, 0x2fff));
//! assert_eq!(usable.to_string(), "0x1000-0x2fff");
//! assert_eq!(usable.size(), 0x2000);
//! ```

use std::fmt;
use std::str::FromStr;

/// A single inclusive range `[lower, upper]`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Constraint {
    lower: u64,
    upper: u64,
}

impl Constraint {
    /// Create a range; `None` if `lower > upper`.
    #[inline]
    #[must_use]
    pub const fn new(lower: u64, upper: u64) -> Option<Self> {
        if lower > upper {
            return None;
        }
        Some(Self { lower, upper })
    }

    #[inline]
    #[must_use]
    pub const fn lower(self) -> u64 {
        self.lower
    }

    #[inline]
    #[must_use]
    pub const fn upper(self) -> u64 {
        self.upper
    }

    /// Number of values in the range, saturating at `u64::MAX`.
    #[inline]
    #[must_use]
    pub const fn size(self) -> u64 {
        (self.upper - self.lower).saturating_add(1)
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, value: u64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lower == self.upper {
            write!(f, "{:#x}", self.lower)
        } else {
            write!(f, "{:#x}-{:#x}", self.lower, self.upper)
        }
    }
}

/// Error produced when parsing a [`ConstraintSet`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintParseError {
    #[error("empty element in constraint list")]
    EmptyElement,
    #[error("invalid number \"{0}\"")]
    InvalidNumber(String),
    #[error("inverted range {lower:#x}-{upper:#x}")]
    InvertedRange { lower: u64, upper: u64 },
}

/// Ordered set of disjoint inclusive ranges.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ConstraintSet {
    ranges: Vec<Constraint>,
}

impl ConstraintSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self { ranges: Vec::new() }
    }

    /// The set `[lower, upper]`; empty if `lower > upper`.
    #[must_use]
    pub fn new(lower: u64, upper: u64) -> Self {
        let mut set = Self::empty();
        set.add_range(lower, upper);
        set
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of values in the set, saturating at `u64::MAX`.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.ranges
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.size()))
    }

    /// The ranges in ascending order.
    pub fn ranges(&self) -> impl Iterator<Item = Constraint> + '_ {
        self.ranges.iter().copied()
    }

    #[must_use]
    pub fn contains(&self, value: u64) -> bool {
        self.containing_index(value).is_some()
    }

    fn containing_index(&self, value: u64) -> Option<usize> {
        // First range whose upper bound is >= value.
        let i = self.ranges.partition_point(|r| r.upper < value);
        (i < self.ranges.len() && self.ranges[i].lower <= value).then_some(i)
    }

    /// Insert `[lower, upper]`, coalescing with overlapping or adjacent ranges.
    pub fn add_range(&mut self, lower: u64, upper: u64) {
        let Some(mut new) = Constraint::new(lower, upper) else {
            return;
        };

        // Ranges strictly left of `new` and not adjacent to it stay untouched.
        let start = self
            .ranges
            .partition_point(|r| r.upper.saturating_add(1) < new.lower);
        let mut end = start;
        while end < self.ranges.len() && self.ranges[end].lower <= new.upper.saturating_add(1) {
            new.lower = new.lower.min(self.ranges[end].lower);
            new.upper = new.upper.max(self.ranges[end].upper);
            end += 1;
        }
        self.ranges.splice(start..end, [new]);
    }

    /// Remove `[lower, upper]` from the set.
    pub fn subtract_range(&mut self, lower: u64, upper: u64) {
        if lower > upper {
            return;
        }
        let mut kept = Vec::with_capacity(self.ranges.len() + 1);
        for r in self.ranges.drain(..) {
            if r.upper < lower || r.lower > upper {
                kept.push(r);
                continue;
            }
            if r.lower < lower {
                kept.push(Constraint {
                    lower: r.lower,
                    upper: lower - 1,
                });
            }
            if r.upper > upper {
                kept.push(Constraint {
                    lower: upper + 1,
                    upper: r.upper,
                });
            }
        }
        self.ranges = kept;
    }

    /// Intersect in place with `other`.
    pub fn apply(&mut self, other: &Self) {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let a = self.ranges[i];
            let b = other.ranges[j];
            if let Some(c) = Constraint::new(a.lower.max(b.lower), a.upper.min(b.upper)) {
                out.push(c);
            }
            if a.upper < b.upper {
                i += 1;
            } else {
                j += 1;
            }
        }
        self.ranges = out;
    }

    /// First address `base` such that `base` is a multiple of `align` and
    /// `[base, base + size - 1]` lies entirely inside one range of the set.
    ///
    /// `align` must be a non-zero power of two. Returns `None` for `size == 0`.
    #[must_use]
    pub fn find_aligned(&self, size: u64, align: u64) -> Option<u64> {
        debug_assert!(align.is_power_of_two(), "alignment must be a power of two");
        if size == 0 {
            return None;
        }
        self.ranges.iter().find_map(|r| {
            let base = r.lower.checked_add(align - 1)? & !(align - 1);
            let last = base.checked_add(size - 1)?;
            (last <= r.upper).then_some(base)
        })
    }
}

fn parse_number(text: &str) -> Result<u64, ConstraintParseError> {
    let text = text.trim();
    let parsed = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        u64::from_str_radix(&hex.replace('_', ""), 16)
    } else {
        text.replace('_', "").parse::<u64>()
    };
    parsed.map_err(|_| ConstraintParseError::InvalidNumber(text.into()))
}

impl FromStr for ConstraintSet {
    type Err = ConstraintParseError;

    /// Parse `"a-b,c,..."`. Blank input yields the empty set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = Self::empty();
        if s.trim().is_empty() {
            return Ok(set);
        }
        for element in s.split(',') {
            let element = element.trim();
            if element.is_empty() {
                return Err(ConstraintParseError::EmptyElement);
            }
            let (lower, upper) = match element.split_once('-') {
                Some((lo, hi)) => (parse_number(lo)?, parse_number(hi)?),
                None => {
                    let v = parse_number(element)?;
                    (v, v)
                }
            };
            if lower > upper {
                return Err(ConstraintParseError::InvertedRange { lower, upper });
            }
            set.add_range(lower, upper);
        }
        Ok(set)
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{r}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(s: &str) -> ConstraintSet {
        s.parse().unwrap()
    }

    #[test]
    fn parse_values_and_ranges() {
        let s = set("0x10-0x1f, 32, 0x40");
        assert_eq!(s.ranges().count(), 2);
        assert_eq!(s.to_string(), "0x10-0x20,0x40");
        assert_eq!(s.size(), 18);
    }

    #[test]
    fn parse_blank_is_empty() {
        assert!(set("").is_empty());
        assert!(set("   ").is_empty());
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            "0x10-zz".parse::<ConstraintSet>(),
            Err(ConstraintParseError::InvalidNumber("zz".into()))
        );
        assert_eq!(
            "0x20-0x10".parse::<ConstraintSet>(),
            Err(ConstraintParseError::InvertedRange {
                lower: 0x20,
                upper: 0x10
            })
        );
        assert_eq!(
            "0x1,,0x2".parse::<ConstraintSet>(),
            Err(ConstraintParseError::EmptyElement)
        );
    }

    #[test]
    fn add_range_coalesces_overlapping_and_adjacent() {
        let mut s = ConstraintSet::new(0x100, 0x1ff);
        s.add_range(0x300, 0x3ff);
        s.add_range(0x200, 0x2ff);
        assert_eq!(s.to_string(), "0x100-0x3ff");
        s.add_range(0x50, 0x150);
        assert_eq!(s.to_string(), "0x50-0x3ff");
    }

    #[test]
    fn apply_intersects() {
        let mut s = set("0x0-0xfff,0x2000-0x2fff,0x5000-0x5fff");
        s.apply(&set("0x800-0x27ff,0x5fff-0x9000"));
        assert_eq!(s.to_string(), "0x800-0xfff,0x2000-0x27ff,0x5fff");
    }

    #[test]
    fn apply_with_empty_is_empty() {
        let mut s = set("0x0-0xfff");
        s.apply(&ConstraintSet::empty());
        assert!(s.is_empty());
    }

    #[test]
    fn subtract_splits_ranges() {
        let mut s = set("0x0-0xfff");
        s.subtract_range(0x100, 0x1ff);
        assert_eq!(s.to_string(), "0x0-0xff,0x200-0xfff");
        s.subtract_range(0xf00, 0x10000);
        assert_eq!(s.to_string(), "0x0-0xff,0x200-0xeff");
        assert!(s.contains(0x250));
        assert!(!s.contains(0x100));
    }

    #[test]
    fn find_aligned_first_fit() {
        let s = set("0x10-0x1fff,0x3000-0x4fff");
        assert_eq!(s.find_aligned(0x1000, 0x1000), Some(0x1000));
        assert_eq!(s.find_aligned(0x1800, 0x1000), Some(0x3000));
        assert_eq!(s.find_aligned(0x3000, 0x1000), None);
        assert_eq!(s.find_aligned(0, 0x1000), None);
    }

    #[test]
    fn find_aligned_near_top_does_not_overflow() {
        let s = ConstraintSet::new(u64::MAX - 0x10, u64::MAX);
        assert_eq!(s.find_aligned(0x1000, 0x1000), None);
    }

    #[test]
    fn full_range_size_saturates() {
        assert_eq!(ConstraintSet::new(0, u64::MAX).size(), u64::MAX);
    }
}
