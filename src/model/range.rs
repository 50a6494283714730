// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::fmt;

use super::error::{FixtureError, Result};

/// An inclusive integer interval of DMX values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    start: u32,
    end: u32,
}

impl Range {
    /// Creates a new range. Fails if start is greater than end.
    pub fn new(start: u32, end: u32) -> Result<Range> {
        if start > end {
            return Err(FixtureError::Range(format!(
                "range start {} is greater than range end {}",
                start, end
            )));
        }
        Ok(Range { start, end })
    }

    /// Gets the start of the range.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Gets the end of the range.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Gets the center of the range, rounded down.
    pub fn center(&self) -> u32 {
        ((u64::from(self.start) + u64::from(self.end)) / 2) as u32
    }

    /// Returns true if the value lies within the range, ends included.
    pub fn contains(&self, value: u32) -> bool {
        self.start <= value && value <= self.end
    }

    /// Returns true if the ranges overlap. Ranges that only touch at their ends do not overlap.
    pub fn overlaps_with(&self, other: &Range) -> bool {
        other.end > self.start && other.start < self.end
    }

    /// Returns true if one range ends directly before the other one starts.
    pub fn is_adjacent_to(&self, other: &Range) -> bool {
        self.end.checked_add(1) == Some(other.start) || other.end.checked_add(1) == Some(self.start)
    }

    /// Merges transitively adjacent ranges.
    ///
    /// Each input range extends the first already merged range it is adjacent to, otherwise it
    /// starts a new one. The output keeps that first-adjacency order and is not sorted. The
    /// input ranges must not overlap each other.
    pub fn merge_ranges(ranges: &[Range]) -> Vec<Range> {
        let mut merged: Vec<Range> = Vec::new();

        for range in ranges {
            match merged.iter_mut().find(|m| m.is_adjacent_to(range)) {
                Some(adjacent) => {
                    adjacent.start = adjacent.start.min(range.start);
                    adjacent.end = adjacent.end.max(range.end);
                }
                None => merged.push(*range),
            }
        }

        merged
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}…{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> Range {
        Range::new(start, end).unwrap()
    }

    #[test]
    fn test_invalid_range() {
        assert!(matches!(Range::new(10, 9), Err(FixtureError::Range(_))));
        assert!(Range::new(10, 10).is_ok());
    }

    #[test]
    fn test_contains_and_center() {
        let r = range(10, 20);
        assert!(r.contains(10));
        assert!(r.contains(20));
        assert!(!r.contains(9));
        assert!(!r.contains(21));
        assert_eq!(r.center(), 15);
        assert_eq!(range(0, 255).center(), 127);
        assert_eq!(range(0, u32::MAX).center(), u32::MAX / 2);
    }

    #[test]
    fn test_overlaps_with() {
        assert!(range(0, 10).overlaps_with(&range(5, 15)));
        assert!(range(5, 15).overlaps_with(&range(0, 10)));
        assert!(range(0, 100).overlaps_with(&range(10, 20)));
        // touching ends do not overlap
        assert!(!range(0, 10).overlaps_with(&range(10, 20)));
        assert!(!range(0, 9).overlaps_with(&range(10, 20)));
    }

    #[test]
    fn test_is_adjacent_to() {
        assert!(range(0, 9).is_adjacent_to(&range(10, 19)));
        assert!(range(10, 19).is_adjacent_to(&range(0, 9)));
        assert!(!range(0, 9).is_adjacent_to(&range(11, 19)));
        assert!(!range(0, u32::MAX).is_adjacent_to(&range(0, 1)));
    }

    #[test]
    fn test_merge_ranges() {
        let merged = Range::merge_ranges(&[range(0, 9), range(10, 19), range(30, 39)]);
        assert_eq!(merged, vec![range(0, 19), range(30, 39)]);
    }

    #[test]
    fn test_merge_ranges_keeps_first_occurrence_order() {
        let merged = Range::merge_ranges(&[range(30, 39), range(0, 9), range(40, 49), range(10, 19)]);
        assert_eq!(merged, vec![range(30, 49), range(0, 19)]);
    }

    #[test]
    fn test_merge_ranges_does_not_rejoin_merged_outputs() {
        // [20, 29] only becomes adjacent to [0, 9] after [10, 19] joins it, which a single
        // pass over the already merged ranges does not revisit.
        let merged = Range::merge_ranges(&[range(0, 9), range(20, 29), range(10, 19)]);
        assert_eq!(merged, vec![range(0, 19), range(20, 29)]);
    }
}
