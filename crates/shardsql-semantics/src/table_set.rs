//! Table-set algebra
//!
//! A [`TableSet`] identifies a subset of the tables referenced by one
//! statement. Tables get unique bits assigned in the order they are
//! encountered during analysis, so bit *i* always means the table with
//! ordinal *i*. The width is fixed at 64 tables per statement; a growable
//! bit-vector is the documented escape hatch if that cap ever binds.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Maximum number of distinct tables one statement may reference
pub const MAX_TABLES: usize = 64;

/// A set of tables, one bit per table ordinal
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TableSet(u64);

impl TableSet {
    /// The empty set
    pub const EMPTY: TableSet = TableSet(0);

    /// The set containing exactly the table with the given ordinal.
    ///
    /// Ordinals at or beyond [`MAX_TABLES`] are a capacity violation; the
    /// analyzer checks before assigning them.
    pub fn singleton(ordinal: usize) -> TableSet {
        debug_assert!(ordinal < MAX_TABLES);
        TableSet(1 << ordinal)
    }

    /// Whether no table is in the set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// A set containing both inputs
    pub const fn merge(&self, other: TableSet) -> TableSet {
        TableSet(self.0 | other.0)
    }

    /// Whether at least one table exists in both sets
    pub const fn is_overlapping(&self, other: TableSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether every table in `self` is also in `other`
    pub const fn is_solved_by(&self, other: TableSet) -> bool {
        self.0 & other.0 == self.0
    }

    /// Number of tables in the set
    pub const fn number_of_tables(&self) -> u32 {
        self.0.count_ones()
    }

    /// The ordinal of the single table in the set.
    ///
    /// Defined only when exactly one bit is set.
    pub fn table_offset(&self) -> Option<usize> {
        if self.number_of_tables() == 1 {
            Some(self.0.trailing_zeros() as usize)
        } else {
            None
        }
    }

    /// Decompose into singleton sets, lowest ordinal first
    pub fn constituents(&self) -> SmallVec<[TableSet; 4]> {
        let mut mask = self.0;
        let mut result = SmallVec::new();
        while mask > 0 {
            let rest = mask & (mask - 1);
            result.push(TableSet(mask ^ rest));
            mask = rest;
        }
        result
    }
}

impl BitOr for TableSet {
    type Output = TableSet;

    fn bitor(self, rhs: TableSet) -> TableSet {
        self.merge(rhs)
    }
}

impl BitOrAssign for TableSet {
    fn bitor_assign(&mut self, rhs: TableSet) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for TableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for single in self.constituents() {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            write!(f, "{}", single.0.trailing_zeros())?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_singleton_offsets() {
        for ordinal in [0, 1, 5, 63] {
            let set = TableSet::singleton(ordinal);
            assert_eq!(set.number_of_tables(), 1);
            assert_eq!(set.table_offset(), Some(ordinal));
        }
    }

    #[test]
    fn test_offset_undefined_off_singletons() {
        assert_eq!(TableSet::EMPTY.table_offset(), None);
        let two = TableSet::singleton(0) | TableSet::singleton(3);
        assert_eq!(two.table_offset(), None);
    }

    #[test]
    fn test_constituents_lowest_first() {
        let set = TableSet::singleton(5) | TableSet::singleton(1) | TableSet::singleton(9);
        let parts = set.constituents();
        assert_eq!(
            parts.to_vec(),
            vec![
                TableSet::singleton(1),
                TableSet::singleton(5),
                TableSet::singleton(9)
            ]
        );
    }

    #[test]
    fn test_display() {
        let set = TableSet::singleton(0) | TableSet::singleton(2);
        assert_eq!(set.to_string(), "{0,2}");
    }

    proptest! {
        #[test]
        fn prop_solved_by_reflexive(bits: u64) {
            let set = TableSet(bits);
            prop_assert!(set.is_solved_by(set));
        }

        #[test]
        fn prop_merge_solves_both(a: u64, b: u64) {
            let (a, b) = (TableSet(a), TableSet(b));
            let merged = a | b;
            prop_assert!(a.is_solved_by(merged));
            prop_assert!(b.is_solved_by(merged));
        }

        #[test]
        fn prop_disjoint_singletons_do_not_overlap(a in 0usize..64, b in 0usize..64) {
            prop_assume!(a != b);
            prop_assert!(!TableSet::singleton(a).is_overlapping(TableSet::singleton(b)));
        }

        #[test]
        fn prop_constituents_rebuild_the_set(bits: u64) {
            let set = TableSet(bits);
            let rebuilt = set
                .constituents()
                .into_iter()
                .fold(TableSet::EMPTY, |acc, s| acc | s);
            prop_assert_eq!(rebuilt, set);
            prop_assert_eq!(set.constituents().len() as u32, set.number_of_tables());
        }
    }
}
