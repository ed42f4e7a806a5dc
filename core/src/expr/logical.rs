//! Logical operators (AND, OR, NOT).
//!
//! This module provides both function-based and operator-based logical operations:
//!
//! ```ignore
//! // Function style
//! and([condition1, condition2])
//! or([condition1, condition2])
//! not(condition)
//!
//! // Operator style (via std::ops traits)
//! condition1 & condition2   // BitAnd
//! condition1 | condition2   // BitOr
//! !condition                // Not
//! ```

use core::ops::{BitAnd, BitOr, Not};

use super::Predicate;

// =============================================================================
// NOT
// =============================================================================

/// Logical NOT.
pub fn not(predicate: Predicate) -> Predicate {
    predicate.negate()
}

// =============================================================================
// AND
// =============================================================================

/// Logical AND of multiple predicates.
///
/// Nested ANDs are flattened, so `and([a, and([b, c])])` is the same tree as
/// `and([a, b, c])`. A single predicate is returned unchanged.
pub fn and<I>(predicates: I) -> Predicate
where
    I: IntoIterator<Item = Predicate>,
{
    let mut children = Vec::new();
    for predicate in predicates {
        match predicate {
            Predicate::And(nested) => children.extend(nested),
            other => children.push(other),
        }
    }
    if children.len() == 1 {
        return children.remove(0);
    }
    Predicate::And(children)
}

// =============================================================================
// OR
// =============================================================================

/// Logical OR of multiple predicates, flattened like [`and`].
pub fn or<I>(predicates: I) -> Predicate
where
    I: IntoIterator<Item = Predicate>,
{
    let mut children = Vec::new();
    for predicate in predicates {
        match predicate {
            Predicate::Or(nested) => children.extend(nested),
            other => children.push(other),
        }
    }
    if children.len() == 1 {
        return children.remove(0);
    }
    Predicate::Or(children)
}

// =============================================================================
// Operators
// =============================================================================

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        and([self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        or([self, rhs])
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        self.negate()
    }
}
