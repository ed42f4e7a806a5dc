use crate::expr::{ColumnRef, Predicate};
use crate::join::JoinRequest;
use crate::sql::Token;

/// Sort direction of an ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub(crate) const fn token(self) -> Token {
        match self {
            Direction::Asc => Token::ASC,
            Direction::Desc => Token::DESC,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: ColumnRef,
    pub direction: Direction,
}

/// Everything a relation asks for, in chaining order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Clauses {
    pub(crate) predicates: Vec<Predicate>,
    pub(crate) orders: Vec<OrderTerm>,
    /// Set by `reorder`: sort keys from the default scope are dropped.
    pub(crate) reordered: bool,
    pub(crate) joins: Vec<JoinRequest>,
    pub(crate) projection: Option<Vec<ColumnRef>>,
    pub(crate) group: Vec<ColumnRef>,
    pub(crate) having: Vec<Predicate>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) distinct: bool,
}

impl Clauses {
    /// Layers explicit clauses over default-scope clauses. Lists concatenate
    /// with defaults first; scalar settings from `explicit` win.
    pub(crate) fn merged(defaults: &Clauses, explicit: &Clauses) -> Clauses {
        fn concat<T: Clone>(first: &[T], second: &[T]) -> Vec<T> {
            first.iter().chain(second).cloned().collect()
        }

        let orders = if explicit.reordered {
            explicit.orders.clone()
        } else {
            concat(&defaults.orders, &explicit.orders)
        };

        let mut joins = defaults.joins.clone();
        for join in &explicit.joins {
            if !joins.contains(join) {
                joins.push(join.clone());
            }
        }

        Clauses {
            predicates: concat(&defaults.predicates, &explicit.predicates),
            orders,
            reordered: explicit.reordered,
            joins,
            projection: explicit
                .projection
                .clone()
                .or_else(|| defaults.projection.clone()),
            group: concat(&defaults.group, &explicit.group),
            having: concat(&defaults.having, &explicit.having),
            limit: explicit.limit.or(defaults.limit),
            offset: explicit.offset.or(defaults.offset),
            distinct: explicit.distinct || defaults.distinct,
        }
    }
}
