//! # Query Predicates
//!
//! A [`Query`] is a conjunction of [`Condition`]s with optional ordering and
//! limit. It is evaluated by store adapters and its [`Query::normalized`]
//! form is the predicate half of a second-level cache key.

use crate::entities::{Row, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl CompareOp {
    fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// One predicate over a column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// `field <op> value`
    Compare {
        /// Column name.
        field: String,
        /// Operator.
        op: CompareOp,
        /// Right-hand side.
        value: Value,
    },
    /// `field IN (values)`
    In {
        /// Column name.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },
}

impl Condition {
    fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Condition::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    /// `field IN (values)`
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Condition::In {
            field: field.into(),
            values,
        }
    }

    /// Evaluate against a row. Missing or incomparable columns never match.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Condition::Compare { field, op, value } => row
                .get(field)
                .and_then(|actual| actual.compare(value))
                .map(|ordering| op.accepts(ordering))
                .unwrap_or(false),
            Condition::In { field, values } => match row.get(field) {
                Some(actual) => values
                    .iter()
                    .any(|v| actual.compare(v) == Some(Ordering::Equal)),
                None => false,
            },
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare { field, op, value } => {
                write!(f, "{} {} {}", field, op.symbol(), value)
            }
            Condition::In { field, values } => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{} IN ({})", field, rendered.join(", "))
            }
        }
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Conjunctive query with ordering and limit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    conditions: Vec<Condition>,
    order_by: Vec<(String, Order)>,
    limit: Option<usize>,
}

impl Query {
    /// Empty query: matches every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition (AND).
    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Append an ordering column.
    pub fn order_by(mut self, field: impl Into<String>, order: Order) -> Self {
        self.order_by.push((field.into(), order));
        self
    }

    /// Limit the number of rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Conditions in insertion order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Ordering columns.
    pub fn ordering(&self) -> &[(String, Order)] {
        &self.order_by
    }

    /// Row limit.
    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Check whether the query has no conditions.
    pub fn is_unfiltered(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check whether a row satisfies every condition.
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }

    /// Sort rows by the ordering columns and apply the limit.
    pub fn arrange(&self, rows: &mut Vec<Row>) {
        if !self.order_by.is_empty() {
            rows.sort_by(|a, b| {
                for (field, order) in &self.order_by {
                    let ordering = match (a.get(field), b.get(field)) {
                        (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
                        (Some(_), None) => Ordering::Greater,
                        (None, Some(_)) => Ordering::Less,
                        (None, None) => Ordering::Equal,
                    };
                    let ordering = match order {
                        Order::Asc => ordering,
                        Order::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
    }

    /// Copy of this query with extra conditions appended.
    ///
    /// Ordering and limit are kept from `self`.
    pub fn with_conditions(&self, extra: impl IntoIterator<Item = Condition>) -> Query {
        let mut merged = self.clone();
        merged.conditions.extend(extra);
        merged
    }

    /// Copy of this query without ordering or limit.
    pub fn filter_only(&self) -> Query {
        Query {
            conditions: self.conditions.clone(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Canonical text of the query.
    ///
    /// Conditions are sorted, so conjunctions that differ only in condition
    /// order share one normalized form.
    pub fn normalized(&self) -> String {
        let mut rendered: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
        rendered.sort();

        let mut out = String::new();
        if !rendered.is_empty() {
            out.push_str("WHERE ");
            out.push_str(&rendered.join(" AND "));
        }
        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|(field, order)| match order {
                    Order::Asc => format!("{} ASC", field),
                    Order::Desc => format!("{} DESC", field),
                })
                .collect();
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str("ORDER BY ");
            out.push_str(&order.join(", "));
        }
        if let Some(limit) = self.limit {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&format!("LIMIT {}", limit));
        }
        out
    }
}
