//! Root-table filters written as `column=op.value`.

use std::fmt;

use crate::dialect::Dialect;
use crate::ident::Ident;
use crate::statement::SqlWriter;

/// Filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equal (=)
    Eq,
    /// Greater than (>)
    Gt,
    /// Less than (<)
    Lt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than or equal (<=)
    Lte,
    /// Pattern match (LIKE); `%` and `_` pass through untouched
    Like,
    /// Set membership (IN)
    In,
}

impl FilterOp {
    /// All operators, in the order they are documented.
    pub const ALL: [Self; 7] = [
        Self::Eq,
        Self::Gt,
        Self::Lt,
        Self::Gte,
        Self::Lte,
        Self::Like,
        Self::In,
    ];

    /// Looks up an operator by its query-string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// The query-string name, e.g. `gte`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::In => "in",
        }
    }

    /// Splits `op.operand` when `op` is a known operator.
    ///
    /// The split happens at the first `.`, so operands may contain dots
    /// (`price=gt.9.99`).
    #[must_use]
    pub fn split(value: &str) -> Option<(Self, &str)> {
        let (name, operand) = value.split_once('.')?;
        Self::from_name(name).map(|op| (op, operand))
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Gt => write!(f, ">"),
            Self::Lt => write!(f, "<"),
            Self::Gte => write!(f, ">="),
            Self::Lte => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
            Self::In => write!(f, "IN"),
        }
    }
}

/// A predicate on one column of the root table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    /// Filtered column.
    pub column: Ident,
    /// Operator.
    pub op: FilterOp,
    /// Operands; exactly one except for `in`.
    pub operands: Vec<String>,
}

impl FilterPredicate {
    /// Creates a predicate from the raw operand text.
    ///
    /// For `in`, the operand is an optionally parenthesised, comma-separated
    /// list; items are kept verbatim. An empty list matches nothing.
    #[must_use]
    pub fn new(column: Ident, op: FilterOp, operand: &str) -> Self {
        let operands = match op {
            FilterOp::In => {
                let list = operand
                    .strip_prefix('(')
                    .and_then(|rest| rest.strip_suffix(')'))
                    .unwrap_or(operand);
                if list.is_empty() {
                    Vec::new()
                } else {
                    list.split(',').map(str::to_string).collect()
                }
            }
            _ => vec![operand.to_string()],
        };
        Self {
            column,
            op,
            operands,
        }
    }

    /// Writes the predicate against `relation`, binding every operand.
    pub fn write<D: Dialect + ?Sized>(&self, relation: &str, w: &mut SqlWriter<'_, D>) {
        if self.op == FilterOp::In && self.operands.is_empty() {
            w.push_str("FALSE");
            return;
        }
        w.push_qualified(relation, self.column.as_str());
        w.push_str(&format!(" {} ", self.op));
        if self.op == FilterOp::In {
            w.push_str("(");
            for (i, operand) in self.operands.iter().enumerate() {
                if i > 0 {
                    w.push_str(", ");
                }
                w.bind(operand);
            }
            w.push_str(")");
        } else {
            for operand in &self.operands {
                w.bind(operand);
            }
        }
    }
}
