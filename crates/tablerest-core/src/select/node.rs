//! The parsed select tree.

use std::fmt;

/// How an embed affects membership of its parent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinType {
    /// Keep the parent row; the embed degrades to `[]` or `null`.
    #[default]
    Left,
    /// Drop the parent row unless the embed is non-empty / non-null.
    Inner,
}

impl JoinType {
    /// Parses the text after `!`.
    #[must_use]
    pub fn from_modifier(modifier: &str) -> Option<Self> {
        match modifier {
            "inner" => Some(Self::Inner),
            "left" => Some(Self::Left),
            _ => None,
        }
    }
}

/// A related resource nested inside its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedNode {
    /// Related table name, as written.
    pub table: String,
    /// Join-type modifier.
    pub join: JoinType,
    /// Projected children; empty means all columns.
    pub children: Vec<FieldNode>,
}

/// One entry in a select expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldNode {
    /// A plain attribute, or `*`.
    Column(String),
    /// A related resource.
    Embed(EmbedNode),
}

impl FieldNode {
    /// The wildcard column, equivalent to an absent `select`.
    #[must_use]
    pub fn wildcard() -> Self {
        Self::Column(String::from("*"))
    }

    /// Creates a column node.
    #[must_use]
    pub fn column(name: &str) -> Self {
        Self::Column(name.to_string())
    }

    /// Creates an embed node.
    #[must_use]
    pub fn embed(table: &str, join: JoinType, children: Vec<Self>) -> Self {
        Self::Embed(EmbedNode {
            table: table.to_string(),
            join,
            children,
        })
    }

    /// Returns the embed, if this node is one.
    #[must_use]
    pub const fn as_embed(&self) -> Option<&EmbedNode> {
        match self {
            Self::Embed(embed) => Some(embed),
            Self::Column(_) => None,
        }
    }
}

impl fmt::Display for FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(name) => f.write_str(name),
            Self::Embed(embed) => {
                f.write_str(&embed.table)?;
                if embed.join == JoinType::Inner {
                    f.write_str("!inner")?;
                }
                write!(f, "({})", DisplayFields(&embed.children))
            }
        }
    }
}

/// Pretty-prints a field list in canonical select syntax.
pub struct DisplayFields<'a>(pub &'a [FieldNode]);

impl fmt::Display for DisplayFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}
