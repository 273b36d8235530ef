//! SELECT statement assembly using the typestate pattern.
//!
//! A statement cannot be rendered until it has both a column list and a
//! `FROM` source; clauses that only make sense after `FROM` are only
//! available then. Bound operands are written through a [`SqlWriter`], which
//! numbers placeholders in the order they appear in the text, so the
//! placeholder count always equals the parameter count.

use std::marker::PhantomData;

use crate::dialect::Dialect;
use crate::filter::FilterPredicate;

/// Accumulates SQL text and its positional operands.
pub struct SqlWriter<'d, D: ?Sized> {
    dialect: &'d D,
    sql: String,
    params: Vec<String>,
}

impl<'d, D: Dialect + ?Sized> SqlWriter<'d, D> {
    /// Creates an empty writer.
    #[must_use]
    pub fn new(dialect: &'d D) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// The dialect being written.
    #[must_use]
    pub const fn dialect(&self) -> &'d D {
        self.dialect
    }

    /// Appends raw SQL text.
    pub fn push_str(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Appends a quoted identifier.
    pub fn push_ident(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    /// Appends `"relation"."column"`.
    pub fn push_qualified(&mut self, relation: &str, column: &str) {
        self.push_ident(relation);
        self.sql.push('.');
        self.push_ident(column);
    }

    /// Appends the next placeholder and records `value` for it.
    pub fn bind(&mut self, value: &str) {
        self.params.push(value.to_string());
        let placeholder = self.dialect.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
    }

    /// Returns the text and operands written so far.
    #[must_use]
    pub fn finish(self) -> (String, Vec<String>) {
        (self.sql, self.params)
    }
}

/// One conjunct of a `WHERE` clause.
#[derive(Debug, Clone)]
pub enum Condition {
    /// A filter on a column of `relation`, with bound operands.
    Filter {
        /// Table name or alias the column belongs to.
        relation: String,
        /// The predicate.
        predicate: FilterPredicate,
    },
    /// Pre-rendered, parameter-free SQL such as an `EXISTS` test or a
    /// correlation predicate.
    Sql(String),
}

impl Condition {
    fn write<D: Dialect + ?Sized>(&self, w: &mut SqlWriter<'_, D>) {
        match self {
            Self::Filter {
                relation,
                predicate,
            } => predicate.write(relation, w),
            Self::Sql(sql) => w.push_str(sql),
        }
    }

    const fn is_bound(&self) -> bool {
        matches!(self, Self::Filter { .. })
    }
}

// Typestate markers (zero-sized types)

/// Marker: no columns selected yet.
pub struct NoColumns;
/// Marker: columns have been selected.
pub struct HasColumns;
/// Marker: no FROM source yet.
pub struct NoFrom;
/// Marker: FROM source has been set.
pub struct HasFrom;

/// A SELECT statement under construction.
pub struct SelectStatement<Cols, From> {
    columns: Vec<String>,
    from: Option<String>,
    joins: Vec<String>,
    conditions: Vec<Condition>,
    order_by: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    _state: PhantomData<(Cols, From)>,
}

impl SelectStatement<NoColumns, NoFrom> {
    /// Creates an empty statement.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: vec![],
            from: None,
            joins: vec![],
            conditions: vec![],
            order_by: None,
            limit: None,
            offset: None,
            _state: PhantomData,
        }
    }
}

impl Default for SelectStatement<NoColumns, NoFrom> {
    fn default() -> Self {
        Self::new()
    }
}

impl<From> SelectStatement<NoColumns, From> {
    /// Sets the select list. Each entry is a complete SQL expression.
    #[must_use]
    pub fn columns(self, columns: Vec<String>) -> SelectStatement<HasColumns, From> {
        SelectStatement {
            columns,
            from: self.from,
            joins: self.joins,
            conditions: self.conditions,
            order_by: self.order_by,
            limit: self.limit,
            offset: self.offset,
            _state: PhantomData,
        }
    }
}

impl<Cols> SelectStatement<Cols, NoFrom> {
    /// Sets the FROM source, which may already include an `AS` alias.
    #[must_use]
    pub fn from(self, source: String) -> SelectStatement<Cols, HasFrom> {
        SelectStatement {
            columns: self.columns,
            from: Some(source),
            joins: self.joins,
            conditions: self.conditions,
            order_by: self.order_by,
            limit: self.limit,
            offset: self.offset,
            _state: PhantomData,
        }
    }
}

impl<Cols> SelectStatement<Cols, HasFrom> {
    /// Adds `LEFT JOIN {table} ON {on}`.
    #[must_use]
    pub fn left_join(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("LEFT JOIN {table} ON {on}"));
        self
    }

    /// ANDs a condition onto the `WHERE` clause.
    #[must_use]
    pub fn and_where(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// ANDs several conditions onto the `WHERE` clause, in order.
    #[must_use]
    pub fn and_where_all(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }
}

impl SelectStatement<HasColumns, HasFrom> {
    /// Sets the `ORDER BY` term.
    #[must_use]
    pub fn order_by(mut self, term: String) -> Self {
        self.order_by = Some(term);
        self
    }

    /// Sets `LIMIT`.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets `OFFSET`.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Writes the statement, binding operands through `w`.
    pub fn write<D: Dialect + ?Sized>(self, w: &mut SqlWriter<'_, D>) {
        w.push_str("SELECT ");
        w.push_str(&self.columns.join(", "));

        if let Some(ref source) = self.from {
            w.push_str(" FROM ");
            w.push_str(source);
        }

        for join in &self.joins {
            w.push_str(" ");
            w.push_str(join);
        }

        for (i, condition) in self.conditions.iter().enumerate() {
            w.push_str(if i == 0 { " WHERE " } else { " AND " });
            condition.write(w);
        }

        if let Some(ref term) = self.order_by {
            w.push_str(" ORDER BY ");
            w.push_str(term);
        }

        if let Some(n) = self.limit {
            w.push_str(&format!(" LIMIT {n}"));
        }

        if let Some(n) = self.offset {
            w.push_str(&format!(" OFFSET {n}"));
        }
    }

    /// Renders the statement and its operands.
    #[must_use]
    pub fn build<D: Dialect + ?Sized>(self, dialect: &D) -> (String, Vec<String>) {
        let mut w = SqlWriter::new(dialect);
        self.write(&mut w);
        w.finish()
    }

    /// Renders the text of a statement that carries no bound operands, for
    /// use as a subquery.
    #[must_use]
    pub fn build_sql<D: Dialect + ?Sized>(self, dialect: &D) -> String {
        debug_assert!(
            !self.conditions.iter().any(Condition::is_bound),
            "subquery carries bound operands"
        );
        self.build(dialect).0
    }
}
