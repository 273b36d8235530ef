//! Request compilation: query parameters in, one parameterized statement out.

use std::collections::HashSet;

use tracing::debug;

use crate::catalog::ColumnCatalog;
use crate::dialect::{Dialect, PostgresDialect};
use crate::embed::{resolve_embeds, EmbedLowering};
use crate::error::{CompileError, Result};
use crate::filter::{FilterOp, FilterPredicate};
use crate::ident::Ident;
use crate::join::FlatJoin;
use crate::order::SortSpec;
use crate::page::PageSpec;
use crate::params::QueryParams;
use crate::relation::{RelationshipCache, RelationshipResolver};
use crate::select::{parse_select, FieldNode};
use crate::statement::{Condition, SelectStatement};

/// A compiled statement and its positional operands.
///
/// Operands are the raw text from the query string; the executor is
/// responsible for converting each one to the type the database expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// SQL text with dialect placeholders.
    pub sql: String,
    /// Operand for each placeholder, in order.
    pub params: Vec<String>,
}

/// Root-table parameters other than `select`, `order`, `limit`, `offset`.
#[derive(Debug, Default)]
struct RootParams {
    filters: Vec<FilterPredicate>,
    joins: Vec<FlatJoin>,
}

/// Compiles requests against one catalog.
pub struct Compiler<'a, C, D = PostgresDialect> {
    catalog: &'a C,
    dialect: D,
    cache: Option<&'a RelationshipCache>,
}

impl<'a, C: ColumnCatalog> Compiler<'a, C> {
    /// Creates a PostgreSQL compiler without a relationship cache.
    #[must_use]
    pub const fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            dialect: PostgresDialect::new(),
            cache: None,
        }
    }
}

impl<'a, C: ColumnCatalog, D: Dialect> Compiler<'a, C, D> {
    /// Switches the output dialect.
    #[must_use]
    pub fn with_dialect<E: Dialect>(self, dialect: E) -> Compiler<'a, C, E> {
        Compiler {
            catalog: self.catalog,
            dialect,
            cache: self.cache,
        }
    }

    /// Resolves relationships through a shared cache.
    #[must_use]
    pub fn with_cache(mut self, cache: &'a RelationshipCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Compiles a request for `table`.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] for any parameter that cannot be honoured
    /// exactly; a partial statement is never produced.
    pub async fn compile(&self, table: &str, params: &QueryParams) -> Result<CompiledQuery> {
        let root = Ident::new(table)?;
        let fields = match params.get("select") {
            Some(select) => parse_select(select)?,
            None => vec![FieldNode::wildcard()],
        };

        let mut resolver = RelationshipResolver::new(self.catalog);
        if let Some(cache) = self.cache {
            resolver = resolver.with_cache(cache);
        }
        let resolved = resolve_embeds(&resolver, &root, &fields).await?;
        let RootParams { filters, joins } = self.classify(&root, &fields, params).await?;
        let sort = params
            .get("order")
            .map(SortSpec::parse)
            .transpose()?
            .flatten();
        let page = PageSpec::parse(params.get("limit"), params.get("offset"))?;

        let lowered =
            EmbedLowering::new(&self.dialect, &resolved).lower(&root, root.as_str(), &fields)?;
        let mut columns = lowered.columns;
        for join in &joins {
            columns.extend(join.column_sql(&self.dialect));
        }

        let mut stmt = SelectStatement::new()
            .columns(columns)
            .from(self.dialect.quote_identifier(root.as_str()));
        for join in &joins {
            let (table, on) = join.to_sql(&self.dialect, root.as_str());
            stmt = stmt.left_join(&table, &on);
        }
        let mut stmt = stmt
            .and_where_all(filters.into_iter().map(|predicate| Condition::Filter {
                relation: root.to_string(),
                predicate,
            }))
            .and_where_all(lowered.exists.into_iter().map(Condition::Sql));
        if let Some(sort) = sort {
            stmt = stmt.order_by(sort.to_sql(&self.dialect, root.as_str()));
        }
        if let Some(n) = page.limit {
            stmt = stmt.limit(n);
        }
        if let Some(n) = page.offset {
            stmt = stmt.offset(n);
        }

        let (sql, params) = stmt.build(&self.dialect);
        debug!(table = %root, params = params.len(), %sql, "compiled query");
        Ok(CompiledQuery { sql, params })
    }

    /// Sorts the unreserved parameters into filters and flat joins.
    async fn classify(
        &self,
        root: &Ident,
        fields: &[FieldNode],
        params: &QueryParams,
    ) -> Result<RootParams> {
        let embeds: HashSet<&str> = fields
            .iter()
            .filter_map(FieldNode::as_embed)
            .map(|embed| embed.table.as_str())
            .collect();
        let mut root_params = RootParams::default();
        let mut join_selects = Vec::new();

        for (key, value) in params.unreserved() {
            if key.contains('.') {
                join_selects.push((key, value));
                continue;
            }
            if key.contains(|c: char| c == '(' || c == ')') {
                return Err(CompileError::UnknownParameter(key.to_string()));
            }
            if let Some((op, operand)) = FilterOp::split(value) {
                root_params
                    .filters
                    .push(FilterPredicate::new(Ident::new(key)?, op, operand));
                continue;
            }
            let Some((fk, pk)) = FlatJoin::split_spec(value) else {
                return Err(unsupported_operator(key, value));
            };
            if embeds.contains(key) {
                debug!(table = key, "join parameter skipped, relation is embedded");
                continue;
            }
            let table = Ident::new(key)?;
            if self
                .catalog
                .column_exists(root.as_str(), table.as_str())
                .await?
            {
                return Err(unsupported_operator(key, value));
            }
            // `fk.pk` that are not identifiers, e.g. `neq.1`, are a bad operator.
            let Ok(join) = FlatJoin::new(table.as_str(), fk, pk) else {
                return Err(unsupported_operator(key, value));
            };
            self.check_join(root, &join, &root_params.joins).await?;
            root_params.joins.push(join);
        }

        for (key, value) in join_selects {
            let target = key
                .strip_suffix(".select")
                .filter(|target| !target.contains('.'));
            match target {
                Some(target) => {
                    if let Some(join) = root_params
                        .joins
                        .iter_mut()
                        .find(|join| join.table.as_str() == target)
                    {
                        join.select_columns(value)?;
                    } else if embeds.contains(target) {
                        debug!(table = target, "join columns skipped, relation is embedded");
                    } else {
                        return Err(CompileError::UnknownParameter(key.to_string()));
                    }
                }
                None => return Err(CompileError::UnknownParameter(key.to_string())),
            }
        }
        Ok(root_params)
    }

    /// Verifies both join columns before any SQL mentions them.
    async fn check_join(&self, root: &Ident, join: &FlatJoin, earlier: &[FlatJoin]) -> Result<()> {
        let unresolvable = |reason: String| CompileError::UnresolvableRelationship {
            parent: root.to_string(),
            related: join.table.to_string(),
            reason,
        };
        if join.table == *root || earlier.iter().any(|j| j.table == join.table) {
            return Err(unresolvable(String::from(
                "table already appears in the query",
            )));
        }
        if !self
            .catalog
            .column_exists(root.as_str(), join.foreign_key.as_str())
            .await?
        {
            return Err(unresolvable(format!(
                "{root}.{} does not exist",
                join.foreign_key
            )));
        }
        if !self
            .catalog
            .column_exists(join.table.as_str(), join.key.as_str())
            .await?
        {
            return Err(unresolvable(format!(
                "{}.{} does not exist",
                join.table, join.key
            )));
        }
        Ok(())
    }
}

fn unsupported_operator(column: &str, value: &str) -> CompileError {
    let operator = value.split_once('.').map_or(value, |(op, _)| op);
    CompileError::UnsupportedOperator {
        column: column.to_string(),
        operator: operator.to_string(),
    }
}
