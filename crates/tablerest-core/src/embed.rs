//! Lowering of the select tree into columns and correlated JSON subqueries.
//!
//! Lowering runs in two phases. [`resolve_embeds`] walks the tree and asks
//! the resolver for every `(parent, related)` pair; this is the only part
//! that touches the catalog. [`EmbedLowering`] then turns the tree into SQL
//! synchronously, looking relationships up in the resolved map.
//!
//! A one-to-many embed becomes
//!
//! ```text
//! (SELECT COALESCE(json_agg(row_to_json("posts_1_rows")), '[]'::json)
//!    FROM (SELECT ... FROM "posts" AS "posts_1"
//!           WHERE "posts_1"."author_id" = "authors"."id") AS "posts_1_rows") AS "posts"
//! ```
//!
//! and a many-to-one embed the same shape with `row_to_json` alone and
//! `LIMIT 1`. An `!inner` embed additionally contributes
//! `EXISTS (SELECT 1 FROM ... WHERE <join> [AND <nested EXISTS>])` to the
//! `WHERE` clause of its parent's query.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::ColumnCatalog;
use crate::dialect::Dialect;
use crate::error::{CompileError, Result};
use crate::ident::Ident;
use crate::relation::{Cardinality, RelationshipDescriptor, RelationshipResolver};
use crate::select::{FieldNode, JoinType};
use crate::statement::{Condition, SelectStatement};

/// Relationships needed by one select tree, keyed by `(parent, related)`.
pub type ResolvedEmbeds = HashMap<(Ident, Ident), RelationshipDescriptor>;

/// Resolves every embed in `fields`, at every depth.
///
/// # Errors
///
/// Returns [`CompileError::IdentifierRejected`] for an embed name that is not
/// a valid identifier, or any resolver error.
pub async fn resolve_embeds<C: ColumnCatalog>(
    resolver: &RelationshipResolver<'_, C>,
    root: &Ident,
    fields: &[FieldNode],
) -> Result<ResolvedEmbeds> {
    let mut resolved = ResolvedEmbeds::new();
    let mut pending = vec![(root.clone(), fields)];
    while let Some((parent, fields)) = pending.pop() {
        for embed in fields.iter().filter_map(FieldNode::as_embed) {
            let related = Ident::new(&embed.table)?;
            let key = (parent.clone(), related.clone());
            if !resolved.contains_key(&key) {
                let descriptor = resolver.resolve(&parent, &related).await?;
                resolved.insert(key, descriptor);
            }
            pending.push((related, embed.children.as_slice()));
        }
    }
    Ok(resolved)
}

/// Select-list entries and existence predicates for one query level.
#[derive(Debug, Default)]
pub struct LoweredFields {
    /// Select-list expressions, in field order.
    pub columns: Vec<String>,
    /// `EXISTS` predicates from `!inner` embeds at this level.
    pub exists: Vec<String>,
}

/// Lowers select trees against a set of resolved relationships.
pub struct EmbedLowering<'a, D: ?Sized> {
    dialect: &'a D,
    resolved: &'a ResolvedEmbeds,
    aliases: usize,
}

impl<'a, D: Dialect + ?Sized> EmbedLowering<'a, D> {
    /// Creates a lowering pass; aliases are numbered from 1.
    #[must_use]
    pub const fn new(dialect: &'a D, resolved: &'a ResolvedEmbeds) -> Self {
        Self {
            dialect,
            resolved,
            aliases: 0,
        }
    }

    fn quote(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }

    fn all_columns(&self, relation: &str) -> String {
        format!("{}.*", self.quote(relation))
    }

    /// Lowers `fields` of `table`, whose rows are visible as `relation`.
    ///
    /// An empty field list selects every column.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::IdentifierRejected`] for an invalid column
    /// name.
    pub fn lower(
        &mut self,
        table: &Ident,
        relation: &str,
        fields: &[FieldNode],
    ) -> Result<LoweredFields> {
        let mut lowered = LoweredFields::default();
        if fields.is_empty() {
            lowered.columns.push(self.all_columns(relation));
            return Ok(lowered);
        }
        for field in fields {
            match field {
                FieldNode::Column(name) if name == "*" => {
                    lowered.columns.push(self.all_columns(relation));
                }
                FieldNode::Column(name) => {
                    let column = Ident::new(name)?;
                    lowered.columns.push(format!(
                        "{}.{}",
                        self.quote(relation),
                        self.quote(column.as_str())
                    ));
                }
                FieldNode::Embed(embed) => {
                    let related = Ident::new(&embed.table)?;
                    let descriptor = self.descriptor(table, &related)?;
                    self.aliases += 1;
                    let alias = format!("{related}_{}", self.aliases);
                    let inner = self.lower(&related, &alias, &embed.children)?;
                    let join = descriptor.join_condition(self.dialect, relation, &alias);

                    if embed.join == JoinType::Inner {
                        lowered.exists.push(self.exists(&related, &alias, &join, &inner.exists));
                    }
                    lowered.columns.push(self.json_subquery(
                        descriptor.cardinality,
                        &related,
                        &alias,
                        &join,
                        inner,
                    ));
                }
            }
        }
        Ok(lowered)
    }

    fn descriptor(&self, parent: &Ident, related: &Ident) -> Result<&'a RelationshipDescriptor> {
        self.resolved
            .get(&(parent.clone(), related.clone()))
            .ok_or_else(|| CompileError::UnresolvableRelationship {
                parent: parent.to_string(),
                related: related.to_string(),
                reason: String::from("relationship was not resolved before lowering"),
            })
    }

    fn source(&self, table: &Ident, alias: &str) -> String {
        format!("{} AS {}", self.quote(table.as_str()), self.quote(alias))
    }

    fn exists(&self, table: &Ident, alias: &str, join: &str, nested: &[String]) -> String {
        let body = SelectStatement::new()
            .columns(vec![String::from("1")])
            .from(self.source(table, alias))
            .and_where(Condition::Sql(join.to_string()))
            .and_where_all(nested.iter().cloned().map(Condition::Sql))
            .build_sql(self.dialect);
        format!("EXISTS ({body})")
    }

    fn json_subquery(
        &self,
        cardinality: Cardinality,
        table: &Ident,
        alias: &str,
        join: &str,
        inner: LoweredFields,
    ) -> String {
        let rows = SelectStatement::new()
            .columns(inner.columns)
            .from(self.source(table, alias))
            .and_where(Condition::Sql(join.to_string()))
            .and_where_all(inner.exists.into_iter().map(Condition::Sql));
        let rows = match cardinality {
            Cardinality::ManyToOne => rows.limit(1),
            Cardinality::OneToMany => rows,
        }
        .build_sql(self.dialect);

        let rows_alias = self.quote(&format!("{alias}_rows"));
        let row = self.dialect.row_to_json(&rows_alias);
        let shaped = match cardinality {
            Cardinality::ManyToOne => row,
            Cardinality::OneToMany => format!(
                "COALESCE({}, {})",
                self.dialect.json_array_agg(&row),
                self.dialect.empty_json_array()
            ),
        };
        debug!(table = %table, alias, %cardinality, "lowered embed");
        format!(
            "(SELECT {shaped} FROM ({rows}) AS {rows_alias}) AS {}",
            self.quote(table.as_str())
        )
    }
}
