//! PostgreSQL resource store.
//!
//! Each resource is one row: its JSON document plus the columns needed for
//! lookups and filtering (uuid, rdf types, tenant, status). Property-level
//! matching runs against the JSONB document.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};

use thesaurus_core::namespaces::{openskos, skos};

use crate::{escape_like, resolve_sorts, TEXT_PROPERTIES};
use thesaurus_core::{
    status_of, ConceptStatus, Error, Resource, ResourceStore, Result, SearchBackend,
    SearchOptions, SearchResults, Term,
};

/// Type-safe parameter binding for generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    OptText(Option<String>),
    TextArray(Vec<String>),
    BigInt(i64),
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [QueryParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::Text(s) => query.bind(s),
            QueryParam::OptText(s) => query.bind(s),
            QueryParam::TextArray(values) => query.bind(values),
            QueryParam::BigInt(n) => query.bind(n),
        };
    }
    query
}

/// WHERE and ORDER BY fragments for a search, with their parameters.
#[derive(Debug, Default)]
pub struct SearchSql {
    pub where_clause: String,
    pub order_clause: String,
    pub params: Vec<QueryParam>,
}

impl SearchSql {
    fn push(&mut self, param: QueryParam) -> usize {
        self.params.push(param);
        self.params.len()
    }

    /// Fragments for `options`. Parameters are numbered from `$1`.
    ///
    /// Fails with [`Error::InvalidField`] on a sort field no property backs.
    pub fn build(options: &SearchOptions) -> Result<Self> {
        let sorts = resolve_sorts(options)?;
        let mut sql = SearchSql::default();
        let mut clauses = Vec::new();

        if let Some(rdf_type) = &options.rdf_type {
            let idx = sql.push(QueryParam::Text(rdf_type.clone()));
            clauses.push(format!("${} = ANY(r.rdf_types)", idx));
        }

        if let Some(tenants) = options.tenants.as_ref().filter(|t| !t.is_empty()) {
            let idx = sql.push(QueryParam::TextArray(tenants.clone()));
            clauses.push(format!("r.tenant = ANY(${})", idx));
        }

        if let Some(sets) = options.sets.as_ref().filter(|s| !s.is_empty()) {
            // A set matches by URI or by its code.
            let prop = sql.push(QueryParam::Text(openskos::SET.to_string()));
            let code = sql.push(QueryParam::Text(openskos::CODE.to_string()));
            let values = sql.push(QueryParam::TextArray(sets.clone()));
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM jsonb_array_elements(r.document->'properties'->${prop}) v \
                 WHERE v->>'value' = ANY(${values}) \
                 OR EXISTS (SELECT 1 FROM resource s, jsonb_array_elements(s.document->'properties'->${code}) c \
                 WHERE s.uri = v->>'value' AND c->>'value' = ANY(${values})))",
            ));
        }

        for (property, values) in [
            (skos::IN_SCHEME, &options.concept_scheme),
            (openskos::IN_SKOS_COLLECTION, &options.skos_collection),
        ] {
            if let Some(values) = values.as_ref().filter(|v| !v.is_empty()) {
                let prop = sql.push(QueryParam::Text(property.to_string()));
                let values = sql.push(QueryParam::TextArray(values.clone()));
                clauses.push(format!(
                    "EXISTS (SELECT 1 FROM jsonb_array_elements(r.document->'properties'->${}) v \
                     WHERE v->>'value' = ANY(${}))",
                    prop, values
                ));
            }
        }

        match options.status.as_ref().filter(|s| !s.is_empty()) {
            Some(statuses) => {
                let values = statuses.iter().map(|s| s.as_str().to_string()).collect();
                let idx = sql.push(QueryParam::TextArray(values));
                clauses.push(format!("r.status = ANY(${})", idx));
            }
            None => {
                let idx = sql.push(QueryParam::Text(ConceptStatus::Deleted.as_str().to_string()));
                clauses.push(format!("r.status IS DISTINCT FROM ${}", idx));
            }
        }

        if let Some(needle) = options.text_needle() {
            let props = sql.push(QueryParam::TextArray(
                TEXT_PROPERTIES.iter().map(|p| p.to_string()).collect(),
            ));
            let pattern = sql.push(QueryParam::Text(format!("%{}%", escape_like(&needle))));
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM jsonb_each(r.document->'properties') p, \
                 jsonb_array_elements(p.value) v \
                 WHERE p.key = ANY(${}) AND lower(v->>'value') LIKE ${})",
                props, pattern
            ));
        }

        sql.where_clause = if clauses.is_empty() {
            "TRUE".to_string()
        } else {
            clauses.join(" AND ")
        };

        let mut order = Vec::new();
        for sort in sorts {
            let prop = sql.push(QueryParam::Text(sort.property.to_string()));
            let lang = sql.push(QueryParam::OptText(sort.language.map(str::to_string)));
            order.push(format!(
                "(SELECT min(v->>'value') FROM jsonb_array_elements(r.document->'properties'->${prop}) v \
                 WHERE ${lang}::text IS NULL OR v->>'lang' = ${lang}) {} NULLS LAST",
                sort.order.as_str().to_uppercase()
            ));
        }
        order.push("r.uri ASC".to_string());
        sql.order_clause = order.join(", ");

        Ok(sql)
    }
}

fn decode_document(document: JsonValue) -> Result<Resource> {
    Ok(serde_json::from_value(document)?)
}

/// PostgreSQL implementation of [`ResourceStore`] and [`SearchBackend`].
#[derive(Clone)]
pub struct PgResourceStore {
    pool: Pool<Postgres>,
}

impl PgResourceStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, column: &str, value: &str) -> Result<Option<Resource>> {
        let sql = format!("SELECT document FROM resource WHERE {} = $1", column);
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(|r| decode_document(r.get("document"))).transpose()
    }

    async fn upsert(&self, resource: &Resource) -> Result<()> {
        let uri = resource.require_uri()?;
        let rdf_types: Vec<String> = resource.rdf_types().map(str::to_string).collect();
        let status = status_of(resource).map(|s| s.as_str().to_string());
        let document = serde_json::to_value(resource)?;

        sqlx::query(
            r#"
            INSERT INTO resource (uri, uuid, rdf_types, tenant, status, document)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (uri) DO UPDATE SET
                uuid = EXCLUDED.uuid,
                rdf_types = EXCLUDED.rdf_types,
                tenant = EXCLUDED.tenant,
                status = EXCLUDED.status,
                document = EXCLUDED.document,
                updated_at_utc = NOW()
            "#,
        )
        .bind(uri)
        .bind(resource.uuid())
        .bind(&rdf_types)
        .bind(resource.tenant())
        .bind(status)
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}

#[async_trait]
impl ResourceStore for PgResourceStore {
    async fn fetch_by_uri(&self, uri: &str) -> Result<Option<Resource>> {
        self.fetch_one_where("uri", uri).await
    }

    async fn fetch_by_uuid(&self, uuid: &str) -> Result<Option<Resource>> {
        self.fetch_one_where("uuid", uuid).await
    }

    async fn fetch_subjects_with_property(
        &self,
        property: &str,
        value: &Term,
        expected_type: &str,
    ) -> Result<Vec<Resource>> {
        let rows = sqlx::query(
            r#"
            SELECT r.document FROM resource r
            WHERE $3 = ANY(r.rdf_types)
              AND EXISTS (
                SELECT 1 FROM jsonb_array_elements(r.document->'properties'->$1) v
                WHERE v->>'value' = $2
              )
            ORDER BY r.uri
            "#,
        )
        .bind(property)
        .bind(value.value())
        .bind(expected_type)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| decode_document(r.get("document")))
            .collect()
    }

    async fn fetch_by_type(&self, rdf_type: &str) -> Result<Vec<Resource>> {
        let rows = sqlx::query("SELECT document FROM resource WHERE $1 = ANY(rdf_types) ORDER BY uri")
            .bind(rdf_type)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| decode_document(r.get("document")))
            .collect()
    }

    async fn store(&self, resource: &Resource) -> Result<()> {
        self.upsert(resource).await?;
        debug!(
            subsystem = "db",
            component = "resources",
            op = "store",
            resource_uri = resource.uri().unwrap_or_default(),
            "Resource stored"
        );
        Ok(())
    }

    async fn soft_delete(&self, resource: &Resource) -> Result<()> {
        self.upsert(resource).await?;
        info!(
            subsystem = "db",
            component = "resources",
            op = "soft_delete",
            resource_uri = resource.uri().unwrap_or_default(),
            "Resource soft-deleted"
        );
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for PgResourceStore {
    async fn search(&self, options: &SearchOptions) -> Result<SearchResults> {
        let start = Instant::now();
        let sql = SearchSql::build(options)?;

        let count_sql = format!(
            "SELECT COUNT(*) AS count FROM resource r WHERE {}",
            sql.where_clause
        );
        let total: i64 = bind_all(sqlx::query(&count_sql), &sql.params)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?
            .get("count");

        let mut params = sql.params.clone();
        params.push(QueryParam::BigInt(options.rows.max(0)));
        let limit_idx = params.len();
        params.push(QueryParam::BigInt(options.start.max(0)));
        let offset_idx = params.len();

        let page_sql = format!(
            "SELECT r.document FROM resource r WHERE {} ORDER BY {} LIMIT ${} OFFSET ${}",
            sql.where_clause, sql.order_clause, limit_idx, offset_idx
        );
        let rows = bind_all(sqlx::query(&page_sql), &params)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let resources = rows
            .into_iter()
            .map(|r| decode_document(r.get("document")))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "db",
            component = "search",
            result_count = resources.len(),
            total = total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );

        Ok(SearchResults { resources, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesaurus_core::{SortOrder, SortSpec};

    #[test]
    fn test_default_search_excludes_deleted() {
        let sql = SearchSql::build(&SearchOptions::default()).unwrap();
        assert_eq!(sql.where_clause, "r.status IS DISTINCT FROM $1");
        assert_eq!(sql.params, vec![QueryParam::Text("deleted".to_string())]);
        assert_eq!(sql.order_clause, "r.uri ASC");
    }

    #[test]
    fn test_parameters_numbered_in_order() {
        let options = SearchOptions {
            rdf_type: Some(skos::CONCEPT.to_string()),
            tenants: Some(vec!["beng".to_string()]),
            status: Some(vec![ConceptStatus::Approved]),
            ..SearchOptions::default()
        };
        let sql = SearchSql::build(&options).unwrap();
        assert_eq!(
            sql.where_clause,
            "$1 = ANY(r.rdf_types) AND r.tenant = ANY($2) AND r.status = ANY($3)"
        );
        assert_eq!(sql.params.len(), 3);
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let options = SearchOptions {
            sorts: Some(SortSpec::from_iter([
                ("sort_s_bogus", SortOrder::Asc),
                ("prefLabel_nl", SortOrder::Desc),
            ])),
            ..SearchOptions::default()
        };
        match SearchSql::build(&options) {
            Err(Error::InvalidField(msg)) => assert!(msg.contains("sort_s_bogus")),
            other => panic!("Expected InvalidField, got {:?}", other.map(|s| s.order_clause)),
        }
    }

    #[test]
    fn test_sort_order_clause() {
        let options = SearchOptions {
            sorts: Some(SortSpec::from_iter([("prefLabel_nl", SortOrder::Desc)])),
            ..SearchOptions::default()
        };
        let sql = SearchSql::build(&options).unwrap();
        assert!(sql.order_clause.contains("DESC NULLS LAST"));
        assert!(sql.order_clause.ends_with("r.uri ASC"));
        assert_eq!(
            sql.params.last(),
            Some(&QueryParam::OptText(Some("nl".to_string())))
        );
    }
}
