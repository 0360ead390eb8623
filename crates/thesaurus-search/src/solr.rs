//! Solr search backend.
//!
//! Translated options become a Solr `select` request. Only document URIs
//! are read from the index; the resources themselves are hydrated from the
//! resource store so responses always reflect stored state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde::Deserialize;
use thesaurus_core::defaults::{SEARCH_TIMEOUT_SECS, URI_FIELD};
use thesaurus_core::{
    Error, ResourceStore, Result, SearchBackend, SearchOptions, SearchResults,
};
use tracing::{debug, error, warn};

/// Index field names.
pub mod index_fields {
    pub const RDF_TYPE: &str = "rdfType";
    pub const TENANT: &str = "s_tenant";
    pub const SET: &str = "s_set";
    pub const IN_SCHEME: &str = "s_inScheme";
    pub const IN_SKOS_COLLECTION: &str = "s_inSkosCollection";
    pub const STATUS: &str = "s_status";
}

/// Connection settings for the Solr core.
#[derive(Debug, Clone)]
pub struct SolrConfig {
    /// Core URL, e.g. `http://localhost:8983/solr/openskos`.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl SolrConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: SEARCH_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectBody {
    num_found: i64,
    #[serde(default)]
    docs: Vec<SelectDoc>,
}

#[derive(Debug, Deserialize)]
struct SelectDoc {
    uri: String,
}

/// Search backend querying Solr and hydrating hits from a resource store.
pub struct SolrSearch {
    client: Client,
    base_url: String,
    store: Arc<dyn ResourceStore>,
}

impl SolrSearch {
    pub fn new(config: SolrConfig, store: Arc<dyn ResourceStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    /// Solr `select` parameters for `options`.
    pub fn select_params(options: &SearchOptions) -> Vec<(String, String)> {
        let mut params = Vec::new();

        let q = options
            .search_text
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or("*:*");
        params.push(("q".to_string(), q.to_string()));

        if let Some(rdf_type) = &options.rdf_type {
            params.push(("fq".to_string(), filter_query(index_fields::RDF_TYPE, [rdf_type])));
        }

        let filters = [
            (index_fields::TENANT, options.tenants.as_ref()),
            (index_fields::SET, options.sets.as_ref()),
            (index_fields::IN_SCHEME, options.concept_scheme.as_ref()),
            (index_fields::IN_SKOS_COLLECTION, options.skos_collection.as_ref()),
        ];
        for (field, values) in filters {
            if let Some(values) = values.filter(|v| !v.is_empty()) {
                params.push(("fq".to_string(), filter_query(field, values)));
            }
        }

        match options.status.as_ref().filter(|s| !s.is_empty()) {
            Some(statuses) => {
                let values: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
                params.push(("fq".to_string(), filter_query(index_fields::STATUS, values)));
            }
            None => {
                // Soft-deleted resources only show up when asked for.
                params.push((
                    "fq".to_string(),
                    format!("-{}:\"deleted\"", index_fields::STATUS),
                ));
            }
        }

        if let Some(sorts) = options.sorts.as_ref().filter(|s| !s.is_empty()) {
            let sort = sorts
                .iter()
                .map(|(field, order)| format!("{} {}", field, order))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("sort".to_string(), sort));
        }

        params.push(("start".to_string(), options.start.to_string()));
        params.push(("rows".to_string(), options.rows.to_string()));
        params.push(("fl".to_string(), URI_FIELD.to_string()));
        params.push(("wt".to_string(), "json".to_string()));

        params
    }

    async fn select(&self, options: &SearchOptions) -> Result<SelectBody> {
        let response = self
            .client
            .get(format!("{}/select", self.base_url))
            .query(&Self::select_params(options))
            .send()
            .await
            .map_err(|e| Error::Search(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Search(format!("Solr returned {}: {}", status, body)));
        }

        let body: SelectResponse = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("Failed to parse response: {}", e)))?;
        Ok(body.response)
    }
}

#[async_trait]
impl SearchBackend for SolrSearch {
    async fn search(&self, options: &SearchOptions) -> Result<SearchResults> {
        let start = Instant::now();

        let body = match self.select(options).await {
            Ok(body) => body,
            Err(e) => {
                error!(subsystem = "search", component = "solr", error = %e, "Search failed");
                return Err(e);
            }
        };

        let fetched = try_join_all(
            body.docs
                .iter()
                .map(|doc| self.store.fetch_by_uri(&doc.uri)),
        )
        .await?;

        let mut resources = Vec::with_capacity(fetched.len());
        for (doc, resource) in body.docs.iter().zip(fetched) {
            match resource {
                Some(resource) => resources.push(resource),
                None => warn!(
                    subsystem = "search",
                    resource_uri = %doc.uri,
                    "Indexed resource missing from store"
                ),
            }
        }

        debug!(
            subsystem = "search",
            component = "solr",
            result_count = resources.len(),
            total = body.num_found,
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );

        Ok(SearchResults {
            resources,
            total: body.num_found,
        })
    }
}

/// `field:("a" OR "b")` with quotes and backslashes escaped.
fn filter_query<I, S>(field: &str, values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let quoted: Vec<String> = values
        .into_iter()
        .map(|v| format!("\"{}\"", escape_phrase(v.as_ref())))
        .collect();
    format!("{}:({})", field, quoted.join(" OR "))
}

fn escape_phrase(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
