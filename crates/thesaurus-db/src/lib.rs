//! # thesaurus-db
//!
//! Storage layer for the thesaurus API.
//!
//! This crate provides:
//! - Connection pool management
//! - A PostgreSQL resource store with JSONB documents and filtered search
//! - A PostgreSQL tenant and user directory
//! - An in-memory store implementing the same traits
//!
//! ## Example
//!
//! ```rust,ignore
//! use thesaurus_db::{Database, PoolConfig, ResourceStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/thesaurus", &PoolConfig::default()).await?;
//!     let scheme = db.resources.fetch_by_uri("http://example.com/scheme").await?;
//!     println!("{:?}", scheme.map(|s| s.uri().map(str::to_string)));
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod pool;
pub mod resources;
pub mod tenants;

// Always compiled so integration tests in tests/ can reach the default URL.
pub mod test_fixtures;

pub use thesaurus_core::*;

use thesaurus_core::fields::sort_property;
use thesaurus_core::namespaces::{dcterms, skos};

/// Properties scanned by free-text search.
pub(crate) const TEXT_PROPERTIES: &[&str] = &[
    skos::PREF_LABEL,
    skos::ALT_LABEL,
    skos::HIDDEN_LABEL,
    skos::NOTATION,
    dcterms::TITLE,
];

/// Escape LIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A sort field resolved to the property it orders by.
pub(crate) struct ResolvedSort<'a> {
    pub property: &'static str,
    pub language: Option<&'a str>,
    pub order: SortOrder,
}

/// Resolve every sort field in `options`, rejecting ones no property backs.
pub(crate) fn resolve_sorts(options: &SearchOptions) -> Result<Vec<ResolvedSort<'_>>> {
    let Some(sorts) = &options.sorts else {
        return Ok(Vec::new());
    };
    sorts
        .iter()
        .map(|(field, order)| {
            let (property, language) = sort_property(field)
                .ok_or_else(|| Error::InvalidField(format!("Unknown sort field: {}", field)))?;
            Ok(ResolvedSort {
                property,
                language,
                order,
            })
        })
        .collect()
}

pub use memory::MemoryStore;
pub use pool::{create_pool, PoolConfig};
pub use resources::{PgResourceStore, QueryParam, SearchSql};
pub use tenants::PgTenantDirectory;

/// Combined database context.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Resource documents and search.
    pub resources: PgResourceStore,
    /// Tenants and their users.
    pub tenants: PgTenantDirectory,
}

impl Database {
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            resources: PgResourceStore::new(pool.clone()),
            tenants: PgTenantDirectory::new(pool.clone()),
            pool,
        }
    }

    /// Connect with the given pool configuration.
    pub async fn connect(url: &str, config: &PoolConfig) -> Result<Self> {
        let pool = create_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("fiets"), "fiets");
    }
}
