//! PostgreSQL tenant directory.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::info;

use thesaurus_core::{Error, Result, Tenant, TenantDirectory, User, UserRole};

/// PostgreSQL implementation of [`TenantDirectory`].
#[derive(Clone)]
pub struct PgTenantDirectory {
    pool: Pool<Postgres>,
}

fn user_from_row(row: &PgRow) -> Result<User> {
    let role: String = row.get("role");
    Ok(User {
        uri: row.get("uri"),
        name: row.get("name"),
        tenant: row.get("tenant"),
        role: role.parse::<UserRole>().map_err(Error::Internal)?,
        api_key: row.get("api_key"),
    })
}

impl PgTenantDirectory {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert or replace a tenant together with its users.
    pub async fn upsert_tenant(&self, tenant: &Tenant) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            "INSERT INTO tenant (code, name) VALUES ($1, $2) \
             ON CONFLICT (code) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(&tenant.code)
        .bind(&tenant.name)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        for user in &tenant.users {
            sqlx::query(
                r#"
                INSERT INTO app_user (uri, name, tenant, role, api_key)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (uri) DO UPDATE SET
                    name = EXCLUDED.name,
                    tenant = EXCLUDED.tenant,
                    role = EXCLUDED.role,
                    api_key = EXCLUDED.api_key
                "#,
            )
            .bind(&user.uri)
            .bind(&user.name)
            .bind(&tenant.code)
            .bind(user.role.to_string())
            .bind(&user.api_key)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;
        info!(
            subsystem = "db",
            component = "tenants",
            tenant = %tenant.code,
            user_count = tenant.users.len(),
            "Tenant saved"
        );
        Ok(())
    }
}

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn fetch_tenant(&self, code: &str) -> Result<Option<Tenant>> {
        let Some(row) = sqlx::query("SELECT code, name FROM tenant WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
        else {
            return Ok(None);
        };

        let users = sqlx::query(
            "SELECT uri, name, tenant, role, api_key FROM app_user WHERE tenant = $1 ORDER BY id",
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?
        .iter()
        .map(user_from_row)
        .collect::<Result<Vec<_>>>()?;

        Ok(Some(Tenant {
            code: row.get("code"),
            name: row.get("name"),
            users,
        }))
    }

    async fn fetch_user_by_key(&self, api_key: &str) -> Result<Option<User>> {
        sqlx::query("SELECT uri, name, tenant, role, api_key FROM app_user WHERE api_key = $1")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }
}
