use crate::domain::{CredentialDocument, SportConfig, SportConfigPatch, DEFAULT_REFRESH_INTERVAL_SECS};
use crate::error::Result;
use crate::persistence::DurableStore;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Row id of the single active configuration
const CONFIG_DOC_ID: &str = "current_config";

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Run migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }
}

fn sport_from_row(r: &PgRow) -> SportConfig {
    SportConfig {
        enabled: r.get("enabled"),
        refresh_interval_seconds: r.get::<i32, _>("refresh_interval_seconds").max(0) as u32,
        last_updated: r.get("last_updated"),
    }
}

#[async_trait]
impl DurableStore for PostgresStore {
    #[instrument(skip(self))]
    async fn load_credential(&self) -> Result<Option<CredentialDocument>> {
        let row = sqlx::query(
            r#"
            SELECT api_key, is_active, last_updated
            FROM odds_config WHERE id = $1
            "#,
        )
        .bind(CONFIG_DOC_ID)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| CredentialDocument {
            api_key: r.get("api_key"),
            is_active: r.get("is_active"),
            last_updated: r.get("last_updated"),
        }))
    }

    #[instrument(skip_all)]
    async fn save_credential(&self, doc: &CredentialDocument) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO odds_config (id, api_key, is_active, last_updated)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                api_key = EXCLUDED.api_key,
                is_active = EXCLUDED.is_active,
                last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(CONFIG_DOC_ID)
        .bind(&doc.api_key)
        .bind(doc.is_active)
        .bind(doc.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_sports(&self) -> Result<HashMap<String, SportConfig>> {
        let rows = sqlx::query(
            r#"
            SELECT sport_id, enabled, refresh_interval_seconds, last_updated
            FROM sports_config
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| (r.get::<String, _>("sport_id"), sport_from_row(r)))
            .collect())
    }

    #[instrument(skip(self))]
    async fn merge_sport(&self, sport_id: &str, patch: &SportConfigPatch) -> Result<SportConfig> {
        let row = sqlx::query(
            r#"
            INSERT INTO sports_config (sport_id, enabled, refresh_interval_seconds, last_updated)
            VALUES ($1, COALESCE($2, FALSE), COALESCE($3, $4), NOW())
            ON CONFLICT (sport_id) DO UPDATE SET
                enabled = COALESCE($2, sports_config.enabled),
                refresh_interval_seconds = COALESCE($3, sports_config.refresh_interval_seconds),
                last_updated = NOW()
            RETURNING enabled, refresh_interval_seconds, last_updated
            "#,
        )
        .bind(sport_id)
        .bind(patch.enabled)
        .bind(patch.refresh_interval_seconds.map(|s| i32::try_from(s).unwrap_or(i32::MAX)))
        .bind(DEFAULT_REFRESH_INTERVAL_SECS as i32)
        .fetch_one(&self.pool)
        .await?;

        Ok(sport_from_row(&row))
    }
}
