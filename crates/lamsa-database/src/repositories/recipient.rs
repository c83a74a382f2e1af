//! Recipient directory backed by PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use lamsa_core::error::{AppError, ErrorKind};
use lamsa_core::result::AppResult;
use lamsa_entity::notification::{Language, Preferences, Recipient, RecipientKind};

use crate::store::RecipientDirectory;

/// [`RecipientDirectory`] implementation over the `recipients` table.
#[derive(Debug, Clone)]
pub struct RecipientRepository {
    pool: PgPool,
}

impl RecipientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RecipientRow {
    id: Uuid,
    kind: RecipientKind,
    phone: Option<String>,
    email: Option<String>,
    device_token: Option<String>,
    language: Language,
    preferences: Option<serde_json::Value>,
}

impl From<RecipientRow> for Recipient {
    fn from(row: RecipientRow) -> Self {
        // A malformed preferences document disables nothing: unknown or
        // missing fields fall back to the permissive defaults.
        let preferences = row.preferences.and_then(|value| {
            match serde_json::from_value::<Preferences>(value) {
                Ok(prefs) => Some(prefs),
                Err(e) => {
                    warn!(recipient_id = %row.id, error = %e, "Ignoring malformed preferences");
                    None
                }
            }
        });

        Recipient {
            id: row.id,
            kind: row.kind,
            phone: row.phone,
            email: row.email,
            device_token: row.device_token,
            language: row.language,
            preferences,
        }
    }
}

#[async_trait]
impl RecipientDirectory for RecipientRepository {
    async fn find(&self, recipient_id: Uuid) -> AppResult<Option<Recipient>> {
        let row = sqlx::query_as::<_, RecipientRow>(
            "SELECT id, kind, phone, email, device_token, language, preferences \
             FROM recipients WHERE id = $1",
        )
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch recipient", e))?;

        Ok(row.map(Recipient::from))
    }

    async fn upsert_preferences(
        &self,
        recipient_id: Uuid,
        preferences: &serde_json::Value,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE recipients SET preferences = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(recipient_id)
        .bind(preferences)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update preferences", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Recipient {recipient_id} not found"
            )));
        }
        Ok(())
    }
}
