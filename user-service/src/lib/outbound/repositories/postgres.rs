use async_trait::async_trait;
use auth::StoreError;
use auth::StoredIdentity;
use auth::UserStore;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn save(&self, identity: StoredIdentity) -> Result<StoredIdentity, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&identity.username)
        .bind(&identity.password_hash)
        .bind(identity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StoreError::UsernameTaken(identity.username.clone());
                }
            }
            StoreError::Unavailable(e.to_string())
        })?;

        Ok(identity)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredIdentity>, StoreError> {
        let row: Option<(String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(row.map(|(username, password_hash, created_at)| StoredIdentity {
            username,
            password_hash,
            created_at,
        }))
    }
}
