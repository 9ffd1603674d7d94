use crate::models::{Match, MatchRecord, Participant, ParticipantId, Snapshot};
use crate::services::store::{PairingStore, StoreError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::{Executor, PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;

const LIST_PARTICIPANTS: &str = r#"
    SELECT id, display_name
    FROM participants
    ORDER BY created_at, id
"#;

const LIST_PREFERENCES: &str = r#"
    SELECT owner_id, selected_id
    FROM preferences
    ORDER BY owner_id, rank
"#;

/// PostgreSQL-backed pairing store
///
/// Participants and preferences are written by the identity and preference
/// collaborators; this client reads them and owns the `matches` table.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(url, max_connections.unwrap_or(10), min_connections.unwrap_or(1)).await
    }

    async fn fetch_participants<'e, E>(executor: E) -> Result<Vec<Participant>, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query(LIST_PARTICIPANTS).fetch_all(executor).await?;

        Ok(rows
            .iter()
            .map(|row| Participant {
                id: ParticipantId::new(row.get::<String, _>("id")),
                display_name: row.get("display_name"),
            })
            .collect())
    }

    async fn fetch_preferences<'e, E>(
        executor: E,
    ) -> Result<HashMap<ParticipantId, Vec<ParticipantId>>, StoreError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query(LIST_PREFERENCES).fetch_all(executor).await?;

        let mut preferences: HashMap<ParticipantId, Vec<ParticipantId>> = HashMap::new();
        for row in &rows {
            let owner = ParticipantId::new(row.get::<String, _>("owner_id"));
            let selected = ParticipantId::new(row.get::<String, _>("selected_id"));
            preferences.entry(owner).or_default().push(selected);
        }

        Ok(preferences)
    }
}

#[async_trait]
impl PairingStore for PostgresStore {
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        Self::fetch_participants(&self.pool).await
    }

    async fn list_preferences(&self) -> Result<HashMap<ParticipantId, Vec<ParticipantId>>, StoreError> {
        Self::fetch_preferences(&self.pool).await
    }

    /// Both reads run in one REPEATABLE READ transaction
    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let participants = Self::fetch_participants(&mut *tx).await?;
        let preferences = Self::fetch_preferences(&mut *tx).await?;
        tx.commit().await?;

        tracing::debug!(
            "Loaded snapshot: {} participants, {} preference lists",
            participants.len(),
            preferences.len()
        );

        Ok(Snapshot::new(participants, preferences))
    }

    async fn replace_matches(&self, matches: &[Match]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM matches").execute(&mut *tx).await?;

        for pair in matches {
            sqlx::query(
                r#"
                INSERT INTO matches (id, user1_id, user2_id, score, matched_at)
                VALUES ($1, $2, $3, $4, NOW())
                "#,
            )
            .bind(uuid::Uuid::new_v4())
            .bind(pair.a.as_str())
            .bind(pair.b.as_str())
            .bind(pair.score)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Replaced {} stored matches with {}",
            removed.rows_affected(),
            matches.len()
        );

        Ok(())
    }

    async fn save_preferences(&self, owner: &ParticipantId, ranked: &[ParticipantId]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("SELECT 1 FROM participants WHERE id = $1")
            .bind(owner.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound(format!("participant {}", owner)));
        }

        sqlx::query("DELETE FROM preferences WHERE owner_id = $1")
            .bind(owner.as_str())
            .execute(&mut *tx)
            .await?;

        for (index, selected) in ranked.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO preferences (owner_id, selected_id, rank)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(owner.as_str())
            .bind(selected.as_str())
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!("Saved {} preferences for {}", ranked.len(), owner);

        Ok(())
    }

    async fn matches_for(&self, participant: &ParticipantId) -> Result<Vec<MatchRecord>, StoreError> {
        let query = r#"
            SELECT m.id, m.score, m.matched_at, p.id AS partner_id, p.display_name
            FROM matches m
            JOIN participants p
              ON p.id = CASE WHEN m.user1_id = $1 THEN m.user2_id ELSE m.user1_id END
            WHERE m.user1_id = $1 OR m.user2_id = $1
            ORDER BY m.score DESC
        "#;

        let rows = sqlx::query(query)
            .bind(participant.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| MatchRecord {
                id: row.get("id"),
                partner: Participant {
                    id: ParticipantId::new(row.get::<String, _>("partner_id")),
                    display_name: row.get("display_name"),
                },
                score: row.get("score"),
                matched_at: row.get("matched_at"),
            })
            .collect())
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
