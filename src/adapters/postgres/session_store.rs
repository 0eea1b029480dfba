//! PostgreSQL implementation of SessionStore.
//!
//! All records live in one `session_items` table keyed by `(pk, sk)`, the
//! metadata row under `sk = 'METADATA'` and one row per booking email. The
//! category index is a partial index on `(index_pk, index_sk)`.
//!
//! Conditional writes are single statements checked through `rows_affected`:
//! `UPDATE … WHERE version = $n` for the version swap and
//! `INSERT … ON CONFLICT DO NOTHING` for the exists-checks.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::ports::{
    BookingRecord, SessionRecord, SessionStore, StoreError, StoredItem, VersionBump, METADATA_SK,
};

const SELECT_COLUMNS: &str = r#"
    pk, sk, index_pk, index_sk, category, level, date, weekday, start_time,
    max_spots, booking_count, version, created_at, updated_at, booked_at
"#;

/// PostgreSQL implementation of SessionStore.
#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool sized and timed from `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect: {}", e)))?;
        Ok(Self::new(pool))
    }

    /// Creates the `session_items` table and its index if missing.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Migration failed: {}", e)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn query_partition(&self, pk: &str) -> Result<Vec<StoredItem>, StoreError> {
        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM session_items WHERE pk = $1 ORDER BY (sk <> $2), sk",
            SELECT_COLUMNS
        ))
        .bind(pk)
        .bind(METADATA_SK)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("query partition", e))?;

        rows.into_iter().map(StoredItem::try_from).collect()
    }

    async fn query_category_index(&self, index_pk: &str) -> Result<Vec<SessionRecord>, StoreError> {
        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {} FROM session_items WHERE index_pk = $1 AND sk = $2 ORDER BY index_sk",
            SELECT_COLUMNS
        ))
        .bind(index_pk)
        .bind(METADATA_SK)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("query category index", e))?;

        rows.into_iter().map(ItemRow::into_session_record).collect()
    }

    async fn insert_session_if_absent(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO session_items (
                pk, sk, index_pk, index_sk, category, level, date, weekday, start_time,
                max_spots, booking_count, version, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (pk, sk) DO NOTHING
            "#,
        )
        .bind(&record.pk)
        .bind(METADATA_SK)
        .bind(&record.index_pk)
        .bind(&record.index_sk)
        .bind(&record.category)
        .bind(record.level.map(i16::from))
        .bind(&record.date)
        .bind(&record.weekday)
        .bind(&record.start_time)
        .bind(i64::from(record.max_spots))
        .bind(i64::from(record.booking_count))
        .bind(to_db_version(record.version)?)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert session", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }

    async fn update_session_if_version(&self, pk: &str, bump: &VersionBump) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE session_items SET
                version = $4,
                booking_count = $5,
                updated_at = $6
            WHERE pk = $1 AND sk = $2 AND version = $3
            "#,
        )
        .bind(pk)
        .bind(METADATA_SK)
        .bind(to_db_version(bump.expected_version)?)
        .bind(to_db_version(bump.new_version)?)
        .bind(i64::from(bump.booking_count))
        .bind(&bump.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update session", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }

    async fn put_booking_if_absent(&self, record: &BookingRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO session_items (pk, sk, booked_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (pk, sk) DO NOTHING
            "#,
        )
        .bind(&record.pk)
        .bind(&record.sk)
        .bind(&record.booked_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert booking", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }
}

fn db_error(action: &str, err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("Failed to {}: {}", action, err))
}

fn to_db_version(version: u64) -> Result<i64, StoreError> {
    i64::try_from(version).map_err(|_| StoreError::Corrupt(format!("version {} out of range", version)))
}

/// Internal row type for sqlx query mapping.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
struct ItemRow {
    pk: String,
    sk: String,
    index_pk: Option<String>,
    index_sk: Option<String>,
    category: Option<String>,
    level: Option<i16>,
    date: Option<String>,
    weekday: Option<String>,
    start_time: Option<String>,
    max_spots: Option<i64>,
    booking_count: Option<i64>,
    version: Option<i64>,
    created_at: Option<String>,
    updated_at: Option<String>,
    booked_at: Option<String>,
}

impl ItemRow {
    fn into_session_record(self) -> Result<SessionRecord, StoreError> {
        let key = format!("{}/{}", self.pk, self.sk);
        let level = self
            .level
            .map(|level| u8::try_from(level).map_err(|_| out_of_range(&key, "level")))
            .transpose()?;

        Ok(SessionRecord {
            index_pk: required(&key, "index_pk", self.index_pk)?,
            index_sk: required(&key, "index_sk", self.index_sk)?,
            category: required(&key, "category", self.category)?,
            level,
            date: required(&key, "date", self.date)?,
            weekday: required(&key, "weekday", self.weekday)?,
            start_time: required(&key, "start_time", self.start_time)?,
            max_spots: to_u32(&key, "max_spots", self.max_spots)?,
            booking_count: to_u32(&key, "booking_count", self.booking_count)?,
            version: required(&key, "version", self.version)
                .and_then(|v| u64::try_from(v).map_err(|_| out_of_range(&key, "version")))?,
            created_at: required(&key, "created_at", self.created_at)?,
            updated_at: required(&key, "updated_at", self.updated_at)?,
            pk: self.pk,
        })
    }

    fn into_booking_record(self) -> Result<BookingRecord, StoreError> {
        let key = format!("{}/{}", self.pk, self.sk);
        Ok(BookingRecord {
            booked_at: required(&key, "booked_at", self.booked_at)?,
            pk: self.pk,
            sk: self.sk,
        })
    }
}

impl TryFrom<ItemRow> for StoredItem {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        if row.sk == METADATA_SK {
            row.into_session_record().map(StoredItem::Session)
        } else {
            row.into_booking_record().map(StoredItem::Booking)
        }
    }
}

fn required<T>(key: &str, column: &str, value: Option<T>) -> Result<T, StoreError> {
    value.ok_or_else(|| StoreError::Corrupt(format!("{}: missing {}", key, column)))
}

fn to_u32(key: &str, column: &str, value: Option<i64>) -> Result<u32, StoreError> {
    required(key, column, value)
        .and_then(|v| u32::try_from(v).map_err(|_| out_of_range(key, column)))
}

fn out_of_range(key: &str, column: &str) -> StoreError {
    StoreError::Corrupt(format!("{}: {} out of range", key, column))
}
