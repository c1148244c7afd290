use crate::config::KvSettings;
use crate::models::{AnalysisRecord, SessionStats};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Every key written lives as long as the session cookie.
pub const SESSION_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Stored analysis {id} is not valid JSON: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode analysis: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Redis(e) => AppError::RedisError(e),
            other => AppError::InternalError(anyhow::Error::new(other)),
        }
    }
}

/// Persistence for per-session analysis history.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Newest first, at most `limit` records.
    async fn list_analyses_by_session(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<AnalysisRecord>, StoreError>;

    async fn get_session_stats(&self, session_id: &str) -> Result<SessionStats, StoreError>;

    /// Stores the record and returns the session's updated stats.
    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<SessionStats, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct RedisAnalysisStore {
    manager: ConnectionManager,
    key_prefix: String,
}

impl RedisAnalysisStore {
    pub async fn new(settings: &KvSettings) -> Result<Self, anyhow::Error> {
        tracing::info!(key_prefix = %settings.key_prefix, "Connecting to key-value store");
        let client = Client::open(settings.url.expose_secret().as_str())?;

        // ConnectionManager reconnects on its own after transient failures.
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            anyhow::anyhow!("Failed to connect to key-value store: {}", e)
        })?;

        tracing::info!("Connected to key-value store");

        Ok(Self {
            manager,
            key_prefix: settings.key_prefix.clone(),
        })
    }
}

/// List of analysis ids for a session, newest first.
pub fn analyses_key(prefix: &str, session_id: &str) -> String {
    format!("{}:session:{}:analyses", prefix, session_id)
}

/// Hash of aggregate stats for a session.
pub fn stats_key(prefix: &str, session_id: &str) -> String {
    format!("{}:session:{}:stats", prefix, session_id)
}

/// JSON-encoded `AnalysisRecord`.
pub fn analysis_key(prefix: &str, analysis_id: &str) -> String {
    format!("{}:analysis:{}", prefix, analysis_id)
}

#[async_trait]
impl AnalysisStore for RedisAnalysisStore {
    async fn list_analyses_by_session(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<AnalysisRecord>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.manager.clone();
        let ids: Vec<String> = conn
            .lrange(analyses_key(&self.key_prefix, session_id), 0, limit as isize - 1)
            .await?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids
            .iter()
            .map(|id| analysis_key(&self.key_prefix, id))
            .collect();
        let payloads: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        // Ids whose record already expired are skipped rather than reported.
        ids.into_iter()
            .zip(payloads)
            .filter_map(|(id, payload)| payload.map(|p| (id, p)))
            .map(|(id, payload)| {
                serde_json::from_str(&payload).map_err(|source| StoreError::Corrupt { id, source })
            })
            .collect()
    }

    async fn get_session_stats(&self, session_id: &str) -> Result<SessionStats, StoreError> {
        let mut conn = self.manager.clone();
        let fields: HashMap<String, String> =
            conn.hgetall(stats_key(&self.key_prefix, session_id)).await?;

        Ok(stats_from_hash(&fields))
    }

    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<SessionStats, StoreError> {
        let payload = serde_json::to_string(record).map_err(StoreError::Encode)?;
        let list_key = analyses_key(&self.key_prefix, &record.session_id);
        let hash_key = stats_key(&self.key_prefix, &record.session_id);
        let mut conn = self.manager.clone();

        redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(analysis_key(&self.key_prefix, &record.id))
            .arg(payload)
            .arg("EX")
            .arg(SESSION_TTL_SECONDS)
            .ignore()
            .cmd("LPUSH")
            .arg(&list_key)
            .arg(&record.id)
            .ignore()
            .cmd("EXPIRE")
            .arg(&list_key)
            .arg(SESSION_TTL_SECONDS)
            .ignore()
            .cmd("HINCRBY")
            .arg(&hash_key)
            .arg("total_analyses")
            .arg(1)
            .ignore()
            .cmd("HINCRBYFLOAT")
            .arg(&hash_key)
            .arg("total_billed")
            .arg(record.total_billed)
            .ignore()
            .cmd("HINCRBYFLOAT")
            .arg(&hash_key)
            .arg("total_potential_savings")
            .arg(record.potential_savings)
            .ignore()
            .cmd("HSET")
            .arg(&hash_key)
            .arg("last_analysis_at")
            .arg(record.created_at.to_rfc3339())
            .ignore()
            .cmd("EXPIRE")
            .arg(&hash_key)
            .arg(SESSION_TTL_SECONDS)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        tracing::info!(
            session_id = %record.session_id,
            analysis_id = %record.id,
            "Analysis recorded"
        );

        self.get_session_stats(&record.session_id).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await?;
        Ok(())
    }
}

/// Missing or unparsable hash fields read as zero.
fn stats_from_hash(fields: &HashMap<String, String>) -> SessionStats {
    let number = |key: &str| {
        fields
            .get(key)
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    SessionStats {
        total_analyses: fields
            .get("total_analyses")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        total_billed: number("total_billed"),
        total_potential_savings: number("total_potential_savings"),
        last_analysis_at: fields
            .get("last_analysis_at")
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// In-memory store for tests and local runs without Redis.
pub struct MockAnalysisStore {
    pub analyses: Mutex<HashMap<String, Vec<AnalysisRecord>>>,
    pub fail: bool,
}

impl Default for MockAnalysisStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnalysisStore {
    pub fn new() -> Self {
        Self {
            analyses: Mutex::new(HashMap::new()),
            fail: false,
        }
    }

    /// A store whose every call fails as if the server went away.
    pub fn failing() -> Self {
        Self {
            analyses: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl AnalysisStore for MockAnalysisStore {
    async fn list_analyses_by_session(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<AnalysisRecord>, StoreError> {
        self.check()?;
        let analyses = self.analyses.lock().unwrap();
        Ok(analyses
            .get(session_id)
            .map(|records| records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_session_stats(&self, session_id: &str) -> Result<SessionStats, StoreError> {
        self.check()?;
        let analyses = self.analyses.lock().unwrap();
        let mut stats = SessionStats::default();
        for record in analyses.get(session_id).into_iter().flatten() {
            stats.record(record);
        }
        Ok(stats)
    }

    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<SessionStats, StoreError> {
        self.check()?;
        self.analyses
            .lock()
            .unwrap()
            .entry(record.session_id.clone())
            .or_default()
            .push(record.clone());
        self.get_session_stats(&record.session_id).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.check()
    }
}
