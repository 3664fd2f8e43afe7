//! Process-local implementation of the fetch log.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entities::{ExternalData, NewExternalData};
use crate::domain::repositories::ExternalDataRepository;
use crate::error::AppError;

/// In-memory append-only log.
///
/// Used when no database is configured and by tests. Contents are lost on
/// restart.
#[derive(Default)]
pub struct InMemoryExternalDataRepository {
    records: RwLock<Vec<ExternalData>>,
}

impl InMemoryExternalDataRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records appended so far.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Snapshot of every record in append order.
    pub async fn all(&self) -> Vec<ExternalData> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ExternalDataRepository for InMemoryExternalDataRepository {
    async fn append(&self, record: NewExternalData) -> Result<ExternalData, AppError> {
        let mut records = self.records.write().await;
        let id = records.len() as i64 + 1;

        let stored = ExternalData::new(
            id,
            record.source,
            record.key_name,
            record.payload,
            record.fetched_at.unwrap_or_else(Utc::now),
        );
        records.push(stored.clone());

        Ok(stored)
    }

    async fn most_recent(
        &self,
        source: &str,
        key_name: &str,
    ) -> Result<Option<ExternalData>, AppError> {
        let records = self.records.read().await;

        Ok(records
            .iter()
            .filter(|r| r.source == source && r.key_name == key_name)
            .max_by_key(|r| r.recency())
            .cloned())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_record(source: &str, key: &str, payload: &str) -> NewExternalData {
        NewExternalData {
            source: source.to_string(),
            key_name: key.to_string(),
            payload: payload.to_string(),
            fetched_at: None,
        }
    }

    #[tokio::test]
    async fn test_append_assigns_id_and_timestamp() {
        let repo = InMemoryExternalDataRepository::new();
        let before = Utc::now();

        let first = repo.append(new_record("openweather", "Orlando", "{}")).await.unwrap();
        let second = repo.append(new_record("openweather", "Orlando", "{}")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.fetched_at >= before);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_append_keeps_explicit_timestamp() {
        let repo = InMemoryExternalDataRepository::new();
        let at = Utc::now() - Duration::hours(3);

        let stored = repo
            .append(new_record("openweather", "Orlando", "{}").fetched_at(at))
            .await
            .unwrap();

        assert_eq!(stored.fetched_at, at);
    }

    #[tokio::test]
    async fn test_most_recent_picks_latest_fetched_at() {
        let repo = InMemoryExternalDataRepository::new();
        let now = Utc::now();

        repo.append(new_record("openweather", "Orlando", "newest").fetched_at(now))
            .await
            .unwrap();
        repo.append(
            new_record("openweather", "Orlando", "older").fetched_at(now - Duration::minutes(30)),
        )
        .await
        .unwrap();

        let latest = repo.most_recent("openweather", "Orlando").await.unwrap().unwrap();
        assert_eq!(latest.payload, "newest");
    }

    #[tokio::test]
    async fn test_most_recent_matches_source_and_key_exactly() {
        let repo = InMemoryExternalDataRepository::new();
        repo.append(new_record("openweather", "Orlando", "{}")).await.unwrap();

        assert!(repo.most_recent("open-meteo", "Orlando").await.unwrap().is_none());
        assert!(repo.most_recent("openweather", "orlando").await.unwrap().is_none());
        assert!(repo.most_recent("openweather", "Orlando").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_timestamp_tie_resolves_to_higher_id() {
        let repo = InMemoryExternalDataRepository::new();
        let at = Utc::now();

        repo.append(new_record("openweather", "Orlando", "first").fetched_at(at))
            .await
            .unwrap();
        repo.append(new_record("openweather", "Orlando", "second").fetched_at(at))
            .await
            .unwrap();

        let latest = repo.most_recent("openweather", "Orlando").await.unwrap().unwrap();
        assert_eq!(latest.payload, "second");
    }
}
