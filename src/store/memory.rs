//! In-memory store used by tests and store-less demo runs.

use super::{AssessmentQuery, AssessmentRecord, HealthStore, Profile, StoreError};
use crate::identity::UserId;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    profiles: HashMap<UserId, Profile>,
    assessments: Vec<AssessmentRecord>,
    insert_error: Option<String>,
}

/// Process-local [`HealthStore`] with the same ordering/filter semantics as
/// the hosted store. Insert failures can be injected to exercise the
/// persistence-error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail with `reason` until cleared with
    /// `None`. Models the hosted store being down.
    pub fn set_insert_error(&self, reason: Option<&str>) {
        let mut inner = self.lock();
        inner.insert_error = reason.map(str::to_string);
    }

    /// Number of stored assessment records, across all users.
    #[must_use]
    pub fn assessment_count(&self) -> usize {
        self.lock().assessments.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HealthStore for MemoryStore {
    fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let mut stored = profile.clone();
        stored.updated_at = Some(Utc::now());
        inner.profiles.insert(stored.id.clone(), stored);
        Ok(())
    }

    fn fetch_profile(&self, user: &UserId) -> Result<Option<Profile>, StoreError> {
        Ok(self.lock().profiles.get(user).cloned())
    }

    fn insert_assessment(&self, record: &AssessmentRecord) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(reason) = &inner.insert_error {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        let mut stored = record.clone();
        stored.created_at = Some(Utc::now());
        inner.assessments.push(stored);
        Ok(())
    }

    fn list_assessments(
        &self,
        user: &UserId,
        query: &AssessmentQuery,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        let inner = self.lock();
        let mut rows: Vec<AssessmentRecord> = inner
            .assessments
            .iter()
            .filter(|row| &row.user_id == user)
            .filter(|row| {
                query
                    .assessment_type
                    .as_deref()
                    .map_or(true, |t| row.assessment_type == t)
            })
            .cloned()
            .collect();
        // Insertion order is creation order; reverse for newest-first.
        if query.newest_first {
            rows.reverse();
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RISK_PREDICTION, SKIN_HEALTH};

    fn record(user: &str, kind: &str, score: f64) -> AssessmentRecord {
        AssessmentRecord {
            user_id: UserId::from(user),
            assessment_type: kind.to_string(),
            risk_score: score,
            data: serde_json::json!({}),
            created_at: None,
        }
    }

    #[test]
    fn upsert_then_fetch_profile_round_trips() {
        let store = MemoryStore::new();
        let user = UserId::from("u-1");
        let profile = Profile {
            id: user.clone(),
            full_name: "Ada".to_string(),
            age: Some(34),
            gender: Some("female".to_string()),
            updated_at: None,
        };
        store.upsert_profile(&profile).expect("upsert");

        let fetched = store.fetch_profile(&user).expect("fetch").expect("present");
        assert_eq!(fetched.full_name, "Ada");
        assert_eq!(fetched.age, Some(34));
        assert!(fetched.updated_at.is_some(), "store stamps updated_at");
    }

    #[test]
    fn fetch_profile_missing_is_none() {
        let store = MemoryStore::new();
        let fetched = store.fetch_profile(&UserId::from("ghost")).expect("fetch");
        assert!(fetched.is_none());
    }

    #[test]
    fn insert_stamps_created_at() {
        let store = MemoryStore::new();
        store
            .insert_assessment(&record("u-1", RISK_PREDICTION, 70.0))
            .expect("insert");
        let rows = store
            .list_assessments(&UserId::from("u-1"), &AssessmentQuery::default())
            .expect("list");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].created_at.is_some());
    }

    #[test]
    fn list_filters_by_user_and_type() {
        let store = MemoryStore::new();
        store
            .insert_assessment(&record("u-1", RISK_PREDICTION, 70.0))
            .expect("insert");
        store
            .insert_assessment(&record("u-1", SKIN_HEALTH, 30.0))
            .expect("insert");
        store
            .insert_assessment(&record("u-2", SKIN_HEALTH, 40.0))
            .expect("insert");

        let query = AssessmentQuery {
            assessment_type: Some(SKIN_HEALTH.to_string()),
            ..AssessmentQuery::default()
        };
        let rows = store
            .list_assessments(&UserId::from("u-1"), &query)
            .expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].assessment_type, SKIN_HEALTH);
        assert_eq!(rows[0].risk_score, 30.0);
    }

    #[test]
    fn list_orders_and_limits() {
        let store = MemoryStore::new();
        for score in [10.0, 20.0, 30.0] {
            store
                .insert_assessment(&record("u-1", RISK_PREDICTION, score))
                .expect("insert");
        }

        let newest = store
            .list_assessments(&UserId::from("u-1"), &AssessmentQuery::default())
            .expect("list");
        assert_eq!(newest[0].risk_score, 30.0);

        let trend = store
            .list_assessments(
                &UserId::from("u-1"),
                &AssessmentQuery::trend(Some(RISK_PREDICTION), 2),
            )
            .expect("list");
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].risk_score, 10.0);
    }

    #[test]
    fn injected_insert_error_fails_until_cleared() {
        let store = MemoryStore::new();
        store.set_insert_error(Some("store offline"));
        let err = store
            .insert_assessment(&record("u-1", RISK_PREDICTION, 50.0))
            .expect_err("insert should fail");
        assert_eq!(err, StoreError::Unavailable("store offline".to_string()));
        assert_eq!(store.assessment_count(), 0);

        store.set_insert_error(None);
        store
            .insert_assessment(&record("u-1", RISK_PREDICTION, 50.0))
            .expect("insert succeeds after clear");
        assert_eq!(store.assessment_count(), 1);
    }
}
