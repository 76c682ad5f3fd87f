//! Hosted-store client speaking the PostgREST dialect.
//!
//! The managed backend exposes tables through `/rest/v1/<table>` with
//! key-based auth headers. Only the operations the app consumes are
//! implemented: profile upsert/fetch, assessment insert, assessment listing.

use super::{AssessmentQuery, AssessmentRecord, HealthStore, Profile, StoreError};
use crate::identity::UserId;
use std::time::Duration;

const PROFILES_TABLE: &str = "profiles";
const ASSESSMENTS_TABLE: &str = "health_assessments";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Blocking REST client for the hosted store.
#[derive(Debug)]
pub struct RestStore {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl RestStore {
    /// Build a client for `base_url` (scheme + host, no trailing slash
    /// required) authenticated with the publishable `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn post(
        &self,
        table: &str,
        body: &impl serde::Serialize,
        prefer: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut request = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body);
        if let Some(prefer) = prefer {
            request = request.header("Prefer", prefer);
        }
        let response = request
            .send()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Rejected(format!("{table}: HTTP {status}")))
        }
    }

    fn get_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .client
            .get(self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(params)
            .send()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Rejected(format!("{table}: HTTP {status}")));
        }
        response
            .json::<Vec<T>>()
            .map_err(|err| StoreError::Rejected(format!("{table}: bad payload: {err}")))
    }
}

/// Query-string parameters for an assessment listing, PostgREST style.
fn list_params(user: &UserId, query: &AssessmentQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", "*".to_string()),
        ("user_id", format!("eq.{}", user.as_str())),
    ];
    if let Some(kind) = &query.assessment_type {
        params.push(("assessment_type", format!("eq.{kind}")));
    }
    let direction = if query.newest_first { "desc" } else { "asc" };
    params.push(("order", format!("created_at.{direction}")));
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

fn profile_params(user: &UserId) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("id", format!("eq.{}", user.as_str())),
        ("limit", "1".to_string()),
    ]
}

impl HealthStore for RestStore {
    fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.post(PROFILES_TABLE, profile, Some("resolution=merge-duplicates"))
    }

    fn fetch_profile(&self, user: &UserId) -> Result<Option<Profile>, StoreError> {
        let rows: Vec<Profile> = self.get_rows(PROFILES_TABLE, &profile_params(user))?;
        Ok(rows.into_iter().next())
    }

    fn insert_assessment(&self, record: &AssessmentRecord) -> Result<(), StoreError> {
        self.post(ASSESSMENTS_TABLE, record, None)
    }

    fn list_assessments(
        &self,
        user: &UserId,
        query: &AssessmentQuery,
    ) -> Result<Vec<AssessmentRecord>, StoreError> {
        self.get_rows(ASSESSMENTS_TABLE, &list_params(user, query))
    }
}
