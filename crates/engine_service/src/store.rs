//! Score and game-history persistence over the realtime-database REST API
//!
//! Records are pushed under the signed-in user's id:
//!
//! - `UsersScore/<uid>/scores/<key>` = `{ "score": f64, "date": "yyyy-mm-dd" }`
//! - `UsersHistory/<uid>/<key>` = `"W/Easy/2024-05-01"`
//!
//! Quiz scores are only written when the user registered a nickname under
//! `UsersScore/<uid>/nickname`, which is what the leaderboard lists.

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::client::directory_url;
use crate::error::{ServiceError, ServiceResult};
use crate::protocol::str_field;

const SCORES_ROOT: &str = "UsersScore";
const HISTORY_ROOT: &str = "UsersHistory";

/// Identity used for datastore writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    /// Database auth token, appended as `?auth=`
    pub auth_token: Option<String>,
}

/// One leaderboard entry
#[derive(Debug, Serialize)]
struct ScoreRecord<'a> {
    score: f64,
    date: &'a str,
}

/// Datastore client; writes fail with [`ServiceError::NotSignedIn`] when no
/// credentials are configured
#[derive(Debug, Clone)]
pub struct ScoreStore {
    http: Client,
    base: Url,
    credentials: Option<Credentials>,
}

impl ScoreStore {
    pub fn new(
        http: Client,
        database_url: &str,
        credentials: Option<Credentials>,
    ) -> ServiceResult<Self> {
        Ok(Self {
            http,
            base: directory_url(database_url)?,
            credentials,
        })
    }

    pub fn is_signed_in(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> ServiceResult<&Credentials> {
        self.credentials.as_ref().ok_or(ServiceError::NotSignedIn)
    }

    fn node_url(&self, credentials: &Credentials, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = self.base.join(&format!("{}.json", segments.join("/")))?;
        if let Some(token) = &credentials.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    fn read(&self, url: Url) -> ServiceResult<Value> {
        debug!("[STORE] GET {}", url.path());
        let body = self.http.get(url).send()?.error_for_status()?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn push<T: Serialize + ?Sized>(&self, url: Url, value: &T) -> ServiceResult<String> {
        debug!("[STORE] POST {}", url.path());
        let body = self
            .http
            .post(url)
            .json(value)
            .send()?
            .error_for_status()?
            .text()?;
        let reply: Value = serde_json::from_str(&body)?;
        str_field(&reply, "name")
    }

    /// Push a quiz score for the signed-in user; returns the new record key
    pub fn store_quiz_score(&self, score: f64, date: &str) -> ServiceResult<String> {
        let credentials = self.credentials()?;
        let user_id = credentials.user_id.as_str();

        let nickname = self.read(self.node_url(credentials, &[SCORES_ROOT, user_id, "nickname"])?)?;
        if nickname.as_str().is_none() {
            return Err(ServiceError::NicknameMissing {
                user_id: user_id.to_string(),
            });
        }

        let url = self.node_url(credentials, &[SCORES_ROOT, user_id, "scores"])?;
        let key = self.push(url, &ScoreRecord { score, date })?;
        info!("[STORE] Quiz score {} stored as {}", score, key);
        Ok(key)
    }

    /// Push a `"<W|L>/<difficulty>/<date>"` game-history entry
    pub fn store_game_history(&self, entry: &str) -> ServiceResult<String> {
        let credentials = self.credentials()?;
        let url = self.node_url(credentials, &[HISTORY_ROOT, &credentials.user_id])?;
        let key = self.push(url, entry)?;
        info!("[STORE] Game history '{}' stored as {}", entry, key);
        Ok(key)
    }
}
