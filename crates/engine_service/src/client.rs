//! Blocking client for the remote stockfish/quiz service
//!
//! Every endpoint takes its arguments as query parameters and answers with a
//! small JSON object. Each call carries the client-wide timeout, so a stalled
//! server surfaces as [`ServiceError::Http`] instead of hanging the caller.

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::ServiceResult;
use crate::protocol::{bool_field, engine_reply, int_field, str_field, EngineReply, MatchId};

/// Client for the engine service endpoints
#[derive(Debug, Clone)]
pub struct EngineClient {
    http: Client,
    base: Url,
}

impl EngineClient {
    /// Create a client rooted at `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> ServiceResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_http(http, base_url)
    }

    /// Create a client that shares an existing HTTP connection pool
    pub fn with_http(http: Client, base_url: &str) -> ServiceResult<Self> {
        Ok(Self {
            http,
            base: directory_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> ServiceResult<Url> {
        let mut url = self.base.join(path)?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> ServiceResult<Value> {
        let response = request.send()?.error_for_status()?;
        let body = response.text()?;
        debug!("[SERVICE] <- {}", body);
        Ok(serde_json::from_str(&body)?)
    }

    fn get(&self, path: &str, params: &[(&str, &str)]) -> ServiceResult<Value> {
        let url = self.endpoint(path, params)?;
        debug!("[SERVICE] GET {}", url);
        self.send(self.http.get(url))
    }

    fn post(&self, path: &str, params: &[(&str, &str)]) -> ServiceResult<Value> {
        let url = self.endpoint(path, params)?;
        debug!("[SERVICE] POST {}", url);
        self.send(self.http.post(url))
    }

    /// Allocate a server-side engine instance for a new game
    pub fn start_match(&self) -> ServiceResult<MatchId> {
        let body = self.get("startMatch", &[])?;
        Ok(MatchId(int_field(&body, "response")?))
    }

    /// Fetch a puzzle: its engine instance and starting FEN
    pub fn start_quiz(&self) -> ServiceResult<(MatchId, String)> {
        let body = self.get("quizStart", &[])?;
        let match_id = MatchId(int_field(&body, "IDMatch")?);
        let fen = str_field(&body, "response")?;
        Ok((match_id, fen))
    }

    /// Set the engine strength; returns the ELO the server acknowledged
    pub fn set_difficulty(&self, match_id: MatchId, elo: &str) -> ServiceResult<String> {
        let index = match_id.to_string();
        let body = self.post("info", &[("index", &index), ("ELO", elo)])?;
        str_field(&body, "ELO")
    }

    /// Reset the engine instance; the reply body is not inspected
    pub fn reset(&self, match_id: MatchId) -> ServiceResult<()> {
        let url = self.endpoint("reset", &[("index", &match_id.to_string())])?;
        debug!("[SERVICE] GET {}", url);
        self.http.get(url).send()?.error_for_status()?;
        Ok(())
    }

    /// Apply `mv` on the server and report whether it delivers mate
    pub fn check_mate(&self, match_id: MatchId, mv: &str) -> ServiceResult<bool> {
        let index = match_id.to_string();
        let body = self.post("", &[("move", mv), ("index", &index)])?;
        bool_field(&body, "mate")
    }

    /// Apply `mv` on the server and let the engine answer
    pub fn engine_move(&self, match_id: MatchId, mv: &str) -> ServiceResult<EngineReply> {
        let index = match_id.to_string();
        let body = self.post("stockfish", &[("move", mv), ("index", &index)])?;
        engine_reply(&body)
    }

    /// Best move for the side to move in the server's current position
    pub fn best_move(&self, match_id: MatchId) -> ServiceResult<String> {
        let body = self.post("bestMove", &[("index", &match_id.to_string())])?;
        str_field(&body, "best")
    }

    /// Rewind the server engine to `fen`
    pub fn undo(&self, match_id: MatchId, fen: &str) -> ServiceResult<String> {
        let index = match_id.to_string();
        let body = self.post("undoStockfish", &[("fen", fen), ("index", &index)])?;
        str_field(&body, "result")
    }
}

/// Parse a base URL so that relative joins append instead of replacing the
/// last path segment
pub(crate) fn directory_url(base_url: &str) -> ServiceResult<Url> {
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{}/", base_url))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> EngineClient {
        EngineClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let c = client("https://example.com/api");
        assert_eq!(c.base_url().as_str(), "https://example.com/api/");
    }

    #[test]
    fn test_endpoint_query_encoding() {
        let c = client("https://example.com");
        let url = c
            .endpoint("undoStockfish", &[("fen", "8/8/8/8/8/8/8/K6k w - - 0 1"), ("index", "3")])
            .unwrap();
        assert_eq!(url.path(), "/undoStockfish");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0].1, "8/8/8/8/8/8/8/K6k w - - 0 1");
        assert_eq!(pairs[1], ("index".to_string(), "3".to_string()));
    }

    #[test]
    fn test_mate_check_hits_service_root() {
        let c = client("https://example.com/api/");
        let url = c.endpoint("", &[("move", "e2e4"), ("index", "1")]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/?move=e2e4&index=1");
    }

    #[test]
    fn test_endpoint_without_params_has_no_query() {
        let c = client("https://example.com");
        let url = c.endpoint("startMatch", &[]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/startMatch");
    }
}
