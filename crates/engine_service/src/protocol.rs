//! Request/reply vocabulary shared by the game controller and the service
//!
//! The controller never performs I/O itself. It emits [`Request`] values and
//! later consumes the matching [`Reply`], which keeps network latency out of
//! the state machine and lets drivers add timeouts and cancellation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{ServiceError, ServiceResult};

/// Server-side match/engine instance identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub i64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who delivered mate, as reported by the engine endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mate {
    /// The human move that was just submitted mates the engine
    Player,
    /// The engine's reply mates the human
    Engine,
}

/// Outcome of submitting a human move to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineReply {
    Mate(Mate),
    /// Engine reply in coordinate notation, e.g. `e7e5`
    Move(String),
}

/// Every network round-trip the client can ask for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    StartMatch,
    StartQuiz,
    SetDifficulty { match_id: MatchId, elo: String },
    ResetMatch { match_id: MatchId },
    /// Apply a move server-side and report whether it mates
    CheckMate { match_id: MatchId, mv: String },
    /// Apply a move server-side and get the engine's answer
    EngineMove { match_id: MatchId, mv: String },
    BestMove { match_id: MatchId },
    /// Rewind the server engine to a position
    Undo { match_id: MatchId, fen: String },
    StoreQuizScore { score: f64, date: String },
    StoreGameHistory { entry: String },
}

impl Request {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Request::StartMatch => "startMatch",
            Request::StartQuiz => "quizStart",
            Request::SetDifficulty { .. } => "info",
            Request::ResetMatch { .. } => "reset",
            Request::CheckMate { .. } => "mate",
            Request::EngineMove { .. } => "stockfish",
            Request::BestMove { .. } => "bestMove",
            Request::Undo { .. } => "undoStockfish",
            Request::StoreQuizScore { .. } => "storeQuizScore",
            Request::StoreGameHistory { .. } => "storeGameHistory",
        }
    }
}

/// Decoded reply, one variant per request kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    MatchStarted(MatchId),
    QuizLoaded { match_id: MatchId, fen: String },
    DifficultySet { elo: String },
    MateChecked { mate: bool },
    EngineReplied(EngineReply),
    BestMove(String),
    Undone { result: String },
    /// Request had no meaningful reply body
    Ack,
}

// ============================================================================
// Loosely typed field extraction
// ============================================================================

fn field<'a>(body: &'a Value, name: &'static str) -> ServiceResult<&'a Value> {
    body.get(name)
        .filter(|v| !v.is_null())
        .ok_or(ServiceError::MissingField { field: name })
}

/// Read an integer that may be sent as a number or a numeric string
pub(crate) fn int_field(body: &Value, name: &'static str) -> ServiceResult<i64> {
    let value = field(body, name)?;
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| ServiceError::UnexpectedValue {
            field: name,
            value: value.to_string(),
        })
}

/// Read a string field; numbers are stringified
pub(crate) fn str_field(body: &Value, name: &'static str) -> ServiceResult<String> {
    match field(body, name)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ServiceError::UnexpectedValue {
            field: name,
            value: other.to_string(),
        }),
    }
}

/// Read a boolean that may be sent as `true` or `"true"` (any case)
pub(crate) fn bool_field(body: &Value, name: &'static str) -> ServiceResult<bool> {
    match field(body, name)? {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => Ok(s.trim().eq_ignore_ascii_case("true")),
        other => Err(ServiceError::UnexpectedValue {
            field: name,
            value: other.to_string(),
        }),
    }
}

/// Decode the `/stockfish` reply
///
/// `mate` is `"player"` or `"stockfish"` when the game ended; any other value
/// means the engine answered with the move in `response`.
pub(crate) fn engine_reply(body: &Value) -> ServiceResult<EngineReply> {
    let mate = body
        .get("mate")
        .and_then(Value::as_str)
        .map(str::to_ascii_lowercase);
    match mate.as_deref() {
        Some("player") => Ok(EngineReply::Mate(Mate::Player)),
        Some("stockfish") => Ok(EngineReply::Mate(Mate::Engine)),
        _ => str_field(body, "response").map(EngineReply::Move),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_field_accepts_number_and_string() {
        assert_eq!(int_field(&json!({"response": 7}), "response").unwrap(), 7);
        assert_eq!(int_field(&json!({"response": " 12 "}), "response").unwrap(), 12);
        assert!(matches!(
            int_field(&json!({"response": "abc"}), "response"),
            Err(ServiceError::UnexpectedValue { field: "response", .. })
        ));
        assert!(matches!(
            int_field(&json!({}), "response"),
            Err(ServiceError::MissingField { field: "response" })
        ));
    }

    #[test]
    fn test_bool_field_is_case_insensitive() {
        assert!(bool_field(&json!({"mate": "True"}), "mate").unwrap());
        assert!(bool_field(&json!({"mate": true}), "mate").unwrap());
        assert!(!bool_field(&json!({"mate": "false"}), "mate").unwrap());
        assert!(!bool_field(&json!({"mate": "nope"}), "mate").unwrap());
    }

    #[test]
    fn test_engine_reply_decoding() {
        assert_eq!(
            engine_reply(&json!({"mate": "player"})).unwrap(),
            EngineReply::Mate(Mate::Player)
        );
        assert_eq!(
            engine_reply(&json!({"mate": "stockfish"})).unwrap(),
            EngineReply::Mate(Mate::Engine)
        );
        assert_eq!(
            engine_reply(&json!({"mate": "false", "response": "e7e5"})).unwrap(),
            EngineReply::Move("e7e5".to_string())
        );
        assert!(engine_reply(&json!({"mate": "false"})).is_err());
    }

    #[test]
    fn test_null_counts_as_missing() {
        assert!(matches!(
            str_field(&json!({"best": null}), "best"),
            Err(ServiceError::MissingField { field: "best" })
        ));
    }
}
