//! Engine service HTTP integration tests
//!
//! Runs the blocking client against an in-process axum server that mimics the
//! remote service, including its loosely typed replies.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use engine_service::{
    ChessService, Credentials, EngineClient, EngineReply, HttpChessService, MatchId, Mate, Reply,
    Request, ServiceError, ServiceSettings,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

type Params = Query<HashMap<String, String>>;

/// Bodies and query strings received by the fake datastore
#[derive(Clone, Default)]
struct Captured {
    writes: Arc<Mutex<Vec<(String, Value)>>>,
    auth: Arc<Mutex<Vec<String>>>,
}

/// Serve `router` on an ephemeral port from a background runtime
fn spawn_server(router: Router) -> String {
    let (tx, rx) = mpsc::channel::<SocketAddr>();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind test listener");
            tx.send(listener.local_addr().expect("local addr"))
                .expect("report address");
            axum::serve(listener, router).await.expect("serve");
        });
    });
    let addr = rx.recv().expect("server address");
    format!("http://{}", addr)
}

fn engine_router() -> Router {
    Router::new()
        .route("/startMatch", get(|| async { Json(json!({"response": 17})) }))
        .route(
            "/quizStart",
            get(|| async {
                Json(json!({
                    "IDMatch": "5",
                    "response": "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1"
                }))
            }),
        )
        .route(
            "/info",
            post(|Query(p): Params| async move {
                let elo = p.get("ELO").cloned().unwrap_or_default();
                Json(json!({ "ELO": elo }))
            }),
        )
        .route("/reset", get(|| async { Json(json!({})) }))
        .route(
            "/",
            post(|Query(p): Params| async move {
                let mate = if p.get("move").map(String::as_str) == Some("d8h4") {
                    "true"
                } else {
                    "false"
                };
                Json(json!({"mate": mate}))
            }),
        )
        .route(
            "/stockfish",
            post(|Query(p): Params| async move {
                match p.get("move").map(String::as_str).unwrap_or_default() {
                    "h5f7" => Json(json!({"mate": "player"})),
                    "a2a3" => Json(json!({"mate": "stockfish"})),
                    _ => Json(json!({"mate": "false", "response": "e7e5"})),
                }
            }),
        )
        .route(
            "/bestMove",
            post(|Query(p): Params| async move {
                let best = if p.get("index").map(String::as_str) == Some("5") {
                    "d1d8"
                } else {
                    "e2e4"
                };
                Json(json!({"best": best}))
            }),
        )
        .route(
            "/undoStockfish",
            post(|Query(p): Params| async move {
                let fen = p.get("fen").cloned().unwrap_or_default();
                Json(json!({ "result": fen }))
            }),
        )
}

fn client(base: &str) -> EngineClient {
    EngineClient::new(base, Duration::from_secs(5)).expect("client")
}

// ============================================================================
// Engine endpoints
// ============================================================================

#[test]
fn test_start_match_and_quiz() {
    let base = spawn_server(engine_router());
    let engine = client(&base);

    assert_eq!(engine.start_match().unwrap(), MatchId(17));

    let (match_id, fen) = engine.start_quiz().unwrap();
    assert_eq!(match_id, MatchId(5), "numeric strings are accepted as ids");
    assert!(fen.starts_with("6k1/"));
}

#[test]
fn test_move_endpoints() {
    let base = spawn_server(engine_router());
    let engine = client(&base);
    let id = MatchId(1);

    assert!(engine.check_mate(id, "d8h4").unwrap());
    assert!(!engine.check_mate(id, "e2e4").unwrap());

    assert_eq!(
        engine.engine_move(id, "e2e4").unwrap(),
        EngineReply::Move("e7e5".to_string())
    );
    assert_eq!(
        engine.engine_move(id, "h5f7").unwrap(),
        EngineReply::Mate(Mate::Player)
    );
    assert_eq!(
        engine.engine_move(id, "a2a3").unwrap(),
        EngineReply::Mate(Mate::Engine)
    );

    assert_eq!(engine.best_move(MatchId(5)).unwrap(), "d1d8");
    assert_eq!(engine.set_difficulty(id, "1300").unwrap(), "1300");
    engine.reset(id).unwrap();
}

#[test]
fn test_undo_round_trips_fen_with_spaces() {
    let base = spawn_server(engine_router());
    let engine = client(&base);
    let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
    assert_eq!(engine.undo(MatchId(2), fen).unwrap(), fen);
}

#[test]
fn test_server_error_status_is_reported() {
    let router = Router::new().route(
        "/startMatch",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn_server(router);
    assert!(matches!(client(&base).start_match(), Err(ServiceError::Http(_))));
}

#[test]
fn test_non_json_reply_is_reported() {
    let router = Router::new().route("/bestMove", post(|| async { "<html>oops</html>" }));
    let base = spawn_server(router);
    assert!(matches!(
        client(&base).best_move(MatchId(1)),
        Err(ServiceError::Json(_))
    ));
}

#[test]
fn test_stalled_server_times_out() {
    let router = Router::new().route(
        "/startMatch",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"response": 1}))
        }),
    );
    let base = spawn_server(router);
    let engine = EngineClient::new(&base, Duration::from_millis(200)).unwrap();

    match engine.start_match() {
        Err(ServiceError::Http(e)) => assert!(e.is_timeout(), "expected timeout, got {e}"),
        other => panic!("expected timeout error, got {:?}", other),
    }
}

// ============================================================================
// Datastore
// ============================================================================

fn store_router(captured: Captured, nickname: Value) -> Router {
    Router::new()
        .route(
            "/UsersScore/uid42/nickname.json",
            get(move || {
                let nickname = nickname.clone();
                async move { Json(nickname) }
            }),
        )
        .route(
            "/UsersScore/uid42/scores.json",
            post(
                |State(c): State<Captured>, Query(p): Params, Json(body): Json<Value>| async move {
                    c.writes.lock().unwrap().push(("scores".to_string(), body));
                    c.auth.lock().unwrap().push(p.get("auth").cloned().unwrap_or_default());
                    Json(json!({"name": "-Nscore"}))
                },
            ),
        )
        .route(
            "/UsersHistory/uid42.json",
            post(|State(c): State<Captured>, Json(body): Json<Value>| async move {
                c.writes.lock().unwrap().push(("history".to_string(), body));
                Json(json!({"name": "-Nhistory"}))
            }),
        )
        .with_state(captured)
}

fn service(base: &str, credentials: Option<Credentials>) -> HttpChessService {
    HttpChessService::new(&ServiceSettings {
        server_url: base.to_string(),
        database_url: base.to_string(),
        timeout: Duration::from_secs(5),
        credentials,
    })
    .expect("service")
}

fn signed_in() -> Option<Credentials> {
    Some(Credentials {
        user_id: "uid42".to_string(),
        auth_token: Some("tok".to_string()),
    })
}

#[test]
fn test_store_quiz_score_and_history() {
    let captured = Captured::default();
    let base = spawn_server(store_router(captured.clone(), json!("magnus")));
    let service = service(&base, signed_in());

    let reply = service
        .execute(&Request::StoreQuizScore {
            score: 1.5,
            date: "2024-05-01".to_string(),
        })
        .unwrap();
    assert_eq!(reply, Reply::Ack);

    service
        .execute(&Request::StoreGameHistory {
            entry: "W/Easy/2024-05-01".to_string(),
        })
        .unwrap();

    let writes = captured.writes.lock().unwrap();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].0, "scores");
    assert_eq!(writes[0].1, json!({"score": 1.5, "date": "2024-05-01"}));
    assert_eq!(writes[1], ("history".to_string(), json!("W/Easy/2024-05-01")));
    assert_eq!(*captured.auth.lock().unwrap(), vec!["tok".to_string()]);
}

#[test]
fn test_quiz_score_skipped_without_nickname() {
    let captured = Captured::default();
    let base = spawn_server(store_router(captured.clone(), Value::Null));
    let service = service(&base, signed_in());

    let result = service.execute(&Request::StoreQuizScore {
        score: 2.0,
        date: "2024-05-01".to_string(),
    });
    assert!(matches!(result, Err(ServiceError::NicknameMissing { .. })));
    assert!(captured.writes.lock().unwrap().is_empty());
}

#[test]
fn test_service_dispatches_engine_requests() {
    let base = spawn_server(engine_router());
    let service = service(&base, None);

    assert_eq!(
        service.execute(&Request::StartMatch).unwrap(),
        Reply::MatchStarted(MatchId(17))
    );
    assert_eq!(
        service
            .execute(&Request::CheckMate {
                match_id: MatchId(17),
                mv: "d8h4".to_string()
            })
            .unwrap(),
        Reply::MateChecked { mate: true }
    );
    assert!(matches!(
        service.execute(&Request::StoreGameHistory {
            entry: "L/Hard/2024-05-01".to_string()
        }),
        Err(ServiceError::NotSignedIn)
    ));
}
