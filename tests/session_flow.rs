//! Integration tests for the synchronous session driver
//!
//! Plays whole games through [`Session`] against an in-memory server and
//! checks both the resulting snapshot and the requests the server saw.

mod common;

use common::{FakeServer, MATCH_ID};
use engine_service::{EngineReply, Mate, Request};
use pocket_chess::game::{Difficulty, GameController, Input, ModeKind, Session, UiEvent};
use shakmaty::{Color, Square};

fn play(session: &mut Session<FakeServer>, from: Square, to: Square) {
    session.dispatch(Input::TakePiece(from));
    session.dispatch(Input::ReleasePiece(to));
}

#[test]
fn test_local_game_until_checkmate() {
    //! Fool's mate between two local players
    //!
    //! Every move is checked for mate by the server; the fourth one is.

    let mut session = Session::new(GameController::new(), FakeServer::new());
    session.dispatch(Input::StartLocal);
    assert_eq!(session.snapshot().mode, ModeKind::Local);

    play(&mut session, Square::F2, Square::F3);
    play(&mut session, Square::E7, Square::E5);
    play(&mut session, Square::G2, Square::G4);
    play(&mut session, Square::D8, Square::H4);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.checkmate, Some(Color::Black));
    assert_eq!(
        snapshot.history,
        vec![
            "1. ♙ f2-f3 ♟ e7-e5".to_string(),
            "2. ♙ g2-g4 ♛ d8-h4".to_string(),
        ]
    );
    assert_eq!(
        session.service().names(),
        vec!["startMatch", "mate", "mate", "mate", "mate"]
    );
    assert!(session
        .take_events()
        .contains(&UiEvent::Checkmate { winner: Color::Black }));
}

#[test]
fn test_quiz_series_stores_score() {
    //! One-puzzle series solved on the first attempt

    let controller = GameController::with_quiz_budget(1, 3);
    let server = FakeServer::new().with_engine_replies([EngineReply::Mate(Mate::Player)]);
    let mut session = Session::new(controller, server);

    session.dispatch(Input::StartQuiz);
    assert_eq!(session.snapshot().mode, ModeKind::Quiz);
    play(&mut session, Square::D1, Square::D8);

    assert_eq!(session.controller().quiz_progress().score, 1.0);
    assert_eq!(
        session.service().names(),
        vec!["quizStart", "bestMove", "stockfish", "storeQuizScore"]
    );
    let events = session.take_events();
    assert!(events.contains(&UiEvent::QuizFinished { score: 1.0 }));
}

#[test]
fn test_quiz_mistake_rewinds_server() {
    let mut session = Session::new(GameController::with_quiz_budget(3, 3), FakeServer::new());
    session.dispatch(Input::StartQuiz);
    play(&mut session, Square::D1, Square::D3);

    assert_eq!(session.snapshot().quiz.attempts, Some(1));
    assert!(session.snapshot().history.is_empty());
    assert!(session.service().log().contains(&Request::Undo {
        match_id: MATCH_ID,
        fen: common::MATE_IN_ONE.to_string(),
    }));
    assert_eq!(session.take_events(), vec![UiEvent::QuizMistake]);
}

#[test]
fn test_engine_game_records_loss() {
    let server = FakeServer::new().with_engine_replies([
        EngineReply::Move("e7e5".to_string()),
        EngineReply::Mate(Mate::Engine),
    ]);
    let mut session = Session::new(GameController::new(), server);

    session.dispatch(Input::StartStock);
    assert!(session.snapshot().input_locked);
    session.dispatch(Input::SetDifficulty(Difficulty::Easy));
    assert!(!session.snapshot().input_locked);

    play(&mut session, Square::E2, Square::E4);
    assert_eq!(session.snapshot().history, vec!["1. ♙ e2-e4 ♟ e7-e5".to_string()]);
    play(&mut session, Square::F2, Square::F3);

    assert_eq!(session.snapshot().checkmate, Some(Color::Black));
    match session.service().log().last() {
        Some(Request::StoreGameHistory { entry }) => assert!(entry.starts_with("L/Easy/")),
        other => panic!("expected a history write, got {:?}", other),
    }
    assert_eq!(
        session.service().log()[1],
        Request::SetDifficulty {
            match_id: MATCH_ID,
            elo: "600".to_string(),
        }
    );
}

#[test]
fn test_reset_releases_server_match() {
    let mut session = Session::new(GameController::new(), FakeServer::new());
    session.dispatch(Input::StartLocal);
    play(&mut session, Square::E2, Square::E4);
    session.dispatch(Input::Reset);

    assert_eq!(session.snapshot().mode, ModeKind::Idle);
    assert_eq!(session.snapshot().pieces.len(), 32);
    assert_eq!(
        session.service().log().last(),
        Some(&Request::ResetMatch { match_id: MATCH_ID })
    );
}
