//! Game mode controller
//!
//! Owns the authoritative board and every piece of per-game state, and is the
//! only place where state changes. It never performs I/O: both entry points
//! return the [`Request`]s the caller should run, and replies come back
//! through [`GameController::on_reply`].
//!
//! # Turn flow
//!
//! ```text
//! SquareClicked / TakePiece ──► AwaitingRelease ──► ReleasePiece
//!                                      │
//!                       ┌──────────────┴───────────────┐
//!                one legal move                several (promotion)
//!                       │                              │
//!                after-move hook ◄── PromotionSelected ┘
//!                       │
//!          Local: mate check · Quiz: compare to best move · Stock: engine reply
//! ```
//!
//! # Failure Handling
//!
//! Service errors are logged and otherwise ignored: whatever the reply would
//! have changed stays as it was, and a board waiting on that reply is
//! unlocked again.

use engine_service::{EngineReply, MatchId, Mate, Reply, Request, ServiceError};
use shakmaty::{Color, Move, Piece, Square};
use tracing::{debug, info, warn};

use crate::game::board::ChessBoard;
use crate::game::events::{Input, UiEvent};
use crate::game::history::{format_history, MoveRecord};
use crate::game::mode::{
    Difficulty, GameMode, Phase, QuizProgress, QuizRound, DEFAULT_QUIZ_HINTS, DEFAULT_QUIZ_ROUNDS,
};
use crate::game::reconcile::reconcile;
use crate::game::snapshot::{QuizStatus, UiSnapshot};
use crate::game::types::{PieceIdAllocator, PieceOnSquare, PieceType};

/// The human always plays white against the engine
const HUMAN_COLOR: Color = Color::White;

pub struct GameController {
    board: ChessBoard,
    mode: GameMode,
    phase: Phase,
    selected: Option<Square>,
    records: Vec<MoveRecord>,
    pieces: Vec<PieceOnSquare>,
    ids: PieceIdAllocator,
    quiz: QuizProgress,
    quiz_rounds: u32,
    quiz_hints: u32,
    /// Quiz move waiting for the best move to be judged
    unverified: Option<MoveRecord>,
    hint_requested: bool,
    last_hint: Option<String>,
    events: Vec<UiEvent>,
    snapshot: UiSnapshot,
}

impl Default for GameController {
    fn default() -> Self {
        Self::new()
    }
}

impl GameController {
    pub fn new() -> Self {
        Self::with_quiz_budget(DEFAULT_QUIZ_ROUNDS, DEFAULT_QUIZ_HINTS)
    }

    /// Controller whose quiz series has `rounds` puzzles and `hints` hints
    pub fn with_quiz_budget(rounds: u32, hints: u32) -> Self {
        let board = ChessBoard::new();
        let mut ids = PieceIdAllocator::new();
        let pieces = reconcile(&[], board.layout(), &[], &mut ids);
        let quiz = QuizProgress::new(rounds, hints);
        let snapshot = UiSnapshot {
            pieces: pieces.clone(),
            selected_square: None,
            reachable_squares: Default::default(),
            pending_promotions: Vec::new(),
            history: Vec::new(),
            mode: GameMode::Idle.kind(),
            side_to_move: board.turn(),
            input_locked: false,
            checkmate: None,
            quiz: QuizStatus {
                progress: quiz.clone(),
                attempts: None,
            },
            best_move: None,
        };
        Self {
            board,
            mode: GameMode::Idle,
            phase: Phase::AwaitingSelection,
            selected: None,
            records: Vec::new(),
            pieces,
            ids,
            quiz,
            quiz_rounds: rounds,
            quiz_hints: hints,
            unverified: None,
            hint_requested: false,
            last_hint: None,
            events: Vec::new(),
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &UiSnapshot {
        &self.snapshot
    }

    /// Drain the events raised since the last call
    pub fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn board(&self) -> &ChessBoard {
        &self.board
    }

    pub fn quiz_progress(&self) -> &QuizProgress {
        &self.quiz
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Apply one input; returns the requests to run, in order
    pub fn handle(&mut self, input: Input) -> Vec<Request> {
        debug!("[CONTROLLER] Input {:?} in {:?}", input, self.phase);
        let requests = match input {
            Input::StartLocal => self.start_local(),
            Input::StartQuiz => self.start_quiz(),
            Input::StartStock => self.start_stock(),
            Input::SetDifficulty(difficulty) => self.set_difficulty(difficulty),
            Input::Reset => {
                info!("[CONTROLLER] Reset");
                self.clear_game()
            }
            Input::SquareClicked(square) => self.square_clicked(square),
            Input::TakePiece(square) => self.take_piece(square),
            Input::ReleasePiece(square) => self.release_piece(square),
            Input::PromotionSelected(piece_type) => self.promotion_selected(piece_type),
            Input::Shake => self.shake(),
        };
        self.refresh();
        requests
    }

    fn start_local(&mut self) -> Vec<Request> {
        let mut requests = self.clear_game();
        info!("[CONTROLLER] Starting local game");
        self.mode = GameMode::Local { match_id: None };
        self.phase = Phase::AwaitingServer;
        requests.push(Request::StartMatch);
        requests
    }

    fn start_quiz(&mut self) -> Vec<Request> {
        let mut requests = self.clear_game();
        if self.quiz.remaining == 0 {
            info!(
                "[CONTROLLER] Quiz series finished with {}, starting a new one",
                self.quiz.score
            );
            self.quiz = QuizProgress::new(self.quiz_rounds, self.quiz_hints);
        }
        info!(
            "[CONTROLLER] Loading puzzle ({} left)",
            self.quiz.remaining
        );
        self.phase = Phase::AwaitingServer;
        requests.push(Request::StartQuiz);
        requests
    }

    fn start_stock(&mut self) -> Vec<Request> {
        let mut requests = self.clear_game();
        info!("[CONTROLLER] Starting engine game");
        self.mode = GameMode::Stock {
            match_id: None,
            difficulty: None,
        };
        self.phase = Phase::AwaitingServer;
        self.events.push(UiEvent::DifficultyPrompt);
        requests.push(Request::StartMatch);
        requests
    }

    fn set_difficulty(&mut self, chosen: Difficulty) -> Vec<Request> {
        let GameMode::Stock {
            match_id,
            difficulty,
        } = &mut self.mode
        else {
            warn!("[CONTROLLER] Difficulty {} ignored outside an engine game", chosen);
            return Vec::new();
        };
        *difficulty = Some(chosen);
        // without a match id yet, sent once the match starts
        match match_id {
            Some(id) => vec![Request::SetDifficulty {
                match_id: *id,
                elo: chosen.elo().to_string(),
            }],
            None => Vec::new(),
        }
    }

    /// Back to a fresh board in idle mode; asks the server to drop the match
    fn clear_game(&mut self) -> Vec<Request> {
        let requests = self
            .mode
            .match_id()
            .map(|match_id| Request::ResetMatch { match_id })
            .into_iter()
            .collect();
        self.board = ChessBoard::new();
        self.mode = GameMode::Idle;
        self.phase = Phase::AwaitingSelection;
        self.selected = None;
        self.records.clear();
        self.pieces.clear();
        self.ids.reset();
        self.unverified = None;
        self.hint_requested = false;
        self.last_hint = None;
        requests
    }

    fn input_locked(&self) -> bool {
        match self.phase {
            Phase::AwaitingServer | Phase::RoundOver | Phase::Checkmate { .. } => return true,
            _ => {}
        }
        match &self.mode {
            GameMode::Stock {
                match_id: Some(_),
                difficulty: Some(_),
            } => self.board.turn() != HUMAN_COLOR,
            GameMode::Stock { .. } => true,
            _ => false,
        }
    }

    fn accepts_board_input(&self) -> bool {
        !self.input_locked() && !matches!(self.phase, Phase::PromotionPending { .. })
    }

    fn square_clicked(&mut self, square: Square) -> Vec<Request> {
        if !self.accepts_board_input() {
            return Vec::new();
        }
        if self.board.is_own_piece(square) {
            return self.select(square, false);
        }
        match self.selected {
            Some(from) => self.try_move(from, square),
            None => Vec::new(),
        }
    }

    fn take_piece(&mut self, square: Square) -> Vec<Request> {
        if !self.accepts_board_input() || !self.board.is_own_piece(square) {
            return Vec::new();
        }
        self.select(square, true)
    }

    fn release_piece(&mut self, square: Square) -> Vec<Request> {
        if self.input_locked() {
            return Vec::new();
        }
        let Phase::AwaitingRelease { from } = self.phase else {
            return Vec::new();
        };
        if square == from {
            // put back where it was picked up
            self.selected = None;
            self.phase = Phase::AwaitingSelection;
            return Vec::new();
        }
        self.try_move(from, square)
    }

    fn select(&mut self, square: Square, dragging: bool) -> Vec<Request> {
        self.selected = Some(square);
        self.phase = if dragging {
            Phase::AwaitingRelease { from: square }
        } else {
            Phase::AwaitingSelection
        };
        self.prefetch_best_move()
    }

    /// Quiz moves are judged against the best move; fetch it while the
    /// player is still choosing
    fn prefetch_best_move(&mut self) -> Vec<Request> {
        match &mut self.mode {
            GameMode::Quiz { round } if round.best_move.is_none() && !round.best_move_requested => {
                round.best_move_requested = true;
                vec![Request::BestMove {
                    match_id: round.match_id,
                }]
            }
            _ => Vec::new(),
        }
    }

    fn try_move(&mut self, from: Square, to: Square) -> Vec<Request> {
        self.selected = None;
        self.phase = Phase::AwaitingSelection;
        let mut moves = self.board.moves_between(from, to);
        match moves.len() {
            0 => {
                debug!("[CONTROLLER] No legal move {}-{}", from, to);
                Vec::new()
            }
            1 => {
                let mv = moves.remove(0);
                self.play_human_move(&mv)
            }
            _ => {
                self.phase = Phase::PromotionPending { moves };
                Vec::new()
            }
        }
    }

    /// # Panics
    ///
    /// Panics when `piece_type` is not one of the offered promotions.
    fn promotion_selected(&mut self, piece_type: PieceType) -> Vec<Request> {
        let Phase::PromotionPending { moves } = &self.phase else {
            warn!("[CONTROLLER] Promotion {:?} without a pending promotion", piece_type);
            return Vec::new();
        };
        let turn = self.board.turn();
        let chosen = moves
            .iter()
            .find(|mv| piece_type.color() == turn && mv.promotion() == Some(piece_type.role()))
            .cloned();
        let Some(mv) = chosen else {
            panic!("promotion to {:?} was not offered", piece_type);
        };
        self.phase = Phase::AwaitingSelection;
        self.play_human_move(&mv)
    }

    fn play_human_move(&mut self, mv: &Move) -> Vec<Request> {
        match self.board.play(mv) {
            Ok(record) => {
                self.records.push(record);
                // a hint still in flight was for the previous position
                self.hint_requested = false;
                self.after_human_move(record)
            }
            Err(e) => {
                warn!("[CONTROLLER] Move rejected: {}", e);
                Vec::new()
            }
        }
    }

    fn after_human_move(&mut self, record: MoveRecord) -> Vec<Request> {
        let notation = record.wire_notation();
        match &mut self.mode {
            GameMode::Idle => Vec::new(),
            GameMode::Local { match_id } => match *match_id {
                Some(match_id) => {
                    self.phase = Phase::AwaitingServer;
                    vec![Request::CheckMate {
                        match_id,
                        mv: notation,
                    }]
                }
                None => {
                    warn!("[CONTROLLER] No match id, skipping mate check for {}", notation);
                    Vec::new()
                }
            },
            GameMode::Quiz { round } => {
                if let Some(best) = round.best_move.clone() {
                    return self.judge_quiz_move(record, &best);
                }
                let fetch = !round.best_move_requested;
                round.best_move_requested = true;
                let match_id = round.match_id;
                self.unverified = Some(record);
                self.phase = Phase::AwaitingServer;
                if fetch {
                    vec![Request::BestMove { match_id }]
                } else {
                    Vec::new()
                }
            }
            GameMode::Stock { match_id, .. } => match *match_id {
                Some(match_id) => {
                    self.phase = Phase::AwaitingServer;
                    self.events.push(UiEvent::EngineThinking(true));
                    vec![Request::EngineMove {
                        match_id,
                        mv: notation,
                    }]
                }
                None => {
                    warn!("[CONTROLLER] No match id, engine cannot answer {}", notation);
                    Vec::new()
                }
            },
        }
    }

    fn judge_quiz_move(&mut self, record: MoveRecord, best: &str) -> Vec<Request> {
        let GameMode::Quiz { round } = &mut self.mode else {
            return Vec::new();
        };

        if record.matches_engine_move(best) {
            debug!("[CONTROLLER] Puzzle move {} is correct", record.wire_notation());
            round.position_changed();
            self.phase = Phase::AwaitingServer;
            return vec![Request::EngineMove {
                match_id: round.match_id,
                mv: record.wire_notation(),
            }];
        }

        info!(
            "[CONTROLLER] Puzzle mistake: {} instead of {}",
            record.wire_notation(),
            best
        );
        round.attempts = round.attempts.saturating_sub(1);
        round.position_changed();
        let exhausted = round.attempts == 0;
        let match_id = round.match_id;
        let fen = round.fen.clone();

        self.events.push(UiEvent::QuizMistake);
        match ChessBoard::from_fen(&fen) {
            Ok(board) => self.board = board,
            Err(e) => warn!("[CONTROLLER] Cannot reload puzzle: {}", e),
        }
        self.records.clear();
        self.selected = None;

        let mut requests = vec![Request::Undo { match_id, fen }];
        if exhausted {
            self.phase = Phase::RoundOver;
            requests.extend(self.finish_round());
        } else {
            self.phase = Phase::AwaitingSelection;
        }
        requests
    }

    /// Raise round-over events; stores the score after the last puzzle
    fn finish_round(&mut self) -> Vec<Request> {
        self.events.push(UiEvent::QuizRoundOver);
        if self.quiz.remaining > 0 {
            return Vec::new();
        }
        let score = self.quiz.score;
        info!("[CONTROLLER] Quiz series over, score {}", score);
        self.events.push(UiEvent::QuizFinished { score });
        vec![Request::StoreQuizScore {
            score,
            date: today(),
        }]
    }

    fn shake(&mut self) -> Vec<Request> {
        // the position is about to change; a hint now would be stale
        if matches!(
            self.phase,
            Phase::AwaitingServer | Phase::Checkmate { .. } | Phase::RoundOver
        ) {
            debug!("[CONTROLLER] Hint ignored in {:?}", self.phase);
            return Vec::new();
        }
        match &mut self.mode {
            GameMode::Quiz { round } => {
                if round.hint_shown || self.quiz.hints_left == 0 {
                    debug!("[CONTROLLER] No hint available");
                    return Vec::new();
                }
                if let Some(best) = round.best_move.clone() {
                    self.show_hint(best);
                    return Vec::new();
                }
                self.hint_requested = true;
                if round.best_move_requested {
                    return Vec::new();
                }
                round.best_move_requested = true;
                vec![Request::BestMove {
                    match_id: round.match_id,
                }]
            }
            GameMode::Stock {
                match_id: Some(match_id),
                ..
            } => {
                self.hint_requested = true;
                vec![Request::BestMove {
                    match_id: *match_id,
                }]
            }
            _ => Vec::new(),
        }
    }

    fn show_hint(&mut self, best: String) {
        if let GameMode::Quiz { round } = &mut self.mode {
            if round.hint_shown || self.quiz.hints_left == 0 {
                return;
            }
            round.hint_shown = true;
            self.quiz.hints_left -= 1;
        }
        self.last_hint = Some(best.clone());
        self.events.push(UiEvent::Hint { best });
    }

    // ========================================================================
    // Replies
    // ========================================================================

    /// Feed back the outcome of a request returned earlier
    pub fn on_reply(
        &mut self,
        request: Request,
        result: Result<Reply, ServiceError>,
    ) -> Vec<Request> {
        let requests = match result {
            Ok(reply) => self.apply_reply(request, reply),
            Err(e) => {
                warn!("[CONTROLLER] {} failed: {}", request.name(), e);
                self.request_failed(&request);
                Vec::new()
            }
        };
        self.refresh();
        requests
    }

    fn apply_reply(&mut self, request: Request, reply: Reply) -> Vec<Request> {
        match (request, reply) {
            (Request::StartMatch, Reply::MatchStarted(id)) => self.match_started(id),
            (Request::StartQuiz, Reply::QuizLoaded { match_id, fen }) => {
                self.quiz_loaded(match_id, fen);
                Vec::new()
            }
            (Request::SetDifficulty { .. }, Reply::DifficultySet { elo }) => {
                info!("[CONTROLLER] Engine strength {} ({})", Difficulty::from_elo(&elo), elo);
                Vec::new()
            }
            (Request::CheckMate { .. }, Reply::MateChecked { mate }) => {
                self.mate_checked(mate);
                Vec::new()
            }
            (Request::EngineMove { .. }, Reply::EngineReplied(reply)) => self.engine_replied(reply),
            (Request::BestMove { .. }, Reply::BestMove(best)) => self.best_move_received(best),
            (Request::Undo { .. }, Reply::Undone { result }) => {
                debug!("[CONTROLLER] Server rewound to {}", result);
                Vec::new()
            }
            (_, Reply::Ack) => Vec::new(),
            (request, reply) => {
                warn!(
                    "[CONTROLLER] Unexpected reply {:?} to {}",
                    reply,
                    request.name()
                );
                Vec::new()
            }
        }
    }

    fn request_failed(&mut self, request: &Request) {
        match request {
            Request::StartMatch | Request::StartQuiz | Request::CheckMate { .. } => {
                self.end_server_wait();
            }
            Request::EngineMove { .. } => {
                if matches!(self.mode, GameMode::Stock { .. }) {
                    self.events.push(UiEvent::EngineThinking(false));
                }
                self.end_server_wait();
            }
            Request::BestMove { .. } => {
                if let GameMode::Quiz { round } = &mut self.mode {
                    round.best_move_requested = false;
                }
                self.hint_requested = false;
                if self.unverified.take().is_some() {
                    self.end_server_wait();
                }
            }
            _ => {}
        }
    }

    fn end_server_wait(&mut self) {
        if self.phase == Phase::AwaitingServer {
            self.phase = Phase::AwaitingSelection;
        }
    }

    fn match_started(&mut self, id: MatchId) -> Vec<Request> {
        let requests = match &mut self.mode {
            GameMode::Local { match_id } => {
                *match_id = Some(id);
                Vec::new()
            }
            GameMode::Stock {
                match_id,
                difficulty,
            } => {
                *match_id = Some(id);
                difficulty
                    .map(|difficulty| Request::SetDifficulty {
                        match_id: id,
                        elo: difficulty.elo().to_string(),
                    })
                    .into_iter()
                    .collect()
            }
            _ => {
                debug!("[CONTROLLER] Match {} started after leaving the mode", id);
                return Vec::new();
            }
        };
        info!("[CONTROLLER] Match {} started", id);
        self.end_server_wait();
        requests
    }

    fn quiz_loaded(&mut self, match_id: MatchId, fen: String) {
        if !matches!(self.mode, GameMode::Idle) {
            debug!("[CONTROLLER] Puzzle {} arrived after leaving the quiz", match_id);
            return;
        }
        self.end_server_wait();
        match ChessBoard::from_fen(&fen) {
            Ok(board) => {
                info!("[CONTROLLER] Puzzle {} loaded: {}", match_id, fen);
                self.board = board;
                self.records.clear();
                self.selected = None;
                self.quiz.remaining = self.quiz.remaining.saturating_sub(1);
                self.mode = GameMode::Quiz {
                    round: QuizRound::new(match_id, fen),
                };
            }
            Err(e) => warn!("[CONTROLLER] Puzzle {} unusable: {}", match_id, e),
        }
    }

    fn mate_checked(&mut self, mate: bool) {
        if !matches!(self.mode, GameMode::Local { .. }) {
            return;
        }
        self.end_server_wait();
        if mate {
            self.declare_checkmate(self.board.turn().other());
        }
    }

    fn declare_checkmate(&mut self, winner: Color) {
        info!("[CONTROLLER] Checkmate, {:?} wins", winner);
        self.phase = Phase::Checkmate { winner };
        self.events.push(UiEvent::Checkmate { winner });
    }

    fn engine_replied(&mut self, reply: EngineReply) -> Vec<Request> {
        match &mut self.mode {
            GameMode::Quiz { round } => match reply {
                EngineReply::Mate(_) => {
                    let earned = round.points();
                    self.quiz.earned = earned;
                    self.quiz.score += earned;
                    info!("[CONTROLLER] Puzzle solved for {}", earned);
                    self.declare_checkmate(self.board.turn().other());
                    self.finish_round()
                }
                EngineReply::Move(notation) => {
                    round.hint_shown = false;
                    round.position_changed();
                    self.play_engine_move(&notation);
                    self.end_server_wait();
                    Vec::new()
                }
            },
            GameMode::Stock { difficulty, .. } => {
                let difficulty = difficulty.unwrap_or(Difficulty::Hard);
                self.events.push(UiEvent::EngineThinking(false));
                match reply {
                    EngineReply::Mate(mate) => {
                        let (winner, outcome) = match mate {
                            Mate::Player => (HUMAN_COLOR, "W"),
                            Mate::Engine => (HUMAN_COLOR.other(), "L"),
                        };
                        self.declare_checkmate(winner);
                        vec![Request::StoreGameHistory {
                            entry: format!("{}/{}/{}", outcome, difficulty.label(), today()),
                        }]
                    }
                    EngineReply::Move(notation) => {
                        self.play_engine_move(&notation);
                        self.end_server_wait();
                        Vec::new()
                    }
                }
            }
            _ => {
                debug!("[CONTROLLER] Engine reply after leaving the mode");
                Vec::new()
            }
        }
    }

    fn play_engine_move(&mut self, notation: &str) {
        match self.board.play_uci(notation) {
            Ok(record) => {
                debug!("[CONTROLLER] Engine played {}", notation);
                self.records.push(record);
            }
            Err(e) => warn!("[CONTROLLER] Engine move not applied: {}", e),
        }
    }

    fn best_move_received(&mut self, best: String) -> Vec<Request> {
        if let GameMode::Quiz { round } = &mut self.mode {
            round.best_move = Some(best.clone());
            round.best_move_requested = false;
        }
        if std::mem::take(&mut self.hint_requested) {
            self.show_hint(best.clone());
        }
        match self.unverified.take() {
            Some(record) => {
                self.end_server_wait();
                self.judge_quiz_move(record, &best)
            }
            None => Vec::new(),
        }
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    fn refresh(&mut self) {
        let pending: &[Move] = match &self.phase {
            Phase::PromotionPending { moves } => moves,
            _ => &[],
        };
        self.pieces = reconcile(&self.pieces, self.board.layout(), pending, &mut self.ids);

        let turn = self.board.turn();
        let pending_promotions = pending
            .iter()
            .filter_map(Move::promotion)
            .map(|role| PieceType::from_piece(Piece { color: turn, role }))
            .collect();

        self.snapshot = UiSnapshot {
            pieces: self.pieces.clone(),
            selected_square: self.selected,
            reachable_squares: self
                .selected
                .map(|square| self.board.targets_from(square))
                .unwrap_or_default(),
            pending_promotions,
            history: format_history(&self.records),
            mode: self.mode.kind(),
            side_to_move: turn,
            input_locked: self.input_locked(),
            checkmate: match self.phase {
                Phase::Checkmate { winner } => Some(winner),
                _ => None,
            },
            quiz: QuizStatus {
                progress: self.quiz.clone(),
                attempts: match &self.mode {
                    GameMode::Quiz { round } => Some(round.attempts),
                    _ => None,
                },
            },
            best_move: self.last_hint.clone(),
        };
    }
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
