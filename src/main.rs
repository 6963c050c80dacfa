//! Pocket Chess command line client
//!
//! `play` opens a line-based board against the remote engine service;
//! `history` prints the move list for a sequence of coordinate moves;
//! `config` shows or writes the configuration file.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use engine_service::HttpChessService;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pocket_chess::core::{credentials_from_env, ClientConfig};
use pocket_chess::game::board::parse_square;
use pocket_chess::game::history::format_history;
use pocket_chess::game::{
    ChessBoard, Difficulty, GameController, Input, PieceType, Session, UiEvent, UiSnapshot,
};

#[derive(Parser, Debug)]
#[command(name = "pocket-chess", version, about = "Chess against a friend, a quiz or an engine")]
struct Cli {
    /// Engine/quiz service base URL
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// Score datastore base URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive board (the default)
    Play,
    /// Print the numbered move list for coordinate moves, e.g. `e2e4 e7e5`
    History { moves: Vec<String> },
    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::load();
    if let Some(url) = cli.server_url {
        config.server_url = url;
    }
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout_secs = secs;
    }

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => play(&config),
        Command::History { moves } => print_history(&moves),
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = config.save()?;
                println!("saved to {}", path.display());
            }
            Ok(())
        }
    }
}

fn print_history(moves: &[String]) -> Result<()> {
    let mut board = ChessBoard::new();
    let mut records = Vec::with_capacity(moves.len());
    for notation in moves {
        records.push(board.play_uci(notation)?);
    }
    for line in format_history(&records) {
        println!("{}", line);
    }
    Ok(())
}

// ============================================================================
// Interactive board
// ============================================================================

const HELP: &str = "\
commands:
  local | quiz | stock          start a game
  level easy|medium|hard        engine strength
  tap <sq>                      select a piece or move the selected one
  take <sq> / release <sq>      drag a piece
  move <from> <to>              take + release
  promote q|r|b|n               finish a promotion
  hint                          ask for the best move
  reset | show | help | quit";

fn play(config: &ClientConfig) -> Result<()> {
    let credentials = credentials_from_env();
    if credentials.is_none() {
        warn!("[CLI] Not signed in, scores and game history will not be stored");
    }
    let service = HttpChessService::new(&config.service_settings(credentials))
        .context("cannot set up the engine service client")?;
    let controller = GameController::with_quiz_budget(config.quiz_rounds, config.quiz_hints);
    let mut session = Session::new(controller, service);
    info!("[CLI] Using engine service at {}", config.server_url);

    println!("{}", HELP);
    print_snapshot(session.snapshot());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["quit" | "exit"] => return Ok(()),
            ["help"] => println!("{}", HELP),
            ["show"] => print_snapshot(session.snapshot()),
            words => match parse_inputs(words, session.snapshot()) {
                Ok(inputs) => {
                    for input in inputs {
                        session.dispatch(input);
                    }
                    print_events(&session.take_events());
                    print_snapshot(session.snapshot());
                }
                Err(e) => println!("{}", e),
            },
        }
    }
}

/// Turn one command line into controller inputs
fn parse_inputs(words: &[&str], snapshot: &UiSnapshot) -> Result<Vec<Input>> {
    let inputs = match words {
        ["local"] => vec![Input::StartLocal],
        ["quiz"] => vec![Input::StartQuiz],
        ["stock"] => vec![Input::StartStock],
        ["reset"] => vec![Input::Reset],
        ["hint" | "shake"] => vec![Input::Shake],
        ["level", name] => vec![Input::SetDifficulty(name.parse::<Difficulty>()?)],
        ["tap", square] => vec![Input::SquareClicked(parse_square(square)?)],
        ["take", square] => vec![Input::TakePiece(parse_square(square)?)],
        ["release", square] => vec![Input::ReleasePiece(parse_square(square)?)],
        ["move", from, to] => vec![
            Input::TakePiece(parse_square(from)?),
            Input::ReleasePiece(parse_square(to)?),
        ],
        ["promote", choice] => vec![Input::PromotionSelected(parse_promotion(choice, snapshot)?)],
        _ => bail!("unknown command, try `help`"),
    };
    Ok(inputs)
}

/// The controller only accepts promotions it offered
fn parse_promotion(choice: &str, snapshot: &UiSnapshot) -> Result<PieceType> {
    if snapshot.pending_promotions.is_empty() {
        bail!("no promotion pending");
    }
    let mut chars = choice.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        bail!("promote takes one letter: q, r, b or n");
    };
    let piece_type = PieceType::from_promotion_char(c, snapshot.side_to_move)?;
    if !snapshot.pending_promotions.contains(&piece_type) {
        bail!("{} is not an option here", piece_type);
    }
    Ok(piece_type)
}

fn print_snapshot(snapshot: &UiSnapshot) {
    print!("{}", snapshot.render_board());
    for line in &snapshot.history {
        println!("{}", line);
    }
    let mut status = format!("{:?}, {:?} to move", snapshot.mode, snapshot.side_to_move);
    if let Some(attempts) = snapshot.quiz.attempts {
        let progress = &snapshot.quiz.progress;
        status.push_str(&format!(
            ", attempts {}, score {}, puzzles left {}, hints left {}",
            attempts, progress.score, progress.remaining, progress.hints_left
        ));
    }
    if !snapshot.pending_promotions.is_empty() {
        status.push_str(", choose a promotion");
    }
    if snapshot.input_locked {
        status.push_str(" (waiting)");
    }
    println!("{}", status);
}

fn print_events(events: &[UiEvent]) {
    for event in events {
        match event {
            UiEvent::Checkmate { winner } => println!("Checkmate! {:?} wins", winner),
            UiEvent::QuizMistake => println!("Not the best move, try again"),
            UiEvent::QuizRoundOver => println!("Puzzle over, `quiz` for the next one"),
            UiEvent::QuizFinished { score } => println!("Quiz finished, score {}", score),
            UiEvent::DifficultyPrompt => println!("Choose a level: level easy|medium|hard"),
            UiEvent::Hint { best } => println!("Hint: {}", best),
            UiEvent::EngineThinking(true) => println!("Engine is thinking..."),
            UiEvent::EngineThinking(false) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Square;

    #[test]
    fn test_parse_move_command() {
        let snapshot = GameController::new().snapshot().clone();
        let inputs = parse_inputs(&["move", "e2", "e4"], &snapshot).unwrap();
        assert_eq!(
            inputs,
            vec![
                Input::TakePiece(Square::E2),
                Input::ReleasePiece(Square::E4)
            ]
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let snapshot = GameController::new().snapshot().clone();
        assert!(parse_inputs(&["tap", "z9"], &snapshot).is_err());
        assert!(parse_inputs(&["level", "impossible"], &snapshot).is_err());
        assert!(parse_inputs(&["dance"], &snapshot).is_err());
    }

    #[test]
    fn test_promotion_requires_pending_choice() {
        let snapshot = GameController::new().snapshot().clone();
        assert!(parse_promotion("q", &snapshot).is_err());

        let mut pending = snapshot.clone();
        pending.pending_promotions = vec![PieceType::WhiteQueen, PieceType::WhiteKnight];
        assert_eq!(
            parse_promotion("q", &pending).unwrap(),
            PieceType::WhiteQueen
        );
        assert!(parse_promotion("r", &pending).is_err());
        assert!(parse_promotion("k", &pending).is_err());
    }
}
