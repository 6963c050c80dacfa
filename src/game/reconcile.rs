//! Minimal-diff reconciliation of the displayed piece list
//!
//! Recomputes the displayed pieces from the authoritative board while keeping
//! each piece's id stable across moves, so a renderer can animate a move
//! instead of redrawing the board.
//!
//! # Algorithm
//!
//! 1. No previous pieces: enumerate squares a1, b1, ... h8 and give each
//!    occupied square a fresh id.
//! 2. Otherwise, walk the squares in the same order:
//!    - the source square of a pending promotion is skipped,
//!    - its destination carries the piece previously on the source, same id,
//!    - any other occupied square keeps an identical previous piece (same
//!      square, same type) or is queued.
//! 3. Queued squares take the id of a leftover previous piece of the same
//!    type, else of a same-color leftover on the same square (a pawn that was
//!    just promoted there), else a fresh id. A leftover is consumed when its
//!    id is reused.
//! 4. The result is ordered by square, so an unchanged board reconciles to
//!    an equal list.
//!
//! Matching is best-effort: with two knights moving in one step their ids may
//! swap, which only affects animation.

use shakmaty::{Board, Move, Square};
use std::collections::HashMap;
use tracing::trace;

use crate::game::types::{PieceIdAllocator, PieceOnSquare, PieceType};

/// Rebuild the displayed piece list for `board`
///
/// Without a pending promotion the result has exactly one entry per occupied
/// square. While a promotion is pending the promoting pawn is shown on its
/// destination and any piece it captures there is hidden.
///
/// # Panics
///
/// Panics if a promotion is pending but `previous` shows the promoting pawn
/// on neither its source nor its destination square; callers must reconcile
/// once before offering a promotion.
pub fn reconcile(
    previous: &[PieceOnSquare],
    board: &Board,
    pending_promotion: &[Move],
    ids: &mut PieceIdAllocator,
) -> Vec<PieceOnSquare> {
    if previous.is_empty() {
        return Square::ALL
            .into_iter()
            .filter_map(|square| {
                board.piece_at(square).map(|piece| PieceOnSquare {
                    id: ids.allocate(),
                    piece_type: PieceType::from_piece(piece),
                    square,
                })
            })
            .collect();
    }

    let mut by_square: HashMap<Square, PieceOnSquare> =
        previous.iter().map(|piece| (piece.square, *piece)).collect();

    let promotion = pending_promotion.first().map(|mv| match mv.from() {
        Some(from) => (from, mv.to()),
        None => panic!("pending promotion move without a source square: {:?}", mv),
    });

    let mut pieces = Vec::with_capacity(previous.len());
    let mut queued = Vec::new();

    for square in Square::ALL {
        if let Some((from, to)) = promotion {
            if square == from {
                continue;
            }
            if square == to {
                let pawn = match by_square.remove(&from) {
                    Some(pawn) => {
                        by_square.remove(&to);
                        pawn
                    }
                    // already carried by an earlier pass
                    None => {
                        let mover = PieceType::from_engine(board.piece_at(from));
                        by_square
                            .remove(&to)
                            .filter(|shown| Some(shown.piece_type) == mover)
                            .unwrap_or_else(|| {
                                panic!("promotion pending from {} but the pawn is not displayed", from)
                            })
                    }
                };
                pieces.push(PieceOnSquare { square: to, ..pawn });
                continue;
            }
        }

        let Some(piece_type) = PieceType::from_engine(board.piece_at(square)) else {
            continue;
        };
        match by_square.get(&square) {
            Some(kept) if kept.piece_type == piece_type => {
                pieces.push(*kept);
                by_square.remove(&square);
            }
            _ => queued.push((square, piece_type)),
        }
    }

    let mut leftovers: Vec<PieceOnSquare> = Square::ALL
        .into_iter()
        .filter_map(|square| by_square.remove(&square))
        .collect();

    for (square, piece_type) in queued {
        let reused = leftovers
            .iter()
            .position(|old| old.piece_type == piece_type)
            .or_else(|| {
                leftovers.iter().position(|old| {
                    old.square == square && old.piece_type.color() == piece_type.color()
                })
            })
            .map(|index| leftovers.remove(index).id);

        let id = match reused {
            Some(id) => id,
            None => {
                let id = ids.allocate();
                trace!("[RECONCILE] New id {} for {:?} on {}", id, piece_type, square);
                id
            }
        };
        pieces.push(PieceOnSquare {
            id,
            piece_type,
            square,
        });
    }

    pieces.sort_by_key(|piece| piece.square);
    pieces
}
