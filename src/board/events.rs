/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::mpsc::Sender;

use super::{MoveOutcome, Piece, Ply, Side, Square};

/// Everything a rendering collaborator needs to know about a move that was just applied.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveEvent {
    /// The move that was played.
    pub ply: Ply,

    /// What the move did, including the check/mate/stalemate bits for the side now to move.
    pub outcome: MoveOutcome,

    /// The side that moves next.
    pub next_side: Side,

    /// Where a piece was removed from the board, if anything was captured.
    ///
    /// For en passant this is *not* the destination of the ply.
    pub capture_square: Option<Square>,

    /// The Rook's relocation, if the ply was a castle.
    pub castling_rook_move: Option<Ply>,

    /// The piece that replaced the Pawn, if the ply was a promotion.
    pub promoted_piece: Option<Piece>,
}

impl MoveEvent {
    /// Creates an event for `ply` with no effects recorded yet.
    #[inline(always)]
    pub const fn new(ply: Ply, next_side: Side) -> Self {
        Self {
            ply,
            outcome: MoveOutcome::LEGAL,
            next_side,
            capture_square: None,
            castling_rook_move: None,
            promoted_piece: None,
        }
    }
}

/// Receives one [`MoveEvent`] for every move successfully applied to a [`Game`](super::Game).
///
/// Observers are called synchronously, in subscription order, after the new position has been evaluated.
pub trait MoveObserver {
    fn move_applied(&mut self, event: &MoveEvent);
}

impl<F: FnMut(&MoveEvent)> MoveObserver for F {
    #[inline(always)]
    fn move_applied(&mut self, event: &MoveEvent) {
        self(event)
    }
}

/// A [`MoveObserver`] that forwards every event over an [`mpsc`](std::sync::mpsc) channel,
/// to be drained by the caller between commands.
#[derive(Clone, Debug)]
pub struct ChannelObserver(pub Sender<MoveEvent>);

impl MoveObserver for ChannelObserver {
    /// Forwards the event over the channel. A dropped receiver is logged and otherwise ignored.
    fn move_applied(&mut self, event: &MoveEvent) {
        if self.0.send(*event).is_err() {
            log::warn!("Move observer channel is closed; dropping event for {}", event.ply);
        }
    }
}
