/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Deref, str::FromStr};

use anyhow::{bail, Result};
use log::debug;

use super::{MoveList, MoveObserver, MoveOutcome, PieceKind, Ply, Position, Square};

/// A game of chess.
///
/// This type encapsulates a [`Position`] and keeps the set of legal moves for the side to move
/// up to date after every move. It is the only way to apply a move with the rules enforced.
///
/// The basic methods you're probably looking for are [`Game::legal_moves`], [`Game::make_move`],
/// and [`Game::subscribe`].
pub struct Game {
    /// The current [`Position`] of the game: pieces, side to move, en passant and castling rights.
    position: Position,

    /// All legal moves for the side to move. Recomputed after every move.
    legal_moves: MoveList,

    /// Notified, in order, after every successfully applied move.
    observers: Vec<Box<dyn MoveObserver>>,
}

impl Game {
    /// Creates a new [`Game`] from the provided [`Position`].
    #[inline(always)]
    pub fn new(position: Position) -> Self {
        let legal_moves = position.legal_moves();
        Self {
            position,
            legal_moves,
            observers: Vec::new(),
        }
    }

    /// Creates a new [`Game`] from the provided FEN string.
    #[inline(always)]
    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::new(Position::from_fen(fen)?))
    }

    /// Fetches the current [`Position`] of this game.
    #[inline(always)]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// All legal moves for the side to move.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Game;
    /// let game = Game::default();
    /// assert_eq!(game.legal_moves().len(), 20);
    /// ```
    #[inline(always)]
    pub fn legal_moves(&self) -> &[Ply] {
        &self.legal_moves
    }

    /// All legal moves of the piece on `square`.
    #[inline(always)]
    pub fn legal_moves_from(&self, square: Square) -> impl Iterator<Item = Ply> + '_ {
        self.legal_moves
            .iter()
            .copied()
            .filter(move |ply| ply.from() == square)
    }

    /// Returns `true` if `ply` is a legal move for the side to move.
    #[inline(always)]
    pub fn is_legal(&self, ply: Ply) -> bool {
        self.legal_moves.contains(&ply)
    }

    /// Classifies the current position from the point of view of the side to move.
    ///
    /// The result contains at most [`MoveOutcome::CHECK`], [`MoveOutcome::CHECKMATE`] (always with `CHECK`)
    /// or [`MoveOutcome::STALEMATE`].
    pub fn status(&self) -> MoveOutcome {
        let in_check = self.position.in_check();
        let no_moves = self.legal_moves.is_empty();

        match (in_check, no_moves) {
            (true, true) => MoveOutcome::CHECK | MoveOutcome::CHECKMATE,
            (true, false) => MoveOutcome::CHECK,
            (false, true) => MoveOutcome::STALEMATE,
            (false, false) => MoveOutcome::empty(),
        }
    }

    /// Registers `observer` to be notified after every successfully applied move.
    pub fn subscribe(&mut self, observer: impl MoveObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Applies `ply` if it is legal, returning [`MoveOutcome::ILLEGAL`] (and changing nothing) otherwise.
    ///
    /// `promotion` is required when `ply` promotes a Pawn and ignored otherwise.
    /// See [`Game::make_move_checked`] for the reason a move was refused.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::{Game, MoveOutcome, Ply, Square};
    /// let mut game = Game::default();
    /// let outcome = game.make_move(Ply::new(Square::E2, Square::E4), None);
    /// assert_eq!(outcome, MoveOutcome::LEGAL);
    ///
    /// // It's Black's turn now
    /// let outcome = game.make_move(Ply::new(Square::D2, Square::D4), None);
    /// assert_eq!(outcome, MoveOutcome::ILLEGAL);
    /// ```
    pub fn make_move(&mut self, ply: Ply, promotion: Option<PieceKind>) -> MoveOutcome {
        self.make_move_checked(ply, promotion)
            .unwrap_or(MoveOutcome::ILLEGAL)
    }

    /// Applies `ply` if it is legal, or returns an error explaining why it was refused.
    ///
    /// On success, the returned outcome includes the status of the side now to move, the legal
    /// moves have been recomputed, and every observer has been notified exactly once.
    pub fn make_move_checked(&mut self, ply: Ply, promotion: Option<PieceKind>) -> Result<MoveOutcome> {
        if let Err(err) = self.validate(ply, promotion) {
            debug!("Refused {ply}: {err}");
            return Err(err);
        }

        let mut event = self.position.make_move(ply, promotion);
        self.legal_moves = self.position.legal_moves();
        event.outcome |= self.status();

        debug!("Applied {ply:?}: {}", event.outcome);

        for observer in self.observers.iter_mut() {
            observer.move_applied(&event);
        }

        Ok(event.outcome)
    }

    /// Parses coordinate move text such as `e2e4` or `e7e8q` and applies it.
    ///
    /// Parse failures and illegal moves are both reported as errors.
    pub fn make_move_uci(&mut self, uci: &str) -> Result<MoveOutcome> {
        let (ply, promotion) = Ply::from_uci(uci)?;
        self.make_move_checked(ply, promotion)
    }

    fn validate(&self, ply: Ply, promotion: Option<PieceKind>) -> Result<()> {
        if !self.is_legal(ply) {
            bail!(
                "{ply} is not a legal move for {} in {}",
                self.side_to_move(),
                self.position
            );
        }

        if self.is_promotion(ply) {
            match promotion {
                None => bail!("{ply} promotes a Pawn, but no promotion choice was given"),
                Some(kind) if !kind.is_promotion_choice() => {
                    bail!("A Pawn cannot promote to a {kind}")
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

impl Deref for Game {
    type Target = Position;
    /// A [`Game`] immutably dereferences to a [`Position`], for simplicity.
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.position
    }
}

impl FromStr for Game {
    type Err = anyhow::Error;
    /// Wrapper for [`Game::from_fen`]
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Default for Game {
    /// Standard starting position for Chess.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Position::default())
    }
}

impl Clone for Game {
    /// Clones the position and legal moves. Observers are not carried over.
    fn clone(&self) -> Self {
        Self {
            position: self.position,
            legal_moves: self.legal_moves.clone(),
            observers: Vec::new(),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let squares_to_string = |squares: &[Square]| {
            squares
                .iter()
                .map(|sq| sq.to_uci())
                .collect::<Vec<_>>()
                .join(", ")
        };

        for rank in (0..Square::RANK_COUNT).rev() {
            write!(f, "{}|", rank + 1)?;
            for file in 0..Square::FILE_COUNT {
                let piece = self.piece_at(Square::new_unchecked(file, rank));
                let piece_char = piece.map(|p| p.char()).unwrap_or('.');
                write!(f, " {piece_char}")?;
            }

            if rank == 6 {
                write!(f, "        FEN: {}", self.position)?;
            } else if rank == 5 {
                write!(f, "   Checkers: {}", squares_to_string(self.checkers().as_slice()))?;
            } else if rank == 4 {
                write!(f, "     Status: {}", self.status())?;
            }
            writeln!(f)?;
        }

        writeln!(f, " +----------------")?;
        write!(f, "   a b c d e f g h")
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("position", &self.position.to_fen())
            .field("legal_moves", &self.legal_moves)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{MoveEvent, Side};

    #[test]
    fn test_status() {
        assert_eq!(Game::default().status(), MoveOutcome::empty());

        let check = Game::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").unwrap();
        assert_eq!(check.status(), MoveOutcome::CHECK);

        let mate = Game::from_fen("R3k3/8/4K3/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(mate.status(), MoveOutcome::CHECK | MoveOutcome::CHECKMATE);

        let stalemate = Game::from_fen("k7/2Q5/8/8/8/8/8/7K b - - 0 1").unwrap();
        assert_eq!(stalemate.status(), MoveOutcome::STALEMATE);
    }

    #[test]
    fn test_illegal_move_changes_nothing() {
        let mut game = Game::default();
        let before = *game.position();

        // A Rook cannot jump its own Pawn
        let outcome = game.make_move(Ply::new(Square::A1, Square::A3), None);
        assert_eq!(outcome, MoveOutcome::ILLEGAL);
        assert_eq!(*game.position(), before);
        assert_eq!(game.legal_moves().len(), 20);

        assert!(game.make_move_uci("e2e5").is_err());
        assert!(game.make_move_uci("nonsense").is_err());
        assert_eq!(game.side_to_move(), Side::White);
    }

    #[test]
    fn test_legal_moves_from() {
        let game = Game::default();
        assert_eq!(game.legal_moves_from(Square::G1).count(), 2);
        assert_eq!(game.legal_moves_from(Square::D1).count(), 0);
        assert_eq!(game.legal_moves_from(Square::E4).count(), 0);
    }

    #[test]
    fn test_promotion_requires_a_choice() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let ply = Ply::new(Square::A7, Square::A8);
        assert!(game.is_promotion(ply));

        assert_eq!(game.make_move(ply, None), MoveOutcome::ILLEGAL);
        assert_eq!(game.make_move(ply, Some(PieceKind::King)), MoveOutcome::ILLEGAL);
        assert_eq!(game.make_move(ply, Some(PieceKind::Pawn)), MoveOutcome::ILLEGAL);

        let outcome = game.make_move(ply, Some(PieceKind::Rook));
        assert!(outcome.contains(MoveOutcome::LEGAL | MoveOutcome::PROMOTION | MoveOutcome::CHECK));
        assert_eq!(game.piece_at(Square::A8), Some(crate::Piece::WHITE_ROOK));
    }

    #[test]
    fn test_observers_receive_one_event_per_move() {
        let events = Rc::new(RefCell::new(Vec::<MoveEvent>::new()));
        let sink = Rc::clone(&events);

        let mut game = Game::default();
        game.subscribe(move |event: &MoveEvent| sink.borrow_mut().push(*event));

        game.make_move(Ply::new(Square::E2, Square::E4), None);
        game.make_move(Ply::new(Square::E2, Square::E4), None);
        game.make_move(Ply::new(Square::E7, Square::E5), None);

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].ply, Ply::new(Square::E2, Square::E4));
        assert_eq!(events[0].next_side, Side::Black);
        assert_eq!(events[1].next_side, Side::White);
        assert_eq!(events[1].capture_square, None);
    }
}
