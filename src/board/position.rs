/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

use super::{
    Direction, MoveEvent, MoveOutcome, Piece, PieceKind, Ply, Side, Square, FEN_STARTPOS,
};

bitflags::bitflags! {
    /// The castling rights of a single side.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct CastlingRights: u8 {
        /// The King may still castle with the Rook on the h-file.
        const KINGSIDE = 1 << 0;
        /// The King may still castle with the Rook on the a-file.
        const QUEENSIDE = 1 << 1;
    }
}

impl CastlingRights {
    /// File of the Rook that castles on this wing. Only meaningful for a single flag.
    #[inline(always)]
    pub(crate) const fn rook_file(&self) -> u8 {
        if self.contains(Self::KINGSIDE) {
            7
        } else {
            0
        }
    }

    /// The right tied to the Rook that starts on `square`, if `square` is one of `side`'s corners.
    #[inline(always)]
    pub(crate) const fn for_corner(side: Side, square: Square) -> Self {
        if square.rank() != side.back_rank() {
            return Self::empty();
        }

        match square.file() {
            0 => Self::QUEENSIDE,
            7 => Self::KINGSIDE,
            _ => Self::empty(),
        }
    }
}

/// Represents the current state of the board: piece placements, side to move,
/// en passant target and castling rights.
///
/// A [`Position`] is a small value type; copying one is how hypothetical moves are tested.
/// It applies moves without enforcing legality. For a type that only accepts legal moves,
/// see [`Game`](super::Game).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Occupant of every square, indexed by [`Square`].
    board: [Option<Piece>; Square::COUNT],

    /// The [`Side`] of the current player.
    side_to_move: Side,

    /// The square a Pawn skipped over on the previous move, if it double-stepped.
    ep_square: Option<Square>,

    /// Castling rights for each side.
    castling_rights: [CastlingRights; Side::COUNT],
}

impl Position {
    /// Creates a new, empty [`Position`] with White to move and no castling rights.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Position;
    /// let position = Position::new();
    /// assert_eq!(position.to_fen(), "8/8/8/8/8/8/8/8 w - - 0 1");
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            board: [None; Square::COUNT],
            side_to_move: Side::White,
            ep_square: None,
            castling_rights: [CastlingRights::empty(); Side::COUNT],
        }
    }

    /// Creates a new [`Position`] from the provided FEN string.
    ///
    /// The half-move and full-move counters are accepted but ignored.
    /// Positions that do not have exactly one King per side are rejected.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut pos = Self::new();
        let mut split = fen.split_ascii_whitespace();

        let placements = split
            .next()
            .ok_or(anyhow!("FEN string must have piece placements."))?;
        pos.place_fen_pieces(placements)?;

        let active_side = split.next().unwrap_or("w");
        let mut chars = active_side.chars();
        pos.side_to_move = match (chars.next(), chars.next()) {
            (Some(c), None) => Side::from_uci(c)?,
            _ => bail!("FEN string must have a valid side to move. Got {active_side:?}"),
        };

        let castling = split.next().unwrap_or("-");
        if castling != "-" {
            for c in castling.chars() {
                let (side, right) = match c {
                    'K' => (Side::White, CastlingRights::KINGSIDE),
                    'Q' => (Side::White, CastlingRights::QUEENSIDE),
                    'k' => (Side::Black, CastlingRights::KINGSIDE),
                    'q' => (Side::Black, CastlingRights::QUEENSIDE),
                    _ => bail!("FEN string has invalid castling rights. Got {castling:?}"),
                };
                pos.castling_rights[side] |= right;
            }
        }

        let en_passant_target = split.next().unwrap_or("-");
        pos.ep_square = match en_passant_target {
            "-" => None,
            square => Some(Square::from_uci(square)?),
        };

        for counter in split.take(2) {
            if counter.parse::<u32>().is_err() {
                bail!("FEN string must have valid move counters. Got {counter:?}");
            }
        }

        for side in Side::all() {
            let kings = pos.pieces(side).filter(|(_, piece)| piece.is_king()).count();
            if kings != 1 {
                bail!("FEN string must have exactly one {side} King. Got {kings}");
            }
        }

        Ok(pos)
    }

    /// Parses the piece placement field of a FEN string onto an empty board.
    fn place_fen_pieces(&mut self, placements: &str) -> Result<()> {
        let ranks = placements.split('/').collect::<Vec<_>>();
        if ranks.len() != Square::RANK_COUNT as usize {
            bail!("FEN placements must have 8 ranks. Got {placements:?}");
        }

        // FEN lists rank 8 first
        for (rank, row) in ranks.into_iter().rev().enumerate() {
            let mut file = 0;
            for c in row.chars() {
                if let Some(empty) = c.to_digit(10) {
                    file += empty as u8;
                    continue;
                }

                let square = Square::new(file, rank as u8)
                    .ok_or(anyhow!("FEN rank {row:?} has more than 8 squares"))?;
                self.board[square] = Some(Piece::from_uci(c)?);
                file += 1;
            }

            if file != Square::FILE_COUNT {
                bail!("FEN rank {row:?} must describe exactly 8 squares");
            }
        }

        Ok(())
    }

    /// Generates a FEN string from this [`Position`].
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Position;
    /// let position = Position::default();
    /// assert_eq!(position.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// ```
    pub fn to_fen(&self) -> String {
        format!("{self}")
    }

    /// Fetches the piece on `square`, if any.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.index()]
    }

    /// Returns `true` if there is a piece on `square`.
    #[inline(always)]
    pub const fn has(&self, square: Square) -> bool {
        self.piece_at(square).is_some()
    }

    /// Iterates over every occupied square and its piece, from `a1` to `h8`.
    #[inline(always)]
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Iterates over every square occupied by `side`, along with its piece.
    #[inline(always)]
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied().filter(move |(_, piece)| piece.side() == side)
    }

    /// Iterates over every square occupied by `side`.
    #[inline(always)]
    pub fn occupied_squares(&self, side: Side) -> impl Iterator<Item = Square> + '_ {
        self.pieces(side).map(|(square, _)| square)
    }

    /// Finds the square of `side`'s King.
    ///
    /// Always `Some` for any position reachable through [`Position::from_fen`] and legal moves.
    #[inline(always)]
    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.pieces(side)
            .find(|(_, piece)| piece.is_king())
            .map(|(square, _)| square)
    }

    /// Returns the current player as a [`Side`].
    #[inline(always)]
    pub const fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// If en passant can be performed, returns the square the capturing Pawn would land on.
    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Returns the [`CastlingRights`] for `side`.
    #[inline(always)]
    pub const fn castling_rights(&self, side: Side) -> CastlingRights {
        self.castling_rights[side.index()]
    }

    /// Returns the castling rights of both sides in FEN notation, such as `KQkq`.
    pub fn castling_rights_uci(&self) -> String {
        let mut castling = String::with_capacity(4);

        for (side, kingside, queenside) in [(Side::White, 'K', 'Q'), (Side::Black, 'k', 'q')] {
            if self.castling_rights(side).contains(CastlingRights::KINGSIDE) {
                castling.push(kingside);
            }
            if self.castling_rights(side).contains(CastlingRights::QUEENSIDE) {
                castling.push(queenside);
            }
        }

        // If no side can castle, use a hyphen
        if castling.is_empty() {
            castling = String::from("-");
        }
        castling
    }

    /// Overwrites the contents of `square`. No validation is performed.
    #[inline(always)]
    pub(crate) fn set_square(&mut self, square: Square, piece: Option<Piece>) {
        self.board[square] = piece;
    }

    /// Removes and returns the piece on `square`, if any.
    #[inline(always)]
    fn take(&mut self, square: Square) -> Option<Piece> {
        self.board[square].take()
    }

    /// Returns `true` if `ply` moves a Pawn onto its far rank with a one-step forward or diagonal pattern.
    ///
    /// Used to decide whether to ask the player for a promotion choice. This says nothing about legality.
    pub fn is_promotion(&self, ply: Ply) -> bool {
        let (from, to) = ply.parts();
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        let side = piece.side();

        piece.is_pawn()
            && to.rank() == side.promotion_rank()
            && to.rank() as i8 - from.rank() as i8 == side.forward()
            && from.distance_files(to) <= 1
    }

    /// Copies `self` and returns a [`Position`] after having applied the provided [`Ply`].
    #[inline(always)]
    pub fn with_move_made(&self, ply: Ply, promotion: Option<PieceKind>) -> Self {
        let mut copied = *self;
        copied.make_move(ply, promotion);
        copied
    }

    /// Applies the move. No enforcement of legality.
    ///
    /// Captures, castling, en passant, promotion and castling-right updates are all derived from
    /// the board. A promoting Pawn becomes `promotion`, or a Queen if none was given.
    ///
    /// Returns a [`MoveEvent`] describing everything but the check/mate/stalemate status of the
    /// resulting position, which depends on the opponent's options.
    pub fn make_move(&mut self, ply: Ply, promotion: Option<PieceKind>) -> MoveEvent {
        let (from, to) = ply.parts();
        let mut event = MoveEvent::new(ply, self.side_to_move);

        // Remove the piece from its previous location, exiting early if there is no piece there
        let Some(mut piece) = self.take(from) else {
            event.outcome = MoveOutcome::empty();
            return event;
        };
        let side = piece.side();

        // A normal capture
        if let Some(victim) = self.take(to) {
            event.outcome |= MoveOutcome::CAPTURE;
            event.capture_square = Some(to);

            // Whatever stood on a Rook's corner, that Rook is gone now
            self.castling_rights[victim.side()] -= CastlingRights::for_corner(victim.side(), to);
        }

        match piece.kind() {
            PieceKind::King => {
                if from.distance_files(to) == 2 {
                    let wing = if to.file() > from.file() {
                        CastlingRights::KINGSIDE
                    } else {
                        CastlingRights::QUEENSIDE
                    };
                    let rook_from = Square::new_unchecked(wing.rook_file(), from.rank());
                    let rook_to = Square::new_unchecked((from.file() + to.file()) / 2, from.rank());

                    let rook = self.take(rook_from);
                    self.set_square(rook_to, rook);

                    event.outcome |= MoveOutcome::CASTLE;
                    event.castling_rook_move = Some(Ply::new(rook_from, rook_to));
                }

                self.castling_rights[side] = CastlingRights::empty();
            }

            PieceKind::Rook => {
                self.castling_rights[side] -= CastlingRights::for_corner(side, from);
            }

            PieceKind::Pawn if Some(to) == self.ep_square => {
                // The victim is beside the source square, one rank behind the destination
                let behind = Direction::new(0, -side.forward());
                if let Some(victim_square) = to.offset(behind) {
                    self.take(victim_square);
                    event.outcome |= MoveOutcome::CAPTURE | MoveOutcome::EN_PASSANT;
                    event.capture_square = Some(victim_square);
                }
            }

            _ => {}
        }

        // Clear the EP square from the last move, then set it again on a double step
        self.ep_square = None;
        if piece.is_pawn() && from.distance_ranks(to) == 2 {
            self.ep_square = from.offset(Direction::new(0, side.forward()));
        }

        if piece.is_pawn() && to.rank() == side.promotion_rank() {
            piece = piece.promoted(promotion.unwrap_or(PieceKind::Queen));
            event.outcome |= MoveOutcome::PROMOTION;
            event.promoted_piece = Some(piece);
        }

        self.set_square(to, Some(piece));
        self.side_to_move = side.opponent();
        event.next_side = self.side_to_move;

        event
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    /// Wrapper for [`Position::from_fen`].
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Default for Position {
    /// Standard starting position for Chess.
    #[inline(always)]
    fn default() -> Self {
        let mut pos = Self::new();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        for side in Side::all() {
            for (file, kind) in (0..Square::FILE_COUNT).zip(back_rank) {
                let piece = Piece::new(side, kind);
                pos.set_square(Square::new_unchecked(file, side.back_rank()), Some(piece));

                let pawn = Piece::new(side, PieceKind::Pawn);
                pos.set_square(Square::new_unchecked(file, side.pawn_rank()), Some(pawn));
            }
            pos.castling_rights[side] = CastlingRights::all();
        }

        debug_assert_eq!(pos.to_fen(), FEN_STARTPOS);
        pos
    }
}

impl fmt::Display for Position {
    /// Writes this position as a FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..Square::RANK_COUNT).rev() {
            let mut empty_spaces = 0;
            for file in 0..Square::FILE_COUNT {
                if let Some(piece) = self.piece_at(Square::new_unchecked(file, rank)) {
                    if empty_spaces != 0 {
                        write!(f, "{empty_spaces}")?;
                        empty_spaces = 0;
                    }
                    write!(f, "{piece}")?;
                } else {
                    empty_spaces += 1;
                }
            }

            if empty_spaces != 0 {
                write!(f, "{empty_spaces}")?;
            }
            if rank != 0 {
                write!(f, "/")?;
            }
        }

        let ep_square = self
            .ep_square
            .map(|square| square.to_string())
            .unwrap_or(String::from("-"));

        write!(
            f,
            " {} {} {ep_square} 0 1",
            self.side_to_move.to_uci(),
            self.castling_rights_uci()
        )
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..Square::RANK_COUNT).rev() {
            write!(f, "{}|", rank + 1)?;
            for file in 0..Square::FILE_COUNT {
                let piece = self.piece_at(Square::new_unchecked(file, rank));
                write!(f, " {}", piece.map(|p| p.char()).unwrap_or('.'))?;
            }
            writeln!(f)?;
        }
        writeln!(f, " +----------------")?;
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "FEN: {self}")
    }
}
