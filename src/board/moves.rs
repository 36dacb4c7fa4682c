/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};

use super::{PieceKind, Square};

/// Upper bound on the number of plies (pseudo-legal ones included) available in a position.
///
/// The most legal moves known in any position is 218; since a [`Ply`] does not carry a promotion
/// choice and pseudo-legal generation can only add King steps into check, this leaves headroom.
pub const MAX_NUM_MOVES: usize = 256;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] plies.
pub type MoveList = arrayvec::ArrayVec<Ply, MAX_NUM_MOVES>;

/// One move by one side, identified only by its source and destination squares.
///
/// Whether a ply captures, castles, takes en passant or promotes is derived from the
/// [`Position`](super::Position) it is played in, never stored here.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ply {
    from: Square,
    to: Square,
}

impl Ply {
    /// Creates a new [`Ply`] from `from` to `to`.
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// The square the moving piece starts on.
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    /// The square the moving piece lands on.
    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Fetches the source and destination squares of this [`Ply`].
    #[inline(always)]
    pub const fn parts(&self) -> (Square, Square) {
        (self.from, self.to)
    }

    /// Parses coordinate move text such as `e2e4`, with an optional trailing promotion letter (`e7e8n`).
    ///
    /// The promotion choice is returned separately, since a [`Ply`] never stores it.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::{PieceKind, Ply, Square};
    /// let (ply, promotion) = Ply::from_uci("e7e8n").unwrap();
    /// assert_eq!(ply, Ply::new(Square::E7, Square::E8));
    /// assert_eq!(promotion, Some(PieceKind::Knight));
    ///
    /// assert!(Ply::from_uci("e2").is_err());
    /// ```
    pub fn from_uci(uci: &str) -> Result<(Self, Option<PieceKind>)> {
        let uci = uci.trim();
        if !uci.is_ascii() || !(4..=5).contains(&uci.len()) {
            bail!("Move text must be 4 or 5 characters, such as e2e4 or e7e8q. Got {uci:?}");
        }

        let from = Square::from_uci(&uci[0..2])?;
        let to = Square::from_uci(&uci[2..4])?;

        let promotion = match uci[4..].chars().next() {
            Some(c) => Some(PieceKind::from_uci(c)?),
            None => None,
        };

        Ok((Self::new(from, to), promotion))
    }

    /// Converts this [`Ply`] into coordinate move text, such as `e2e4`.
    #[inline(always)]
    pub fn to_uci(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

impl FromStr for Ply {
    type Err = anyhow::Error;
    /// Parses a [`Ply`], rejecting any trailing promotion letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_uci(s)? {
            (ply, None) => Ok(ply),
            (_, Some(kind)) => bail!("A Ply does not carry a promotion choice. Got {kind:?} in {s:?}"),
        }
    }
}

impl fmt::Display for Ply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl fmt::Debug for Ply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

bitflags::bitflags! {
    /// Describes what a call to [`Game::make_move`](super::Game::make_move) did.
    ///
    /// Several bits may be set at once, such as a capture that delivers checkmate.
    /// [`MoveOutcome::ILLEGAL`] is only ever returned alone.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct MoveOutcome: u16 {
        /// The move was refused; nothing changed.
        const ILLEGAL = 1 << 0;
        /// The move was applied.
        const LEGAL = 1 << 1;
        const CAPTURE = 1 << 2;
        /// The side now to move is in check.
        const CHECK = 1 << 3;
        /// The side now to move is in check and has no legal moves. Always set alongside [`MoveOutcome::CHECK`].
        const CHECKMATE = 1 << 4;
        /// The side now to move is not in check but has no legal moves.
        const STALEMATE = 1 << 5;
        const EN_PASSANT = 1 << 6;
        const PROMOTION = 1 << 7;
        const CASTLE = 1 << 8;
    }
}

impl MoveOutcome {
    /// Returns `true` if the move was applied.
    #[inline(always)]
    pub const fn is_legal(&self) -> bool {
        self.contains(Self::LEGAL)
    }

    /// Returns `true` if the game is over: checkmate or stalemate.
    #[inline(always)]
    pub const fn is_game_over(&self) -> bool {
        self.intersects(Self::CHECKMATE.union(Self::STALEMATE))
    }
}

impl fmt::Display for MoveOutcome {
    /// Lists the set flags, lowercased and separated by `|`, or `-` if none are set.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }

        let names = self
            .iter_names()
            .map(|(name, _)| name.to_ascii_lowercase().replace('_', " "))
            .collect::<Vec<_>>();

        write!(f, "{}", names.join(" | "))
    }
}
