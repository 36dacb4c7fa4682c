/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Neg},
    str::FromStr,
};

use anyhow::{bail, Result};

/// Represents the side (player) that owns a piece or is to move.
///
/// White traditionally moves first, and therefore [`Side`] defaults to [`Side::White`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum Side {
    #[default]
    White,
    Black,
}

impl Side {
    /// Number of side variants.
    pub const COUNT: usize = 2;

    /// An array of both sides, starting with White.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::White, Self::Black]
    }

    /// Returns this [`Side`]'s opponent.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Side;
    /// assert_eq!(Side::White.opponent(), Side::Black);
    /// assert_eq!(Side::Black.opponent(), Side::White);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Returns this [`Side`] as a `usize`: `0` for White, `1` for Black.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// The rank offset of a single step "forward" for this side's Pawns.
    #[inline(always)]
    pub const fn forward(&self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// The rank this side's pieces start on.
    #[inline(always)]
    pub const fn back_rank(&self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }

    /// The rank this side's Pawns start on, and may double-step from.
    #[inline(always)]
    pub const fn pawn_rank(&self) -> u8 {
        match self {
            Self::White => 1,
            Self::Black => 6,
        }
    }

    /// The far rank, on which this side's Pawns promote.
    #[inline(always)]
    pub const fn promotion_rank(&self) -> u8 {
        self.opponent().back_rank()
    }

    /// Creates a [`Side`] from `'w'` or `'b'` (case-insensitive).
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Side;
    /// assert_eq!(Side::from_uci('w').unwrap(), Side::White);
    /// assert!(Side::from_uci('x').is_err());
    /// ```
    #[inline(always)]
    pub fn from_uci(side: char) -> Result<Self> {
        match side {
            'w' | 'W' => Ok(Self::White),
            'b' | 'B' => Ok(Self::Black),
            _ => bail!("Side must be either 'w' or 'b' (case-insensitive). Found {side:?}"),
        }
    }

    /// Converts this [`Side`] to `'w'` or `'b'`.
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    /// Fetches a human-readable name for this [`Side`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl Neg for Side {
    type Output = Self;
    /// Negating [`Side::White`] yields [`Side::Black`] and vice versa.
    #[inline(always)]
    fn neg(self) -> Self::Output {
        self.opponent()
    }
}

impl<T> Index<Side> for [T; Side::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Side) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Side> for [T; Side::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Side) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

bitflags::bitflags! {
    /// A set of [`PieceKind`]s.
    ///
    /// Every [`PieceKind`] owns a single bit, so asking whether a piece is, say, a Queen *or* a Rook
    /// is one intersection test against [`PieceKinds::ORTHOGONAL_SLIDERS`].
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct PieceKinds: u8 {
        const KING = PieceKind::King as u8;
        const QUEEN = PieceKind::Queen as u8;
        const ROOK = PieceKind::Rook as u8;
        const KNIGHT = PieceKind::Knight as u8;
        const BISHOP = PieceKind::Bishop as u8;
        const PAWN = PieceKind::Pawn as u8;

        /// Pieces that slide along ranks and files.
        const ORTHOGONAL_SLIDERS = Self::QUEEN.bits() | Self::ROOK.bits();
        /// Pieces that slide along diagonals.
        const DIAGONAL_SLIDERS = Self::QUEEN.bits() | Self::BISHOP.bits();
    }
}

/// Represents the kind (or "role") that a chess piece can be.
///
/// Each variant is a distinct bit; see [`PieceKinds`] for sets of kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum PieceKind {
    King = 1 << 0,
    Queen = 1 << 1,
    Rook = 1 << 2,
    Knight = 1 << 3,
    Bishop = 1 << 4,
    Pawn = 1 << 5,
}

impl PieceKind {
    /// Number of piece kinds.
    pub const COUNT: usize = 6;

    /// The kinds a Pawn may promote to, strongest first.
    pub const PROMOTIONS: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    /// This kind as a single-member [`PieceKinds`] set.
    #[inline(always)]
    pub const fn bit(&self) -> PieceKinds {
        PieceKinds::from_bits_retain(*self as u8)
    }

    /// Returns `true` if this kind is a member of `kinds`.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::{PieceKind, PieceKinds};
    /// assert!(PieceKind::Rook.is_one_of(PieceKinds::ORTHOGONAL_SLIDERS));
    /// assert!(!PieceKind::Bishop.is_one_of(PieceKinds::ORTHOGONAL_SLIDERS));
    /// ```
    #[inline(always)]
    pub const fn is_one_of(&self, kinds: PieceKinds) -> bool {
        kinds.intersects(self.bit())
    }

    /// Returns `true` if a Pawn may promote to this kind.
    #[inline(always)]
    pub const fn is_promotion_choice(&self) -> bool {
        self.is_one_of(PieceKinds::QUEEN.union(PieceKinds::ROOK.union(
            PieceKinds::BISHOP.union(PieceKinds::KNIGHT),
        )))
    }

    /// Creates a new [`PieceKind`] from a letter such as `'q'` or `'N'`.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::PieceKind;
    /// assert_eq!(PieceKind::from_uci('Q').unwrap(), PieceKind::Queen);
    /// assert!(PieceKind::from_uci('x').is_err());
    /// ```
    #[inline(always)]
    pub fn from_uci(kind: char) -> Result<Self> {
        match kind {
            'P' | 'p' => Ok(Self::Pawn),
            'N' | 'n' => Ok(Self::Knight),
            'B' | 'b' => Ok(Self::Bishop),
            'R' | 'r' => Ok(Self::Rook),
            'Q' | 'q' => Ok(Self::Queen),
            'K' | 'k' => Ok(Self::King),
            _ => bail!("Invalid char for PieceKind: Got {kind:?}."),
        }
    }

    /// Converts this [`PieceKind`] to a lowercase letter.
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    /// Fetches a human-readable name for this [`PieceKind`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }
}

impl From<PieceKind> for PieceKinds {
    #[inline(always)]
    fn from(kind: PieceKind) -> Self {
        kind.bit()
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// Represents a chess piece on the game board: a [`Side`] and a [`PieceKind`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Piece {
    side: Side,
    kind: PieceKind,
}

impl Piece {
    pub const WHITE_PAWN: Self = Self::new(Side::White, PieceKind::Pawn);
    pub const WHITE_KNIGHT: Self = Self::new(Side::White, PieceKind::Knight);
    pub const WHITE_BISHOP: Self = Self::new(Side::White, PieceKind::Bishop);
    pub const WHITE_ROOK: Self = Self::new(Side::White, PieceKind::Rook);
    pub const WHITE_QUEEN: Self = Self::new(Side::White, PieceKind::Queen);
    pub const WHITE_KING: Self = Self::new(Side::White, PieceKind::King);

    pub const BLACK_PAWN: Self = Self::new(Side::Black, PieceKind::Pawn);
    pub const BLACK_KNIGHT: Self = Self::new(Side::Black, PieceKind::Knight);
    pub const BLACK_BISHOP: Self = Self::new(Side::Black, PieceKind::Bishop);
    pub const BLACK_ROOK: Self = Self::new(Side::Black, PieceKind::Rook);
    pub const BLACK_QUEEN: Self = Self::new(Side::Black, PieceKind::Queen);
    pub const BLACK_KING: Self = Self::new(Side::Black, PieceKind::King);

    /// Creates a new [`Piece`] from the given [`Side`] and [`PieceKind`].
    #[inline(always)]
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self { side, kind }
    }

    /// The [`Side`] that owns this piece.
    #[inline(always)]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// The [`PieceKind`] of this piece.
    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Returns `true` if this piece belongs to `side` and its kind is one of `kinds`.
    #[inline(always)]
    pub const fn is(&self, side: Side, kinds: PieceKinds) -> bool {
        self.side as u8 == side as u8 && self.kind.is_one_of(kinds)
    }

    #[inline(always)]
    pub const fn is_pawn(&self) -> bool {
        self.kind.is_one_of(PieceKinds::PAWN)
    }

    #[inline(always)]
    pub const fn is_king(&self) -> bool {
        self.kind.is_one_of(PieceKinds::KING)
    }

    /// Returns a copy of this piece with its kind replaced by `kind`, keeping the [`Side`].
    #[inline(always)]
    pub const fn promoted(self, kind: PieceKind) -> Self {
        Self::new(self.side, kind)
    }

    /// Creates a [`Piece`] from its FEN letter: uppercase for White, lowercase for Black.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Piece;
    /// assert_eq!(Piece::from_uci('N').unwrap(), Piece::WHITE_KNIGHT);
    /// assert_eq!(Piece::from_uci('q').unwrap(), Piece::BLACK_QUEEN);
    /// ```
    #[inline(always)]
    pub fn from_uci(piece: char) -> Result<Self> {
        let side = if piece.is_ascii_lowercase() {
            Side::Black
        } else {
            Side::White
        };

        Ok(Self::new(side, PieceKind::from_uci(piece)?))
    }

    /// Converts this [`Piece`] to its FEN letter: uppercase for White, lowercase for Black.
    #[inline(always)]
    pub const fn char(&self) -> char {
        let c = self.kind.to_uci();
        match self.side {
            Side::White => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }
}

impl FromStr for Piece {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_uci(c),
            _ => bail!("Piece must be a single character. Got {s:?}"),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.char().fmt(f)
    }
}
