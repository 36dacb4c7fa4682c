/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Mul, Neg},
    str::FromStr,
};

use anyhow::{bail, Result};

/// An offset between two squares, measured in files (`dx`) and ranks (`dy`).
///
/// Directions are only ever *applied* to a [`Square`] through [`Square::offset`],
/// which refuses to produce anything that falls off the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Direction {
    pub dx: i8,
    pub dy: i8,
}

impl Direction {
    /// The four rook directions.
    pub const ORTHOGONALS: [Self; 4] = [
        Self::new(0, 1),
        Self::new(1, 0),
        Self::new(0, -1),
        Self::new(-1, 0),
    ];

    /// The four bishop directions.
    pub const DIAGONALS: [Self; 4] = [
        Self::new(1, 1),
        Self::new(1, -1),
        Self::new(-1, -1),
        Self::new(-1, 1),
    ];

    /// All eight directions a King or Queen may move in.
    pub const ORTHODIAGONALS: [Self; 8] = [
        Self::new(0, 1),
        Self::new(1, 0),
        Self::new(0, -1),
        Self::new(-1, 0),
        Self::new(1, 1),
        Self::new(1, -1),
        Self::new(-1, -1),
        Self::new(-1, 1),
    ];

    /// The eight Knight hops.
    pub const KNIGHT_HOPS: [Self; 8] = [
        Self::new(1, 2),
        Self::new(2, 1),
        Self::new(2, -1),
        Self::new(1, -2),
        Self::new(-1, 2),
        Self::new(-2, 1),
        Self::new(-2, -1),
        Self::new(-1, -2),
    ];

    /// Creates a new [`Direction`] from a file and rank offset.
    #[inline(always)]
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self { dx, dy }
    }

    /// Multiplies both components of this [`Direction`] by `steps`.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Direction;
    /// assert_eq!(Direction::new(1, -1).scaled(3), Direction::new(3, -3));
    /// assert_eq!(3 * Direction::new(1, -1), Direction::new(3, -3));
    /// ```
    #[inline(always)]
    pub const fn scaled(self, steps: i8) -> Self {
        Self::new(self.dx * steps, self.dy * steps)
    }
}

impl Mul<Direction> for i8 {
    type Output = Direction;
    #[inline(always)]
    fn mul(self, direction: Direction) -> Self::Output {
        direction.scaled(self)
    }
}

impl Neg for Direction {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self::Output {
        self.scaled(-1)
    }
}

/// Represents a single square on an `8x8` chess board.
///
/// Internally this is `file + rank * 8`, so `a1` is `0` and `h8` is `63`.
/// A [`Square`] can only be built from in-range coordinates; everything that
/// could leave the board ([`Square::new`], [`Square::offset`]) returns an [`Option`].
///
/// ```text
/// 8| 56 57 58 59 60 61 62 63
/// 7| 48 49 50 51 52 53 54 55
/// 6| 40 41 42 43 44 45 46 47
/// 5| 32 33 34 35 36 37 38 39
/// 4| 24 25 26 27 28 29 30 31
/// 3| 16 17 18 19 20 21 22 23
/// 2|  8  9 10 11 12 13 14 15
/// 1|  0  1  2  3  4  5  6  7
///  +------------------------
///    a  b  c  d  e  f  g  h
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    pub const A1: Self = Self::new_unchecked(0, 0);
    pub const B1: Self = Self::new_unchecked(1, 0);
    pub const C1: Self = Self::new_unchecked(2, 0);
    pub const D1: Self = Self::new_unchecked(3, 0);
    pub const E1: Self = Self::new_unchecked(4, 0);
    pub const F1: Self = Self::new_unchecked(5, 0);
    pub const G1: Self = Self::new_unchecked(6, 0);
    pub const H1: Self = Self::new_unchecked(7, 0);

    pub const A2: Self = Self::new_unchecked(0, 1);
    pub const B2: Self = Self::new_unchecked(1, 1);
    pub const C2: Self = Self::new_unchecked(2, 1);
    pub const D2: Self = Self::new_unchecked(3, 1);
    pub const E2: Self = Self::new_unchecked(4, 1);
    pub const F2: Self = Self::new_unchecked(5, 1);
    pub const G2: Self = Self::new_unchecked(6, 1);
    pub const H2: Self = Self::new_unchecked(7, 1);

    pub const A3: Self = Self::new_unchecked(0, 2);
    pub const B3: Self = Self::new_unchecked(1, 2);
    pub const C3: Self = Self::new_unchecked(2, 2);
    pub const D3: Self = Self::new_unchecked(3, 2);
    pub const E3: Self = Self::new_unchecked(4, 2);
    pub const F3: Self = Self::new_unchecked(5, 2);
    pub const G3: Self = Self::new_unchecked(6, 2);
    pub const H3: Self = Self::new_unchecked(7, 2);

    pub const A4: Self = Self::new_unchecked(0, 3);
    pub const B4: Self = Self::new_unchecked(1, 3);
    pub const C4: Self = Self::new_unchecked(2, 3);
    pub const D4: Self = Self::new_unchecked(3, 3);
    pub const E4: Self = Self::new_unchecked(4, 3);
    pub const F4: Self = Self::new_unchecked(5, 3);
    pub const G4: Self = Self::new_unchecked(6, 3);
    pub const H4: Self = Self::new_unchecked(7, 3);

    pub const A5: Self = Self::new_unchecked(0, 4);
    pub const B5: Self = Self::new_unchecked(1, 4);
    pub const C5: Self = Self::new_unchecked(2, 4);
    pub const D5: Self = Self::new_unchecked(3, 4);
    pub const E5: Self = Self::new_unchecked(4, 4);
    pub const F5: Self = Self::new_unchecked(5, 4);
    pub const G5: Self = Self::new_unchecked(6, 4);
    pub const H5: Self = Self::new_unchecked(7, 4);

    pub const A6: Self = Self::new_unchecked(0, 5);
    pub const B6: Self = Self::new_unchecked(1, 5);
    pub const C6: Self = Self::new_unchecked(2, 5);
    pub const D6: Self = Self::new_unchecked(3, 5);
    pub const E6: Self = Self::new_unchecked(4, 5);
    pub const F6: Self = Self::new_unchecked(5, 5);
    pub const G6: Self = Self::new_unchecked(6, 5);
    pub const H6: Self = Self::new_unchecked(7, 5);

    pub const A7: Self = Self::new_unchecked(0, 6);
    pub const B7: Self = Self::new_unchecked(1, 6);
    pub const C7: Self = Self::new_unchecked(2, 6);
    pub const D7: Self = Self::new_unchecked(3, 6);
    pub const E7: Self = Self::new_unchecked(4, 6);
    pub const F7: Self = Self::new_unchecked(5, 6);
    pub const G7: Self = Self::new_unchecked(6, 6);
    pub const H7: Self = Self::new_unchecked(7, 6);

    pub const A8: Self = Self::new_unchecked(0, 7);
    pub const B8: Self = Self::new_unchecked(1, 7);
    pub const C8: Self = Self::new_unchecked(2, 7);
    pub const D8: Self = Self::new_unchecked(3, 7);
    pub const E8: Self = Self::new_unchecked(4, 7);
    pub const F8: Self = Self::new_unchecked(5, 7);
    pub const G8: Self = Self::new_unchecked(6, 7);
    pub const H8: Self = Self::new_unchecked(7, 7);

    /// Number of files (columns) on the board.
    pub const FILE_COUNT: u8 = 8;
    /// Number of ranks (rows) on the board.
    pub const RANK_COUNT: u8 = 8;
    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Creates a new [`Square`] from a file and rank, both in `[0, 8)`.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Square;
    /// assert_eq!(Square::new(2, 3), Some(Square::C4));
    /// assert_eq!(Square::new(8, 0), None);
    /// ```
    #[inline(always)]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < Self::FILE_COUNT && rank < Self::RANK_COUNT {
            Some(Self::new_unchecked(file, rank))
        } else {
            None
        }
    }

    /// Creates a new [`Square`] without bounds checking.
    ///
    /// # Panics
    ///
    /// If `file` or `rank` is out of range and debug assertions are enabled.
    #[inline(always)]
    pub const fn new_unchecked(file: u8, rank: u8) -> Self {
        debug_assert!(file < Self::FILE_COUNT && rank < Self::RANK_COUNT);
        Self(file + rank * Self::FILE_COUNT)
    }

    /// Creates a new [`Square`] from its index in `[0, 63]`.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Square;
    /// assert_eq!(Square::from_index(26).unwrap(), Square::C4);
    /// assert!(Square::from_index(64).is_err());
    /// ```
    #[inline(always)]
    pub fn from_index(index: usize) -> Result<Self> {
        if index >= Self::COUNT {
            bail!("Invalid index for Square: Must be between [0, 63]. Got {index}");
        }
        Ok(Self(index as u8))
    }

    /// Returns an iterator over all 64 squares, from `a1` to `h8`.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// The file (column) of this square, in `[0, 8)`.
    #[inline(always)]
    pub const fn file(&self) -> u8 {
        self.0 % Self::FILE_COUNT
    }

    /// The rank (row) of this square, in `[0, 8)`.
    #[inline(always)]
    pub const fn rank(&self) -> u8 {
        self.0 / Self::FILE_COUNT
    }

    /// Index of this square in `[0, 63]`, for indexing into arrays.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Number of files between `self` and `other`.
    #[inline(always)]
    pub const fn distance_files(&self, other: Self) -> u8 {
        self.file().abs_diff(other.file())
    }

    /// Number of ranks between `self` and `other`.
    #[inline(always)]
    pub const fn distance_ranks(&self, other: Self) -> u8 {
        self.rank().abs_diff(other.rank())
    }

    /// Attempt to move this [`Square`] by `direction`.
    ///
    /// Returns [`None`] if the result would fall off the board.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::{Direction, Square};
    /// assert_eq!(Square::C4.offset(Direction::new(1, 1)), Some(Square::D5));
    /// assert_eq!(Square::A1.offset(Direction::new(-1, 0)), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, direction: Direction) -> Option<Self> {
        let file = self.file() as i8 + direction.dx;
        let rank = self.rank() as i8 + direction.dy;

        if file < 0 || rank < 0 {
            return None;
        }

        Self::new(file as u8, rank as u8)
    }

    /// Walks outward from this square along `direction`, yielding at most `range` squares.
    ///
    /// The walk ends at the edge of the board. The starting square is never yielded.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::{Direction, Square};
    /// let ray: Vec<_> = Square::F6.ray(Direction::new(1, 1), 7).collect();
    /// assert_eq!(ray, [Square::G7, Square::H8]);
    /// ```
    #[inline(always)]
    pub fn ray(self, direction: Direction, range: u8) -> impl Iterator<Item = Self> {
        (1..=range as i8).map_while(move |step| self.offset(step * direction))
    }

    /// Creates a [`Square`] from a string such as `"e4"`.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Square;
    /// assert_eq!(Square::from_uci("c4").unwrap(), Square::C4);
    /// assert!(Square::from_uci("z0").is_err());
    /// ```
    pub fn from_uci(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Invalid Square string: String must contain exactly 2 characters. Got {square:?}");
        };

        if !('a'..='h').contains(&file) {
            bail!("Invalid file for Square: Must be between [a, h]. Got {file:?}");
        }
        if !('1'..='8').contains(&rank) {
            bail!("Invalid rank for Square: Must be between [1, 8]. Got {rank:?}");
        }

        Ok(Self::new_unchecked(file as u8 - b'a', rank as u8 - b'1'))
    }

    /// Converts this [`Square`] to a string such as `"e4"`.
    #[inline(always)]
    pub fn to_uci(self) -> String {
        format!("{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    /// Wrapper for [`Square::from_uci`].
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    /// A [`Square`] can be used to index into an array of 64 elements.
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_uci().fmt(f)
    }
}

impl fmt::Debug for Square {
    /// Displays the square name and its `(file, rank)` coordinates.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.to_uci(), self.file(), self.rank())
    }
}
