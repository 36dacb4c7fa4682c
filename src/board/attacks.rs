/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use super::{Direction, PieceKinds, Position, Side, Square};

/// Furthest a slider can travel on an `8x8` board.
pub const SLIDER_RANGE: u8 = 7;

/// Upper bound on the number of pieces that can attack a single square at once.
pub const MAX_ATTACKERS: usize = 16;

impl Position {
    /// Returns `true` if any piece owned by the opponent of `defender` attacks `square`.
    ///
    /// Works by looking outward from `square`: along each ray the first occupied square decides
    /// whether the ray carries an attack. Whether `square` itself is occupied does not matter.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::{Position, Side, Square};
    /// let position = Position::default();
    /// // e3 is covered by White's d2 and f2 Pawns, so Black would be attacked there
    /// assert!(position.is_square_attacked(Square::E3, Side::Black));
    /// assert!(!position.is_square_attacked(Square::E4, Side::Black));
    /// ```
    pub fn is_square_attacked(&self, square: Square, defender: Side) -> bool {
        self.attackers(square, defender).next().is_some()
    }

    /// Lists the squares of every piece owned by the opponent of `defender` that attacks `square`.
    pub fn attackers_of(&self, square: Square, defender: Side) -> ArrayVec<Square, MAX_ATTACKERS> {
        self.attackers(square, defender).collect()
    }

    /// Returns `true` if `side`'s King is attacked.
    ///
    /// # Panics
    ///
    /// If `side` has no King on the board. A [`Position`] built from FEN always has one.
    pub fn is_in_check(&self, side: Side) -> bool {
        let Some(king) = self.king_square(side) else {
            panic!("The {side} King is missing from the board:\n{self:?}");
        };

        self.is_square_attacked(king, side)
    }

    /// Returns `true` if the side to move is in check.
    #[inline(always)]
    pub fn in_check(&self) -> bool {
        self.is_in_check(self.side_to_move())
    }

    /// Lists the squares of every piece currently giving check to the side to move.
    pub fn checkers(&self) -> ArrayVec<Square, MAX_ATTACKERS> {
        let side = self.side_to_move();
        match self.king_square(side) {
            Some(king) => self.attackers_of(king, side),
            None => ArrayVec::new(),
        }
    }

    /// Lazily finds every attacker of `square` belonging to the opponent of `defender`.
    fn attackers(&self, square: Square, defender: Side) -> impl Iterator<Item = Square> + '_ {
        let attacker = defender.opponent();

        // Sliders along ranks and files
        let orthogonal = Direction::ORTHOGONALS
            .into_iter()
            .filter_map(move |dir| self.first_piece_along(square, dir, SLIDER_RANGE))
            .filter(move |&sq| self.is_at(sq, attacker, PieceKinds::ORTHOGONAL_SLIDERS));

        // Sliders along diagonals
        let diagonal = Direction::DIAGONALS
            .into_iter()
            .filter_map(move |dir| self.first_piece_along(square, dir, SLIDER_RANGE))
            .filter(move |&sq| self.is_at(sq, attacker, PieceKinds::DIAGONAL_SLIDERS));

        let king = Direction::ORTHODIAGONALS
            .into_iter()
            .filter_map(move |dir| square.offset(dir))
            .filter(move |&sq| self.is_at(sq, attacker, PieceKinds::KING));

        let knights = Direction::KNIGHT_HOPS
            .into_iter()
            .filter_map(move |dir| square.offset(dir))
            .filter(move |&sq| self.is_at(sq, attacker, PieceKinds::KNIGHT));

        // An attacking Pawn sits one rank *behind* the target, from its own point of view
        let pawns = [-1, 1]
            .into_iter()
            .filter_map(move |dx| square.offset(Direction::new(dx, -attacker.forward())))
            .filter(move |&sq| self.is_at(sq, attacker, PieceKinds::PAWN));

        orthogonal.chain(diagonal).chain(king).chain(knights).chain(pawns)
    }

    /// The first occupied square walking out from `origin` along `direction`.
    #[inline(always)]
    fn first_piece_along(&self, origin: Square, direction: Direction, range: u8) -> Option<Square> {
        origin.ray(direction, range).find(|&sq| self.has(sq))
    }

    #[inline(always)]
    fn is_at(&self, square: Square, side: Side, kinds: PieceKinds) -> bool {
        self.piece_at(square)
            .is_some_and(|piece| piece.is(side, kinds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_rays_do_not_attack() {
        // The a1 Rook is blocked by its own Pawn on a2
        let pos = Position::from_fen("k7/8/8/8/8/8/P7/R6K w - - 0 1").unwrap();
        assert!(!pos.is_square_attacked(Square::A5, Side::Black));
        assert!(pos.is_square_attacked(Square::A2, Side::Black));
        assert!(pos.is_square_attacked(Square::D1, Side::Black));
        // Covered by both the Rook and the King
        assert!(pos.is_square_attacked(Square::G1, Side::Black));
        assert_eq!(pos.attackers_of(Square::G1, Side::Black).len(), 2);
    }

    #[test]
    fn test_pawn_attacks_are_directional() {
        let pos = Position::from_fen("k7/8/8/3p4/8/8/8/7K w - - 0 1").unwrap();
        // A Black Pawn on d5 attacks c4 and e4, never forward or backward
        assert!(pos.is_square_attacked(Square::C4, Side::White));
        assert!(pos.is_square_attacked(Square::E4, Side::White));
        assert!(!pos.is_square_attacked(Square::D4, Side::White));
        assert!(!pos.is_square_attacked(Square::C6, Side::White));
        assert!(!pos.is_square_attacked(Square::E6, Side::White));
    }

    #[test]
    fn test_knights_and_kings() {
        let pos = Position::from_fen("k7/8/8/8/3N4/8/8/7K w - - 0 1").unwrap();
        for sq in [Square::B3, Square::B5, Square::C6, Square::E6, Square::F5, Square::F3] {
            assert!(pos.is_square_attacked(sq, Side::Black), "{sq} should be attacked");
        }
        assert!(!pos.is_square_attacked(Square::D5, Side::Black));

        assert!(pos.is_square_attacked(Square::G2, Side::Black));
        assert!(pos.is_square_attacked(Square::B7, Side::White));
        assert!(!pos.is_square_attacked(Square::C6, Side::White));
    }

    #[test]
    fn test_check_and_checkers() {
        // Double check from a Rook and a Knight
        let pos = Position::from_fen("4k3/8/3N4/8/8/8/8/4R1K1 b - - 0 1").unwrap();
        assert!(pos.in_check());
        assert!(pos.is_in_check(Side::Black));
        assert!(!pos.is_in_check(Side::White));

        let mut checkers = pos.checkers();
        checkers.sort();
        assert_eq!(checkers.as_slice(), &[Square::E1, Square::D6]);

        assert!(Position::default().checkers().is_empty());
    }

    #[test]
    #[should_panic]
    fn test_missing_king_panics() {
        let mut pos = Position::default();
        pos.set_square(Square::E1, None);
        pos.is_in_check(Side::White);
    }
}
