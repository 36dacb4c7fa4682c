/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use log::trace;

use super::{
    CastlingRights, Direction, MoveList, Piece, PieceKind, Ply, Position, Side, Square,
    SLIDER_RANGE,
};

/// Whether a ray walk may, must, or must not end on an enemy piece.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum CaptureMode {
    /// Only destinations holding an enemy piece are yielded. Pawn diagonals.
    Mandatory,

    /// Empty squares are yielded, and the walk ends on (and includes) the first enemy piece.
    #[default]
    Optional,

    /// Only empty squares are yielded, and the walk ends at the first piece of either side. Pawn advances.
    Impossible,
}

impl Position {
    /// Generates all legal moves for the side to move.
    ///
    /// Every pseudo-legal move is played on a copy of this position and kept only if the mover's
    /// King is not attacked afterwards.
    ///
    /// # Example
    /// ```
    /// # use budget_chess::Position;
    /// let position = Position::default();
    /// assert_eq!(position.legal_moves().len(), 20);
    /// ```
    pub fn legal_moves(&self) -> MoveList {
        let mover = self.side_to_move();
        let mut moves = self.pseudo_legal_moves();

        moves.retain(|ply| {
            // The promotion choice cannot affect the safety of the mover's King
            let leaves_king_safe = !self.with_move_made(*ply, None).is_in_check(mover);
            if !leaves_king_safe {
                trace!("Rejecting {ply:?}: it leaves the {mover} King in check");
            }
            leaves_king_safe
        });

        moves
    }

    /// Generates all pseudo-legal moves for the side to move.
    ///
    /// These follow the movement rules of every piece, but may leave the mover's own King attacked.
    pub fn pseudo_legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();

        for (from, piece) in self.pieces(self.side_to_move()) {
            self.generate_piece_moves(from, piece, &mut moves);
        }

        moves
    }

    /// Generates the pseudo-legal moves of the piece on `from` into `moves`.
    fn generate_piece_moves(&self, from: Square, piece: Piece, moves: &mut MoveList) {
        match piece.kind() {
            PieceKind::Queen => {
                self.generate_ray_moves(from, &Direction::ORTHODIAGONALS, SLIDER_RANGE, CaptureMode::Optional, moves)
            }
            PieceKind::Rook => {
                self.generate_ray_moves(from, &Direction::ORTHOGONALS, SLIDER_RANGE, CaptureMode::Optional, moves)
            }
            PieceKind::Bishop => {
                self.generate_ray_moves(from, &Direction::DIAGONALS, SLIDER_RANGE, CaptureMode::Optional, moves)
            }
            PieceKind::Knight => {
                self.generate_ray_moves(from, &Direction::KNIGHT_HOPS, 1, CaptureMode::Optional, moves)
            }
            PieceKind::King => {
                self.generate_ray_moves(from, &Direction::ORTHODIAGONALS, 1, CaptureMode::Optional, moves);
                self.generate_castling_moves(from, piece.side(), moves);
            }
            PieceKind::Pawn => self.generate_pawn_moves(from, piece.side(), moves),
        }
    }

    /// Walks outward from `from` along each of `directions`, pushing every reachable destination.
    ///
    /// A walk never continues past the first occupied square. Whether that square is included
    /// depends on its owner and on `mode`.
    pub fn generate_ray_moves(
        &self,
        from: Square,
        directions: &[Direction],
        range: u8,
        mode: CaptureMode,
        moves: &mut MoveList,
    ) {
        let Some(mover) = self.piece_at(from).map(|piece| piece.side()) else {
            return;
        };

        for &direction in directions {
            for to in from.ray(direction, range) {
                match self.piece_at(to) {
                    None if mode != CaptureMode::Mandatory => moves.push(Ply::new(from, to)),
                    None => {}
                    Some(occupant) => {
                        if occupant.side() != mover && mode != CaptureMode::Impossible {
                            moves.push(Ply::new(from, to));
                        }
                        break;
                    }
                }
            }
        }
    }

    fn generate_pawn_moves(&self, from: Square, side: Side, moves: &mut MoveList) {
        let forward = Direction::new(0, side.forward());
        let range = if from.rank() == side.pawn_rank() { 2 } else { 1 };
        self.generate_ray_moves(from, &[forward], range, CaptureMode::Impossible, moves);

        let diagonals = [Direction::new(-1, side.forward()), Direction::new(1, side.forward())];
        self.generate_ray_moves(from, &diagonals, 1, CaptureMode::Mandatory, moves);

        // The en passant target is always empty, so it needs to be checked separately
        if let Some(ep_square) = self.ep_square() {
            for to in diagonals.into_iter().filter_map(|dir| from.offset(dir)) {
                if to == ep_square {
                    moves.push(Ply::new(from, to));
                }
            }
        }
    }

    /// Generates the two-file King moves that castle.
    ///
    /// Requires the right for that wing, the King on its home square with its own Rook in the corner,
    /// every square between them empty, and neither the King's square, the square it crosses nor its
    /// destination attacked.
    fn generate_castling_moves(&self, from: Square, side: Side, moves: &mut MoveList) {
        let rights = self.castling_rights(side);
        if rights.is_empty()
            || from != Square::new_unchecked(4, side.back_rank())
            || self.is_square_attacked(from, side)
        {
            return;
        }

        for wing in [CastlingRights::KINGSIDE, CastlingRights::QUEENSIDE] {
            if !rights.contains(wing) {
                continue;
            }

            let rook_square = Square::new_unchecked(wing.rook_file(), side.back_rank());
            if self.piece_at(rook_square) != Some(Piece::new(side, PieceKind::Rook)) {
                continue;
            }

            let step = if wing == CastlingRights::KINGSIDE { 1 } else { -1 };
            let between = from.file().abs_diff(rook_square.file()) - 1;
            let path_is_clear = from
                .ray(Direction::new(step, 0), between)
                .all(|sq| !self.has(sq));

            let king_path_is_safe = from
                .ray(Direction::new(step, 0), 2)
                .all(|sq| !self.is_square_attacked(sq, side));

            if path_is_clear && king_path_is_safe {
                if let Some(to) = from.offset(Direction::new(2 * step, 0)) {
                    moves.push(Ply::new(from, to));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destinations(position: &Position, from: Square) -> Vec<Square> {
        let mut targets = position
            .legal_moves()
            .into_iter()
            .filter(|ply| ply.from() == from)
            .map(|ply| ply.to())
            .collect::<Vec<_>>();
        targets.sort();
        targets
    }

    #[test]
    fn test_sliders_stop_at_blockers() {
        // Rook on d4, own Pawn on d6, enemy Pawn on f4
        let pos = Position::from_fen("k7/8/3P4/8/3R1p2/8/8/7K w - - 0 1").unwrap();
        assert_eq!(
            destinations(&pos, Square::D4),
            [
                Square::D1,
                Square::D2,
                Square::D3,
                Square::A4,
                Square::B4,
                Square::C4,
                Square::E4,
                Square::F4,
                Square::D5,
            ]
        );
    }

    #[test]
    fn test_capture_modes() {
        let pos = Position::from_fen("k7/8/8/2p1p3/3P4/8/8/7K w - - 0 1").unwrap();

        let mut moves = MoveList::new();
        pos.generate_ray_moves(Square::D4, &Direction::DIAGONALS, 1, CaptureMode::Mandatory, &mut moves);
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|ply| pos.has(ply.to())));

        moves.clear();
        pos.generate_ray_moves(Square::D4, &Direction::DIAGONALS, 1, CaptureMode::Impossible, &mut moves);
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|ply| !pos.has(ply.to())));

        moves.clear();
        pos.generate_ray_moves(Square::D4, &Direction::DIAGONALS, 1, CaptureMode::Optional, &mut moves);
        assert_eq!(moves.len(), 4);
    }

    #[test]
    fn test_pawn_pushes() {
        let pos = Position::default();
        assert_eq!(destinations(&pos, Square::E2), [Square::E3, Square::E4]);

        // A blocked Pawn cannot move, and cannot jump the blocker
        let pos = Position::from_fen("k7/8/8/8/8/4n3/4P3/7K w - - 0 1").unwrap();
        assert!(destinations(&pos, Square::E2).is_empty());
        let pos = Position::from_fen("k7/8/8/8/4n3/8/4P3/7K w - - 0 1").unwrap();
        assert_eq!(destinations(&pos, Square::E2), [Square::E3]);

        // Only one step once off the home rank
        let pos = Position::from_fen("k7/8/8/8/8/4P3/8/7K w - - 0 1").unwrap();
        assert_eq!(destinations(&pos, Square::E3), [Square::E4]);
    }

    #[test]
    fn test_en_passant_is_generated() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1")
                .unwrap();
        assert_eq!(destinations(&pos, Square::E5), [Square::D6, Square::E6]);
    }

    #[test]
    fn test_castling_generation() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let king_moves = destinations(&pos, Square::E1);
        assert!(king_moves.contains(&Square::G1));
        assert!(king_moves.contains(&Square::C1));

        // Blocked on the queenside by a Knight on b1
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1").unwrap();
        let king_moves = destinations(&pos, Square::E1);
        assert!(king_moves.contains(&Square::G1));
        assert!(!king_moves.contains(&Square::C1));

        // No rights, no castling
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1").unwrap();
        let king_moves = destinations(&pos, Square::E1);
        assert!(!king_moves.contains(&Square::G1));
        assert!(!king_moves.contains(&Square::C1));
    }

    #[test]
    fn test_no_castling_out_of_through_or_into_check() {
        // In check from e8
        let pos = Position::from_fen("4r2k/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(!destinations(&pos, Square::E1).contains(&Square::G1));
        assert!(!destinations(&pos, Square::E1).contains(&Square::C1));

        // f1 is attacked, d1 is not
        let pos = Position::from_fen("5r1k/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(!destinations(&pos, Square::E1).contains(&Square::G1));
        assert!(destinations(&pos, Square::E1).contains(&Square::C1));

        // g1 is attacked
        let pos = Position::from_fen("6rk/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(!destinations(&pos, Square::E1).contains(&Square::G1));

        // Only b1 is attacked, which the King never crosses
        let pos = Position::from_fen("1r5k/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(destinations(&pos, Square::E1).contains(&Square::C1));
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        // The e2 Knight is pinned to its King by the e8 Rook
        let pos = Position::from_fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(destinations(&pos, Square::E2).is_empty());
        assert!(!pos.pseudo_legal_moves().is_empty());
    }
}
