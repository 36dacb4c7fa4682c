/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use budget_chess::{perft, perft_generic, Position, FEN_KIWIPETE, FEN_STARTPOS};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let position = Position::from_fen(fen).unwrap();
    let res = perft(&position, depth);
    assert_eq!(res, expected, "PERFT({depth}) failed on {fen}");
}

#[cfg(test)]
mod promotion_perft {
    use crate::test_perft_fen_nodes;

    const FEN: &str = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1 ";

    #[test]
    fn test_promotion_perft_1() {
        test_perft_fen_nodes(1, FEN, 24);
    }
    #[test]
    fn test_promotion_perft_2() {
        test_perft_fen_nodes(2, FEN, 496);
    }
    #[test]
    fn test_promotion_perft_3() {
        test_perft_fen_nodes(3, FEN, 9483);
    }
    #[test]
    fn test_promotion_perft_4() {
        test_perft_fen_nodes(4, FEN, 182838);
    }
}

#[cfg(test)]
mod startpos_perft {
    use super::*;

    #[test]
    fn test_startpos_perft_1() {
        test_perft_fen_nodes(1, FEN_STARTPOS, 20);
    }
    #[test]
    fn test_startpos_perft_2() {
        test_perft_fen_nodes(2, FEN_STARTPOS, 400);
    }
    #[test]
    fn test_startpos_perft_3() {
        test_perft_fen_nodes(3, FEN_STARTPOS, 8902);
    }
    #[test]
    fn test_startpos_perft_4() {
        test_perft_fen_nodes(4, FEN_STARTPOS, 197281);
    }

    #[test]
    fn test_startpos_leaf_counting() {
        let position = Position::default();
        assert_eq!(perft_generic::<false, false>(&position, 3), 8902);
    }
}

#[cfg(test)]
mod kiwipete_perft {
    use super::*;

    #[test]
    fn test_kiwipete_perft_1() {
        test_perft_fen_nodes(1, FEN_KIWIPETE, 48);
    }
    #[test]
    fn test_kiwipete_perft_2() {
        test_perft_fen_nodes(2, FEN_KIWIPETE, 2039);
    }
    #[test]
    fn test_kiwipete_perft_3() {
        test_perft_fen_nodes(3, FEN_KIWIPETE, 97862);
    }
}

#[cfg(test)]
mod position_3_perft {
    use super::*;

    const FEN: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

    #[test]
    fn test_position_3_perft_1() {
        test_perft_fen_nodes(1, FEN, 14);
    }
    #[test]
    fn test_position_3_perft_2() {
        test_perft_fen_nodes(2, FEN, 191);
    }
    #[test]
    fn test_position_3_perft_3() {
        test_perft_fen_nodes(3, FEN, 2812);
    }
    #[test]
    fn test_position_3_perft_4() {
        test_perft_fen_nodes(4, FEN, 43238);
    }
}

#[cfg(test)]
mod position_4_perft {
    use super::*;

    const FEN: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    // The same position, mirrored with colors swapped
    const FEN_MIRRORED: &str = "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1";

    #[test]
    fn test_position_4_perft_1() {
        test_perft_fen_nodes(1, FEN, 6);
        test_perft_fen_nodes(1, FEN_MIRRORED, 6);
    }
    #[test]
    fn test_position_4_perft_2() {
        test_perft_fen_nodes(2, FEN, 264);
        test_perft_fen_nodes(2, FEN_MIRRORED, 264);
    }
    #[test]
    fn test_position_4_perft_3() {
        test_perft_fen_nodes(3, FEN, 9467);
        test_perft_fen_nodes(3, FEN_MIRRORED, 9467);
    }
}

#[cfg(test)]
mod position_5_perft {
    use super::*;

    const FEN: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    #[test]
    fn test_position_5_perft_1() {
        test_perft_fen_nodes(1, FEN, 44);
    }
    #[test]
    fn test_position_5_perft_2() {
        test_perft_fen_nodes(2, FEN, 1486);
    }
    #[test]
    fn test_position_5_perft_3() {
        test_perft_fen_nodes(3, FEN, 62379);
    }
}
