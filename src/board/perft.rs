/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Instant;

use super::{PieceKind, Ply, Position};

/// Perform a perft at the specified depth, collecting only data about the number of possible positions (nodes).
///
/// A promoting [`Ply`] counts once per promotion choice, so the results match published reference values.
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
/// If you do *not* want to use bulk counting, use [`perft_generic`].
///
/// # Example
/// ```
/// # use budget_chess::{perft, Position};
/// assert_eq!(perft(&Position::default(), 2), 400);
/// ```
#[inline(always)]
pub fn perft(position: &Position, depth: usize) -> u64 {
    perft_generic::<true, false>(position, depth)
}

/// Perform a splitperft at the specified depth, printing the number of nodes reachable after each
/// move available at the root node.
#[inline(always)]
pub fn splitperft(position: &Position, depth: usize) -> u64 {
    perft_generic::<true, true>(position, depth)
}

/// Generic version of `perft` that allows you to specify whether to perform bulk counting and splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will perform a splitperft.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(position: &Position, depth: usize) -> u64 {
    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if BULK && !SPLIT && depth == 1 {
        return position
            .legal_moves()
            .into_iter()
            .map(|ply| choices(position, ply).len() as u64)
            .sum();
    }
    // Recursion limit; return 1, since we're fathoming this node.
    else if depth == 0 {
        return 1;
    }

    // Recursively accumulate the nodes from the remaining depths
    position.legal_moves().into_iter().fold(0, |nodes, ply| {
        choices(position, ply).iter().fold(nodes, |nodes, &promotion| {
            let new_nodes =
                perft_generic::<BULK, false>(&position.with_move_made(ply, promotion), depth - 1);

            if SPLIT {
                match promotion {
                    Some(kind) => println!("{ply}{}\t{new_nodes}", kind.to_uci()),
                    None => println!("{ply}\t{new_nodes}"),
                }
            }

            nodes + new_nodes
        })
    })
}

/// Runs a perft (or splitperft, if `SPLIT` is set) and prints the total, elapsed time and speed.
pub fn print_perft<const BULK: bool, const SPLIT: bool>(position: &Position, depth: usize) -> u64 {
    let now = Instant::now();
    let nodes = perft_generic::<BULK, SPLIT>(position, depth);
    let elapsed = now.elapsed();

    let nps = nodes as f64 / elapsed.as_secs_f64();
    println!("\n{nodes} nodes in {elapsed:.1?} ({nps:.0} nps)");

    nodes
}

/// Every way `ply` can be completed: all four promotion choices for a promoting Pawn, otherwise none.
#[inline(always)]
fn choices(position: &Position, ply: Ply) -> &'static [Option<PieceKind>] {
    const PROMOTIONS: [Option<PieceKind>; 4] = [
        Some(PieceKind::Queen),
        Some(PieceKind::Rook),
        Some(PieceKind::Bishop),
        Some(PieceKind::Knight),
    ];

    if position.is_promotion(ply) {
        &PROMOTIONS
    } else {
        &[None]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_KIWIPETE;

    #[test]
    fn test_bulk_and_leaf_counting_agree() {
        let position = Position::from_fen(FEN_KIWIPETE).unwrap();
        assert_eq!(
            perft_generic::<true, false>(&position, 2),
            perft_generic::<false, false>(&position, 2)
        );
    }

    #[test]
    fn test_promotions_count_four_times() {
        let position = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        // 5 King moves + 4 ways to promote
        assert_eq!(perft(&position, 1), 9);
        assert_eq!(perft_generic::<false, false>(&position, 1), 9);
    }
}
