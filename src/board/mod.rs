/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Detecting whether squares are attacked, and by whom.
mod attacks;

/// Move notifications for external collaborators.
mod events;

/// A game of chess: a position with its legal moves kept up to date.
mod game;

/// Pseudo-legal move generation and the legality filter.
mod movegen;

/// Plies, move lists, and move outcomes.
mod moves;

/// Perft (performance test) for validating move generation.
mod perft;

/// Sides, piece kinds, and pieces.
mod piece;

/// Board contents, FEN, and the move executor.
mod position;

/// Squares and directions on the board.
mod square;

/// Misc constants.
mod utils;

pub use attacks::*;
pub use events::*;
pub use game::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use square::*;
pub use utils::*;
