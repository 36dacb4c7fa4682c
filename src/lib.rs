/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// All chess rules: board, move generation, check detection, and move execution.
mod board;

/// The command set understood by the engine shell.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

pub use board::*;
pub use cli::*;
pub use engine::*;
