/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;

use crate::Square;

/// A command to be sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<COMMAND> [ARGS]")
)]
pub enum EngineCommand {
    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Apply the provided move to the game, if it is legal.
    ///
    /// Moves are given in coordinate form, such as `e2e4`, with a trailing letter for promotions (`e7e8n`).
    #[command(name = "move", alias = "m")]
    MakeMove { mv_string: String },

    /// Shows all legal moves in the current position, or for a specific piece.
    Moves {
        square: Option<Square>,

        /// If set, moves will be sorted in alphabetical order.
        ///
        /// By default, moves are listed in generation order.
        #[arg(short, long, default_value = "false")]
        sort: bool,
    },

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Set up a new game: `position startpos` or `position fen <FEN>`, optionally followed by `moves <MOVES>...`.
    Position {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Print whether the side to move is in check, checkmated, or stalemated.
    Status,
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a line of whitespace-separated input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("d".parse::<EngineCommand>().unwrap(), EngineCommand::Display);
        assert_eq!("quit".parse::<EngineCommand>().unwrap(), EngineCommand::Exit);
        assert_eq!(
            "m e2e4".parse::<EngineCommand>().unwrap(),
            EngineCommand::MakeMove {
                mv_string: String::from("e2e4")
            }
        );
        assert_eq!(
            "moves e2".parse::<EngineCommand>().unwrap(),
            EngineCommand::Moves {
                square: Some(Square::E2),
                sort: false
            }
        );
        assert_eq!(
            "perft 3".parse::<EngineCommand>().unwrap(),
            EngineCommand::Perft { depth: 3 }
        );

        assert!("perft three".parse::<EngineCommand>().is_err());
        assert!("moves z9".parse::<EngineCommand>().is_err());
        assert!("castle".parse::<EngineCommand>().is_err());
    }

    #[test]
    fn test_parse_position_keeps_fen_fields() {
        let cmd = "position fen 4k3/8/8/8/8/8/8/4K3 w - - 0 1 moves e1e2"
            .parse::<EngineCommand>()
            .unwrap();

        let EngineCommand::Position { args } = cmd else {
            panic!("Expected a position command, got {cmd:?}");
        };
        assert_eq!(args.len(), 9);
        assert_eq!(args[3], "-");
        assert_eq!(args[8], "e1e2");
    }
}
