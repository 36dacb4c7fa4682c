/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use budget_chess::{Engine, EngineCommand};
use clap::{error::ErrorKind, Parser};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut engine = Engine::new();

    // Skip the executable name, and allow quoted commands like "perft 4"
    let args = std::env::args()
        .skip(1)
        .flat_map(|arg| {
            arg.split_ascii_whitespace()
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    // Try the longest run of arguments first, shrinking until something parses as a command
    let mut arg_idx = args.len();
    let mut parsed_idx = 0;
    while parsed_idx < arg_idx {
        let slice = &args[parsed_idx..arg_idx];

        match EngineCommand::try_parse_from(slice) {
            Ok(cmd) => {
                if let Err(e) = engine.send_command(cmd) {
                    eprintln!("{e}");
                }
                parsed_idx = arg_idx;
                arg_idx = args.len();
            }

            // Edge case: `--help` and `--version` are both "error" cases according to Clap
            Err(e)
                if matches!(e.kind(), ErrorKind::DisplayHelp)
                    || matches!(e.kind(), ErrorKind::DisplayVersion) =>
            {
                println!("{e}");
                parsed_idx = arg_idx;
                arg_idx = args.len();
            }

            Err(e) => {
                // Nothing starting here parses; report it and move on
                if arg_idx == parsed_idx + 1 {
                    eprintln!("ERROR on input {slice:?}:\n{e}");
                    parsed_idx += 1;
                    arg_idx = args.len();
                } else {
                    arg_idx -= 1;
                }
            }
        }
    }

    if let Err(e) = engine.run() {
        eprintln!("{} encountered an error: {e}", env!("CARGO_PKG_NAME"));
    }
}
