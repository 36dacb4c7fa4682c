/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};

use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};

use crate::{
    print_perft, ChannelObserver, EngineCommand, Game, MoveEvent, MoveOutcome, Square,
    FEN_STARTPOS,
};

/// A line-oriented shell over a single [`Game`].
#[derive(Debug)]
pub struct Engine {
    /// The game being played.
    ///
    /// This is modified whenever moves are played or a new position is given.
    game: Game,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,

    /// Handed to every new [`Game`] so that applied moves can be announced.
    events_tx: Sender<MoveEvent>,

    /// Drained after every command.
    events_rx: Receiver<MoveEvent>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        let (events_tx, events_rx) = channel();

        let mut game = Game::default();
        game.subscribe(ChannelObserver(events_tx.clone()));

        Self {
            game,
            sender,
            receiver,
            events_tx,
            events_rx,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Fetches the game currently being played.
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.sender
            .send(command)
            .context("Failed to send command to engine")
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        info!("Starting {}", self.name());

        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                warn!("Input handler thread stopping: {err}");
            }
        });

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            if cmd == EngineCommand::Exit {
                break;
            }

            // Keep running, even on error
            if let Err(e) = self.execute(cmd) {
                eprintln!("Error: {e}");
            }
        }

        Ok(())
    }

    /// Executes a single [`EngineCommand`], other than [`EngineCommand::Exit`].
    pub fn execute(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Display => println!("{}", self.game),

            EngineCommand::Exit => {}

            EngineCommand::Fen => println!("{}", self.game.to_fen()),

            EngineCommand::MakeMove { mv_string } => {
                self.game.make_move_uci(&mv_string)?;
            }

            EngineCommand::Moves { square, sort } => self.moves(square, sort),

            EngineCommand::Perft { depth } => {
                print_perft::<true, false>(self.game.position(), depth);
            }

            EngineCommand::Position { args } => self.position(&args)?,

            EngineCommand::Splitperft { depth } => {
                print_perft::<true, true>(self.game.position(), depth);
            }

            EngineCommand::Status => println!("{}", announcement(self.game.status())),
        }

        self.announce_events();
        Ok(())
    }

    /// Executes the `moves` command, printing every legal move (optionally only those from `square`).
    fn moves(&self, square: Option<Square>, sort: bool) {
        let mut moves = match square {
            Some(square) => self.game.legal_moves_from(square).collect::<Vec<_>>(),
            None => self.game.legal_moves().to_vec(),
        };

        if sort {
            moves.sort_by_key(|ply| ply.to_uci());
        }

        // If there are none, print "(none)"
        let moves_string = if moves.is_empty() {
            String::from("(none)")
        } else {
            // Otherwise, join them by comma-space
            moves
                .into_iter()
                .map(|ply| ply.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("{moves_string}");
    }

    /// Executes the `position` command: `startpos` or `fen <FEN>`, then an optional `moves` list.
    fn position(&mut self, args: &[String]) -> Result<()> {
        let moves_idx = args.iter().position(|arg| arg == "moves");
        let (setup, moves) = match moves_idx {
            Some(idx) => (&args[..idx], &args[idx + 1..]),
            None => (args, &args[args.len()..]),
        };

        let fen = match setup.split_first() {
            None => FEN_STARTPOS.to_string(),
            Some((kind, rest)) if kind == "startpos" && rest.is_empty() => {
                FEN_STARTPOS.to_string()
            }
            Some((kind, rest)) if kind == "fen" && !rest.is_empty() => rest.join(" "),
            Some((kind, _)) => bail!("Expected `startpos` or `fen <FEN>`. Got {kind:?}"),
        };

        // Build the whole game before replacing the current one, so a bad move changes nothing
        let mut game = Game::from_fen(&fen)?;
        for mv in moves {
            game.make_move_uci(mv)
                .map_err(|err| anyhow!("Cannot apply {mv:?} to {fen:?}: {err}"))?;
        }

        self.new_game(game);
        Ok(())
    }

    /// Replaces the current game with `game`, subscribing to its move events.
    fn new_game(&mut self, mut game: Game) {
        game.subscribe(ChannelObserver(self.events_tx.clone()));
        self.game = game;
    }

    /// Prints a line for every move applied since the last call.
    fn announce_events(&self) {
        for event in self.events_rx.try_iter() {
            let text = announcement(event.outcome);
            match event.capture_square {
                Some(square) => println!("{:?} (captured on {square}): {text}", event.ply),
                None => println!("{:?}: {text}", event.ply),
            }

            if event.outcome.is_game_over() {
                println!("Game over. Use `position` to start a new game.");
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns the flags of a [`MoveOutcome`] into user-facing text, one phrase per condition.
pub fn announcement(outcome: MoveOutcome) -> String {
    let phrases = [
        (MoveOutcome::ILLEGAL, "Illegal move"),
        (MoveOutcome::CHECKMATE, "Checkmate!"),
        (MoveOutcome::STALEMATE, "Stalemate!"),
        (MoveOutcome::CASTLE, "Castle"),
        (MoveOutcome::EN_PASSANT, "En passant"),
        (MoveOutcome::PROMOTION, "Promotion"),
    ];

    let mut text = phrases
        .into_iter()
        .filter(|(flag, _)| outcome.contains(*flag))
        .map(|(_, phrase)| phrase)
        .collect::<Vec<_>>();

    // Checkmate already says it all
    if outcome.contains(MoveOutcome::CHECK) && !outcome.contains(MoveOutcome::CHECKMATE) {
        text.push("Check!");
    }

    if text.is_empty() {
        String::from("-")
    } else {
        text.join(", ")
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line from stdin")?;

        // For ctrl + d
        if 0 == bytes {
            // Send the Exit command and exit this function
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        match buf.parse::<EngineCommand>() {
            // If successful, send the command to the engine
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_announcements() {
        assert_eq!(announcement(MoveOutcome::LEGAL), "-");
        assert_eq!(announcement(MoveOutcome::ILLEGAL), "Illegal move");
        assert_eq!(
            announcement(MoveOutcome::LEGAL | MoveOutcome::CHECK | MoveOutcome::CHECKMATE),
            "Checkmate!"
        );
        assert_eq!(
            announcement(MoveOutcome::LEGAL | MoveOutcome::PROMOTION | MoveOutcome::CHECK),
            "Promotion, Check!"
        );
    }

    #[test]
    fn test_position_command() {
        let mut engine = Engine::new();
        engine
            .execute("position startpos moves e2e4 e7e5".parse().unwrap())
            .unwrap();
        assert_eq!(
            engine.game().to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 1"
        );

        // A bad move leaves the previous game in place
        assert!(engine
            .execute("position startpos moves e2e5".parse().unwrap())
            .is_err());
        assert_eq!(engine.game().legal_moves().len(), 29);

        engine
            .execute("position fen 4k3/8/8/8/8/8/8/4K3 b - - 0 1".parse().unwrap())
            .unwrap();
        assert_eq!(engine.game().to_fen(), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");

        assert!(engine.execute("position kiwipete".parse().unwrap()).is_err());
    }

    #[test]
    fn test_illegal_move_command_is_an_error() {
        let mut engine = Engine::new();
        assert!(engine.execute("move e2e5".parse().unwrap()).is_err());
        assert!(engine.execute("move e2e4".parse().unwrap()).is_ok());
        assert_eq!(engine.game().side_to_move(), crate::Side::Black);
    }
}
