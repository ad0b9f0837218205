//! The single task that owns all mutable game state.
//!
//! Every connection is represented to this actor purely through [`Event`]s
//! delivered over one `mpsc` channel. Because the actor drains that channel
//! one event at a time, no `Mutex` is needed anywhere in the core — state
//! mutation is already fully serialized, the same guarantee spec.md's
//! single-threaded readiness loop gave for free.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::dictionary::{parse_guess, Dictionary, Game, GuessOutcome};
use crate::logger::Logger;
use crate::protocol::{self, MAX_NAME};
use crate::registry::{ClientId, Registry};
use crate::turn::Turn;

pub enum Event {
    Connected {
        id: ClientId,
        addr: SocketAddr,
        outbox: UnboundedSender<String>,
        reader_handle: JoinHandle<()>,
    },
    Line {
        id: ClientId,
        line: String,
    },
    Oversized {
        id: ClientId,
    },
    Disconnected {
        id: ClientId,
    },
}

enum ServerEvent<'a> {
    Connected(SocketAddr),
    Named { addr: SocketAddr, name: &'a str },
    NameRejected { addr: SocketAddr, reason: &'a str },
    Guess { name: &'a str, letter: char },
    Disconnected { name: Option<&'a str> },
    Rollover { word: &'a str },
}

impl fmt::Display for ServerEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerEvent::Connected(addr) => write!(f, "connection from {addr}"),
            ServerEvent::Named { addr, name } => write!(f, "{addr} is now known as {name}"),
            ServerEvent::NameRejected { addr, reason } => {
                write!(f, "{addr} rejected as a name: {reason}")
            }
            ServerEvent::Guess { name, letter } => write!(f, "{name} guessed '{letter}'"),
            ServerEvent::Disconnected { name: Some(name) } => write!(f, "{name} disconnected"),
            ServerEvent::Disconnected { name: None } => write!(f, "unnamed client disconnected"),
            ServerEvent::Rollover { word } => write!(f, "new game started, word is {word}"),
        }
    }
}

pub struct GameActor {
    registry: Registry,
    turn: Turn,
    game: Game,
    dictionary: Dictionary,
    reader_handles: HashMap<ClientId, JoinHandle<()>>,
    addrs: HashMap<ClientId, SocketAddr>,
    logger: Logger,
}

impl GameActor {
    pub fn new(dictionary: Dictionary, logger: Logger) -> Self {
        let word = dictionary.random_word().to_string();
        Self {
            registry: Registry::new(),
            turn: Turn::Empty,
            game: Game::new(&word),
            dictionary,
            reader_handles: HashMap::new(),
            addrs: HashMap::new(),
            logger,
        }
    }

    pub async fn run(mut self, mut events: UnboundedReceiver<Event>) {
        while let Some(event) = events.recv().await {
            match event {
                Event::Connected {
                    id,
                    addr,
                    outbox,
                    reader_handle,
                } => self.on_connected(id, addr, outbox, reader_handle),
                Event::Line { id, line } => self.on_line(id, line),
                Event::Oversized { id } => self.on_oversized(id),
                Event::Disconnected { id } => self.remove_client(id),
            }
        }
    }

    fn on_connected(
        &mut self,
        id: ClientId,
        addr: SocketAddr,
        outbox: UnboundedSender<String>,
        reader_handle: JoinHandle<()>,
    ) {
        self.logger.info(ServerEvent::Connected(addr));
        self.addrs.insert(id, addr);
        self.reader_handles.insert(id, reader_handle);
        self.registry.add_applicant(id, outbox);
        self.safe_write(id, protocol::WELCOME_MSG);
    }

    fn on_oversized(&mut self, id: ClientId) {
        self.safe_write(id, protocol::oversized_input());
    }

    fn on_line(&mut self, id: ClientId, line: String) {
        if self.registry.find_applicant(id).is_some() {
            self.handle_applicant_line(id, line);
        } else if self.registry.find_player(id).is_some() {
            self.handle_player_line(id, line);
        }
        // Unknown ids have already been removed; the event simply races the
        // removal and is dropped.
    }

    fn handle_applicant_line(&mut self, id: ClientId, line: String) {
        let addr = self.addrs.get(&id).copied();
        let name = line.trim().to_string();

        if name.is_empty() {
            self.safe_write(id, protocol::please_enter_name());
            return;
        }
        if self.registry.name_taken(&name) {
            if let Some(addr) = addr {
                self.logger.verbose(ServerEvent::NameRejected {
                    addr,
                    reason: "name taken",
                });
            }
            self.safe_write(id, protocol::name_taken());
            return;
        }

        let truncated_warning = name.len() >= MAX_NAME;
        let seated_name: String = if truncated_warning {
            name.chars().take(MAX_NAME - 1).collect()
        } else {
            name
        };

        let applicant = self.registry.remove_applicant(id).expect("checked above");
        if let Some(addr) = addr {
            self.logger.info(ServerEvent::Named {
                addr,
                name: &seated_name,
            });
        }
        self.registry.seat_player(applicant, seated_name.clone());

        if truncated_warning {
            self.safe_write(id, protocol::name_too_long());
        }

        self.broadcast(&protocol::join_announcement(&seated_name));
        let status = self.game.status_message();
        self.safe_write(id, &status);

        if self.turn == Turn::Empty {
            self.turn = self.turn.advance(&self.registry);
        }
        self.announce_turn();
    }

    fn handle_player_line(&mut self, id: ClientId, line: String) {
        if !self.turn.is_holding(id) {
            self.safe_write(id, protocol::not_your_turn());
            return;
        }

        let Some(letter) = parse_guess(line.trim()) else {
            self.safe_write(id, protocol::invalid_guess());
            return;
        };
        if self.game.already_guessed(letter) {
            self.safe_write(id, protocol::invalid_guess());
            return;
        }

        let name = self
            .registry
            .find_player(id)
            .map(|p| p.name.clone())
            .expect("caller verified turn holder is seated");

        self.logger.verbose(ServerEvent::Guess {
            name: &name,
            letter,
        });

        let outcome = self.game.guess(letter);

        // "<name> guesses: <letter>" is announced only when the guess keeps
        // the game going — never on a win or a loss, which get their own
        // dedicated announcement instead.
        if matches!(outcome, GuessOutcome::Hit | GuessOutcome::Miss) {
            self.broadcast(&protocol::guess_announcement(&name, letter));
        }

        match outcome {
            GuessOutcome::Hit => {
                // Turn is preserved across a correct guess.
                let status = self.game.status_message();
                self.broadcast(&status);
                self.announce_turn();
            }
            GuessOutcome::Miss => {
                self.safe_write(id, &protocol::letter_not_in_word(letter));
                self.turn = self.turn.advance(&self.registry);
                let status = self.game.status_message();
                self.broadcast(&status);
                self.announce_turn();
            }
            GuessOutcome::Won => {
                // Turn is preserved: the winner opens the next round.
                let word = self.game.word().to_string();
                self.announce_winner(&word, &name, id);
                self.start_new_round(&word);
            }
            GuessOutcome::OutOfGuesses => {
                let word = self.game.word().to_string();
                self.broadcast(&protocol::no_more_guesses(&word));
                self.turn = self.turn.advance(&self.registry);
                self.start_new_round(&word);
            }
        }
    }

    fn announce_winner(&mut self, word: &str, winner_name: &str, winner_id: ClientId) {
        let ids: Vec<ClientId> = self.registry.players.iter().map(|p| p.id).collect();
        for pid in ids {
            if pid == winner_id {
                self.safe_write(pid, &protocol::winner_announcement_self(word));
            } else {
                self.safe_write(pid, &protocol::winner_announcement_other(word, winner_name));
            }
        }
    }

    fn start_new_round(&mut self, finished_word: &str) {
        self.logger.info(ServerEvent::Rollover { word: finished_word });
        let next_word = self.dictionary.random_word().to_string();
        self.game.reinit(&next_word);
        let status = self.game.status_message();
        self.broadcast(&status);
        if self.turn != Turn::Empty {
            self.announce_turn();
        }
    }

    /// Tell the whole table whose turn it is: everyone but the holder gets
    /// "It's `<name>`'s turn.", the holder gets the guess prompt instead.
    fn announce_turn(&mut self) {
        let Some(holder_id) = self.turn.holder() else {
            return;
        };
        let Some(name) = self.registry.find_player(holder_id).map(|p| p.name.clone()) else {
            return;
        };
        let turn_msg = protocol::turn_announcement(&name);
        let ids: Vec<ClientId> = self.registry.players.iter().map(|p| p.id).collect();
        for pid in ids {
            if pid == holder_id {
                self.safe_write(pid, protocol::your_guess_prompt());
            } else {
                self.safe_write(pid, &turn_msg);
            }
        }
    }

    /// Send `msg` to one client. A failed send means the peer is already
    /// gone on the wire even though we haven't processed its disconnect
    /// event yet — remove it immediately so later broadcasts don't retry it.
    fn safe_write(&mut self, id: ClientId, msg: &str) {
        let sent = if let Some(a) = self.registry.find_applicant(id) {
            a.outbox.send(msg.to_string()).is_ok()
        } else if let Some(p) = self.registry.find_player(id) {
            p.outbox.send(msg.to_string()).is_ok()
        } else {
            return;
        };
        if !sent {
            self.remove_client(id);
        }
    }

    /// Broadcast to every seated player. The id list is snapshotted before
    /// the loop starts so a mid-loop `remove_client` (triggered by a failed
    /// write to an earlier target) can't invalidate the traversal.
    fn broadcast(&mut self, msg: &str) {
        let ids: Vec<ClientId> = self.registry.players.iter().map(|p| p.id).collect();
        for id in ids {
            self.safe_write(id, msg);
        }
    }

    fn remove_client(&mut self, id: ClientId) {
        if let Some(handle) = self.reader_handles.remove(&id) {
            handle.abort();
        }
        self.addrs.remove(&id);

        if self.registry.remove_applicant(id).is_some() {
            return;
        }

        let Some(idx) = self.registry.player_index(id) else {
            return;
        };
        let player = self.registry.players.remove(idx);
        self.logger.info(ServerEvent::Disconnected {
            name: Some(&player.name),
        });
        self.broadcast(&protocol::goodbye_announcement(&player.name));

        if self.turn.is_holding(id) {
            self.turn = Turn::after_removal_at(&self.registry, idx);
            self.announce_turn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use tempfile_for_tests::temp_word_file;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    /// Minimal stand-in for a tempfile crate: write a word list to a path
    /// under the OS temp dir and return it. Grounded on not pulling in an
    /// extra dev-dependency the teacher doesn't already carry.
    mod tempfile_for_tests {
        use std::io::Write;

        pub fn temp_word_file(words: &[&str]) -> std::path::PathBuf {
            let mut path = std::env::temp_dir();
            path.push(format!(
                "wordgame-test-dict-{}.txt",
                std::process::id().wrapping_add(words.len() as u32)
            ));
            let mut f = std::fs::File::create(&path).unwrap();
            for w in words {
                writeln!(f, "{w}").unwrap();
            }
            path
        }
    }

    fn dummy_handle() -> JoinHandle<()> {
        tokio::spawn(async { std::future::pending::<()>().await })
    }

    fn connect(
        actor: &mut GameActor,
        id: ClientId,
    ) -> UnboundedReceiver<String> {
        let (tx, rx) = unbounded_channel();
        actor.on_connected(id, "127.0.0.1:1".parse().unwrap(), tx, dummy_handle());
        rx
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn make_actor(words: &[&str]) -> GameActor {
        let path = temp_word_file(words);
        let dict = Dictionary::load(&path).unwrap();
        GameActor::new(dict, Logger::new(0))
    }

    #[tokio::test]
    async fn naming_seats_an_applicant_and_starts_turn() {
        let mut actor = make_actor(&["cat"]);
        let mut rx = connect(&mut actor, 1);
        drain(&mut rx);

        actor.on_line(1, "alice".to_string());
        assert!(actor.registry.find_player(1).is_some());
        assert_eq!(actor.turn, Turn::Holding(1));

        let msgs = drain(&mut rx);
        assert!(msgs.iter().any(|m| m.contains("has just joined")));
        assert!(msgs.iter().any(|m| m.contains("Your guess?")));
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let mut actor = make_actor(&["cat"]);
        let mut rx1 = connect(&mut actor, 1);
        let mut rx2 = connect(&mut actor, 2);
        drain(&mut rx1);
        drain(&mut rx2);

        actor.on_line(1, "alice".to_string());
        actor.on_line(2, "alice".to_string());

        assert!(actor.registry.find_player(2).is_none());
        let msgs = drain(&mut rx2);
        assert!(msgs.iter().any(|m| m.contains("taken")));
    }

    #[tokio::test]
    async fn guessing_out_of_turn_is_rejected() {
        let mut actor = make_actor(&["cat"]);
        let mut rx1 = connect(&mut actor, 1);
        let mut rx2 = connect(&mut actor, 2);
        actor.on_line(1, "alice".to_string());
        actor.on_line(2, "bob".to_string());
        drain(&mut rx1);
        drain(&mut rx2);

        actor.on_line(2, "c".to_string());
        let msgs = drain(&mut rx2);
        assert!(msgs.iter().any(|m| m.contains("not your turn")));
    }

    #[tokio::test]
    async fn winning_guess_announces_and_starts_new_round() {
        let mut actor = make_actor(&["cat"]);
        let mut rx1 = connect(&mut actor, 1);
        actor.on_line(1, "alice".to_string());
        drain(&mut rx1);

        for letter in ['c', 'a', 't'] {
            actor.on_line(1, letter.to_string());
        }
        let msgs = drain(&mut rx1);
        assert!(msgs.iter().any(|m| m.contains("You Win")));
        assert_eq!(actor.game.word(), "cat");
    }

    #[tokio::test]
    async fn removing_the_turn_holder_transfers_to_next_player() {
        let mut actor = make_actor(&["cat"]);
        let mut rx1 = connect(&mut actor, 1);
        let mut rx2 = connect(&mut actor, 2);
        actor.on_line(1, "alice".to_string());
        actor.on_line(2, "bob".to_string());
        drain(&mut rx1);
        drain(&mut rx2);

        assert_eq!(actor.turn, Turn::Holding(1));
        actor.remove_client(1);
        assert_eq!(actor.turn, Turn::Holding(2));

        let msgs = drain(&mut rx2);
        assert!(msgs.iter().any(|m| m.contains("Goodbye") || m.contains("turn")));
    }

    #[tokio::test]
    async fn correct_guess_preserves_turn_and_wrong_guess_advances_it() {
        let mut actor = make_actor(&["cat"]);
        let mut rx1 = connect(&mut actor, 1);
        let mut rx2 = connect(&mut actor, 2);
        actor.on_line(1, "alice".to_string());
        actor.on_line(2, "bob".to_string());
        drain(&mut rx1);
        drain(&mut rx2);

        actor.on_line(1, "c".to_string());
        assert_eq!(actor.turn, Turn::Holding(1));
        drain(&mut rx1);
        drain(&mut rx2);

        actor.on_line(1, "z".to_string());
        assert_eq!(actor.turn, Turn::Holding(2));
    }

    #[tokio::test]
    async fn wrong_guess_is_reported_only_to_the_guesser() {
        let mut actor = make_actor(&["cat"]);
        let mut rx1 = connect(&mut actor, 1);
        let mut rx2 = connect(&mut actor, 2);
        actor.on_line(1, "alice".to_string());
        actor.on_line(2, "bob".to_string());
        drain(&mut rx1);
        drain(&mut rx2);

        actor.on_line(1, "z".to_string());
        let msgs1 = drain(&mut rx1);
        let msgs2 = drain(&mut rx2);
        assert!(msgs1.iter().any(|m| m.contains("is not in the word")));
        assert!(!msgs2.iter().any(|m| m.contains("is not in the word")));
    }

    #[tokio::test]
    async fn turn_announcement_excludes_the_holder() {
        let mut actor = make_actor(&["cat"]);
        let mut rx1 = connect(&mut actor, 1);
        let mut rx2 = connect(&mut actor, 2);
        actor.on_line(1, "alice".to_string());
        drain(&mut rx1);
        actor.on_line(2, "bob".to_string());

        let msgs1 = drain(&mut rx1);
        let msgs2 = drain(&mut rx2);
        assert!(msgs1.iter().any(|m| m.contains("Your guess?")));
        assert!(!msgs1.iter().any(|m| m.contains("It's alice's turn")));
        assert!(msgs2.iter().any(|m| m.contains("It's alice's turn")));
    }

    #[tokio::test]
    async fn winner_keeps_the_turn_into_the_next_round() {
        let mut actor = make_actor(&["cat", "dog"]);
        let mut rx1 = connect(&mut actor, 1);
        let mut rx2 = connect(&mut actor, 2);
        actor.on_line(1, "alice".to_string());
        actor.on_line(2, "bob".to_string());
        drain(&mut rx1);
        drain(&mut rx2);

        // Force the word to "cat" for a deterministic win regardless of
        // which of the two dictionary words was drawn at startup.
        actor.game.reinit("cat");
        for letter in ['c', 'a', 't'] {
            actor.on_line(1, letter.to_string());
        }

        assert_eq!(actor.turn, Turn::Holding(1));
    }

    #[tokio::test]
    async fn removing_last_player_empties_the_turn() {
        let mut actor = make_actor(&["cat"]);
        let _rx1 = connect(&mut actor, 1);
        actor.on_line(1, "alice".to_string());

        actor.remove_client(1);
        assert_eq!(actor.turn, Turn::Empty);
        assert!(actor.registry.players.is_empty());
    }
}
