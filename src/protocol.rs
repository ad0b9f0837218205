//! Wire protocol constants and message formatting.
//!
//! Client → Server (one line per message):
//!   <name>                      — before admission
//!   <letter>                    — a single-letter guess, once admitted
//!
//! Server → Client (one line per message, all CRLF-terminated):
//!   the messages built by the functions below.

/// Longest accepted display name, including the terminator budget the
/// original buffer reserved; names must be shorter than this.
pub const MAX_NAME: usize = 16;

/// Capacity of each client's line-framing buffer (see [`crate::framer`]).
pub const MAX_BUF: usize = 256;

/// Documented default listening port.
pub const DEFAULT_PORT: u16 = 54623;

/// Guesses granted at the start of every game.
pub const STARTING_GUESSES: u32 = 7;

pub const WELCOME_MSG: &str = "Welcome to Hangman! What is your name?\r\n";

pub fn please_enter_name() -> &'static str {
    "Please enter a valid name.\r\n"
}

pub fn name_taken() -> &'static str {
    "Sorry, that name is taken! Please enter a new name.\r\n"
}

pub fn name_too_long() -> &'static str {
    "Your name was too long! It might look weird now.\r\n"
}

pub fn oversized_input() -> &'static str {
    "Your input was too long! Weird stuff might happen now.\r\n"
}

pub fn not_your_turn() -> &'static str {
    "It is not your turn to guess.\r\n"
}

pub fn invalid_guess() -> &'static str {
    "Invalid guess. Please guess again.\r\n"
}

pub fn your_guess_prompt() -> &'static str {
    "Your guess?\r\n"
}

pub fn turn_announcement(name: &str) -> String {
    format!("It's {name}'s turn.\r\n")
}

pub fn join_announcement(name: &str) -> String {
    format!("{name} has just joined.\r\n")
}

pub fn goodbye_announcement(name: &str) -> String {
    format!("Goodbye {name}\r\n")
}

pub fn guess_announcement(name: &str, letter: char) -> String {
    format!("{name} guesses: {letter}\r\n")
}

pub fn letter_not_in_word(letter: char) -> String {
    format!("{letter} is not in the word\r\n")
}

pub fn no_more_guesses(word: &str) -> String {
    format!("No more guesses.  The word was {word}.\r\n\r\nLet's start a new game.\r\n")
}

pub fn winner_announcement_other(word: &str, winner: &str) -> String {
    format!("The word was {word}.\r\nGame Over! {winner} Won!\r\n\r\nLet's start a new game.\r\n")
}

pub fn winner_announcement_self(word: &str) -> String {
    format!("The word was {word}.\r\nGame Over! You Win!\r\n\r\nLet's start a new game.\r\n")
}
