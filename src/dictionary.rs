//! Word dictionary loading and single-game state.

use std::fmt;
use std::fs;
use std::path::Path;

use rand::Rng;

use crate::protocol::STARTING_GUESSES;

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("could not read dictionary file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("dictionary file {path} contains no words")]
    Empty { path: String },
}

/// A list of candidate words loaded once at startup.
pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path_ref = path.as_ref();
        let text = fs::read_to_string(path_ref).map_err(|source| DictionaryError::Read {
            path: path_ref.display().to_string(),
            source,
        })?;
        let words: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_lowercase)
            .collect();
        if words.is_empty() {
            return Err(DictionaryError::Empty {
                path: path_ref.display().to_string(),
            });
        }
        Ok(Self { words })
    }

    pub fn random_word(&self) -> &str {
        let idx = rand::thread_rng().gen_range(0..self.words.len());
        &self.words[idx]
    }
}

/// State of the single game in progress: the secret word, which letters
/// have been guessed, and guesses remaining.
pub struct Game {
    word: String,
    letters_guessed: [bool; 26],
    guesses_left: u32,
}

impl Game {
    pub fn new(word: &str) -> Self {
        Self {
            word: word.to_string(),
            letters_guessed: [false; 26],
            guesses_left: STARTING_GUESSES,
        }
    }

    /// Restart the same game slot with a freshly chosen word.
    pub fn reinit(&mut self, word: &str) {
        self.word = word.to_string();
        self.letters_guessed = [false; 26];
        self.guesses_left = STARTING_GUESSES;
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn guesses_left(&self) -> u32 {
        self.guesses_left
    }

    /// `letter` must already be validated as a single lowercase ASCII letter
    /// that has not been guessed before (see [`parse_guess`] and
    /// [`Game::already_guessed`]).
    pub fn guess(&mut self, letter: char) -> GuessOutcome {
        let idx = (letter as u8 - b'a') as usize;
        self.letters_guessed[idx] = true;

        if !self.word.contains(letter) {
            self.guesses_left = self.guesses_left.saturating_sub(1);
            if self.guesses_left == 0 {
                return GuessOutcome::OutOfGuesses;
            }
            return GuessOutcome::Miss;
        }

        if self.word.chars().all(|c| self.letters_guessed[(c as u8 - b'a') as usize]) {
            GuessOutcome::Won
        } else {
            GuessOutcome::Hit
        }
    }

    pub fn already_guessed(&self, letter: char) -> bool {
        self.letters_guessed[(letter as u8 - b'a') as usize]
    }

    fn masked_word(&self) -> String {
        self.word
            .chars()
            .map(|c| {
                if self.letters_guessed[(c as u8 - b'a') as usize] {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }

    fn unguessed_letters(&self) -> String {
        (b'a'..=b'z')
            .filter(|&b| !self.letters_guessed[(b - b'a') as usize])
            .map(|b| b as char)
            .collect()
    }

    /// Multi-line status shown after every guess: remaining guesses, the
    /// word with unguessed letters masked, and the letters still available.
    pub fn status_message(&self) -> String {
        format!(
            "Guesses left: {}\r\nWord so far: {}\r\nLetters guessed: {}\r\n",
            self.guesses_left,
            self.masked_word(),
            self.unguessed_letters(),
        )
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked_word())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Hit,
    Miss,
    Won,
    OutOfGuesses,
}

/// A guess line is valid exactly when it is a single lowercase ASCII letter.
/// Whether it has already been guessed is checked separately against the
/// live [`Game`], matching the original predicate
/// `where != 3 || c < 'a' || c > 'z' || letters_guessed[c-'a']`.
pub fn parse_guess(line: &str) -> Option<char> {
    let mut chars = line.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if c.is_ascii_lowercase() {
        Some(c)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_guess_accepts_single_lowercase_letter() {
        assert_eq!(parse_guess("a"), Some('a'));
        assert_eq!(parse_guess("z"), Some('z'));
    }

    #[test]
    fn parse_guess_rejects_multi_char_and_uppercase() {
        assert_eq!(parse_guess("ab"), None);
        assert_eq!(parse_guess("A"), None);
        assert_eq!(parse_guess(""), None);
        assert_eq!(parse_guess("1"), None);
    }

    #[test]
    fn guess_hit_then_win() {
        let mut g = Game::new("cat");
        assert_eq!(g.guess('c'), GuessOutcome::Hit);
        assert_eq!(g.guess('a'), GuessOutcome::Hit);
        assert_eq!(g.guess('t'), GuessOutcome::Won);
    }

    #[test]
    fn guess_miss_decrements_and_exhausts() {
        let mut g = Game::new("cat");
        for (i, letter) in ['q', 'w', 'e', 'r', 'u', 'i'].iter().enumerate() {
            let outcome = g.guess(*letter);
            if i < 5 {
                assert_eq!(outcome, GuessOutcome::Miss);
            } else {
                assert_eq!(outcome, GuessOutcome::OutOfGuesses);
            }
        }
    }

    #[test]
    fn status_message_masks_unguessed_letters() {
        let mut g = Game::new("cat");
        g.guess('c');
        let msg = g.status_message();
        assert!(msg.contains("c--"));
        assert!(msg.contains("Letters guessed"));
    }

    #[test]
    fn reinit_resets_state() {
        let mut g = Game::new("cat");
        g.guess('q');
        g.reinit("dog");
        assert_eq!(g.word(), "dog");
        assert_eq!(g.guesses_left(), STARTING_GUESSES);
        assert!(!g.already_guessed('q'));
    }
}
