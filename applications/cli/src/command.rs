//! Interactive command parsing
//!
//! One command per input line. Track numbers are 1-based on the terminal and
//! converted to 0-based indices here. A line holding a single space toggles
//! play/pause and an empty line toggles direction, mirroring the space and
//! enter keys.

use crate::error::{CliError, Result};
use loopdeck_engine::Direction;
use std::path::PathBuf;

/// Command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load files and append them
    Add(Vec<PathBuf>),
    /// Start, pause or resume
    TogglePlay,
    /// Flip direction
    ToggleDirection,
    /// Set a specific direction
    Direction(Direction),
    /// Play a track
    Select(usize),
    /// Reorder
    Move { from: usize, to: usize },
    /// Rename a track
    Rename { index: usize, name: String },
    /// Delete a track
    Remove(usize),
    /// Delete every track
    Clear,
    /// Stop and go idle
    Reset,
    /// Print the playlist
    Status,
    /// Print help
    Help,
    /// Leave the session
    Quit,
}

pub const HELP: &str = "\
Commands:
  add <file>...          append audio files (\"quote\" names with spaces)
  play | p | <space>     start, pause or resume
  dir | d | <enter>      toggle direction
  forward | reverse      set direction
  <n> | select <n>       play track n
  move <from> <to>       reorder tracks
  rename <n> <name>      rename track n
  rm <n>                 delete track n
  clear                  delete every track
  reset                  stop playback
  ls | status            show the playlist
  help                   show this help
  quit | q               leave";

impl Command {
    /// Parse one input line (without its trailing newline)
    pub fn parse(line: &str) -> Result<Self> {
        if line == " " {
            return Ok(Command::TogglePlay);
        }

        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::ToggleDirection);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        if let Ok(number) = word.parse::<usize>() {
            no_args(word, rest)?;
            return Ok(Command::Select(to_index(number)?));
        }

        let command = match word.to_ascii_lowercase().as_str() {
            "add" | "a" => {
                let paths = split_paths(rest)?;
                if paths.is_empty() {
                    return Err(CliError::Command("add needs at least one file".to_string()));
                }
                Command::Add(paths)
            }
            "play" | "pause" | "p" => no_args(word, rest).map(|()| Command::TogglePlay)?,
            "dir" | "d" => no_args(word, rest).map(|()| Command::ToggleDirection)?,
            "forward" | "fwd" => no_args(word, rest).map(|()| Command::Direction(Direction::Forward))?,
            "reverse" | "rev" => no_args(word, rest).map(|()| Command::Direction(Direction::Reverse))?,
            "select" | "s" => Command::Select(parse_track(rest)?),
            "move" | "mv" => {
                let (from, to) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| CliError::Command("move needs <from> <to>".to_string()))?;
                Command::Move {
                    from: parse_track(from)?,
                    to: parse_track(to.trim())?,
                }
            }
            "rename" | "rn" => {
                let (index, name) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| CliError::Command("rename needs <n> <name>".to_string()))?;
                Command::Rename {
                    index: parse_track(index)?,
                    name: name.trim().to_string(),
                }
            }
            "rm" | "remove" | "del" => Command::Remove(parse_track(rest)?),
            "clear" => no_args(word, rest).map(|()| Command::Clear)?,
            "reset" | "stop" => no_args(word, rest).map(|()| Command::Reset)?,
            "ls" | "status" => no_args(word, rest).map(|()| Command::Status)?,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(CliError::Command(format!("unknown command '{other}'"))),
        };

        Ok(command)
    }
}

/// Split on whitespace, keeping single- or double-quoted runs together
fn split_paths(text: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = None;

    for c in text.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if std::mem::take(&mut in_word) {
                    paths.push(PathBuf::from(std::mem::take(&mut current)));
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CliError::Command("unterminated quote in file name".to_string()));
    }
    if in_word {
        paths.push(PathBuf::from(current));
    }
    Ok(paths)
}

fn no_args(word: &str, rest: &str) -> Result<()> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(CliError::Command(format!("{word} takes no arguments")))
    }
}

fn parse_track(text: &str) -> Result<usize> {
    let number = text
        .trim()
        .parse::<usize>()
        .map_err(|_| CliError::Command(format!("'{text}' is not a track number")))?;
    to_index(number)
}

fn to_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| CliError::Command("track numbers start at 1".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap()
    }

    #[test]
    fn key_shortcuts() {
        assert_eq!(parse(" "), Command::TogglePlay);
        assert_eq!(parse(""), Command::ToggleDirection);
        assert_eq!(parse("\t"), Command::ToggleDirection);
    }

    #[test]
    fn track_numbers_are_one_based() {
        assert_eq!(parse("3"), Command::Select(2));
        assert_eq!(parse("select 1"), Command::Select(0));
        assert!(Command::parse("0").is_err());
        assert!(Command::parse("select zero").is_err());
    }

    #[test]
    fn move_and_rename() {
        assert_eq!(parse("move 1 3"), Command::Move { from: 0, to: 2 });
        assert_eq!(
            parse("rename 2   Night Drive  "),
            Command::Rename {
                index: 1,
                name: "Night Drive".to_string()
            }
        );
        assert!(Command::parse("move 1").is_err());
        assert!(Command::parse("rename 2").is_err());
    }

    #[test]
    fn add_collects_paths() {
        assert_eq!(
            parse("add a.mp3 /music/b.mp3"),
            Command::Add(vec![PathBuf::from("a.mp3"), PathBuf::from("/music/b.mp3")])
        );
        assert!(Command::parse("add").is_err());
    }

    #[test]
    fn add_keeps_quoted_names_whole() {
        assert_eq!(
            parse(r#"add "/music/Side A/01 Intro.mp3" 'b c.mp3' d.mp3"#),
            Command::Add(vec![
                PathBuf::from("/music/Side A/01 Intro.mp3"),
                PathBuf::from("b c.mp3"),
                PathBuf::from("d.mp3"),
            ])
        );
        assert_eq!(
            parse(r#"add "it's.mp3""#),
            Command::Add(vec![PathBuf::from("it's.mp3")])
        );
        assert!(Command::parse(r#"add "open.mp3"#).is_err());
    }

    #[test]
    fn words_are_case_insensitive() {
        assert_eq!(parse("PLAY"), Command::TogglePlay);
        assert_eq!(parse("Reverse"), Command::Direction(Direction::Reverse));
        assert_eq!(parse("q"), Command::Quit);
    }

    #[test]
    fn unknown_and_extra_arguments() {
        assert!(matches!(Command::parse("dance"), Err(CliError::Command(_))));
        assert!(Command::parse("play now").is_err());
        assert!(Command::parse("2 3").is_err());
    }
}
