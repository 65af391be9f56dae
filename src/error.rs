use std::error::Error;
use std::fmt;
use std::io;

use crate::session::Phase;

/// An operation was invoked in a phase that does not allow it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    InvalidTransition { op: &'static str, phase: Phase },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidTransition { op, phase } => {
                write!(f, "cannot {op} while {phase}")
            }
        }
    }
}

impl Error for SessionError {}

/// Failures talking to the score history backend.
///
/// None of these reach the player: reads fall back to an empty history and
/// writes are logged while the in-memory history stays authoritative.
#[derive(Debug)]
pub enum StoreError {
    Read(io::Error),
    Corrupt(serde_json::Error),
    Write(io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Read(e) => write!(f, "failed to read score history: {e}"),
            StoreError::Corrupt(e) => write!(f, "stored score history is corrupt: {e}"),
            StoreError::Write(e) => write!(f, "failed to save score history: {e}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Read(e) | StoreError::Write(e) => Some(e),
            StoreError::Corrupt(e) => Some(e),
        }
    }
}

/// Problems building a prompt corpus
#[derive(Debug)]
pub enum CorpusError {
    Missing(String),
    Parse(serde_json::Error),
    Empty,
    BlankText(usize),
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusError::Missing(name) => write!(f, "no bundled corpus named {name}"),
            CorpusError::Parse(e) => write!(f, "unable to deserialize corpus json: {e}"),
            CorpusError::Empty => write!(f, "corpus has no texts"),
            CorpusError::BlankText(idx) => write!(f, "corpus text {idx} is blank"),
        }
    }
}

impl Error for CorpusError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CorpusError::Parse(e) => Some(e),
            _ => None,
        }
    }
}
