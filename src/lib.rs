// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod aim;
pub mod app_dirs;
pub mod bench;
pub mod clock;
pub mod config;
pub mod corpus;
pub mod error;
pub mod history;
pub mod runtime;
pub mod score;
pub mod session;
pub mod typing;
pub mod util;

pub use bench::Bench;
pub use score::{AimScore, GameKind, Score, ScoreHistory, TypingScore};
pub use session::Phase;
