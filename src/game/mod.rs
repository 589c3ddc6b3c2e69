//! Core game logic module for Snake
//!
//! The engine owns all mutable game state and exposes the operations the
//! input and timer drive. Nothing here touches the terminal.

pub mod action;
pub mod config;
pub mod engine;
pub mod hud;
pub mod state;
pub mod timer;

// Re-export commonly used types
pub use action::{Command, Direction};
pub use config::GameConfig;
pub use engine::{GameEngine, TickOutcome};
pub use hud::Hud;
pub use state::{CollisionType, GamePhase, GameState, Position, Snake};
pub use timer::TickTimer;
