//! Grid Snake - the classic snake game in the terminal
//!
//! This library provides:
//! - Core game logic and the tick-driven game loop controller (game module)
//! - Keyboard and swipe input mapping (input module)
//! - Frame composition and TUI rendering (render module)
//! - High score persistence (storage module)
//! - The interactive play mode tying them together (modes module)

pub mod game;
pub mod input;
pub mod modes;
pub mod render;
pub mod storage;
