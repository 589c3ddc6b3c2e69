//! Drawing the board
//!
//! `scene` builds a frame as plain drawing operations, `surface` paints
//! one onto a ratatui canvas, and `renderer` lays out the whole screen.

pub mod renderer;
pub mod scene;
pub mod surface;

pub use renderer::Renderer;
pub use scene::{DrawOp, Part, PixelRect, Scene};
pub use surface::SurfaceView;
