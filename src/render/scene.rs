//! Frame composition
//!
//! [`Scene::compose`] turns the board into an ordered list of drawing
//! operations in surface pixels (origin top-left, y down). It reads the
//! state and never changes it; the only input besides the board is the
//! clock driving the food pulse.

use ratatui::style::Color;
use std::time::Duration;

use crate::game::{GameState, Position};

pub const BACKGROUND: Color = Color::Rgb(0x0f, 0x0f, 0x23);
pub const GRID_LINE: Color = Color::Rgb(0x16, 0x21, 0x3e);
pub const SNAKE_HEAD: Color = Color::Rgb(0x4c, 0xaf, 0x50);
pub const SNAKE_BODY: Color = Color::Rgb(0x8b, 0xc3, 0x4a);
pub const EYE: Color = Color::Rgb(0xff, 0xff, 0xff);
pub const FOOD: Color = Color::Rgb(0xff, 0x57, 0x22);

/// Food pulse speed, radians per millisecond
const PULSE_RATE: f64 = 0.005;
/// Gap left between neighbouring segments, in pixels
const SEGMENT_GAP: f64 = 2.0;

/// Axis-aligned rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// What a filled rectangle depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    SnakeHead,
    SnakeBody,
    Eye,
    Food,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    Background {
        size: f64,
        color: Color,
    },
    GridLine {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
    },
    Fill {
        rect: PixelRect,
        color: Color,
        part: Part,
    },
}

/// One frame worth of drawing operations, in paint order
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: f64,
    pub ops: Vec<DrawOp>,
}

impl Scene {
    /// Draw background, grid, snake and food for `state`.
    ///
    /// `grid_size` is the cell side in pixels and `clock` any monotonic time
    /// used for the food pulse.
    pub fn compose(state: &GameState, grid_size: u32, clock: Duration) -> Self {
        let cell = f64::from(grid_size);
        let size = f64::from(state.tile_count.max(0)) * cell;
        let mut ops = Vec::with_capacity(2 + 2 * (state.tile_count.max(0) as usize + 1));

        ops.push(DrawOp::Background {
            size,
            color: BACKGROUND,
        });

        for i in 0..=state.tile_count.max(0) {
            let offset = f64::from(i) * cell;
            ops.push(DrawOp::GridLine {
                x1: offset,
                y1: 0.0,
                x2: offset,
                y2: size,
                color: GRID_LINE,
            });
            ops.push(DrawOp::GridLine {
                x1: 0.0,
                y1: offset,
                x2: size,
                y2: offset,
                color: GRID_LINE,
            });
        }

        for (index, segment) in state.snake.segments().enumerate() {
            let rect = segment_rect(segment, cell);
            if index == 0 {
                ops.push(DrawOp::Fill {
                    rect,
                    color: SNAKE_HEAD,
                    part: Part::SnakeHead,
                });
                for eye in eye_rects(segment, cell) {
                    ops.push(DrawOp::Fill {
                        rect: eye,
                        color: EYE,
                        part: Part::Eye,
                    });
                }
            } else {
                ops.push(DrawOp::Fill {
                    rect,
                    color: SNAKE_BODY,
                    part: Part::SnakeBody,
                });
            }
        }

        // After a board-filling meal the food sits under the head
        if !state.is_occupied_by_snake(state.food) {
            ops.push(DrawOp::Fill {
                rect: food_rect(state.food, cell, clock),
                color: FOOD,
                part: Part::Food,
            });
        }

        Self { size, ops }
    }

    pub fn background(&self) -> Color {
        self.ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Background { color, .. } => Some(*color),
                _ => None,
            })
            .unwrap_or(Color::Reset)
    }

    /// Filled rectangles depicting `part`, in paint order
    pub fn fills(&self, part: Part) -> impl Iterator<Item = PixelRect> + '_ {
        self.ops.iter().filter_map(move |op| match op {
            DrawOp::Fill { rect, part: p, .. } if *p == part => Some(*rect),
            _ => None,
        })
    }
}

/// Side of the food square at `clock`, swinging 2px either side of `cell - 4`
pub fn pulse_size(cell: f64, clock: Duration) -> f64 {
    let phase = clock.as_secs_f64() * 1000.0 * PULSE_RATE;
    phase.sin() * 2.0 + cell - 4.0
}

fn segment_rect(pos: Position, cell: f64) -> PixelRect {
    PixelRect::new(
        f64::from(pos.x) * cell,
        f64::from(pos.y) * cell,
        cell - SEGMENT_GAP,
        cell - SEGMENT_GAP,
    )
}

fn eye_rects(head: Position, cell: f64) -> [PixelRect; 2] {
    let x = f64::from(head.x) * cell;
    let y = f64::from(head.y) * cell;
    let eye = cell * 0.15;
    [
        PixelRect::new(x + cell * 0.25, y + cell * 0.25, eye, eye),
        PixelRect::new(x + cell * 0.6, y + cell * 0.25, eye, eye),
    ]
}

fn food_rect(pos: Position, cell: f64, clock: Duration) -> PixelRect {
    let side = pulse_size(cell, clock);
    let inset = (cell - side) / 2.0;
    PixelRect::new(
        f64::from(pos.x) * cell + inset,
        f64::from(pos.y) * cell + inset,
        side,
        side,
    )
}
