use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Line, Painter, Shape},
    },
};

use super::scene::{DrawOp, PixelRect, Scene};

/// Rasterises a [`Scene`] onto terminal cells
pub struct SurfaceView<'a> {
    scene: &'a Scene,
}

impl<'a> SurfaceView<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }
}

impl Widget for SurfaceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let size = self.scene.size;
        let ops = &self.scene.ops;

        // Canvas y grows upwards, scene y grows downwards
        let flip = move |y: f64| size - y;

        Canvas::default()
            .marker(Marker::HalfBlock)
            .background_color(self.scene.background())
            .x_bounds([0.0, size])
            .y_bounds([0.0, size])
            .paint(move |ctx| {
                for op in ops {
                    match *op {
                        DrawOp::Background { .. } => {}
                        DrawOp::GridLine {
                            x1,
                            y1,
                            x2,
                            y2,
                            color,
                        } => ctx.draw(&Line::new(x1, flip(y1), x2, flip(y2), color)),
                        DrawOp::Fill { rect, color, .. } => ctx.draw(&FilledRect {
                            rect,
                            color,
                            surface: size,
                        }),
                    }
                }
            })
            .render(area, buf);
    }
}

/// Solid rectangle, sampled once per surface pixel
struct FilledRect {
    rect: PixelRect,
    color: Color,
    surface: f64,
}

impl Shape for FilledRect {
    fn draw(&self, painter: &mut Painter) {
        let mut y = self.rect.y + 0.5;
        while y < self.rect.bottom() {
            let mut x = self.rect.x + 0.5;
            while x < self.rect.right() {
                if let Some((px, py)) = painter.get_point(x, self.surface - y) {
                    painter.paint(px, py, self.color);
                }
                x += 1.0;
            }
            y += 1.0;
        }
    }
}
