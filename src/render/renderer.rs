use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::time::Duration;

use super::scene::Scene;
use super::surface::SurfaceView;
use crate::game::{GameConfig, GamePhase, GameState, Hud};

pub struct Renderer {
    grid_size: u32,
}

impl Renderer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            grid_size: config.grid_size,
        }
    }

    /// Draw the whole screen. Returns the area the board was drawn in.
    pub fn render(&self, frame: &mut Frame, state: &GameState, hud: &Hud, clock: Duration) -> Rect {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(hud), chunks[0]);

        let board = board_area(chunks[1], state.tile_count);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::White))
            .title(" Snake ");
        let surface = block.inner(board);
        frame.render_widget(block, board);

        let scene = Scene::compose(state, self.grid_size, clock);
        frame.render_widget(SurfaceView::new(&scene), surface);

        if hud.game_over_visible {
            self.render_popup(frame, surface, self.render_game_over(hud), Color::Red);
        } else if state.phase == GamePhase::Paused {
            self.render_popup(frame, surface, self.render_paused(), Color::Yellow);
        } else if state.phase == GamePhase::Idle {
            self.render_popup(frame, surface, self.render_idle(), Color::Green);
        }

        frame.render_widget(self.render_controls(state.phase, hud), chunks[2]);

        surface
    }

    fn render_stats(&self, hud: &Hud) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                hud.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("High Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(hud.high_score.to_string(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over(&self, hud: &Hud) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    hud.final_score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if hud.new_record {
            lines.push(Line::from(vec![Span::styled(
                "NEW RECORD!",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )]));
        }

        lines.push(Line::from(vec![
            key_span("Space", Color::Green),
            Span::styled(" play again  ", Style::default().fg(Color::Gray)),
            key_span("R", Color::Green),
            Span::styled(" reset", Style::default().fg(Color::Gray)),
        ]));

        lines
    }

    fn render_paused(&self) -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                key_span("Space", Color::Green),
                Span::styled(" to resume", Style::default().fg(Color::Gray)),
            ]),
        ]
    }

    fn render_idle(&self) -> Vec<Line<'static>> {
        vec![Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            key_span("Space", Color::Green),
            Span::styled(" to start", Style::default().fg(Color::Gray)),
        ])]
    }

    fn render_popup(&self, frame: &mut Frame, over: Rect, lines: Vec<Line<'static>>, border: Color) {
        let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 4;
        let height = lines.len() as u16 + 2;
        let popup = centered(over, width, height);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            ),
            popup,
        );
    }

    fn render_controls(&self, phase: GamePhase, hud: &Hud) -> Paragraph<'_> {
        let space = match phase {
            GamePhase::Running | GamePhase::Paused => hud.pause_label(),
            GamePhase::Idle | GamePhase::Over => "Start",
        };

        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" / "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" / drag to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" {} | ", space)),
            Span::styled("R", Style::default().fg(Color::Cyan)),
            Span::raw(" reset | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

fn key_span(key: &'static str, color: Color) -> Span<'static> {
    Span::styled(key, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

/// Largest square-looking board (two columns per row) that fits, borders included
fn board_area(area: Rect, tile_count: i32) -> Rect {
    let tiles = u16::try_from(tile_count.max(1)).unwrap_or(u16::MAX);
    let columns = tiles.saturating_mul(2);
    let scale = (area.width.saturating_sub(2) / columns)
        .min(area.height.saturating_sub(2) / tiles)
        .max(1);
    centered(
        area,
        columns.saturating_mul(scale).saturating_add(2),
        tiles.saturating_mul(scale).saturating_add(2),
    )
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Position, Snake};
    use ratatui::{Terminal, backend::TestBackend};

    fn screen(state: &GameState, hud: &Hud) -> (String, Rect) {
        let config = GameConfig::small();
        let renderer = Renderer::new(&config);
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let mut surface = Rect::default();
        terminal
            .draw(|frame| surface = renderer.render(frame, state, hud, Duration::ZERO))
            .unwrap();

        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        (text, surface)
    }

    fn state(phase: GamePhase) -> GameState {
        let mut state = GameState::new(Snake::new(Position::new(5, 5)), Position::new(1, 1), 10);
        state.phase = phase;
        state
    }

    #[test]
    fn test_header_shows_scores() {
        let hud = Hud {
            score: 30,
            high_score: 90,
            ..Default::default()
        };
        let (text, _) = screen(&state(GamePhase::Running), &hud);

        assert!(text.contains("Score: 30"));
        assert!(text.contains("High Score: 90"));
        assert!(text.contains("Space Pause"));
        assert!(!text.contains("GAME OVER"));
    }

    #[test]
    fn test_game_over_panel() {
        let mut hud = Hud::new(10);
        hud.on_game_over(40);
        let (text, _) = screen(&state(GamePhase::Over), &hud);

        assert!(text.contains("GAME OVER"));
        assert!(text.contains("Final Score: 40"));
        assert!(text.contains("NEW RECORD!"));
    }

    #[test]
    fn test_no_record_banner_below_high_score() {
        let mut hud = Hud::new(100);
        hud.on_game_over(40);
        let (text, _) = screen(&state(GamePhase::Over), &hud);

        assert!(text.contains("Final Score: 40"));
        assert!(!text.contains("NEW RECORD!"));
    }

    #[test]
    fn test_pause_and_idle_overlays() {
        let hud = Hud {
            paused: true,
            ..Default::default()
        };
        let (text, _) = screen(&state(GamePhase::Paused), &hud);
        assert!(text.contains("PAUSED"));
        assert!(text.contains("Space Resume"));

        let (text, _) = screen(&state(GamePhase::Idle), &Hud::default());
        assert!(text.contains("to start"));
    }

    #[test]
    fn test_oversized_board_is_clipped_to_the_screen() {
        let area = Rect::new(0, 3, 80, 24);
        assert_eq!(board_area(area, 40000), area);
        assert_eq!(board_area(area, i32::MAX), area);

        let config = GameConfig::new(255, 1);
        let renderer = Renderer::new(&config);
        let state = GameState::new(Snake::new(Position::new(127, 127)), Position::new(1, 1), 255);
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|frame| {
                renderer.render(frame, &state, &Hud::default(), Duration::ZERO);
            })
            .unwrap();
    }

    #[test]
    fn test_board_keeps_its_shape() {
        let (_, surface) = screen(&state(GamePhase::Running), &Hud::default());
        assert_eq!(surface.width, surface.height * 2);
        assert_eq!(surface.height, 20);
    }
}
