use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Position as CellPosition, Rect},
};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::info;

use crate::game::{GameConfig, GameEngine, TickOutcome};
use crate::input::{InputHandler, KeyAction, SwipeTracker};
use crate::render::Renderer;
use crate::storage::HighScoreStore;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;

pub struct HumanMode {
    engine: GameEngine,
    renderer: Renderer,
    input_handler: InputHandler,
    swipe: SwipeTracker,
    should_quit: bool,
    started_at: Instant,
    surface_area: Rect,
}

impl HumanMode {
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Self {
        let renderer = Renderer::new(&config);

        Self {
            engine: GameEngine::new(config, store),
            renderer,
            input_handler: InputHandler::new(),
            swipe: SwipeTracker::new(),
            should_quit: false,
            started_at: Instant::now(),
            surface_area: Rect::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        info!(high_score = self.engine.hud().high_score, "session ended");
        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Redraw at 30 FPS so the food keeps pulsing between ticks
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick, only while the engine has it armed
                _ = self.engine.timer_mut().tick() => {
                    self.update_game();
                }

                // Animation frame
                _ = render_timer.tick() => {
                    self.draw(terminal)?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }

            if self.engine.take_redraw() {
                self.draw(terminal)?;
            }
        }

        Ok(())
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let clock = self.started_at.elapsed();
        let mut surface_area = self.surface_area;

        terminal
            .draw(|frame| {
                surface_area =
                    self.renderer
                        .render(frame, self.engine.state(), self.engine.hud(), clock);
            })
            .context("Failed to draw frame")?;

        self.surface_area = surface_area;
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                // Only process key press events, not release
                if key.kind != KeyEventKind::Press {
                    return;
                }

                let action = self.input_handler.handle_key_event(key, self.engine.phase());
                self.apply(action);
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(..) => {
                // Board position moved, a half-finished drag no longer means anything
                self.swipe.cancel();
            }
            _ => {}
        }
    }

    /// Mouse drags on the board stand in for touch swipes
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let x = f64::from(mouse.column);
        let y = f64::from(mouse.row) * CELL_ASPECT;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let cell = CellPosition::new(mouse.column, mouse.row);
                if self.surface_area.contains(cell) {
                    self.swipe.begin(x, y);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(direction) = self.swipe.end(x, y) {
                    let action = self.input_handler.handle_swipe(direction, self.engine.phase());
                    self.apply(action);
                }
            }
            _ => {}
        }
    }

    fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::GameAction(command) => {
                self.engine.handle(command);
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn update_game(&mut self) {
        let outcome = self.engine.tick();

        if let TickOutcome::Collided(collision) = outcome {
            info!(?collision, score = self.engine.state().score, "snake crashed");
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )
        .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
