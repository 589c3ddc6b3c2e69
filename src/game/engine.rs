use rand::{Rng, rngs::ThreadRng, seq::IteratorRandom};
use tracing::{debug, info};

use super::{
    action::{Command, Direction},
    config::GameConfig,
    hud::Hud,
    state::{CollisionType, GamePhase, GameState, Position, Snake},
    timer::TickTimer,
};
use crate::storage::HighScoreStore;

/// What a single tick did to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The game was not running, nothing changed
    Skipped,
    /// The snake moved one cell
    Moved,
    /// The snake moved onto the food and grew
    Ate,
    /// The snake hit something and the game is over
    Collided(CollisionType),
    /// The snake ate the last free cell and the game is over
    BoardFilled,
}

impl TickOutcome {
    pub fn is_game_over(&self) -> bool {
        matches!(self, TickOutcome::Collided(_) | TickOutcome::BoardFilled)
    }
}

/// The game loop controller
///
/// Owns the board, the tick timer and the high score bookkeeping. Every
/// operation is a no-op when it does not apply to the current phase.
pub struct GameEngine<R = ThreadRng> {
    config: GameConfig,
    state: GameState,
    hud: Hud,
    timer: TickTimer,
    store: Box<dyn HighScoreStore>,
    rng: R,
    redraw: bool,
}

impl GameEngine<ThreadRng> {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Self {
        Self::with_rng(config, store, rand::thread_rng())
    }
}

impl<R: Rng> GameEngine<R> {
    /// Create an engine drawing food positions from `rng`
    pub fn with_rng(config: GameConfig, store: Box<dyn HighScoreStore>, rng: R) -> Self {
        let high_score = store.load_high_score();
        let tile_count = config.tile_count();
        let center = GameState::center(tile_count);

        let mut engine = Self {
            timer: TickTimer::new(config.tick_interval()),
            state: GameState::new(Snake::new(center), center, tile_count),
            hud: Hud::new(high_score),
            config,
            store,
            rng,
            redraw: true,
        };
        engine.reset_board();
        engine
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access to the board, for scripted setups
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn timer(&self) -> &TickTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut TickTimer {
        &mut self.timer
    }

    /// Returns true once after anything visible changed
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Apply a command. Returns true if it changed anything.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::TogglePause => self.toggle_pause(),
            Command::Turn(direction) => self.change_direction(direction),
            Command::Reset => {
                self.reset();
                true
            }
        }
    }

    /// Start a game from idle, or a fresh one after a game over
    pub fn start(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Running | GamePhase::Paused => return false,
            GamePhase::Over => self.reset_board(),
            GamePhase::Idle => {}
        }

        if self.state.direction().is_none() {
            self.state.heading = Some(Direction::Right);
        }

        self.state.phase = GamePhase::Running;
        self.hud.game_over_visible = false;
        self.hud.paused = false;
        self.timer.arm();
        self.redraw = true;

        info!(high_score = self.hud.high_score, "game started");
        true
    }

    /// Flip between running and paused
    pub fn toggle_pause(&mut self) -> bool {
        self.state.phase = match self.state.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Running,
            GamePhase::Idle | GamePhase::Over => return false,
        };
        self.hud.paused = self.state.phase == GamePhase::Paused;
        self.redraw = true;

        debug!(paused = self.hud.paused, "pause toggled");
        true
    }

    /// Queue a direction change for the next tick.
    ///
    /// A later turn replaces a queued one, with one exception to last write
    /// wins: a turn is refused if it reverses the direction last moved in,
    /// even when a different turn is already queued (heading right, queue
    /// up, then left is refused). Reversing the queued turn is refused too.
    pub fn change_direction(&mut self, direction: Direction) -> bool {
        if self.state.phase != GamePhase::Running {
            return false;
        }

        let reverses = |current: Option<Direction>| {
            current.is_some_and(|current| current.is_opposite(direction))
        };
        if reverses(self.state.heading) || reverses(self.state.pending) {
            debug!(?direction, "reversal ignored");
            return false;
        }

        self.state.pending = Some(direction);
        true
    }

    /// Return to an idle board with a fresh snake and food
    pub fn reset(&mut self) {
        self.reset_board();
        info!("game reset");
    }

    /// Advance the game by one step
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.phase != GamePhase::Running {
            return TickOutcome::Skipped;
        }
        let Some(direction) = self.state.direction() else {
            return TickOutcome::Skipped;
        };

        self.state.heading = Some(direction);
        self.state.pending = None;
        self.redraw = true;

        let new_head = self.state.snake.head().moved_in_direction(direction);

        if let Some(collision) = self.check_collision(new_head) {
            self.game_over();
            return TickOutcome::Collided(collision);
        }

        self.state.snake.push_head(new_head);

        if new_head != self.state.food {
            self.state.snake.pop_tail();
            return TickOutcome::Moved;
        }

        self.state.score = self.state.score.saturating_add(self.config.food_points);
        self.hud.score = self.state.score;

        match self.spawn_food() {
            Some(food) => {
                self.state.food = food;
                TickOutcome::Ate
            }
            None => {
                self.game_over();
                TickOutcome::BoardFilled
            }
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, pos: Position) -> Option<CollisionType> {
        if !self.state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if self.state.is_occupied_by_snake(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    fn game_over(&mut self) {
        self.timer.cancel();
        self.state.phase = GamePhase::Over;
        self.redraw = true;

        let score = self.state.score;
        if self.hud.on_game_over(score) {
            self.store.save_high_score(score);
        }

        info!(
            score,
            high_score = self.hud.high_score,
            new_record = self.hud.new_record,
            "game over"
        );
    }

    fn reset_board(&mut self) {
        self.timer.cancel();

        let tile_count = self.state.tile_count;
        let center = GameState::center(tile_count);
        self.state = GameState::new(Snake::new(center), center, tile_count);
        if let Some(food) = self.spawn_food() {
            self.state.food = food;
        }

        self.hud.clear_round();
        self.redraw = true;
    }

    fn spawn_food(&mut self) -> Option<Position> {
        let food = spawn_food_avoid_snake(
            &mut self.rng,
            &self.state.snake,
            self.state.tile_count,
            self.config.max_food_attempts,
        );
        debug!(?food, "food spawned");
        food
    }
}

/// Pick a uniformly random cell the snake does not occupy.
///
/// Tries `attempts` random draws first, then enumerates the free cells and
/// picks one of them. Returns `None` only when the snake covers the board.
pub fn spawn_food_avoid_snake<R: Rng>(
    rng: &mut R,
    snake: &Snake,
    tile_count: i32,
    attempts: usize,
) -> Option<Position> {
    if tile_count <= 0 {
        return None;
    }

    for _ in 0..attempts {
        let pos = Position::new(rng.gen_range(0..tile_count), rng.gen_range(0..tile_count));
        if !snake.contains(pos) {
            return Some(pos);
        }
    }

    (0..tile_count)
        .flat_map(|y| (0..tile_count).map(move |x| Position::new(x, y)))
        .filter(|&pos| !snake.contains(pos))
        .choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rand::{SeedableRng, rngs::StdRng};

    fn engine_with(config: GameConfig, store: MemoryStore) -> GameEngine<StdRng> {
        GameEngine::with_rng(config, Box::new(store), StdRng::seed_from_u64(7))
    }

    fn engine() -> GameEngine<StdRng> {
        engine_with(GameConfig::small(), MemoryStore::new())
    }

    fn snake(cells: &[(i32, i32)]) -> Snake {
        Snake::from_segments(cells.iter().map(|&(x, y)| Position::new(x, y))).unwrap()
    }

    #[test]
    fn test_reset() {
        let engine = engine();
        let state = engine.state();

        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.score, 0);
        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.snake.head(), Position::new(5, 5));
        assert_eq!(state.direction(), None);
        assert!(!state.is_occupied_by_snake(state.food));
        assert!(state.is_in_bounds(state.food));
        assert!(!engine.timer().is_armed());
    }

    #[test]
    fn test_start_defaults_to_right() {
        let mut engine = engine();
        assert!(engine.start());

        assert_eq!(engine.phase(), GamePhase::Running);
        assert_eq!(engine.state().direction(), Some(Direction::Right));
        assert!(engine.timer().is_armed());
    }

    #[test]
    fn test_start_is_noop_while_running_or_paused() {
        let mut engine = engine();
        engine.start();
        assert!(!engine.start());
        assert_eq!(engine.timer().arm_count(), 1);

        engine.toggle_pause();
        assert!(!engine.start());
        assert_eq!(engine.phase(), GamePhase::Paused);
        assert_eq!(engine.timer().arm_count(), 1);
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = engine();
        engine.start();
        let food = engine.state().food;
        engine.state_mut().food = if food == Position::new(6, 5) {
            Position::new(0, 0)
        } else {
            food
        };

        assert_eq!(engine.tick(), TickOutcome::Moved);
        assert_eq!(engine.state().snake.head(), Position::new(6, 5));
        assert_eq!(engine.state().snake.len(), 1);
        assert_eq!(engine.state().score, 0);
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = engine();
        engine.start();
        engine.state_mut().food = Position::new(6, 5);

        assert_eq!(engine.tick(), TickOutcome::Ate);
        assert_eq!(engine.state().score, 10);
        assert_eq!(engine.hud().score, 10);
        assert_eq!(engine.state().snake.len(), 2);
        assert!(!engine.state().is_occupied_by_snake(engine.state().food));
    }

    #[test]
    fn test_tick_while_not_running_changes_nothing() {
        let mut engine = engine();
        let idle = engine.state().clone();
        assert_eq!(engine.tick(), TickOutcome::Skipped);
        assert_eq!(engine.state(), &idle);

        engine.start();
        engine.toggle_pause();
        let paused = engine.state().clone();
        assert_eq!(engine.tick(), TickOutcome::Skipped);
        assert_eq!(engine.state(), &paused);
    }

    #[test]
    fn test_pause_round_trip() {
        let mut engine = engine();
        assert!(!engine.toggle_pause());

        engine.start();
        assert!(engine.toggle_pause());
        assert_eq!(engine.phase(), GamePhase::Paused);
        assert_eq!(engine.hud().pause_label(), "Resume");

        assert!(engine.toggle_pause());
        assert_eq!(engine.phase(), GamePhase::Running);
        assert_eq!(engine.hud().pause_label(), "Pause");
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = engine();
        engine.start();
        {
            let state = engine.state_mut();
            state.snake = snake(&[(0, 5), (1, 5), (2, 5)]);
            state.heading = Some(Direction::Left);
            state.food = Position::new(8, 8);
            state.score = 30;
        }

        let result = engine.tick();

        assert_eq!(result, TickOutcome::Collided(CollisionType::Wall));
        assert!(result.is_game_over());
        assert_eq!(engine.phase(), GamePhase::Over);
        assert!(!engine.timer().is_armed());
        assert!(engine.hud().game_over_visible);
        assert_eq!(engine.hud().final_score, 30);
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine();
        engine.start();
        {
            let state = engine.state_mut();
            // Head at (5,5) with the body curling round below and to the left
            state.snake = snake(&[(5, 5), (5, 6), (4, 6), (4, 5), (4, 4)]);
            state.heading = Some(Direction::Up);
            state.food = Position::new(9, 9);
        }

        assert!(engine.change_direction(Direction::Left));
        assert_eq!(
            engine.tick(),
            TickOutcome::Collided(CollisionType::SelfCollision)
        );
        assert_eq!(engine.phase(), GamePhase::Over);
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut engine = engine();
        engine.start();

        assert!(!engine.change_direction(Direction::Left));
        assert_eq!(engine.state().direction(), Some(Direction::Right));

        // Queued up, so down now reverses the queued move
        assert!(engine.change_direction(Direction::Up));
        assert!(!engine.change_direction(Direction::Down));
        assert_eq!(engine.state().direction(), Some(Direction::Up));

        // Left reverses the direction last moved in
        assert!(!engine.change_direction(Direction::Left));
        assert_eq!(engine.state().direction(), Some(Direction::Up));
    }

    #[test]
    fn test_last_turn_before_tick_wins() {
        let mut engine = engine();
        engine.start();
        engine.state_mut().food = Position::new(0, 0);

        assert!(engine.change_direction(Direction::Up));
        assert!(engine.change_direction(Direction::Right));
        engine.tick();

        assert_eq!(engine.state().snake.head(), Position::new(6, 5));
        assert_eq!(engine.state().heading, Some(Direction::Right));
        assert_eq!(engine.state().pending, None);
    }

    #[test]
    fn test_turns_ignored_unless_running() {
        let mut engine = engine();
        assert!(!engine.change_direction(Direction::Up));
        assert_eq!(engine.state().direction(), None);

        engine.start();
        engine.toggle_pause();
        assert!(!engine.change_direction(Direction::Up));
        assert_eq!(engine.state().direction(), Some(Direction::Right));
    }

    #[test]
    fn test_high_score_saved_only_on_new_record() {
        let store = MemoryStore::with_high_score(20);
        let mut engine = engine_with(GameConfig::small(), store.clone());
        assert_eq!(engine.hud().high_score, 20);

        engine.start();
        engine.state_mut().score = 20;
        engine.state_mut().snake = snake(&[(9, 5)]);
        engine.tick();
        assert_eq!(engine.phase(), GamePhase::Over);
        assert!(!engine.hud().new_record);
        assert_eq!(store.writes(), 0);

        engine.start();
        engine.state_mut().score = 30;
        engine.state_mut().snake = snake(&[(9, 5)]);
        engine.tick();
        assert!(engine.hud().new_record);
        assert_eq!(engine.hud().high_score, 30);
        assert_eq!(store.value(), Some(30));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_start_after_game_over_resets_first() {
        let mut engine = engine();
        engine.start();
        engine.state_mut().snake = snake(&[(9, 5), (8, 5)]);
        engine.state_mut().score = 10;
        engine.tick();
        assert_eq!(engine.phase(), GamePhase::Over);

        assert!(engine.start());
        assert_eq!(engine.phase(), GamePhase::Running);
        assert_eq!(engine.state().snake.head(), Position::new(5, 5));
        assert_eq!(engine.state().score, 0);
        assert!(!engine.hud().game_over_visible);
        assert_eq!(engine.timer().arm_count(), 2);
    }

    #[test]
    fn test_reset_cancels_timer() {
        let mut engine = engine();
        engine.start();
        engine.reset();
        assert!(!engine.timer().is_armed());
        assert_eq!(engine.phase(), GamePhase::Idle);

        engine.reset();
        assert!(!engine.timer().is_armed());
    }

    #[test]
    fn test_board_filled_ends_game() {
        let mut engine = engine_with(GameConfig::new(40, 20), MemoryStore::new());
        engine.start();
        {
            let state = engine.state_mut();
            state.snake = snake(&[(0, 1), (0, 0), (1, 0)]);
            state.heading = Some(Direction::Right);
            state.food = Position::new(1, 1);
        }

        assert_eq!(engine.tick(), TickOutcome::BoardFilled);
        assert_eq!(engine.phase(), GamePhase::Over);
        assert_eq!(engine.state().snake.len(), 4);
        assert_eq!(engine.hud().final_score, 10);
    }

    #[test]
    fn test_redraw_flag() {
        let mut engine = engine();
        assert!(engine.take_redraw());
        assert!(!engine.take_redraw());

        engine.tick();
        assert!(!engine.take_redraw());

        engine.start();
        engine.tick();
        assert!(engine.take_redraw());
    }

    #[test]
    fn test_food_spawn_uses_free_cells_when_crowded() {
        let mut rng = StdRng::seed_from_u64(1);
        let cells: Vec<Position> = (0..3)
            .flat_map(|y| (0..3).map(move |x| Position::new(x, y)))
            .filter(|&pos| pos != Position::new(2, 1))
            .collect();
        let snake = Snake::from_segments(cells).unwrap();

        let food = spawn_food_avoid_snake(&mut rng, &snake, 3, 0);
        assert_eq!(food, Some(Position::new(2, 1)));

        let full = Snake::from_segments(
            (0..2).flat_map(|y| (0..2).map(move |x| Position::new(x, y))),
        )
        .unwrap();
        assert_eq!(spawn_food_avoid_snake(&mut rng, &full, 2, 16), None);
    }

    #[test]
    fn test_food_never_on_snake() {
        let mut rng = StdRng::seed_from_u64(99);
        let snake = snake(&[(0, 0), (1, 0), (2, 0), (2, 1), (1, 1), (0, 1)]);
        for _ in 0..500 {
            let food = spawn_food_avoid_snake(&mut rng, &snake, 4, 8).unwrap();
            assert!(!snake.contains(food));
        }
    }
}
