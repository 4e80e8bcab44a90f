use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::{
    config::GameConfig,
    direction::Direction,
    rng::RandomSource,
    state::{CollisionType, EndReason, GameState, GameStatus, Position, Snake},
};

/// Heading every game starts with
pub const START_DIRECTION: Direction = Direction::Right;

/// Discrete side effect of a tick, for audio and other listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Eat,
    Collision,
}

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
    /// Whether eating filled the last free cell
    pub board_filled: bool,
}

/// Result of a game step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// Whether the game is over after this step
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    /// Signal emitted by this step, if any
    pub fn signal(&self) -> Option<Signal> {
        if self.info.collision_type.is_some() {
            Some(Signal::Collision)
        } else if self.info.ate_food {
            Some(Signal::Eat)
        } else {
            None
        }
    }
}

/// The game engine that owns the board and handles all game logic
///
/// Nothing here touches the terminal, the clock or the speaker: the host
/// calls [`handle_input`](Self::handle_input), [`tick`](Self::tick) and
/// [`reset`](Self::reset), reads [`state`](Self::state) to draw, and routes
/// the returned [`Signal`] to whoever plays sounds.
pub struct GameEngine<R: RandomSource = StdRng> {
    config: GameConfig,
    state: GameState,
    rng: R,
}

impl GameEngine<StdRng> {
    /// Engine whose food layout is fully determined by `seed`
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Engine seeded from the operating system
    pub fn from_entropy(config: GameConfig) -> Self {
        Self::new(config, StdRng::from_entropy())
    }
}

impl<R: RandomSource> GameEngine<R> {
    /// Create a new game engine and start the first game
    pub fn new(config: GameConfig, mut rng: R) -> Self {
        let state = Self::fresh_state(&config, &mut rng);
        Self { config, state, rng }
    }

    /// Start from an arbitrary state, e.g. a mid-game position
    pub fn with_state(config: GameConfig, state: GameState, rng: R) -> Self {
        Self { config, state, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    /// How long the host should wait between ticks right now
    pub fn tick_interval(&self) -> Duration {
        self.state.tick_interval
    }

    /// Queue a heading for the next tick
    ///
    /// A request is checked against the heading the snake actually moved in
    /// last, so a burst like Up, Left, Down between two ticks can never turn
    /// the snake back onto itself. The last accepted request wins.
    pub fn handle_input(&mut self, requested: Direction) {
        if self.state.status.is_over() {
            return;
        }
        if self.state.snake.direction.is_opposite(requested) {
            return;
        }
        self.state.pending_direction = Some(requested);
    }

    /// Advance the game by one step. Does nothing once the game is over.
    pub fn tick(&mut self) -> StepResult {
        if self.state.status.is_over() {
            return StepResult {
                terminated: true,
                info: StepInfo::default(),
            };
        }

        if let Some(direction) = self.state.pending_direction.take() {
            self.state.snake.direction = direction;
        }

        let new_head = self
            .state
            .snake
            .head()
            .moved_in_direction(self.state.snake.direction);

        if let Some(collision_type) = self.check_collision(new_head) {
            self.state.status = GameStatus::Over(EndReason::Collision(collision_type));
            self.state.steps += 1;
            info!(
                ?collision_type,
                score = self.state.score,
                length = self.state.snake.len(),
                "game over"
            );

            return StepResult {
                terminated: true,
                info: StepInfo {
                    collision_type: Some(collision_type),
                    ..StepInfo::default()
                },
            };
        }

        self.state.snake.push_head(new_head);
        self.state.steps += 1;

        let ate_food = self.state.food == Some(new_head);
        let mut info = StepInfo {
            ate_food,
            ..StepInfo::default()
        };

        if ate_food {
            self.state.score += 1;
            self.state.tick_interval = self.next_interval();
            self.state.food = self.spawn_food();
            debug!(
                score = self.state.score,
                interval_ms = self.state.tick_interval.as_millis() as u64,
                food = ?self.state.food,
                "food eaten"
            );

            if self.state.food.is_none() {
                self.state.status = GameStatus::Over(EndReason::BoardFilled);
                info.board_filled = true;
                info!(score = self.state.score, "board filled");
            }
        } else {
            self.state.snake.drop_tail();
        }

        StepResult {
            terminated: self.state.status.is_over(),
            info,
        }
    }

    /// Start a new game. Works from any status.
    pub fn reset(&mut self) {
        self.state = Self::fresh_state(&self.config, &mut self.rng);
        debug!(food = ?self.state.food, "game reset");
    }

    fn fresh_state(config: &GameConfig, rng: &mut R) -> GameState {
        let center = Position::new(
            (config.grid_width / 2) as i32,
            (config.grid_height / 2) as i32,
        );
        let mut state = GameState::new(
            Snake::new(center, START_DIRECTION),
            None,
            config.grid_width,
            config.grid_height,
            config.initial_interval(),
        );
        state.food = Self::pick_free_cell(&state, rng);
        state
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

    fn next_interval(&self) -> Duration {
        self.state
            .tick_interval
            .saturating_sub(self.config.interval_step())
            .max(self.config.min_interval())
    }

    fn spawn_food(&mut self) -> Option<Position> {
        Self::pick_free_cell(&self.state, &mut self.rng)
    }

    /// Uniform pick among cells the snake does not cover, `None` if there are none
    fn pick_free_cell(state: &GameState, rng: &mut R) -> Option<Position> {
        let free = state.free_cells();
        if free.is_empty() {
            return None;
        }
        Some(free[rng.pick(free.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rng::ScriptedSource;
    use rand::Rng;

    const ALL_DIRECTIONS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    fn engine_at(
        config: GameConfig,
        body: Vec<Position>,
        direction: Direction,
        food: Option<Position>,
    ) -> GameEngine<StdRng> {
        let state = GameState::new(
            Snake::from_segments(body, direction).unwrap(),
            food,
            config.grid_width,
            config.grid_height,
            config.initial_interval(),
        );
        GameEngine::with_state(config, state, StdRng::seed_from_u64(1))
    }

    fn assert_no_duplicates(state: &GameState) {
        let body = &state.snake.body;
        for (i, a) in body.iter().enumerate() {
            assert!(!body[i + 1..].contains(a), "duplicate segment {:?}", a);
        }
    }

    #[test]
    fn test_new_game_layout() {
        let engine = GameEngine::seeded(GameConfig::default(), 3);
        let state = engine.state();

        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.snake.body, vec![Position::new(20, 15)]);
        assert_eq!(state.snake.direction, Direction::Right);
        assert_eq!(engine.tick_interval(), Duration::from_millis(150));
        let food = state.food.unwrap();
        assert!(state.is_in_bounds(food));
        assert!(!state.snake.occupies(food));
    }

    #[test]
    fn test_plain_move_shifts_snake() {
        let mut engine = GameEngine::new(GameConfig::default(), ScriptedSource::first());
        assert_eq!(engine.state().food, Some(Position::new(0, 0)));

        let result = engine.tick();

        assert!(!result.terminated);
        assert_eq!(result.signal(), None);
        assert_eq!(engine.state().snake.body, vec![Position::new(21, 15)]);
        assert_eq!(engine.state().steps, 1);
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = engine_at(
            GameConfig::small(),
            vec![Position::new(0, 5)],
            Direction::Left,
            Some(Position::new(5, 5)),
        );

        let result = engine.tick();

        assert!(result.terminated);
        assert_eq!(result.info.collision_type, Some(CollisionType::Wall));
        assert_eq!(result.signal(), Some(Signal::Collision));
        assert_eq!(
            engine.status(),
            GameStatus::Over(EndReason::Collision(CollisionType::Wall))
        );
        assert_eq!(engine.state().snake.body, vec![Position::new(0, 5)]);
    }

    #[test]
    fn test_eating_grows_and_speeds_up() {
        let mut engine = engine_at(
            GameConfig::small(),
            vec![Position::new(5, 5)],
            Direction::Right,
            Some(Position::new(6, 5)),
        );

        let result = engine.tick();

        assert!(!result.terminated);
        assert!(result.info.ate_food);
        assert_eq!(result.signal(), Some(Signal::Eat));
        let state = engine.state();
        assert_eq!(
            state.snake.body,
            vec![Position::new(6, 5), Position::new(5, 5)]
        );
        let food = state.food.unwrap();
        assert_ne!(food, Position::new(6, 5));
        assert_ne!(food, Position::new(5, 5));
        assert_eq!(state.score, 1);
        assert_eq!(engine.tick_interval(), Duration::from_millis(145));
    }

    #[test]
    fn test_self_collision() {
        // Head at (5,5) heading Up, body curls so (5,4) is occupied
        let mut engine = engine_at(
            GameConfig::small(),
            vec![
                Position::new(5, 5),
                Position::new(6, 5),
                Position::new(6, 4),
                Position::new(5, 4),
                Position::new(4, 4),
            ],
            Direction::Left,
            Some(Position::new(0, 0)),
        );

        engine.handle_input(Direction::Up);
        let result = engine.tick();

        assert!(result.terminated);
        assert_eq!(
            result.info.collision_type,
            Some(CollisionType::SelfCollision)
        );
        assert_eq!(engine.state().snake.len(), 5);
    }

    #[test]
    fn test_moving_into_tail_cell_is_a_collision() {
        let mut engine = engine_at(
            GameConfig::small(),
            vec![
                Position::new(5, 5),
                Position::new(5, 6),
                Position::new(4, 6),
                Position::new(4, 5),
            ],
            Direction::Up,
            Some(Position::new(0, 0)),
        );

        engine.handle_input(Direction::Left);
        let result = engine.tick();

        assert_eq!(
            result.info.collision_type,
            Some(CollisionType::SelfCollision)
        );
    }

    #[test]
    fn test_reverse_input_is_ignored() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 9);

        for _ in 0..5 {
            engine.handle_input(Direction::Left);
        }
        assert_eq!(engine.state().pending_direction, None);

        engine.tick();
        assert_eq!(engine.state().snake.direction, Direction::Right);
        assert_eq!(engine.state().snake.head(), Position::new(21, 15));
    }

    #[test]
    fn test_burst_of_inputs_cannot_reverse() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 9);

        // Up is fine, Left is checked against Right and dropped, Down wins
        engine.handle_input(Direction::Up);
        engine.handle_input(Direction::Left);
        engine.handle_input(Direction::Down);
        assert_eq!(engine.state().pending_direction, Some(Direction::Down));

        engine.tick();
        assert_eq!(engine.state().snake.direction, Direction::Down);
        assert_eq!(engine.state().snake.head(), Position::new(20, 16));
    }

    #[test]
    fn test_repeated_input_is_idempotent() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 9);
        engine.handle_input(Direction::Up);
        let once = engine.state().clone();
        engine.handle_input(Direction::Up);
        engine.handle_input(Direction::Up);
        assert_eq!(engine.state(), &once);
    }

    #[test]
    fn test_game_over_freezes_state() {
        let mut engine = engine_at(
            GameConfig::small(),
            vec![Position::new(9, 0)],
            Direction::Right,
            Some(Position::new(0, 9)),
        );
        engine.tick();
        let frozen = engine.state().clone();

        engine.handle_input(Direction::Down);
        let result = engine.tick();

        assert!(result.terminated);
        assert_eq!(result.signal(), None);
        assert_eq!(engine.state(), &frozen);
    }

    #[test]
    fn test_reset_after_game_over() {
        let mut engine = engine_at(
            GameConfig::default(),
            vec![Position::new(0, 5), Position::new(1, 5), Position::new(2, 5)],
            Direction::Left,
            Some(Position::new(10, 10)),
        );
        engine.state.tick_interval = Duration::from_millis(60);
        engine.tick();
        assert!(engine.status().is_over());

        engine.reset();

        let state = engine.state();
        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.snake.body, vec![Position::new(20, 15)]);
        assert_eq!(state.snake.direction, Direction::Right);
        assert_eq!(state.pending_direction, None);
        assert_eq!(state.score, 0);
        assert_eq!(engine.tick_interval(), Duration::from_millis(150));
        assert!(state.food.is_some());
    }

    #[test]
    fn test_reset_while_running() {
        let mut engine = GameEngine::seeded(GameConfig::default(), 5);
        engine.handle_input(Direction::Up);
        engine.tick();
        engine.reset();
        assert_eq!(engine.state().snake.body, vec![Position::new(20, 15)]);
        assert_eq!(engine.state().steps, 0);
    }

    #[test]
    fn test_interval_is_floored() {
        let config = GameConfig::default();
        let mut engine = engine_at(
            config.clone(),
            vec![Position::new(0, 0)],
            Direction::Right,
            None,
        );

        for eaten in 1..=30u64 {
            let head = engine.state().snake.head();
            let next = head.moved_in_direction(Direction::Right);
            engine.state.food = Some(next);
            let result = engine.tick();
            assert!(result.info.ate_food);

            let expected = config
                .initial_interval_ms
                .saturating_sub(eaten * config.interval_step_ms)
                .max(config.min_interval_ms);
            assert_eq!(engine.tick_interval(), Duration::from_millis(expected));
        }
        assert_eq!(engine.tick_interval(), config.min_interval());
    }

    #[test]
    fn test_food_lands_on_only_free_cell() {
        // 3x1 board: snake fills two cells after eating, one cell left
        let mut engine = engine_at(
            GameConfig::with_grid(3, 1),
            vec![Position::new(0, 0)],
            Direction::Right,
            Some(Position::new(1, 0)),
        );

        let result = engine.tick();

        assert!(result.info.ate_food);
        assert!(!result.terminated);
        assert_eq!(engine.state().food, Some(Position::new(2, 0)));
    }

    #[test]
    fn test_filling_the_board_ends_the_game() {
        let mut engine = engine_at(
            GameConfig::with_grid(2, 1),
            vec![Position::new(0, 0)],
            Direction::Right,
            Some(Position::new(1, 0)),
        );

        let result = engine.tick();

        assert!(result.terminated);
        assert!(result.info.ate_food);
        assert!(result.info.board_filled);
        assert_eq!(result.signal(), Some(Signal::Eat));
        assert_eq!(engine.status(), GameStatus::Over(EndReason::BoardFilled));
        assert_eq!(engine.state().food, None);
        assert_eq!(engine.state().snake.len(), 2);
    }

    #[test]
    fn test_single_cell_board_starts_without_food() {
        let mut engine = GameEngine::seeded(GameConfig::with_grid(1, 1), 0);
        assert_eq!(engine.state().food, None);

        let result = engine.tick();
        assert_eq!(result.info.collision_type, Some(CollisionType::Wall));
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = GameEngine::seeded(GameConfig::default(), 77);
        let mut b = GameEngine::seeded(GameConfig::default(), 77);
        for _ in 0..50 {
            a.tick();
            b.tick();
            a.reset();
            b.reset();
        }
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_invariants_under_random_play() {
        let mut driver = StdRng::seed_from_u64(2024);
        let mut engine = GameEngine::seeded(GameConfig::with_grid(8, 6), 11);

        for _ in 0..20_000 {
            if driver.gen_bool(0.3) {
                engine.handle_input(ALL_DIRECTIONS[driver.gen_range(0..4)]);
            }
            // Steer towards food now and then so the snake grows
            if driver.gen_bool(0.5) {
                if let Some(food) = engine.state().food {
                    let head = engine.state().snake.head();
                    let dir = if food.x > head.x {
                        Direction::Right
                    } else if food.x < head.x {
                        Direction::Left
                    } else if food.y > head.y {
                        Direction::Down
                    } else {
                        Direction::Up
                    };
                    engine.handle_input(dir);
                }
            }

            let before = engine.state().snake.len();
            let was_running = engine.status().is_running();
            let result = engine.tick();
            let state = engine.state();

            if was_running && result.info.collision_type.is_none() {
                let expected = if result.info.ate_food { before + 1 } else { before };
                assert_eq!(state.snake.len(), expected);
            } else {
                assert_eq!(state.snake.len(), before);
            }
            if state.status.is_running() {
                assert_no_duplicates(state);
            }
            if let Some(food) = state.food {
                assert!(!state.snake.occupies(food));
            }

            if state.status.is_over() && driver.gen_bool(0.2) {
                engine.reset();
            }
        }
    }
}
