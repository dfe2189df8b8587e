//! Snake simulation on a square grid.
//!
//! The grid is `size × size` cells with `(0, 0)` at the top left. The
//! simulation only advances through [`GameState::tick`]; direction input goes
//! through [`GameState::turn`], which accepts at most one change per tick.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rng::FoodSource;

/// Default grid edge length
pub const DEFAULT_GRID_SIZE: i32 = 20;

/// Points awarded per food eaten by default
pub const DEFAULT_SCORE_INCREMENT: u32 = 10;

/// Grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn offset(self, dir: Direction) -> Self {
        let (dx, dy) = dir.vector();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Heading of the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector, y grows downwards
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    fn same_axis(self, other: Direction) -> bool {
        self.is_horizontal() == other.is_horizontal()
    }
}

/// Where new food may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoodPlacement {
    /// Uniform over cells the snake does not occupy
    #[default]
    FreeCell,
    /// Uniform over the whole grid, even under the snake
    Anywhere,
}

/// Rules that stay fixed for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    pub grid_size: i32,
    pub score_increment: u32,
    pub food_placement: FoodPlacement,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            score_increment: DEFAULT_SCORE_INCREMENT,
            food_placement: FoodPlacement::default(),
        }
    }
}

/// Why the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfHit,
}

/// Result of one simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Moved,
    Ate,
    Collided(Collision),
    /// The game was already over; nothing changed
    Stopped,
}

/// What a grid cell shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Food,
    Body,
    Head,
}

/// Live game state
#[derive(Debug, Clone)]
pub struct GameState {
    settings: GameSettings,
    /// Head first
    snake: Vec<Point>,
    food: Point,
    direction: Direction,
    score: u32,
    turn_open: bool,
    over: bool,
}

impl GameState {
    /// Fresh game: one segment in the middle heading up, score zero.
    pub fn new(settings: GameSettings, rng: &mut dyn FoodSource) -> Self {
        let mid = settings.grid_size / 2;
        let mut state = Self {
            settings,
            snake: vec![Point::new(mid, mid)],
            food: Point::new(0, 0),
            direction: Direction::Up,
            score: 0,
            turn_open: true,
            over: false,
        };
        state.food = state.spawn_food(rng);
        state
    }

    pub fn grid_size(&self) -> i32 {
        self.settings.grid_size
    }

    pub fn snake(&self) -> &[Point] {
        &self.snake
    }

    pub fn head(&self) -> Point {
        self.snake[0]
    }

    pub fn food(&self) -> Point {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    #[cfg(test)]
    pub fn can_turn(&self) -> bool {
        self.turn_open
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        let n = self.settings.grid_size;
        (0..n).contains(&p.x) && (0..n).contains(&p.y)
    }

    /// Request a new heading.
    ///
    /// Accepted only while the turn lock is open and the new heading is on
    /// the other axis; anything else is dropped, not queued.
    pub fn turn(&mut self, dir: Direction) -> bool {
        if self.over || !self.turn_open || dir.same_axis(self.direction) {
            return false;
        }
        debug!(from = ?self.direction, to = ?dir, "Turn accepted");
        self.direction = dir;
        self.turn_open = false;
        true
    }

    /// Advance one step
    pub fn tick(&mut self, rng: &mut dyn FoodSource) -> TickOutcome {
        if self.over {
            return TickOutcome::Stopped;
        }
        self.turn_open = true;

        let candidate = self.head().offset(self.direction);
        if !self.in_bounds(candidate) {
            self.over = true;
            return TickOutcome::Collided(Collision::Wall);
        }
        if self.snake.contains(&candidate) {
            self.over = true;
            return TickOutcome::Collided(Collision::SelfHit);
        }

        self.snake.insert(0, candidate);
        if candidate == self.food {
            self.score += self.settings.score_increment;
            self.food = self.spawn_food(rng);
            TickOutcome::Ate
        } else {
            self.snake.pop();
            TickOutcome::Moved
        }
    }

    fn spawn_food(&self, rng: &mut dyn FoodSource) -> Point {
        let n = self.settings.grid_size;
        if self.settings.food_placement == FoodPlacement::FreeCell {
            let free: Vec<Point> = (0..n)
                .flat_map(|y| (0..n).map(move |x| Point::new(x, y)))
                .filter(|p| !self.snake.contains(p))
                .collect();
            if !free.is_empty() {
                return free[rng.next_index(free.len())];
            }
        }
        let x = rng.next_index(n as usize) as i32;
        let y = rng.next_index(n as usize) as i32;
        Point::new(x, y)
    }

    /// Classify one cell. Head wins over body, body over food.
    pub fn cell_at(&self, p: Point) -> Cell {
        if self.head() == p {
            Cell::Head
        } else if self.snake[1..].contains(&p) {
            Cell::Body
        } else if self.food == p {
            Cell::Food
        } else {
            Cell::Empty
        }
    }

    /// All cells, row-major
    pub fn cells(&self) -> Vec<Cell> {
        let n = self.settings.grid_size;
        let mut cells = vec![Cell::Empty; (n * n) as usize];
        let idx = |p: Point| (p.y * n + p.x) as usize;
        if self.in_bounds(self.food) {
            cells[idx(self.food)] = Cell::Food;
        }
        for seg in &self.snake[1..] {
            cells[idx(*seg)] = Cell::Body;
        }
        cells[idx(self.head())] = Cell::Head;
        cells
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        settings: GameSettings,
        snake: Vec<Point>,
        food: Point,
        direction: Direction,
    ) -> Self {
        assert!(!snake.is_empty());
        Self {
            settings,
            snake,
            food,
            direction,
            score: 0,
            turn_open: true,
            over: false,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Replays a fixed list of indices, wrapping around
    pub(crate) struct Scripted {
        values: Vec<usize>,
        pos: usize,
    }

    impl Scripted {
        pub(crate) fn new(values: &[usize]) -> Self {
            Self { values: values.to_vec(), pos: 0 }
        }
    }

    impl FoodSource for Scripted {
        fn next_index(&mut self, bound: usize) -> usize {
            let v = self.values.get(self.pos % self.values.len().max(1)).copied().unwrap_or(0);
            self.pos += 1;
            v % bound
        }
    }

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    fn anywhere() -> GameSettings {
        GameSettings {
            food_placement: FoodPlacement::Anywhere,
            ..GameSettings::default()
        }
    }

    fn assert_invariants(game: &GameState) {
        assert!(!game.snake().is_empty());
        let unique: HashSet<_> = game.snake().iter().collect();
        assert_eq!(unique.len(), game.snake().len());
        let (dx, dy) = game.direction().vector();
        assert_eq!(dx.abs() + dy.abs(), 1);
    }

    #[test]
    fn test_new_game() {
        let game = GameState::new(anywhere(), &mut Scripted::new(&[15, 5]));
        assert_eq!(game.snake(), &[p(10, 10)]);
        assert_eq!(game.direction(), Direction::Up);
        assert_eq!(game.score(), 0);
        assert_eq!(game.food(), p(15, 5));
        assert!(game.can_turn());
        assert!(!game.is_over());
    }

    #[test]
    fn test_eat_food_grows() {
        let mut game = GameState::from_parts(
            GameSettings::default(),
            vec![p(10, 10)],
            p(10, 9),
            Direction::Up,
        );
        let outcome = game.tick(&mut Scripted::new(&[0]));
        assert_eq!(outcome, TickOutcome::Ate);
        assert_eq!(game.head(), p(10, 9));
        assert_eq!(game.score(), 10);
        assert_eq!(game.snake().len(), 2);
        assert!(!game.snake().contains(&game.food()));
        assert_invariants(&game);
    }

    #[test]
    fn test_move_keeps_length() {
        let mut game = GameState::from_parts(
            anywhere(),
            vec![p(5, 5), p(5, 6), p(5, 7)],
            p(0, 0),
            Direction::Up,
        );
        assert_eq!(game.tick(&mut Scripted::new(&[0])), TickOutcome::Moved);
        assert_eq!(game.snake(), &[p(5, 4), p(5, 5), p(5, 6)]);
        assert_invariants(&game);
    }

    #[test]
    fn test_wall_collision_leaves_snake() {
        let mut game = GameState::from_parts(
            GameSettings::default(),
            vec![p(0, 5)],
            p(10, 10),
            Direction::Left,
        );
        assert_eq!(
            game.tick(&mut Scripted::new(&[0])),
            TickOutcome::Collided(Collision::Wall)
        );
        assert!(game.is_over());
        assert_eq!(game.snake(), &[p(0, 5)]);
        assert_eq!(game.tick(&mut Scripted::new(&[0])), TickOutcome::Stopped);
    }

    #[test]
    fn test_far_wall_collision() {
        let mut game = GameState::from_parts(
            GameSettings::default(),
            vec![p(19, 3)],
            p(0, 0),
            Direction::Right,
        );
        assert_eq!(
            game.tick(&mut Scripted::new(&[0])),
            TickOutcome::Collided(Collision::Wall)
        );
    }

    #[test]
    fn test_self_collision() {
        // Head at (5,5) moving down into its own body at (5,6)
        let snake = vec![p(5, 5), p(6, 5), p(6, 6), p(5, 6), p(4, 6)];
        let mut game =
            GameState::from_parts(GameSettings::default(), snake.clone(), p(0, 0), Direction::Down);
        assert_eq!(
            game.tick(&mut Scripted::new(&[0])),
            TickOutcome::Collided(Collision::SelfHit)
        );
        assert_eq!(game.snake(), snake.as_slice());
    }

    #[test]
    fn test_reversal_rejected() {
        let mut game = GameState::new(GameSettings::default(), &mut Scripted::new(&[0]));
        assert!(!game.turn(Direction::Down));
        assert_eq!(game.direction(), Direction::Up);
        assert!(game.can_turn());

        game.tick(&mut Scripted::new(&[0]));
        assert!(!game.turn(Direction::Down));
        assert!(!game.turn(Direction::Up));
        assert_eq!(game.direction(), Direction::Up);
    }

    #[test]
    fn test_one_turn_per_tick() {
        let mut game = GameState::new(GameSettings::default(), &mut Scripted::new(&[0]));
        assert!(game.turn(Direction::Right));
        assert!(!game.turn(Direction::Down));
        assert_eq!(game.direction(), Direction::Right);

        game.tick(&mut Scripted::new(&[0]));
        assert_eq!(game.head(), p(11, 10));
        assert!(game.turn(Direction::Down));
        assert_eq!(game.direction(), Direction::Down);
    }

    #[test]
    fn test_free_cell_food_avoids_snake() {
        // Every cell but (3,3) is taken on a 5x5 grid
        let settings = GameSettings { grid_size: 5, ..GameSettings::default() };
        let mut snake = Vec::new();
        for y in 0..5 {
            let row: Vec<Point> = if y % 2 == 0 {
                (0..5).map(|x| p(x, y)).collect()
            } else {
                (0..5).rev().map(|x| p(x, y)).collect()
            };
            snake.extend(row);
        }
        snake.retain(|s| *s != p(3, 3));
        let game = GameState::from_parts(settings, snake, p(0, 0), Direction::Up);
        for seed in 0..10 {
            assert_eq!(game.spawn_food(&mut Scripted::new(&[seed])), p(3, 3));
        }
    }

    #[test]
    fn test_anywhere_food_may_overlap() {
        let game = GameState::from_parts(anywhere(), vec![p(2, 3)], p(0, 0), Direction::Up);
        assert_eq!(game.spawn_food(&mut Scripted::new(&[2, 3])), p(2, 3));
    }

    #[test]
    fn test_cell_precedence() {
        let game = GameState::from_parts(
            anywhere(),
            vec![p(4, 4), p(4, 5), p(4, 6)],
            p(4, 5),
            Direction::Up,
        );
        assert_eq!(game.cell_at(p(4, 4)), Cell::Head);
        assert_eq!(game.cell_at(p(4, 5)), Cell::Body);
        assert_eq!(game.cell_at(p(0, 0)), Cell::Empty);

        let cells = game.cells();
        assert_eq!(cells.len(), 400);
        assert_eq!(cells[(5 * 20 + 4) as usize], Cell::Body);
        assert_eq!(cells.iter().filter(|c| **c == Cell::Food).count(), 0);
        assert_eq!(cells.iter().filter(|c| **c == Cell::Head).count(), 1);
    }

    #[test]
    fn test_invariants_over_long_run() {
        let mut rng = crate::core::rng::XorShift::new(99);
        let mut game = GameState::new(GameSettings::default(), &mut rng);
        let turns = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];
        for step in 0..200 {
            if step % 3 == 0 {
                game.turn(turns[(step / 3) % 4]);
            }
            game.tick(&mut rng);
            assert_invariants(&game);
            if game.is_over() {
                break;
            }
        }
    }
}
