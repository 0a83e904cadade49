use anyhow::Result;
use rand::Rng;
use tracing::{debug, info};

use crate::apple::place_apple;
use crate::config::GameConfig;
use crate::display::Display;
use crate::input::{InputEvent, InputSource, Key};
use crate::snake::{Coordinates, Snake, SnakeDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];

    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Player::One => "Player 1",
            Player::Two => "Player 2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    Wall,
    SelfBite,
}

/// Why the game stopped. Only the first reason seen is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Collision { player: Player, kind: CollisionKind },
    TargetReached,
}

/// What the driver should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The whole game state: both snakes, the apple and the running flag.
pub struct Game<R: Rng> {
    config: GameConfig,
    snakes: [Snake; 2],
    apple: Coordinates,
    phase: Phase,
    end_reason: Option<EndReason>,
    rng: R,
}

impl<R: Rng> Game<R> {
    /// Spawns player 1 a quarter of the way across, player 2 three quarters,
    /// both on the middle row, each heading in a random direction.
    pub fn new(config: GameConfig, mut rng: R) -> Self {
        let row = config.height / 2 / config.cell_size;
        let first = Coordinates::new(config.width / 4 / config.cell_size, row);
        let second = Coordinates::new(3 * config.width / 4 / config.cell_size, row);
        let first_direction = SnakeDirection::random(&mut rng);
        let second_direction = SnakeDirection::random(&mut rng);
        let snakes = [
            Snake::new(first, first_direction),
            Snake::new(second, second_direction),
        ];
        let apple = place_apple(
            &mut rng,
            config.grid_width(),
            config.grid_height(),
            &[&snakes[0], &snakes[1]],
        );
        info!(
            ?first,
            ?first_direction,
            ?second,
            ?second_direction,
            ?apple,
            "game started"
        );
        Game {
            config,
            snakes,
            apple,
            phase: Phase::Running,
            end_reason: None,
            rng,
        }
    }

    /// Starts from a prepared position instead of the usual spawn
    pub fn with_state(
        config: GameConfig,
        rng: R,
        first: Snake,
        second: Snake,
        apple: Coordinates,
    ) -> Self {
        Game {
            config,
            snakes: [first, second],
            apple,
            phase: Phase::Running,
            end_reason: None,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snake(&self, player: Player) -> &Snake {
        &self.snakes[player.index()]
    }

    pub fn snake_mut(&mut self, player: Player) -> &mut Snake {
        &mut self.snakes[player.index()]
    }

    pub fn apple(&self) -> Coordinates {
        self.apple
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// Applies one input event. Keys nobody listens to are dropped.
    pub fn handle_event(&mut self, event: InputEvent) -> Control {
        let (player, direction) = match event {
            InputEvent::Quit => return Control::Quit,
            InputEvent::KeyDown(key) => match key {
                Key::W => (Player::One, SnakeDirection::Up),
                Key::S => (Player::One, SnakeDirection::Down),
                Key::A => (Player::One, SnakeDirection::Left),
                Key::D => (Player::One, SnakeDirection::Right),
                Key::ArrowUp => (Player::Two, SnakeDirection::Up),
                Key::ArrowDown => (Player::Two, SnakeDirection::Down),
                Key::ArrowLeft => (Player::Two, SnakeDirection::Left),
                Key::ArrowRight => (Player::Two, SnakeDirection::Right),
                Key::Other(_) => return Control::Continue,
            },
        };
        self.snake_mut(player).change_direction(direction);
        Control::Continue
    }

    /// Advances the simulation by one tick: move, eat, collide, check the score.
    /// Does nothing once the game has ended.
    pub fn step(&mut self) -> Phase {
        if self.phase == Phase::Ended {
            return self.phase;
        }

        for snake in self.snakes.iter_mut() {
            snake.move_forward();
        }

        self.eat_apple();

        // snakes only collide with walls and themselves, never with each other
        for player in Player::BOTH {
            if let Some(kind) = self.collision(player) {
                info!(player = player.label(), ?kind, "collision");
                self.end(EndReason::Collision { player, kind });
            }
        }

        let target = self.config.target_score;
        if self.snakes.iter().any(|snake| snake.score() >= target) {
            info!(
                first = self.snakes[0].score(),
                second = self.snakes[1].score(),
                target,
                "target score reached"
            );
            self.end(EndReason::TargetReached);
        }

        self.phase
    }

    fn eat_apple(&mut self) {
        // both heads are compared to the apple as it was before anyone ate
        let apple = self.apple;
        let mut eaten = 0;
        for player in Player::BOTH {
            if self.snakes[player.index()].head() != apple {
                continue;
            }
            let snake = &mut self.snakes[player.index()];
            snake.grow();
            snake.add_point();
            eaten += 1;
            debug!(
                player = player.label(),
                score = snake.score(),
                "apple eaten"
            );
            self.apple = place_apple(
                &mut self.rng,
                self.config.grid_width(),
                self.config.grid_height(),
                &[&self.snakes[0], &self.snakes[1]],
            );
        }
        if eaten > 1 {
            debug!(apple = ?self.apple, "both snakes ate the same apple");
        }
    }

    fn collision(&self, player: Player) -> Option<CollisionKind> {
        let snake = &self.snakes[player.index()];
        if !snake
            .head()
            .is_in_bound(self.config.grid_width(), self.config.grid_height())
        {
            return Some(CollisionKind::Wall);
        }
        if snake.bites_itself() {
            return Some(CollisionKind::SelfBite);
        }
        None
    }

    fn end(&mut self, reason: EndReason) {
        self.phase = Phase::Ended;
        if self.end_reason.is_none() {
            self.end_reason = Some(reason);
        }
    }

    /// One full tick as the driver runs it: drain input, step, then render if
    /// the game is still going.
    pub fn tick<I, D>(&mut self, input: &mut I, display: &mut D) -> Result<Control>
    where
        I: InputSource + ?Sized,
        D: Display + ?Sized,
    {
        for event in input.poll_events() {
            if self.handle_event(event) == Control::Quit {
                return Ok(Control::Quit);
            }
        }
        if self.step() == Phase::Running {
            self.render(display)?;
        }
        Ok(Control::Continue)
    }

    pub fn render<D: Display + ?Sized>(&self, display: &mut D) -> Result<()> {
        let config = &self.config;
        let cell = config.cell_size;
        display.clear_frame();
        for player in Player::BOTH {
            self.snake(player)
                .draw(display, cell, config.snake_colors[player.index()]);
        }
        display.draw_rect(
            (self.apple.x * cell, self.apple.y * cell),
            (cell, cell),
            config.apple_color,
        );

        let first = format!("{} Score: {}", Player::One.label(), self.snakes[0].score());
        let second = format!("{} Score: {}", Player::Two.label(), self.snakes[1].score());
        display.draw_text(&first, (10, 10), config.text_color);
        let second_x = config.width - display.measure_text(&second) - 10;
        display.draw_text(&second, (second_x, 10), config.text_color);

        display.present()
    }

    /// Player 1 wins whenever it reached the target, otherwise player 2 is
    /// reported. `None` while the game is still running.
    pub fn winner(&self) -> Option<Player> {
        match self.phase {
            Phase::Running => None,
            Phase::Ended if self.snakes[0].score() >= self.config.target_score => {
                Some(Player::One)
            }
            Phase::Ended => Some(Player::Two),
        }
    }

    /// The line printed once the game is over
    pub fn result_message(&self) -> Option<String> {
        self.winner().map(|winner| format!("{} wins!", winner.label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::RecordingDisplay;
    use crate::input::ScriptedInput;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn game_with(first: Snake, second: Snake, apple: Coordinates) -> Game<StdRng> {
        Game::with_state(GameConfig::default(), rng(), first, second, apple)
    }

    fn idle_second() -> Snake {
        Snake::new(Coordinates::new(30, 15), SnakeDirection::Down)
    }

    #[test]
    fn test_new_game_spawn() {
        let game = Game::new(GameConfig::default(), rng());
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.snake(Player::One).head(), Coordinates::new(10, 15));
        assert_eq!(game.snake(Player::Two).head(), Coordinates::new(30, 15));
        assert_eq!(game.snake(Player::One).score(), 0);
        assert!(!game.snake(Player::One).occupies(game.apple()));
        assert!(!game.snake(Player::Two).occupies(game.apple()));
        assert!(game.winner().is_none());
    }

    #[test]
    fn test_eating_the_apple() {
        let mut game = game_with(
            Snake::new(Coordinates::new(5, 5), SnakeDirection::Right),
            idle_second(),
            Coordinates::new(6, 5),
        );
        // the tail copy from growing sits under the head of a one segment snake
        assert_eq!(game.step(), Phase::Ended);
        let snake = game.snake(Player::One);
        assert_eq!(snake.head(), Coordinates::new(6, 5));
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.score(), 1);
        assert_ne!(game.apple(), Coordinates::new(6, 5));
        assert!(!snake.occupies(game.apple()));
        assert_eq!(
            game.end_reason(),
            Some(EndReason::Collision {
                player: Player::One,
                kind: CollisionKind::SelfBite
            })
        );
    }

    #[test]
    fn test_longer_snake_keeps_running_after_eating() {
        let first = Snake::from_body(
            vec![Coordinates::new(5, 5), Coordinates::new(4, 5)],
            SnakeDirection::Right,
        );
        let mut game = game_with(first, idle_second(), Coordinates::new(6, 5));
        assert_eq!(game.step(), Phase::Running);
        let snake = game.snake(Player::One);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.score(), 1);
    }

    #[test]
    fn test_wall_ends_the_game() {
        let mut game = game_with(
            Snake::new(Coordinates::new(0, 7), SnakeDirection::Left),
            idle_second(),
            Coordinates::new(20, 20),
        );
        assert_eq!(game.step(), Phase::Ended);
        assert_eq!(game.snake(Player::One).head(), Coordinates::new(-1, 7));
        assert_eq!(
            game.end_reason(),
            Some(EndReason::Collision {
                player: Player::One,
                kind: CollisionKind::Wall
            })
        );
    }

    #[test]
    fn test_every_wall() {
        let cases = [
            (Coordinates::new(39, 3), SnakeDirection::Right),
            (Coordinates::new(3, 0), SnakeDirection::Up),
            (Coordinates::new(3, 29), SnakeDirection::Down),
        ];
        for (head, direction) in cases {
            let mut game = game_with(
                Snake::new(Coordinates::new(10, 10), SnakeDirection::Down),
                Snake::new(head, direction),
                Coordinates::new(20, 20),
            );
            assert_eq!(game.step(), Phase::Ended);
            assert_eq!(
                game.end_reason(),
                Some(EndReason::Collision {
                    player: Player::Two,
                    kind: CollisionKind::Wall
                })
            );
        }
    }

    #[test]
    fn test_self_bite_ends_the_game() {
        // a hook shape: moving up puts the head on (5, 4)
        let first = Snake::from_body(
            vec![
                Coordinates::new(5, 5),
                Coordinates::new(6, 5),
                Coordinates::new(6, 4),
                Coordinates::new(5, 4),
                Coordinates::new(4, 4),
            ],
            SnakeDirection::Up,
        );
        let mut game = game_with(first, idle_second(), Coordinates::new(20, 20));
        assert_eq!(game.step(), Phase::Ended);
        assert_eq!(
            game.end_reason(),
            Some(EndReason::Collision {
                player: Player::One,
                kind: CollisionKind::SelfBite
            })
        );
    }

    #[test]
    fn test_snakes_pass_through_each_other() {
        let first = Snake::new(Coordinates::new(10, 10), SnakeDirection::Right);
        let second = Snake::from_body(
            vec![
                Coordinates::new(11, 9),
                Coordinates::new(11, 10),
                Coordinates::new(11, 11),
            ],
            SnakeDirection::Up,
        );
        let mut game = game_with(first, second, Coordinates::new(20, 20));
        assert_eq!(game.step(), Phase::Running);
        assert!(game
            .snake(Player::Two)
            .occupies(game.snake(Player::One).head()));
    }

    #[test]
    fn test_target_score_wins() {
        let mut first = Snake::from_body(
            vec![Coordinates::new(5, 5), Coordinates::new(4, 5)],
            SnakeDirection::Right,
        );
        first.set_score(9);
        let mut game = game_with(first, idle_second(), Coordinates::new(6, 5));
        assert_eq!(game.step(), Phase::Ended);
        assert_eq!(game.end_reason(), Some(EndReason::TargetReached));
        assert_eq!(game.winner(), Some(Player::One));
        assert_eq!(game.result_message().as_deref(), Some("Player 1 wins!"));
    }

    #[test]
    fn test_second_player_reaches_target() {
        let mut second = Snake::from_body(
            vec![Coordinates::new(30, 15), Coordinates::new(31, 15)],
            SnakeDirection::Left,
        );
        second.set_score(9);
        let mut game = game_with(
            Snake::new(Coordinates::new(5, 5), SnakeDirection::Down),
            second,
            Coordinates::new(29, 15),
        );
        assert_eq!(game.step(), Phase::Ended);
        assert_eq!(game.winner(), Some(Player::Two));
    }

    #[test]
    fn test_both_reach_target_first_player_wins() {
        let mut first = Snake::from_body(
            vec![Coordinates::new(5, 5), Coordinates::new(4, 5)],
            SnakeDirection::Right,
        );
        first.set_score(9);
        let mut second = Snake::from_body(
            vec![Coordinates::new(7, 5), Coordinates::new(8, 5)],
            SnakeDirection::Left,
        );
        second.set_score(9);
        let mut game = game_with(first, second, Coordinates::new(6, 5));
        assert_eq!(game.step(), Phase::Ended);
        assert_eq!(game.end_reason(), Some(EndReason::TargetReached));
        assert_eq!(game.snake(Player::One).score(), 10);
        assert_eq!(game.snake(Player::Two).score(), 10);
        assert_eq!(game.snake(Player::One).len(), 3);
        assert_eq!(game.snake(Player::Two).len(), 3);
        assert_eq!(game.winner(), Some(Player::One));
    }

    #[test]
    fn test_collision_without_target_reports_player_two() {
        let mut game = game_with(
            Snake::new(Coordinates::new(0, 7), SnakeDirection::Left),
            idle_second(),
            Coordinates::new(20, 20),
        );
        game.step();
        assert_eq!(game.winner(), Some(Player::Two));
    }

    #[test]
    fn test_step_after_end_is_a_no_op() {
        let mut game = game_with(
            Snake::new(Coordinates::new(0, 7), SnakeDirection::Left),
            idle_second(),
            Coordinates::new(20, 20),
        );
        game.step();
        let head = game.snake(Player::Two).head();
        assert_eq!(game.step(), Phase::Ended);
        assert_eq!(game.snake(Player::Two).head(), head);
    }

    #[test]
    fn test_key_mapping() {
        let mut game = game_with(
            Snake::new(Coordinates::new(10, 10), SnakeDirection::Up),
            Snake::new(Coordinates::new(20, 10), SnakeDirection::Up),
            Coordinates::new(0, 0),
        );
        let cases = [
            (Key::A, Player::One, SnakeDirection::Left),
            (Key::S, Player::One, SnakeDirection::Down),
            (Key::D, Player::One, SnakeDirection::Right),
            (Key::W, Player::One, SnakeDirection::Up),
            (Key::ArrowLeft, Player::Two, SnakeDirection::Left),
            (Key::ArrowDown, Player::Two, SnakeDirection::Down),
            (Key::ArrowRight, Player::Two, SnakeDirection::Right),
            (Key::ArrowUp, Player::Two, SnakeDirection::Up),
        ];
        for (key, player, direction) in cases {
            assert_eq!(
                game.handle_event(InputEvent::KeyDown(key)),
                Control::Continue
            );
            assert_eq!(game.snake(player).direction(), direction);
        }
        assert_eq!(game.handle_event(InputEvent::Quit), Control::Quit);
    }

    #[test]
    fn test_reversal_keys_are_ignored() {
        let mut game = game_with(
            Snake::new(Coordinates::new(10, 10), SnakeDirection::Right),
            Snake::new(Coordinates::new(20, 10), SnakeDirection::Up),
            Coordinates::new(0, 0),
        );
        game.handle_event(InputEvent::KeyDown(Key::A));
        game.handle_event(InputEvent::KeyDown(Key::ArrowDown));
        game.handle_event(InputEvent::KeyDown(Key::Other(b'x')));
        assert_eq!(game.snake(Player::One).direction(), SnakeDirection::Right);
        assert_eq!(game.snake(Player::Two).direction(), SnakeDirection::Up);
    }

    #[test]
    fn test_tick_renders_running_game() {
        let mut game = game_with(
            Snake::new(Coordinates::new(5, 5), SnakeDirection::Right),
            Snake::new(Coordinates::new(20, 10), SnakeDirection::Up),
            Coordinates::new(0, 0),
        );
        let mut input = ScriptedInput::new(vec![vec![InputEvent::KeyDown(Key::S)]]);
        let mut display = RecordingDisplay::default();
        assert_eq!(
            game.tick(&mut input, &mut display).ok(),
            Some(Control::Continue)
        );
        assert_eq!(game.snake(Player::One).head(), Coordinates::new(5, 6));
        assert_eq!(display.frames, 1);
        assert_eq!(display.rects.len(), 3);
        let config = GameConfig::default();
        assert_eq!(
            display.rects[0],
            ((100, 120), (20, 20), config.snake_colors[0])
        );
        assert_eq!(display.rects[2], ((0, 0), (20, 20), config.apple_color));
        assert_eq!(display.texts[0].0, "Player 1 Score: 0");
        assert_eq!(display.texts[0].1, (10, 10));
        // right aligned, 17 chars at 10 px each
        assert_eq!(display.texts[1].0, "Player 2 Score: 0");
        assert_eq!(display.texts[1].1, (800 - 170 - 10, 10));
    }

    #[test]
    fn test_tick_quits_before_stepping() {
        let mut game = game_with(
            Snake::new(Coordinates::new(5, 5), SnakeDirection::Right),
            idle_second(),
            Coordinates::new(0, 0),
        );
        let mut input = ScriptedInput::new(vec![vec![
            InputEvent::KeyDown(Key::S),
            InputEvent::Quit,
        ]]);
        let mut display = RecordingDisplay::default();
        assert_eq!(game.tick(&mut input, &mut display).ok(), Some(Control::Quit));
        assert_eq!(game.snake(Player::One).head(), Coordinates::new(5, 5));
        assert_eq!(display.frames, 0);
    }

    #[test]
    fn test_tick_does_not_render_ended_game() {
        let mut game = game_with(
            Snake::new(Coordinates::new(0, 5), SnakeDirection::Left),
            idle_second(),
            Coordinates::new(20, 20),
        );
        let mut display = RecordingDisplay::default();
        let control = game.tick(&mut ScriptedInput::default(), &mut display).ok();
        assert_eq!(control, Some(Control::Continue));
        assert_eq!(game.phase(), Phase::Ended);
        assert_eq!(display.frames, 0);
    }
}
