//! Two players, two snakes, one apple. First to the target score wins, running
//! into a wall or into yourself ends the game.

pub mod apple;
pub mod config;
pub mod display;
pub mod game;
pub mod input;
pub mod snake;
pub mod terminal;

pub use config::{Color, GameConfig};
pub use game::{CollisionKind, Control, EndReason, Game, Phase, Player};
pub use snake::{Coordinates, Snake, SnakeDirection};
