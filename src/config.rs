use std::time::Duration;

/// An RGB color, independent of the backend that ends up drawing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }
}

/// Fixed game settings. Sizes are in pixels, the grid is derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub title: &'static str,
    pub width: i32,
    pub height: i32,
    pub cell_size: i32,
    pub target_score: u32,
    pub ticks_per_second: u32,
    pub background: Color,
    pub snake_colors: [Color; 2],
    pub apple_color: Color,
    pub text_color: Color,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Two-Player Snake Game",
            width: 800,
            height: 600,
            cell_size: 20,
            target_score: 10,
            ticks_per_second: 10,
            background: Color::BLACK,
            snake_colors: [Color::BLUE, Color::GREEN],
            apple_color: Color::RED,
            text_color: Color::WHITE,
        }
    }
}

impl GameConfig {
    /// Number of cells along the x axis
    pub fn grid_width(&self) -> i32 {
        self.width / self.cell_size
    }

    /// Number of cells along the y axis
    pub fn grid_height(&self) -> i32 {
        self.height / self.cell_size
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(1000 / self.ticks_per_second.max(1) as u64)
    }
}
