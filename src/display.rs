use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{Color, GameConfig};

/// Pixel position, top left corner is (0, 0)
pub type Point = (i32, i32);
/// Pixel width and height
pub type Size = (i32, i32);

/// Drawing surface the game renders onto. Everything is expressed in pixels of
/// a fixed size surface; the backend decides how that maps to its own units.
pub trait Display {
    fn clear_frame(&mut self);
    fn draw_rect(&mut self, position: Point, size: Size, color: Color);
    fn draw_text(&mut self, text: &str, position: Point, color: Color);
    /// Width in pixels that `text` takes once drawn
    fn measure_text(&self, text: &str) -> i32;
    fn present(&mut self) -> Result<()>;
}

/// Headless display that keeps the draw calls of the last frame.
#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    pub rects: Vec<(Point, Size, Color)>,
    pub texts: Vec<(String, Point, Color)>,
    pub frames: usize,
}

impl RecordingDisplay {
    pub const CHAR_WIDTH: i32 = 10;
}

impl Display for RecordingDisplay {
    fn clear_frame(&mut self) {
        self.rects.clear();
        self.texts.clear();
    }

    fn draw_rect(&mut self, position: Point, size: Size, color: Color) {
        self.rects.push((position, size, color));
    }

    fn draw_text(&mut self, text: &str, position: Point, color: Color) {
        self.texts.push((text.to_string(), position, color));
    }

    fn measure_text(&self, text: &str) -> i32 {
        text.chars().count() as i32 * Self::CHAR_WIDTH
    }

    fn present(&mut self) -> Result<()> {
        self.frames += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

/// Draws onto a character canvas and prints it to stdout. A grid cell is two
/// terminal columns wide so cells look roughly square.
pub struct TerminalDisplay {
    title: String,
    cell_size: i32,
    background: Color,
    columns: usize,
    rows: usize,
    canvas: Vec<Vec<Glyph>>,
}

impl TerminalDisplay {
    pub fn new(config: &GameConfig) -> Self {
        let columns = (config.grid_width() * 2).max(0) as usize;
        let rows = config.grid_height().max(0) as usize;
        let blank = Glyph {
            ch: ' ',
            fg: config.text_color,
            bg: config.background,
        };
        TerminalDisplay {
            title: config.title.to_string(),
            cell_size: config.cell_size,
            background: config.background,
            columns,
            rows,
            canvas: vec![vec![blank; columns]; rows],
        }
    }

    // pixels covered by one terminal column
    fn column_width(&self) -> i32 {
        (self.cell_size / 2).max(1)
    }

    #[cfg(test)]
    fn glyph_at(&self, column: usize, row: usize) -> Option<Glyph> {
        self.canvas.get(row).and_then(|r| r.get(column)).copied()
    }

    /// The whole frame as it is sent to the terminal
    pub fn render_frame(&self) -> String {
        let mut out = String::new();
        // clear screen and move the cursor home
        out.push_str("\x1b[2J\x1b[1;1H");
        out.push_str(&self.title);
        out.push('\n');
        // border up
        out.push('▗');
        out.push_str(&"▄".repeat(self.columns));
        out.push_str("▖\n");
        for row in &self.canvas {
            out.push('▐');
            for glyph in row {
                let painted = glyph
                    .ch
                    .to_string()
                    .truecolor(glyph.fg.r, glyph.fg.g, glyph.fg.b)
                    .on_truecolor(glyph.bg.r, glyph.bg.g, glyph.bg.b);
                out.push_str(&painted.to_string());
            }
            out.push_str("▌\n");
        }
        // border down
        out.push('▝');
        out.push_str(&"▀".repeat(self.columns));
        out.push_str("▘\n");
        out
    }
}

impl Display for TerminalDisplay {
    fn clear_frame(&mut self) {
        let background = self.background;
        for row in self.canvas.iter_mut() {
            for glyph in row.iter_mut() {
                glyph.ch = ' ';
                glyph.bg = background;
            }
        }
    }

    fn draw_rect(&mut self, position: Point, size: Size, color: Color) {
        let column_width = self.column_width();
        let first_column = position.0.div_euclid(column_width).max(0);
        let last_column = (position.0 + size.0 + column_width - 1).div_euclid(column_width);
        let first_row = position.1.div_euclid(self.cell_size).max(0);
        let last_row = (position.1 + size.1 + self.cell_size - 1).div_euclid(self.cell_size);
        for row in first_row..last_row.min(self.rows as i32) {
            for column in first_column..last_column.min(self.columns as i32) {
                let glyph = &mut self.canvas[row as usize][column as usize];
                glyph.ch = ' ';
                glyph.bg = color;
            }
        }
    }

    fn draw_text(&mut self, text: &str, position: Point, color: Color) {
        if position.1 < 0 {
            return;
        }
        let row = (position.1 / self.cell_size) as usize;
        let start = position.0.div_euclid(self.column_width());
        let Some(line) = self.canvas.get_mut(row) else {
            return;
        };
        for (offset, ch) in text.chars().enumerate() {
            let column = start + offset as i32;
            if column < 0 {
                continue;
            }
            match line.get_mut(column as usize) {
                Some(glyph) => {
                    glyph.ch = ch;
                    glyph.fg = color;
                }
                None => break,
            }
        }
    }

    fn measure_text(&self, text: &str) -> i32 {
        text.chars().count() as i32 * self.column_width()
    }

    fn present(&mut self) -> Result<()> {
        let frame = self.render_frame();
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(frame.as_bytes())
            .context("Failed to write frame to stdout")?;
        stdout.flush().context("Failed to flush stdout")?;
        Ok(())
    }
}
