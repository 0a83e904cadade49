// the body is stored head first, every move prepends a head and drops the tail;
// eating appends a copy of the tail which unfolds on the following moves
use std::collections::VecDeque;

use rand::Rng;
use tracing::trace;

use crate::config::Color;
use crate::display::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SnakeDirection {
    pub const ALL: [SnakeDirection; 4] = [
        SnakeDirection::Up,
        SnakeDirection::Down,
        SnakeDirection::Left,
        SnakeDirection::Right,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> SnakeDirection {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn opposite(self) -> SnakeDirection {
        match self {
            SnakeDirection::Up => SnakeDirection::Down,
            SnakeDirection::Down => SnakeDirection::Up,
            SnakeDirection::Left => SnakeDirection::Right,
            SnakeDirection::Right => SnakeDirection::Left,
        }
    }

    /// Unit vector of the direction, y grows downwards
    pub fn delta(self) -> (i32, i32) {
        match self {
            SnakeDirection::Up => (0, -1),
            SnakeDirection::Down => (0, 1),
            SnakeDirection::Left => (-1, 0),
            SnakeDirection::Right => (1, 0),
        }
    }
}

/// A cell of the grid. Values outside the grid are representable so that a
/// head that went through a wall can still be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub fn new(x: i32, y: i32) -> Coordinates {
        Coordinates { x, y }
    }

    pub fn step(self, direction: SnakeDirection) -> Coordinates {
        let (dx, dy) = direction.delta();
        Coordinates::new(self.x + dx, self.y + dy)
    }

    pub fn is_in_bound(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.y >= 0 && self.y < height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<Coordinates>, // The head is the first element
    direction: SnakeDirection,
    score: u32,
}

// the body is never empty
#[allow(clippy::len_without_is_empty)]
impl Snake {
    pub fn new(head: Coordinates, direction: SnakeDirection) -> Self {
        Self::from_body(vec![head], direction)
    }

    /// Builds a snake from explicit segments, head first. `body` must hold at
    /// least one segment.
    pub fn from_body(body: Vec<Coordinates>, direction: SnakeDirection) -> Self {
        debug_assert!(!body.is_empty(), "a snake needs at least one segment");
        Snake {
            body: body.into(),
            direction,
            score: 0,
        }
    }

    pub fn head(&self) -> Coordinates {
        self.body[0]
    }

    pub fn tail(&self) -> Coordinates {
        self.body[self.body.len() - 1]
    }

    pub fn body(&self) -> impl Iterator<Item = &Coordinates> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn direction(&self) -> SnakeDirection {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_point(&mut self) {
        self.score += 1;
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    /// Advance one cell in the current direction. Bounds are not checked here.
    pub fn move_forward(&mut self) {
        let new_head = self.head().step(self.direction);
        self.body.push_front(new_head);
        self.body.pop_back();
    }

    pub fn grow(&mut self) {
        let tail = self.tail();
        self.body.push_back(tail);
    }

    /// Turning back onto the neck is ignored, every other direction is taken.
    pub fn change_direction(&mut self, direction: SnakeDirection) {
        if direction == self.direction.opposite() {
            trace!(?direction, current = ?self.direction, "reversal ignored");
            return;
        }
        self.direction = direction;
    }

    pub fn occupies(&self, position: Coordinates) -> bool {
        self.body.contains(&position)
    }

    /// True when the head sits on any other segment, including a tail copy
    /// stacked by `grow` that has not unfolded yet. A one segment snake that
    /// eats therefore bites itself on the same tick.
    pub fn bites_itself(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|segment| *segment == head)
    }

    pub fn draw<D: Display + ?Sized>(&self, display: &mut D, cell_size: i32, color: Color) {
        for segment in self.body.iter() {
            display.draw_rect(
                (segment.x * cell_size, segment.y * cell_size),
                (cell_size, cell_size),
                color,
            );
        }
    }
}
