//! The monochrome framebuffer that `00E0` and `DXYN` draw to.

use std::fmt;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// Sprites are always one byte, eight pixels, wide.
const SPRITE_WIDTH: usize = 8;

/// A 64x32 grid of cells that are either 0 or 1, indexed `[y][x]`.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    cells: [[u8; SCREEN_WIDTH]; SCREEN_HEIGHT],
}

impl Framebuffer {

    pub fn new() -> Framebuffer {
        Framebuffer {
            cells: [[0; SCREEN_WIDTH]; SCREEN_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.cells = [[0; SCREEN_WIDTH]; SCREEN_HEIGHT];
    }

    /// The state of a cell, with both coordinates wrapped onto the screen.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y % SCREEN_HEIGHT][x % SCREEN_WIDTH]
    }

    pub fn rows(&self) -> &[[u8; SCREEN_WIDTH]; SCREEN_HEIGHT] {
        &self.cells
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|row| row.iter().all(|&c| c == 0))
    }

    /// XOR a sprite onto the screen with its top left corner at `(x, y)`.
    ///
    /// Each byte of `sprite` is one row, most significant bit leftmost. Pixels
    /// that fall off an edge wrap around to the opposite edge, rows and columns
    /// independently. Returns whether any lit cell was switched off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let x = x % SCREEN_WIDTH;
        let y = y % SCREEN_HEIGHT;

        let mut collision = false;
        for (row, byte) in sprite.iter().enumerate() {
            let cell_y = (y + row) % SCREEN_HEIGHT;
            for col in 0..SPRITE_WIDTH {
                if byte & (0x80 >> col) == 0 {
                    continue;
                }
                let cell = &mut self.cells[cell_y][(x + col) % SCREEN_WIDTH];
                if *cell == 1 {
                    collision = true;
                }
                *cell ^= 1;
            }
        }
        collision
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.iter() {
            for c in row.iter() {
                write!(f, "{}", if *c == 1 { "#" } else { " " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        fmt::Display::fmt(self, f)
    }
}
