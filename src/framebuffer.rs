use std::fmt;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

pub const PIXEL_ON: u32 = 0xFFFF_FFFF;
pub const PIXEL_OFF: u32 = 0;

/// sprites are always 8 pixels wide, one byte per row
const SPRITE_WIDTH: usize = 8;

/// 64x32 monochrome pixel grid, row-major. Each cell is a full-width pixel
/// value so the presentation layer can blit it without conversion.
pub struct FrameBuffer {
    cells: Box<[u32]>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            cells: vec![PIXEL_OFF; WIDTH * HEIGHT].into_boxed_slice(),
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(PIXEL_OFF);
    }

    /// XOR an 8-pixel-wide sprite onto the grid with its top-left corner at
    /// (x, y). Every pixel coordinate wraps around the edges. Returns true
    /// when any pixel that was on got switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut collision = false;
        for (dy, row) in rows.iter().enumerate() {
            let py = (y as usize + dy) % HEIGHT;
            for dx in 0..SPRITE_WIDTH {
                if row & (0x80u8 >> dx) == 0 {
                    continue;
                }
                let px = (x as usize + dx) % WIDTH;
                let cell = &mut self.cells[py * WIDTH + px];
                if *cell == PIXEL_ON {
                    collision = true;
                }
                *cell ^= PIXEL_ON;
            }
        }
        collision
    }

    pub fn is_on(&self, x: usize, y: usize) -> bool {
        self.cells[(y % HEIGHT) * WIDTH + (x % WIDTH)] == PIXEL_ON
    }

    /// raw pixel data for presentation
    pub fn snapshot(&self) -> &[u32] {
        &self.cells
    }

    /// (x, y) of every lit pixel, row by row
    pub fn lit_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == PIXEL_ON)
            .map(|(i, _)| (i % WIDTH, i / WIDTH))
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// one text line per row, '#' for lit pixels
impl fmt::Display for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(WIDTH) {
            for cell in row {
                f.write_str(if *cell == PIXEL_ON { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_off(fb: &FrameBuffer) -> bool {
        fb.snapshot().iter().all(|c| *c == PIXEL_OFF)
    }

    #[test]
    fn test_new_is_blank() {
        let fb = FrameBuffer::new();
        assert_eq!(fb.snapshot().len(), 2048);
        assert!(all_off(&fb));
    }

    #[test]
    fn test_draw_msb_first() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.draw_sprite(10, 4, &[0b1000_0001]));
        assert!(fb.is_on(10, 4));
        assert!(!fb.is_on(11, 4));
        assert!(fb.is_on(17, 4));
        assert_eq!(fb.snapshot()[4 * 64 + 10], PIXEL_ON);
        assert_eq!(fb.lit_pixels().collect::<Vec<_>>(), [(10, 4), (17, 4)]);
    }

    #[test]
    fn test_draw_twice_is_blank_with_collision() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.draw_sprite(3, 7, &[0xff]));
        assert!(fb.draw_sprite(3, 7, &[0xff]));
        assert!(all_off(&fb));
    }

    #[test]
    fn test_no_collision_when_only_turning_on() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0xf0]);
        assert!(!fb.draw_sprite(0, 0, &[0x0f]));
        assert_eq!(fb.lit_pixels().count(), 8);
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0xff, 0xff, 0xff]);
        fb.clear();
        assert!(all_off(&fb));
    }

    #[test]
    fn test_draw_wraps_both_edges() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(62, 31, &[0xe0, 0x80]);
        assert!(fb.is_on(62, 31));
        assert!(fb.is_on(63, 31));
        assert!(fb.is_on(0, 31));
        assert!(fb.is_on(62, 0));
        assert_eq!(fb.lit_pixels().count(), 4);
    }

    #[test]
    fn test_draw_start_beyond_screen_wraps() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(64 + 5, 32 + 2, &[0x80]);
        assert!(fb.is_on(5, 2));
    }

    #[test]
    fn test_display_text() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0x80]);
        let text = fb.to_string();
        assert_eq!(text.lines().count(), 32);
        assert!(text.starts_with("#."));
    }
}
