use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::HashMap;
use std::io;
use std::time::Duration;

pub const KEY_COUNT: usize = 16;

/// the 16-key hex keypad state. Written by the input layer, read by the
/// interpreter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputLatch {
    keys: [bool; KEY_COUNT],
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// keys outside 0x0..0xF are ignored
    pub fn set(&mut self, key: u8, pressed: bool) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = pressed;
        }
    }

    /// only the low nibble selects the key
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[(key & 0x0f) as usize]
    }

    /// lowest pressed key, if any
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}

/// map using left-hand side of qwerty keyboard
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// what the host should do after polling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// reads key events and reflects them into the latch
pub trait Input {
    /// called once per timer tick
    fn poll(&mut self, latch: &mut InputLatch) -> Result<Control, io::Error>;
}

/// terminals only report presses, so a key stays down for this many ticks
/// after its last press event (key repeat keeps it down while held)
const KEY_HOLD_TICKS: u8 = 6;

/// Input from the terminal, using crossterm in raw mode
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: [u8; KEY_COUNT],
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; KEY_COUNT],
        })
    }

    fn read_events(&mut self) -> Result<Control, io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(mapped_key) => self.held[*mapped_key as usize] = KEY_HOLD_TICKS,
                        None => {
                            debug!("can't map {:?} to a CHIP-8 key", key);
                        }
                    },
                    KeyCode::Esc => return Ok(Control::Quit),
                    _ => {
                        debug!("ignoring key event {:?}", evt);
                    }
                },
                Event::Resize(..) => {}
                other => {
                    warn!("unknown event received: {:?}", other);
                }
            }
        }
        Ok(Control::Continue)
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to leave raw mode: {}", e);
        }
    }
}

impl Input for TermInput {
    fn poll(&mut self, latch: &mut InputLatch) -> Result<Control, io::Error> {
        let control = self.read_events()?;
        for (key, ticks) in self.held.iter_mut().enumerate() {
            latch.set(key as u8, *ticks > 0);
            *ticks = ticks.saturating_sub(1);
        }
        Ok(control)
    }
}

/// dummy Input implementation for testing: the given keys are held down,
/// optionally quitting after a number of polls
pub struct DummyInput {
    keys: Vec<u8>,
    polls_left: Option<usize>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            keys: Vec::from(keys),
            polls_left: None,
        }
    }

    pub fn quit_after(mut self, polls: usize) -> Self {
        self.polls_left = Some(polls);
        self
    }
}

impl Input for DummyInput {
    fn poll(&mut self, latch: &mut InputLatch) -> Result<Control, io::Error> {
        if let Some(left) = self.polls_left.as_mut() {
            if *left == 0 {
                return Ok(Control::Quit);
            }
            *left -= 1;
        }
        latch.release_all();
        for key in &self.keys {
            latch.set(*key, true);
        }
        Ok(Control::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_starts_released() {
        let l = InputLatch::new();
        assert_eq!(l.first_pressed(), None);
        assert!((0..16).all(|k| !l.is_pressed(k)));
    }

    #[test]
    fn test_latch_set_and_first_pressed() {
        let mut l = InputLatch::new();
        l.set(0xb, true);
        l.set(0x3, true);
        assert!(l.is_pressed(0xb));
        assert_eq!(l.first_pressed(), Some(0x3));
        l.set(0x3, false);
        assert_eq!(l.first_pressed(), Some(0xb));
        l.release_all();
        assert_eq!(l.first_pressed(), None);
    }

    #[test]
    fn test_latch_ignores_out_of_range() {
        let mut l = InputLatch::new();
        l.set(0x10, true);
        assert_eq!(l, InputLatch::new());
        // reads only look at the low nibble
        l.set(0x2, true);
        assert!(l.is_pressed(0x12));
    }

    #[test]
    fn test_keymap_covers_keypad() {
        let map = HashMap::from(CHIP8_CONVENTIONAL_KEYMAP);
        let mut keys: Vec<u8> = map.values().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn test_dummy_input() -> Result<(), io::Error> {
        let mut input = DummyInput::new(&[0x5]).quit_after(1);
        let mut l = InputLatch::new();
        assert_eq!(input.poll(&mut l)?, Control::Continue);
        assert!(l.is_pressed(0x5));
        assert_eq!(input.poll(&mut l)?, Control::Quit);
        Ok(())
    }
}
