//! ## Design
//!
//! * one instruction per `step()`; the engine never blocks or sleeps, the
//!   host owns both the instruction clock and the 60Hz timer clock
//! * memory access policy is a single switch: strict mode range-checks every
//!   fetch, read and write; lenient mode masks addresses to 12 bits
//! * unknown encodings are no-ops, only memory faults and call stack misuse
//!   stop a step
//! * display and input are traits, so the core never knows about terminals
//! * no sound; the sound timer is kept as state only
//!
//! Model
//!
//! main
//!  |-- display, input, config
//!  |-- interpreter(config)
//!  |    |-- address space (glyphs + program)
//!  |    |-- frame buffer
//!  |    `-- input latch
//!  `-- host.main_loop()
//!       |-- input.poll(latch)          // once per tick
//!       |-- interpreter.step() x N     // N averages instructions/s / 60
//!       |-- interpreter.tick_timers()
//!       |-- display.draw(frame buffer)
//!       `-- sleep until the next tick
pub mod config;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod host;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod opcode;

pub use config::{Config, HostConfig};
pub use error::{Error, Result};
pub use framebuffer::FrameBuffer;
pub use input::InputLatch;
pub use interpreter::Chip8Interpreter;
pub use memory::{AddressSpace, MemoryMap};
