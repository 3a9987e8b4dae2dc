//! The outer loop. The interpreter never keeps time itself, so the host
//! drives both clocks: per timer tick (60Hz) it polls input into the latch,
//! runs a batch of instructions, ticks the timers and presents the frame.
use crate::config::HostConfig;
use crate::display::Display;
use crate::error::Result;
use crate::input::{Control, Input};
use crate::interpreter::Chip8Interpreter;
use log::{debug, info};
use std::time::{Duration, Instant};

/// why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    Quit,
    CycleLimit,
    ProgramEnd,
}

/// Splits the instruction rate into per-tick batches. The remainder of each
/// division carries over to the next tick, so over one second exactly
/// `instructions_per_second` steps run, and rates below the tick rate leave
/// some ticks empty.
struct InstructionClock {
    rate: u32,
    ticks_per_second: u32,
    carry: u32,
}

impl InstructionClock {
    fn new(rate: u32, ticks_per_second: u32) -> Self {
        InstructionClock {
            rate,
            ticks_per_second: ticks_per_second.max(1),
            carry: 0,
        }
    }

    /// steps to run in the coming tick
    fn next_batch(&mut self) -> u32 {
        self.carry += self.rate;
        let batch = self.carry / self.ticks_per_second;
        self.carry %= self.ticks_per_second;
        batch
    }
}

pub struct Host<'a> {
    interpreter: &'a mut Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    config: HostConfig,
    cycles: u64,
}

impl<'a> Host<'a> {
    pub fn new(
        interpreter: &'a mut Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        config: HostConfig,
    ) -> Self {
        Host {
            interpreter,
            display,
            input,
            config,
            cycles: 0,
        }
    }

    /// instructions executed so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run until something stops the machine. A faulting step ends the loop
    /// with that error.
    pub fn main_loop(&mut self) -> Result<Stop> {
        let tick = Duration::from_secs(1) / self.config.timer_hz.max(1);
        let mut clock =
            InstructionClock::new(self.config.instructions_per_second, self.config.timer_hz);
        let mut deadline = Instant::now() + tick;
        info!(
            "running at {} instructions/s, {} ticks/s",
            self.config.instructions_per_second, self.config.timer_hz
        );

        loop {
            if self.input.poll(self.interpreter.keys_mut())? == Control::Quit {
                return Ok(self.stop(Stop::Quit));
            }
            for _ in 0..clock.next_batch() {
                if let Some(stop) = self.run_one()? {
                    self.display.draw(self.interpreter.frame_buffer())?;
                    return Ok(self.stop(stop));
                }
            }
            self.interpreter.tick_timers();
            self.display.draw(self.interpreter.frame_buffer())?;

            if self.config.realtime {
                let now = Instant::now();
                if deadline > now {
                    spin_sleep::sleep(deadline - now);
                }
                deadline += tick;
            }
        }
    }

    fn run_one(&mut self) -> Result<Option<Stop>> {
        if self.config.max_cycles.map_or(false, |max| self.cycles >= max) {
            return Ok(Some(Stop::CycleLimit));
        }
        if self.config.stop_at_program_end && self.interpreter.at_program_end() {
            return Ok(Some(Stop::ProgramEnd));
        }
        self.interpreter.step()?;
        self.cycles += 1;
        Ok(None)
    }

    fn stop(&self, reason: Stop) -> Stop {
        debug!("stopped after {} cycles: {:?}", self.cycles, reason);
        reason
    }
}
