//! # interpreter
//!
//! Fetch/decode/execute engine. One call to `step()` runs exactly one
//! instruction and never blocks; the host drives the instruction clock and
//! the 60Hz timer clock (`tick_timers()`) itself.
//!
//! Machine state:
//!  * V0-VF   8bit general registers. VF doubles as the flag output of the
//!            last carry/borrow/shift/draw operation
//!  * I       16bit address register
//!  * PC      program counter, starts at 0x200
//!  * stack   16 return addresses plus a stack pointer
//!  * DT, ST  delay and sound timers, counting down at 60Hz when ticked
use crate::config::Config;
use crate::error::{Error, Result};
use crate::framebuffer::FrameBuffer;
use crate::input::InputLatch;
use crate::memory::{AddressSpace, MemoryMap, PROGRAM_ADDR};
use crate::opcode::{Instruction, Opcode};
use log::{debug, error, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::{fmt, io};

pub const STACK_DEPTH: usize = 16;
const VF: usize = 0xf;

pub struct Chip8Interpreter {
    memory: AddressSpace,
    display: FrameBuffer,
    keys: InputLatch,
    v: [u8; 16],
    i: u16,
    program_counter: u16,
    stack: [u16; STACK_DEPTH],
    stack_pointer: usize,
    delay_timer: u8,
    sound_timer: u8,
    last_opcode: u16,
    rng: StdRng,
}

impl Chip8Interpreter {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory: AddressSpace::new(config.strict),
            display: FrameBuffer::new(),
            keys: InputLatch::new(),
            v: [0; 16],
            i: 0,
            program_counter: PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            stack_pointer: 0,
            delay_timer: 0,
            sound_timer: 0,
            last_opcode: 0,
            rng,
        }
    }

    /// back to power-on state: memory zeroed with glyphs reloaded, screen
    /// and keys cleared, registers zeroed, PC at 0x200
    pub fn reset(&mut self) {
        self.memory.reset();
        self.display.clear();
        self.keys.release_all();
        self.v = [0; 16];
        self.i = 0;
        self.program_counter = PROGRAM_ADDR;
        self.stack = [0; STACK_DEPTH];
        self.stack_pointer = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.last_opcode = 0;
        debug!("interpreter reset");
    }

    /// load a chip8 program
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load_program(program)
    }

    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<()> {
        self.memory.load_program_from(reader)
    }

    /// Run one instruction. A fault aborts the step with PC left on the
    /// faulting instruction and is reported as `MalformedProgram`.
    pub fn step(&mut self) -> Result<()> {
        let pc = self.program_counter;
        let opcode = match self.memory.read_instruction(pc) {
            Ok(word) => Opcode(word),
            Err(e) => return Err(self.fault(pc, 0, e)),
        };
        self.last_opcode = opcode.0;

        // every relative target below works from the advanced PC
        self.program_counter = pc.wrapping_add(2);

        let instruction = opcode.decode();
        trace!("{:04x}: {} {:?}", pc, opcode, instruction);
        if let Err(e) = self.execute(instruction) {
            self.program_counter = pc;
            return Err(self.fault(pc, opcode.0, e));
        }
        Ok(())
    }

    /// count both timers down by one, stopping at zero. The host calls this
    /// at 60Hz.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// The word at PC is 0x0000, which no loaded program executes on purpose.
    /// A PC that cannot be fetched is not an end; `step()` reports it.
    pub fn at_program_end(&self) -> bool {
        self.memory
            .read_instruction(self.program_counter)
            .map_or(false, |word| word == 0x0000)
    }

    fn fault(&self, pc: u16, opcode: u16, source: Error) -> Error {
        error!("fault at {:#06x}: {}\n{}", pc, source, self.core_dump());
        Error::MalformedProgram {
            pc,
            opcode,
            source: Box::new(source),
        }
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(2);
        }
    }

    // anything fallible happens before state is touched, so an Err leaves
    // the machine as it was apart from PC, which step() restores
    fn execute(&mut self, instruction: Instruction) -> Result<()> {
        use Instruction::*;
        match instruction {
            ClearScreen => self.display.clear(),
            Return => {
                if self.stack_pointer == 0 {
                    return Err(Error::StackUnderflow);
                }
                self.stack_pointer -= 1;
                self.program_counter = self.stack[self.stack_pointer];
            }
            Jump { nnn } => self.program_counter = nnn,
            Call { nnn } => {
                if self.stack_pointer == STACK_DEPTH {
                    return Err(Error::StackOverflow);
                }
                self.stack[self.stack_pointer] = self.program_counter;
                self.stack_pointer += 1;
                self.program_counter = nnn;
            }
            SkipEqImm { x, kk } => self.skip_if(self.v[x as usize] == kk),
            SkipNeImm { x, kk } => self.skip_if(self.v[x as usize] != kk),
            SkipEqReg { x, y } => self.skip_if(self.v[x as usize] == self.v[y as usize]),
            SkipNeReg { x, y } => self.skip_if(self.v[x as usize] != self.v[y as usize]),
            LoadImm { x, kk } => self.v[x as usize] = kk,
            AddImm { x, kk } => self.v[x as usize] = self.v[x as usize].wrapping_add(kk),
            Move { x, y } => self.v[x as usize] = self.v[y as usize],
            Or { x, y } => self.v[x as usize] |= self.v[y as usize],
            And { x, y } => self.v[x as usize] &= self.v[y as usize],
            Xor { x, y } => self.v[x as usize] ^= self.v[y as usize],

            // flag producers write VF first and Vx second, so with x == F
            // the arithmetic result is what survives
            AddReg { x, y } => {
                let (sum, carry) = self.v[x as usize].overflowing_add(self.v[y as usize]);
                self.set_flag_then(x, carry as u8, sum);
            }
            Sub { x, y } => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.set_flag_then(x, (vx > vy) as u8, vx.wrapping_sub(vy));
            }
            ShiftRight { x } => {
                let vx = self.v[x as usize];
                self.set_flag_then(x, vx & 1, vx >> 1);
            }
            SubReverse { x, y } => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.set_flag_then(x, (vy > vx) as u8, vy.wrapping_sub(vx));
            }
            ShiftLeft { x } => {
                let vx = self.v[x as usize];
                self.set_flag_then(x, (vx & 0x80) >> 7, vx << 1);
            }

            LoadIndex { nnn } => self.i = nnn,
            JumpOffset { nnn } => self.program_counter = u16::from(self.v[0]) + nnn,
            Random { x, kk } => self.v[x as usize] = self.rng.gen::<u8>() & kk,
            Draw { x, y, n } => {
                let rows = self.memory.read_bytes(self.i, n as usize)?;
                let collision = self
                    .display
                    .draw_sprite(self.v[x as usize], self.v[y as usize], &rows);
                self.v[VF] = collision as u8;
            }
            SkipKeyDown { x } => self.skip_if(self.keys.is_pressed(self.v[x as usize])),
            SkipKeyUp { x } => self.skip_if(!self.keys.is_pressed(self.v[x as usize])),
            LoadDelay { x } => self.v[x as usize] = self.delay_timer,
            WaitKey { x } => match self.keys.first_pressed() {
                Some(key) => self.v[x as usize] = key,
                // run this instruction again next step
                None => self.program_counter = self.program_counter.wrapping_sub(2),
            },
            SetDelay { x } => self.delay_timer = self.v[x as usize],
            SetSound { x } => self.sound_timer = self.v[x as usize],
            AddIndex { x } => self.i = self.i.wrapping_add(u16::from(self.v[x as usize])),
            LoadGlyph { x } => self.i = AddressSpace::glyph_addr(self.v[x as usize]),
            StoreBcd { x } => {
                let vx = self.v[x as usize];
                self.memory.write_bytes(self.i, &[vx / 100, vx / 10 % 10, vx % 10])?;
            }
            StoreRegs { x } => {
                self.memory.write_bytes(self.i, &self.v[..=x as usize])?;
            }
            LoadRegs { x } => {
                let bytes = self.memory.read_bytes(self.i, x as usize + 1)?;
                self.v[..=x as usize].copy_from_slice(&bytes);
            }
            Unknown(word) => debug!("ignoring unknown opcode {:04x}", word),
        }
        Ok(())
    }

    fn set_flag_then(&mut self, x: u8, flag: u8, result: u8) {
        self.v[VF] = flag;
        self.v[x as usize] = result;
    }

    /// registers, stack, timers, memory and screen as text
    pub fn core_dump(&self) -> String {
        self.to_string()
    }

    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut AddressSpace {
        &mut self.memory
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.display
    }

    pub fn keys(&self) -> &InputLatch {
        &self.keys
    }

    /// for the input layer only
    pub fn keys_mut(&mut self) -> &mut InputLatch {
        &mut self.keys
    }

    pub fn v(&self, x: u8) -> u8 {
        self.v[(x & 0x0f) as usize]
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.program_counter
    }

    /// return addresses currently on the stack, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn last_opcode(&self) -> u16 {
        self.last_opcode
    }
}

impl fmt::Display for Chip8Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "================REGISTER DUMP================")?;
        for (row, regs) in self.v.chunks(4).enumerate() {
            for (col, value) in regs.iter().enumerate() {
                write!(f, "V{:X}={:02x} ", row * 4 + col, value)?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "I={:04x} PC={:04x} SP={} DT={:02x} ST={:02x} last={:04x}",
            self.i,
            self.program_counter,
            self.stack_pointer,
            self.delay_timer,
            self.sound_timer,
            self.last_opcode
        )?;
        writeln!(f, "stack: {:04x?}", self.stack())?;
        writeln!(f, "=================MEMORY DUMP=================")?;
        write!(f, "{}", self.memory)?;
        writeln!(f, "================DISPLAY DUMP=================")?;
        write!(f, "{}", self.display)
    }
}
