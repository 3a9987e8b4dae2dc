use crate::error::{Error, Result};
use log::{debug, warn};
use std::{fmt, io};

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// how much RAM we have
pub const MEMORY_SIZE: usize = 4096;

/// where the built-in hex glyphs live; 5 bytes per digit
pub const GLYPH_ADDR: u16 = 0x050;
pub const GLYPH_BYTES: u16 = 5;

/// where the program is loaded, and where the protected region starts
pub const PROGRAM_ADDR: u16 = 0x200;
/// first address past the protected region
pub const PROTECTED_END: u16 = 0xF00;
pub const MAX_PROGRAM_SIZE: usize = (PROTECTED_END - PROGRAM_ADDR) as usize;

const ADDR_MASK: u16 = (MEMORY_SIZE - 1) as u16;

/// Represents the memory map and its access policy. Implementors decide where
/// an address lands (or whether it may be touched at all); the accessors are
/// built on top of that.
pub trait MemoryMap {
    /// index of `addr` for a data read
    fn resolve_read(&self, addr: u16) -> Result<usize>;

    /// index of `addr` for a write; `None` drops the write
    fn resolve_write(&self, addr: u16) -> Result<Option<usize>>;

    /// indices of the two bytes of the instruction at `addr`
    fn resolve_fetch(&self, addr: u16) -> Result<(usize, usize)>;

    /// get a r/o view of the underlying memory
    fn get_ro_slice(&self) -> &[u8];

    /// get a r/w view of the underlying memory
    fn get_rw_slice(&mut self) -> &mut [u8];

    /// get the big-endian instruction word at `addr`
    fn read_instruction(&self, addr: u16) -> Result<u16> {
        let (hi, lo) = self.resolve_fetch(addr)?;
        let bytes = self.get_ro_slice();
        Ok(u16::from(bytes[hi]) << 8 | u16::from(bytes[lo]))
    }

    fn read_byte(&self, addr: u16) -> Result<u8> {
        let a = self.resolve_read(addr)?;
        Ok(self.get_ro_slice()[a])
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        if let Some(a) = self.resolve_write(addr)? {
            self.get_rw_slice()[a] = value;
        }
        Ok(())
    }

    /// read `len` consecutive bytes starting at `addr`
    fn read_bytes(&self, addr: u16, len: usize) -> Result<Vec<u8>> {
        (0..len)
            .map(|i| self.read_byte(addr.wrapping_add(i as u16)))
            .collect()
    }

    /// write a run of bytes; every address is checked before anything is
    /// written, so a failure leaves memory untouched
    fn write_bytes(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        let targets = (0..data.len())
            .map(|i| self.resolve_write(addr.wrapping_add(i as u16)))
            .collect::<Result<Vec<_>>>()?;
        let bytes = self.get_rw_slice();
        for (target, value) in targets.into_iter().zip(data) {
            if let Some(a) = target {
                bytes[a] = *value;
            }
        }
        Ok(())
    }
}

/// The CHIP-8 address space:
///   0x0000-0x004f  unused
///   0x0050-0x009f  hex glyphs (read-only)
///   0x00a0-0x01ff  unused
///   0x0200-0x0eff  program and work area (protected region)
///   0x0f00-0x0fff  reserved
pub struct AddressSpace {
    bytes: Box<[u8]>,
    strict: bool,
}

impl MemoryMap for AddressSpace {
    fn resolve_read(&self, addr: u16) -> Result<usize> {
        if !self.strict {
            return Ok((addr & ADDR_MASK) as usize);
        }
        if is_glyph(addr) || is_protected(addr) {
            Ok(addr as usize)
        } else {
            Err(Error::OutOfRangeAccess { addr })
        }
    }

    fn resolve_write(&self, addr: u16) -> Result<Option<usize>> {
        if self.strict {
            return if is_protected(addr) {
                Ok(Some(addr as usize))
            } else {
                Err(Error::OutOfRangeAccess { addr })
            };
        }
        let masked = addr & ADDR_MASK;
        if is_glyph(masked) {
            warn!("dropping write to glyph memory at {:#06x}", masked);
            Ok(None)
        } else {
            Ok(Some(masked as usize))
        }
    }

    fn resolve_fetch(&self, addr: u16) -> Result<(usize, usize)> {
        if !self.strict {
            return Ok((
                (addr & ADDR_MASK) as usize,
                (addr.wrapping_add(1) & ADDR_MASK) as usize,
            ));
        }
        if addr < PROGRAM_ADDR || u32::from(addr) + 1 >= u32::from(PROTECTED_END) {
            return Err(Error::OutOfRangeAccess { addr });
        }
        if addr % 2 != 0 {
            return Err(Error::MisalignedFetch { addr });
        }
        Ok((addr as usize, addr as usize + 1))
    }

    fn get_ro_slice(&self) -> &[u8] {
        &self.bytes
    }

    fn get_rw_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

fn is_glyph(addr: u16) -> bool {
    (GLYPH_ADDR..GLYPH_ADDR + GLYPH_BYTES * 16).contains(&addr)
}

fn is_protected(addr: u16) -> bool {
    (PROGRAM_ADDR..PROTECTED_END).contains(&addr)
}

impl AddressSpace {
    /// zeroed memory with the glyph set baked in
    pub fn new(strict: bool) -> Self {
        let mut m = AddressSpace {
            bytes: vec![0u8; MEMORY_SIZE].into_boxed_slice(),
            strict,
        };
        m.reset();
        m
    }

    /// zero-fill and reload the glyphs; only done at session start
    pub fn reset(&mut self) {
        self.bytes.fill(0);
        let start = GLYPH_ADDR as usize;
        self.bytes[start..start + GLYPHS.len()].copy_from_slice(&GLYPHS);
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// address of the glyph for hex digit `digit` (low nibble only)
    pub fn glyph_addr(digit: u8) -> u16 {
        GLYPH_ADDR + GLYPH_BYTES * u16::from(digit & 0x0f)
    }

    /// load a CHIP-8 program at 0x200, replacing whatever was there before
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Error::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = PROGRAM_ADDR as usize;
        self.bytes[start..PROTECTED_END as usize].fill(0);
        self.bytes[start..start + program.len()].copy_from_slice(program);
        debug!("loaded {} byte program at {:#06x}", program.len(), PROGRAM_ADDR);
        Ok(())
    }

    /// read a whole program image from `reader` and load it
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<()> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)
    }
}

/// hex dump, 16 bytes per row prefixed by the row address
impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.bytes.chunks(16).enumerate() {
            write!(f, "{:04x}:", row * 16)?;
            for b in chunk {
                write!(f, " {:02x}", b)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub const GLYPHS: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
