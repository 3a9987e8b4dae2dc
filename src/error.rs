use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("memory access out of range at address {addr:#06X}")]
    OutOfRangeAccess { addr: u16 },

    #[error("instruction fetch from odd address {addr:#06X}")]
    MisalignedFetch { addr: u16 },

    #[error("call stack overflow")]
    StackOverflow,

    #[error("return with an empty call stack")]
    StackUnderflow,

    /// a fault raised mid-step; the step was aborted
    #[error("malformed program at {pc:#06X} (opcode {opcode:#06X}): {source}")]
    MalformedProgram {
        pc: u16,
        opcode: u16,
        #[source]
        source: Box<Error>,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
