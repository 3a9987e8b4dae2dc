use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use chip8_vm::config::{Config, HostConfig, DEFAULT_INSTRUCTIONS_PER_SECOND};
use chip8_vm::display::MonoTermDisplay;
use chip8_vm::host::Host;
use chip8_vm::input::TermInput;
use chip8_vm::interpreter::Chip8Interpreter;

/// Run a CHIP-8 program in the terminal. Esc quits.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// program image, loaded at 0x200
    rom: PathBuf,

    /// instructions per second
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND)]
    ips: u32,

    /// range-check every memory access and stop on a fault
    #[arg(long)]
    strict: bool,

    /// seed for the random number opcode
    #[arg(long)]
    seed: Option<u64>,

    /// stop after this many instructions
    #[arg(long)]
    cycles: Option<u64>,

    /// stop when PC reaches a 0x0000 word
    #[arg(long)]
    stop_at_end: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = Config {
        strict: args.strict,
        seed: args.seed,
    };
    let host_config = HostConfig {
        instructions_per_second: args.ips,
        max_cycles: args.cycles,
        stop_at_program_end: args.stop_at_end,
        ..HostConfig::default()
    };

    // load a program
    let mut interpreter = Chip8Interpreter::new(config);
    let mut f = File::open(&args.rom)?;
    interpreter.load_program_from(&mut f)?;
    info!("loaded {}", args.rom.display());

    let mut display = MonoTermDisplay::new()?;
    let mut input = TermInput::new()?;
    let stop = Host::new(&mut interpreter, &mut display, &mut input, host_config).main_loop();
    // leave raw mode before anything gets printed
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }
    info!("stopped: {:?}", stop?);
    Ok(())
}
