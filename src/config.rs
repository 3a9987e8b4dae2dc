/// engine settings, fixed for the lifetime of an interpreter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// range-check every memory access (instruction fetch, byte reads and
    /// writes); when off, addresses are masked to 12 bits instead
    pub strict: bool,
    /// seed for the Cxkk random source; entropy when absent
    pub seed: Option<u64>,
}

impl Config {
    pub fn strict() -> Self {
        Config {
            strict: true,
            ..Config::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;
pub const TIMER_HZ: u32 = 60;

/// settings for the outer loop that drives the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    pub instructions_per_second: u32,
    pub timer_hz: u32,
    /// sleep between ticks to keep wallclock time; tests turn this off
    pub realtime: bool,
    pub max_cycles: Option<u64>,
    /// stop once the word at PC is 0x0000
    pub stop_at_program_end: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            timer_hz: TIMER_HZ,
            realtime: true,
            max_cycles: None,
            stop_at_program_end: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_lenient() {
        let c = Config::default();
        assert!(!c.strict);
        assert_eq!(c.seed, None);
    }

    #[test]
    fn test_strict_with_seed() {
        let c = Config::strict().with_seed(42);
        assert!(c.strict);
        assert_eq!(c.seed, Some(42));
    }

    #[test]
    fn test_host_defaults() {
        let h = HostConfig::default();
        assert_eq!(h.instructions_per_second, 700);
        assert_eq!(h.timer_hz, 60);
        assert!(h.realtime);
    }
}
