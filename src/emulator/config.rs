use super::quirks::Quirks;
use std::time::Duration;

/// Time between instructions unless configured otherwise, about 500 instructions per second.
pub const DEFAULT_TICK: Duration = Duration::from_millis(2);

/// Everything that determines how a program runs, apart from the program itself and its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub quirks: Quirks,
    /// Delay between two instructions. Zero runs instructions as fast as possible.
    pub tick: Duration,
    /// Stop after this many instructions in a row that jump to themselves.
    pub idle_halt: Option<u32>,
    /// Seed for `CXNN`. Without one, random numbers come from the operating system.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quirks: Quirks::default(),
            tick: DEFAULT_TICK,
            idle_halt: None,
            seed: None,
        }
    }
}

impl Config {

    pub fn with_quirks(mut self, quirks: Quirks) -> Config {
        self.quirks = quirks;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Config {
        self.tick = tick;
        self
    }

    pub fn with_idle_halt(mut self, cycles: u32) -> Config {
        self.idle_halt = Some(cycles);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Config {
        self.seed = Some(seed);
        self
    }
}
