use std::path::PathBuf;
use std::time::Duration;

use env_logger::Env;
use structopt::StructOpt;

use chip_8_vm::emulator::output::RecordingOutput;
use chip_8_vm::emulator::{Config, Controller, Quirks, Runner};
use chip_8_vm::Error;

/// Run a CHIP-8 program without a frontend, then print the final screen and registers.
#[derive(StructOpt, Debug)]
#[structopt(name = "chip-8-vm")]
struct Opt {
    /// The program to execute
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Quirk preset: none, vip or schip
    #[structopt(long, default_value = "none")]
    quirks: Quirks,

    /// Shift VX in place for 8XY6/8XYE
    #[structopt(long)]
    shift: bool,

    /// Use VX instead of V0 as the offset for BNNN
    #[structopt(long)]
    jump: bool,

    /// Reset VF after 8XY1, 8XY2 and 8XY3
    #[structopt(long)]
    logic: bool,

    /// Advance I after FX55/FX65
    #[structopt(long)]
    load_store: bool,

    /// Microseconds between instructions, 0 for as fast as possible
    #[structopt(long, default_value = "2000")]
    tick_us: u64,

    /// Seed for the random number generator
    #[structopt(long)]
    seed: Option<u64>,

    /// Stop after this many instructions in a row that jump to themselves
    #[structopt(long)]
    idle_halt: Option<u32>,

    /// Stop after this many milliseconds
    #[structopt(long)]
    run_for_ms: Option<u64>,

    /// Start paused
    #[structopt(long)]
    paused: bool,

    /// Verbose mode (-v, -vv, -vvv)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

impl Opt {
    fn config(&self) -> Config {
        let mut quirks = self.quirks;
        quirks.shift |= self.shift;
        quirks.jump |= self.jump;
        quirks.logic |= self.logic;
        quirks.load_store |= self.load_store;

        let mut config = Config::default()
            .with_quirks(quirks)
            .with_tick(Duration::from_micros(self.tick_us));
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(cycles) = self.idle_halt {
            config = config.with_idle_halt(cycles);
        }
        config
    }
}

fn main() -> Result<(), Error> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    log::info!("Executing {:?}", &opt.input);
    let program = std::fs::read(&opt.input)?;

    let config = opt.config();
    log::info!("Quirks: {}", config.quirks);
    let mut controller = Controller::new(config);
    controller.load(&program)?;

    let (mut runner, handle) = Runner::new(controller, RecordingOutput::new());
    let _handle = match opt.run_for_ms {
        Some(ms) => {
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(ms));
                handle.stop();
            });
            None
        }
        // Keep the handle alive, or the runner would stop right away
        None => Some(handle),
    };

    let result = runner.run(opt.paused);

    // Reported before a stop reloads the program
    let output = runner.output();
    if let Some(frame) = &output.last_frame {
        println!("{}", frame);
    }
    match output.states.last() {
        Some((_, snapshot)) => println!("{}", snapshot),
        None => println!("{}", runner.controller().snapshot()),
    }
    result
}
