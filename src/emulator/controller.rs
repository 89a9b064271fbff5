//! Paces the emulator: instructions at the configured tick, timers at 60Hz,
//! and the start/pause/step/stop state machine used by debuggers.

use super::clock::{Clock, MonotonicClock};
use super::config::Config;
use super::display::Framebuffer;
use super::emulator::Emulator;
use super::snapshot::Snapshot;
use super::timer::{SoundEvent, TIMER_PERIOD};
use crate::error::Result;

use std::fmt;
use std::time::{Duration, Instant};

/// Most instructions run by a single `advance` when the tick is zero,
/// so that commands are still looked at between batches.
const UNTHROTTLED_BATCH: usize = 1000;

/// How far the schedule may fall behind the clock before it is moved forward
/// instead of catching up.
const MAX_LAG: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Stopped,
    Running,
    Paused,
    /// Paused, but the next `advance` runs one instruction.
    Stepping,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionState::Stopped => "stopped",
            ExecutionState::Running => "running",
            ExecutionState::Paused => "paused",
            ExecutionState::Stepping => "stepping",
        };
        f.write_str(name)
    }
}

/// What a call to `advance` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub instructions: usize,
    pub timer_ticks: usize,
}

/// Owns an `Emulator` and decides when it runs.
pub struct Controller<C: Clock = MonotonicClock> {
    emulator: Emulator,
    config: Config,
    program: Vec<u8>,
    state: ExecutionState,
    clock: C,
    next_instruction: Instant,
    next_timer_tick: Instant,
    idle_cycles: u32,
}

impl Controller<MonotonicClock> {

    pub fn new(config: Config) -> Controller<MonotonicClock> {
        Controller::with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> Controller<C> {

    pub fn with_clock(config: Config, clock: C) -> Controller<C> {
        let emulator = match config.seed {
            Some(seed) => Emulator::with_seed(config.quirks, seed),
            None => Emulator::new(config.quirks),
        };
        let now = clock.now();
        Controller {
            emulator,
            config,
            program: Vec::new(),
            state: ExecutionState::Stopped,
            clock,
            next_instruction: now,
            next_timer_tick: now + TIMER_PERIOD,
            idle_cycles: 0,
        }
    }

    /// Stop, then load a new program. The program is kept, so that
    /// every `start` runs it from the beginning.
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        self.state = ExecutionState::Stopped;
        self.emulator.load(program)?;
        self.program = program.to_vec();
        Ok(())
    }

    /// Run the loaded program from the beginning.
    pub fn start(&mut self) -> Result<()> {
        if self.state != ExecutionState::Stopped {
            log::warn!("Ignoring start, the emulator is already {}", self.state);
            return Ok(());
        }
        self.emulator.load(&self.program)?;
        self.idle_cycles = 0;
        self.reschedule();
        self.set_state(ExecutionState::Running);
        log::info!("Started {} byte program with quirks {}", self.program.len(), self.config.quirks);
        Ok(())
    }

    pub fn pause(&mut self) {
        match self.state {
            ExecutionState::Running | ExecutionState::Stepping => self.set_state(ExecutionState::Paused),
            _ => log::debug!("Ignoring pause, the emulator is {}", self.state),
        }
    }

    pub fn resume(&mut self) {
        match self.state {
            ExecutionState::Paused | ExecutionState::Stepping => {
                self.reschedule();
                self.set_state(ExecutionState::Running);
            }
            _ => log::debug!("Ignoring resume, the emulator is {}", self.state),
        }
    }

    /// Run a single instruction while paused.
    pub fn step(&mut self) {
        match self.state {
            ExecutionState::Paused => self.set_state(ExecutionState::Stepping),
            _ => log::debug!("Ignoring step, the emulator is {}", self.state),
        }
    }

    /// Stop running and return the machine to its state right after loading the program.
    pub fn stop(&mut self) -> Result<()> {
        self.set_state(ExecutionState::Stopped);
        self.emulator.load(&self.program)
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.emulator.set_key(key, pressed);
    }

    /// Change the delay between instructions. Takes effect from the next instruction.
    pub fn set_tick(&mut self, tick: Duration) {
        log::debug!("Instruction tick set to {:?}", tick);
        self.config.tick = tick;
        self.next_instruction = self.clock.now();
    }

    /// Run every instruction and timer tick that is due.
    ///
    /// A fatal error stops the controller. The emulator is left as it was when
    /// the error happened, so it can be inspected.
    pub fn advance(&mut self) -> Result<Progress> {
        self.advance_until(|| false)
    }

    /// Like `advance`, but `interrupted` is asked after every instruction and
    /// ends the batch early when it returns true. Whatever is still due runs on
    /// the next call.
    pub fn advance_until<F>(&mut self, mut interrupted: F) -> Result<Progress>
    where
        F: FnMut() -> bool,
    {
        let mut progress = Progress::default();
        match self.state {
            ExecutionState::Stopped | ExecutionState::Paused => return Ok(progress),
            ExecutionState::Stepping => {
                self.execute_one()?;
                progress.instructions = 1;
                if self.state == ExecutionState::Stepping {
                    self.set_state(ExecutionState::Paused);
                }
                return Ok(progress);
            }
            ExecutionState::Running => {}
        }

        let now = self.clock.now();
        if self.config.tick == Duration::from_secs(0) {
            self.next_instruction = now;
        } else if now > self.next_instruction + MAX_LAG {
            log::warn!("Fell {:?} behind, skipping ahead", now - self.next_instruction);
            self.next_instruction = now;
        }
        if now > self.next_timer_tick + MAX_LAG {
            self.next_timer_tick = now;
        }

        loop {
            let timer_due = self.next_timer_tick <= now;
            let instruction_due = self.next_instruction <= now && progress.instructions < UNTHROTTLED_BATCH;

            if timer_due && (!instruction_due || self.next_timer_tick <= self.next_instruction) {
                self.emulator.tick_timers();
                self.next_timer_tick += TIMER_PERIOD;
                progress.timer_ticks += 1;
            } else if instruction_due {
                self.execute_one()?;
                progress.instructions += 1;
                self.next_instruction += self.config.tick;
                if self.state != ExecutionState::Running || interrupted() {
                    break;
                }
            } else {
                break;
            }
        }

        Ok(progress)
    }

    /// When `advance` next has work to do, or `None` if it has to be
    /// told to continue first.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            ExecutionState::Running => Some(std::cmp::min(self.next_instruction, self.next_timer_tick)),
            ExecutionState::Stepping => Some(self.clock.now()),
            ExecutionState::Stopped | ExecutionState::Paused => None,
        }
    }

    fn execute_one(&mut self) -> Result<()> {
        let address = self.emulator.program_counter();
        let waiting_for_key = self.emulator.is_waiting_for_key();

        if let Err(error) = self.emulator.step() {
            log::error!("Halting: {}", error);
            self.set_state(ExecutionState::Stopped);
            return Err(error);
        }

        if let Some(limit) = self.config.idle_halt {
            if self.emulator.program_counter() == address && !waiting_for_key {
                self.idle_cycles += 1;
                if self.idle_cycles >= limit {
                    log::warn!("Stuck at {:#05x} for {} instructions, halting", address, limit);
                    self.set_state(ExecutionState::Stopped);
                }
            } else {
                self.idle_cycles = 0;
            }
        }
        Ok(())
    }

    fn reschedule(&mut self) {
        let now = self.clock.now();
        self.next_instruction = now;
        self.next_timer_tick = now + TIMER_PERIOD;
    }

    fn set_state(&mut self, state: ExecutionState) {
        if self.state != state {
            log::debug!("{} -> {}", self.state, state);
            self.state = state;
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn emulator(&self) -> &Emulator {
        &self.emulator
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.emulator.framebuffer()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.emulator.snapshot()
    }

    pub fn take_frame_dirty(&mut self) -> bool {
        self.emulator.take_frame_dirty()
    }

    pub fn take_sound_event(&mut self) -> Option<SoundEvent> {
        self.emulator.take_sound_event()
    }
}
