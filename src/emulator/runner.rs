//! A single-threaded event loop around a `Controller`.
//!
//! The loop alternates between handling commands, running whatever
//! instructions and timer ticks are due, and handing the results to an
//! `EmulatorOutput`. Between deadlines it sleeps on the command channel, and
//! while paused it blocks on it, so an idle emulator uses no CPU.

use super::clock::{Clock, MonotonicClock};
use super::controller::{Controller, ExecutionState};
use super::input::{Command, ControlHandle};
use super::output::EmulatorOutput;
use super::timer::SoundEvent;
use crate::error::Result;

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};

pub struct Runner<O: EmulatorOutput, C: Clock = MonotonicClock> {
    controller: Controller<C>,
    output: O,
    commands: Receiver<Command>,
    reported_state: ExecutionState,
}

impl<O: EmulatorOutput, C: Clock> Runner<O, C> {

    /// Create a runner, and a handle that can control it from other threads.
    pub fn new(controller: Controller<C>, output: O) -> (Runner<O, C>, ControlHandle) {
        let (sender, commands) = channel();
        let reported_state = controller.state();
        let runner = Runner {
            controller,
            output,
            commands,
            reported_state,
        };
        (runner, ControlHandle::new(sender))
    }

    /// Run the loaded program until it is stopped, fails, or every
    /// `ControlHandle` is dropped.
    pub fn run(&mut self, start_paused: bool) -> Result<()> {
        self.controller.start()?;
        if start_paused {
            self.controller.pause();
        }
        self.report_state(false);

        loop {
            // Handle everything that arrived since the last instruction
            loop {
                match self.commands.try_recv() {
                    Ok(command) => self.apply(command)?,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        log::info!("All control handles dropped, stopping");
                        self.stop()?;
                        break;
                    }
                }
            }
            if self.controller.state() == ExecutionState::Stopped {
                break;
            }

            // A command arriving mid-batch ends the batch after the current instruction
            let stepping = self.controller.state() == ExecutionState::Stepping;
            let commands = &self.commands;
            let mut pending = Vec::new();
            let result = self.controller.advance_until(|| match commands.try_recv() {
                Ok(command) => {
                    pending.push(command);
                    true
                }
                Err(_) => false,
            });
            self.report_output();
            self.report_state(stepping);
            result?;
            for command in pending {
                self.apply(command)?;
            }
            if self.controller.state() == ExecutionState::Stopped {
                break;
            }

            let received = match self.controller.next_deadline() {
                Some(deadline) => {
                    let now = self.controller.clock().now();
                    if deadline <= now {
                        continue;
                    }
                    match self.commands.recv_timeout(deadline - now) {
                        Ok(command) => Some(command),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => None,
                    }
                }
                // Paused, nothing happens until we are told
                None => self.commands.recv().ok(),
            };
            if let Some(command) = received {
                self.apply(command)?;
            }
        }

        self.report_state(false);
        log::info!("Stopped");
        Ok(())
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        log::debug!("Handling {:?}", command);
        match command {
            Command::Pause => self.controller.pause(),
            Command::Resume => self.controller.resume(),
            Command::Step => self.controller.step(),
            Command::Stop => self.stop()?,
            Command::Key { key, pressed } => self.controller.set_key(key, pressed),
            Command::SetTick(tick) => self.controller.set_tick(tick),
        }
        Ok(())
    }

    /// Report the final state, then let the controller reset for the next run.
    fn stop(&mut self) -> Result<()> {
        if self.controller.state() != ExecutionState::Stopped {
            self.reported_state = ExecutionState::Stopped;
            self.output.state_changed(ExecutionState::Stopped, &self.controller.snapshot());
        }
        self.controller.stop()
    }

    fn report_output(&mut self) {
        if self.controller.take_frame_dirty() {
            self.output.frame(self.controller.framebuffer());
        }
        match self.controller.take_sound_event() {
            Some(SoundEvent::Beep(duration)) => self.output.beep(duration),
            Some(SoundEvent::Silence) => self.output.silence(),
            None => {}
        }
    }

    fn report_state(&mut self, force: bool) {
        let state = self.controller.state();
        if force || state != self.reported_state {
            self.reported_state = state;
            self.output.state_changed(state, &self.controller.snapshot());
        }
    }

    pub fn controller(&self) -> &Controller<C> {
        &self.controller
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }
}
