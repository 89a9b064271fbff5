use std::sync::mpsc::Sender;
use std::time::Duration;

/// A request to the `Runner`, handled between two instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    /// Run one instruction while paused.
    Step,
    Stop,
    Key { key: u8, pressed: bool },
    SetTick(Duration),
}

/// Sends commands to a running `Runner` from any thread, for example a
/// keyboard handler or a debugger window.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    sender: Sender<Command>,
}

impl ControlHandle {

    pub fn new(sender: Sender<Command>) -> ControlHandle {
        ControlHandle { sender }
    }

    pub fn send(&self, command: Command) {
        if self.sender.send(command).is_err() {
            log::debug!("Runner is gone, dropping {:?}", command);
        }
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    pub fn resume(&self) {
        self.send(Command::Resume);
    }

    pub fn step(&self) {
        self.send(Command::Step);
    }

    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    pub fn set_key(&self, key: u8, pressed: bool) {
        self.send(Command::Key { key, pressed });
    }

    pub fn set_tick(&self, tick: Duration) {
        self.send(Command::SetTick(tick));
    }
}
