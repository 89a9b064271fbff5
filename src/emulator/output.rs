use super::controller::ExecutionState;
use super::display::Framebuffer;
use super::snapshot::Snapshot;

use std::sync::mpsc::Sender;
use std::time::Duration;

/// Somewhere the `Runner` reports to: a screen, a speaker, a debugger.
/// Everything is handed over by reference on the runner's own thread.
pub trait EmulatorOutput {
    /// The screen changed.
    fn frame(&mut self, frame: &Framebuffer);

    /// Start a tone of the given length.
    fn beep(&mut self, _duration: Duration) {}

    /// The sound timer ran out.
    fn silence(&mut self) {}

    /// The emulator started, paused, stepped or stopped.
    fn state_changed(&mut self, _state: ExecutionState, _snapshot: &Snapshot) {}
}

/// An output device that keeps track of everything it was told.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub frames: usize,
    pub last_frame: Option<Framebuffer>,
    pub beeps: Vec<Duration>,
    pub silences: usize,
    pub states: Vec<(ExecutionState, Snapshot)>,
}

impl RecordingOutput {
    pub fn new() -> RecordingOutput {
        RecordingOutput::default()
    }
}

impl EmulatorOutput for RecordingOutput {
    fn frame(&mut self, frame: &Framebuffer) {
        self.frames += 1;
        self.last_frame = Some(frame.clone());
    }

    fn beep(&mut self, duration: Duration) {
        self.beeps.push(duration);
    }

    fn silence(&mut self) {
        self.silences += 1;
    }

    fn state_changed(&mut self, state: ExecutionState, snapshot: &Snapshot) {
        self.states.push((state, snapshot.clone()));
    }
}

/// What a `ChannelOutput` sends.
#[derive(Debug, Clone)]
pub enum OutputEvent {
    Frame(Box<Framebuffer>),
    Beep(Duration),
    Silence,
    State(ExecutionState, Box<Snapshot>),
}

/// Copies everything onto a channel, for a renderer running on another thread.
pub struct ChannelOutput {
    sender: Sender<OutputEvent>,
}

impl ChannelOutput {
    pub fn new(sender: Sender<OutputEvent>) -> ChannelOutput {
        ChannelOutput { sender }
    }

    fn send(&self, event: OutputEvent) {
        if self.sender.send(event).is_err() {
            log::trace!("Renderer is gone, dropping output");
        }
    }
}

impl EmulatorOutput for ChannelOutput {
    fn frame(&mut self, frame: &Framebuffer) {
        self.send(OutputEvent::Frame(Box::new(frame.clone())));
    }

    fn beep(&mut self, duration: Duration) {
        self.send(OutputEvent::Beep(duration));
    }

    fn silence(&mut self) {
        self.send(OutputEvent::Silence);
    }

    fn state_changed(&mut self, state: ExecutionState, snapshot: &Snapshot) {
        self.send(OutputEvent::State(state, Box::new(snapshot.clone())));
    }
}
