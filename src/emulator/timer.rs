//! The delay and sound timers, which count down at 60Hz regardless of how fast
//! instructions run.

use std::time::Duration;

pub const TIMER_HZ: u64 = 60;

/// Time between two timer decrements.
pub const TIMER_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / TIMER_HZ);

/// What the audio collaborator should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    /// Start a tone that lasts as long as the sound timer will.
    Beep(Duration),
    /// The sound timer ran out.
    Silence,
}

/// How long a sound timer value lasts.
pub fn sound_duration(ticks: u8) -> Duration {
    Duration::from_micros(ticks as u64 * 1_000_000 / TIMER_HZ)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {

    pub fn new() -> Timers {
        Timers::default()
    }

    /// Set the sound timer. A beep starts only when the timer was idle;
    /// writing to a timer that is already sounding just changes how long it lasts.
    pub fn set_sound(&mut self, value: u8) -> Option<SoundEvent> {
        let was_active = self.sound > 0;
        self.sound = value;
        if value > 0 && !was_active {
            Some(SoundEvent::Beep(sound_duration(value)))
        } else if value == 0 && was_active {
            Some(SoundEvent::Silence)
        } else {
            None
        }
    }

    /// Count both timers one step towards zero.
    /// Reports when the sound timer reaches zero.
    pub fn tick(&mut self) -> Option<SoundEvent> {
        self.delay = self.delay.saturating_sub(1);
        if self.sound > 0 {
            self.sound -= 1;
            if self.sound == 0 {
                return Some(SoundEvent::Silence);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn delay_reaches_zero_and_stays_there() {
        let mut timers = Timers::new();
        timers.delay = 10;
        for _ in 0..10 {
            timers.tick();
        }
        assert_eq!(timers.delay, 0);
        timers.tick();
        timers.tick();
        assert_eq!(timers.delay, 0);
    }

    #[test]
    fn silence_is_signalled_once() {
        let mut timers = Timers::new();
        assert_eq!(timers.set_sound(2), Some(SoundEvent::Beep(sound_duration(2))));
        assert_eq!(timers.tick(), None);
        assert_eq!(timers.tick(), Some(SoundEvent::Silence));
        assert_eq!(timers.tick(), None);
    }

    #[test]
    fn rewriting_an_active_sound_timer_does_not_beep_again() {
        let mut timers = Timers::new();
        assert_eq!(timers.set_sound(5), Some(SoundEvent::Beep(sound_duration(5))));
        assert_eq!(timers.set_sound(3), None);
        assert_eq!(timers.sound, 3);

        // Once it has run out, the next write beeps again
        for _ in 0..3 {
            timers.tick();
        }
        assert_eq!(timers.set_sound(4), Some(SoundEvent::Beep(sound_duration(4))));
    }

    #[test]
    fn clearing_an_active_sound_timer_silences() {
        let mut timers = Timers::new();
        timers.set_sound(30);
        assert_eq!(timers.set_sound(0), Some(SoundEvent::Silence));
        assert_eq!(timers.set_sound(0), None);
    }

    #[test]
    fn beep_lasts_as_long_as_the_timer() {
        assert_eq!(sound_duration(60), Duration::from_secs(1));
        assert_eq!(sound_duration(0), Duration::from_secs(0));
    }

    #[test]
    fn period_is_one_sixtieth_of_a_second() {
        assert_eq!(TIMER_PERIOD.as_micros(), 16_666);
    }
}
