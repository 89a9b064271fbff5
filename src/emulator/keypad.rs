pub const NUM_KEYS: usize = 16;

/// The state of the hexadecimal keypad, keys `0x0..=0xF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Keypad {
    keys: [bool; NUM_KEYS],
}

impl Keypad {

    pub fn new() -> Keypad {
        Keypad::default()
    }

    /// Press or release a key. Indices outside the keypad are ignored.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        match self.keys.get_mut(key as usize) {
            Some(state) => *state = pressed,
            None => log::warn!("Ignoring key {:#x}, the keypad only has keys 0x0..=0xF", key),
        }
    }

    /// Whether a key is held. Only the low nibble of `key` is used.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[(key & 0xF) as usize]
    }

    /// The lowest numbered key that is held, if any.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&pressed| pressed).map(|i| i as u8)
    }

    pub fn release_all(&mut self) {
        self.keys = [false; NUM_KEYS];
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn keys_start_released() {
        let keypad = Keypad::new();
        assert!((0..16).all(|k| !keypad.is_pressed(k)));
        assert_eq!(keypad.first_pressed(), None);
    }

    #[test]
    fn first_pressed_scans_in_order() {
        let mut keypad = Keypad::new();
        keypad.set_key(0xC, true);
        keypad.set_key(0x3, true);
        assert_eq!(keypad.first_pressed(), Some(0x3));
        keypad.set_key(0x3, false);
        assert_eq!(keypad.first_pressed(), Some(0xC));
    }

    #[test]
    fn highest_key_is_reachable() {
        let mut keypad = Keypad::new();
        keypad.set_key(0xF, true);
        assert_eq!(keypad.first_pressed(), Some(0xF));
        assert!(keypad.is_pressed(0xF));
    }

    #[test]
    fn out_of_range_keys_are_ignored() {
        let mut keypad = Keypad::new();
        keypad.set_key(16, true);
        assert_eq!(keypad, Keypad::new());
    }
}
