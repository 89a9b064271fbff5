//! Behavioural differences between historical CHIP-8 interpreters.
//!
//! Some programs depend on how the interpreter they were written for behaved,
//! so the emulator is handed one `Quirks` value when it is created and keeps it
//! for the whole run.

use std::fmt;
use std::str::FromStr;

/// Which historical semantics to use for the instructions that differ between interpreters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quirks {
    /// `8XY6`/`8XYE` shift `VX` in place instead of shifting `VY` into `VX`.
    pub shift: bool,
    /// `BNNN` jumps to `NNN + VX`, where `X` is the high nibble of `NNN`, instead of `NNN + V0`.
    pub jump: bool,
    /// `8XY1`, `8XY2` and `8XY3` set `VF` to zero.
    pub logic: bool,
    /// `FX55`/`FX65` leave `I` pointing just past the last register transferred.
    pub load_store: bool,
}

impl Quirks {

    /// The original COSMAC VIP interpreter.
    pub fn cosmac_vip() -> Quirks {
        Quirks {
            shift: false,
            jump: false,
            logic: true,
            load_store: true,
        }
    }

    /// The SUPER-CHIP interpreter for HP48 calculators.
    pub fn super_chip() -> Quirks {
        Quirks {
            shift: true,
            jump: true,
            logic: false,
            load_store: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown quirk preset `{0}`, expected one of: none, vip, schip")]
pub struct UnknownPreset(String);

/// Parse a preset name, as given on the command line.
impl FromStr for Quirks {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "default" => Ok(Quirks::default()),
            "vip" | "cosmac" | "cosmac-vip" => Ok(Quirks::cosmac_vip()),
            "schip" | "superchip" | "super-chip" => Ok(Quirks::super_chip()),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

impl fmt::Display for Quirks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shift={} jump={} logic={} load_store={}",
            self.shift, self.jump, self.logic, self.load_store
        )
    }
}
