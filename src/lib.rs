/*!

A CHIP-8 virtual machine as specified at https://en.wikipedia.org/wiki/CHIP-8.

The crate is only the interpreter. Windows, audio and keyboard mapping are left to
whoever embeds it: they hand over a program and key presses, and get back frames,
register snapshots and beeps.

# Running a program

The main way of running a program is to load it as bytes and step through it.

```rust
use chip_8_vm::emulator::{Emulator, Quirks};

let mut emulator = Emulator::new(Quirks::default());

// Load a program at address 0x200: V0 = 5, V0 += 3
emulator.load(&[0x60, 0x05, 0x70, 0x03]).unwrap();
emulator.step().unwrap();
emulator.step().unwrap();
assert_eq!(emulator.registers()[0], 8);
```

Alternatively, you can experiment by executing instructions directly.

```rust
use chip_8_vm::emulator::{Emulator, Quirks};
use chip_8_vm::emulator::instruction::{Instruction, Reg, Const, Addr};

let mut emulator = Emulator::new(Quirks::cosmac_vip());

emulator.execute(Instruction::ClearScreen).unwrap();
emulator.execute_many(&[
    Instruction::Jump(Addr(0x250)),
    Instruction::SetConst(Reg(0xA), Const(35)),
    Instruction::SetReg(Reg(0xB), Reg(0xA)),
]).unwrap();
assert_eq!(emulator.program_counter(), 0x250);
assert_eq!(emulator.registers()[0xB], 35);
```

# Quirks

Historical interpreters disagree on a handful of instructions. Pick the behaviour a
program expects with `Quirks`, either field by field or from a preset such as
`Quirks::cosmac_vip()` or `Quirks::super_chip()`. The choice is fixed for the lifetime
of an `Emulator`.

# Real time

An `Emulator` only moves when stepped. To run a program at a steady pace with its
timers counting down at 60Hz, put it in a `Controller`, and the controller in a
`Runner`. The runner is an event loop that takes `Command`s (pause, step, keys, ...)
from a `ControlHandle` and reports frames and beeps to an `EmulatorOutput`.

```rust
use chip_8_vm::emulator::{Config, Controller, Runner};
use chip_8_vm::emulator::output::RecordingOutput;

let mut controller = Controller::new(Config::default());
controller.load(&[0x00, 0xE0, 0x12, 0x02]).unwrap();

let (mut runner, handle) = Runner::new(controller, RecordingOutput::new());
std::thread::spawn(move || {
    std::thread::sleep(std::time::Duration::from_millis(20));
    handle.stop();
});
runner.run(false).unwrap();
assert!(runner.output().frames > 0);
```
*/

pub mod emulator;
pub mod error;

pub use error::{Error, Result};
