//! The CHIP-8 virtual machine as described at https://en.wikipedia.org/wiki/CHIP-8#Virtual_machine_description.

use super::display::Framebuffer;
use super::instruction::*;
use super::keypad::Keypad;
use super::memory::{self, Memory, ADDR_MASK, FONT_START, GLYPH_SIZE, PROGRAM_START};
use super::opcode::Opcode;
use super::quirks::Quirks;
use super::snapshot::Snapshot;
use super::timer::{SoundEvent, Timers};
use crate::error::{Error, Result};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const NUM_REGISTERS: usize = 16;
pub const STACK_SIZE: usize = 16;
const FLAG: usize = 0xF;
const MAX_SPRITE_HEIGHT: usize = 15;

/// The interpreter state: memory, registers, stack, timers, keypad and screen.
///
/// An `Emulator` only moves forward when asked to, through `step` and
/// `tick_timers`. Pacing those calls is the job of the `Controller`.
pub struct Emulator {
    memory: Memory,
    registers: [u8; NUM_REGISTERS],
    i: u16,
    program_counter: u16,
    stack_pointer: usize,
    stack: [u16; STACK_SIZE],
    timers: Timers,
    keypad: Keypad,
    screen: Framebuffer,

    quirks: Quirks,
    seed: Option<u64>,
    rng: StdRng,

    frame_dirty: bool,
    sound_event: Option<SoundEvent>,
}

impl Emulator {

    /// Create an emulator whose random numbers come from the operating system.
    pub fn new(quirks: Quirks) -> Emulator {
        Emulator::build(quirks, None)
    }

    /// Create an emulator whose random number sequence is fixed by `seed`,
    /// so that a run only depends on its program, input and timing.
    pub fn with_seed(quirks: Quirks, seed: u64) -> Emulator {
        Emulator::build(quirks, Some(seed))
    }

    fn build(quirks: Quirks, seed: Option<u64>) -> Emulator {
        Emulator {
            memory: Memory::new(),
            registers: [0; NUM_REGISTERS],
            i: 0,
            program_counter: PROGRAM_START,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
            timers: Timers::new(),
            keypad: Keypad::new(),
            screen: Framebuffer::new(),

            quirks,
            seed,
            rng: new_rng(seed),

            frame_dirty: false,
            sound_event: None,
        }
    }

    /// Discard all state, as if the emulator was just created.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.registers = [0; NUM_REGISTERS];
        self.i = 0;
        self.program_counter = PROGRAM_START;
        self.stack_pointer = 0;
        self.stack = [0; STACK_SIZE];
        self.timers = Timers::new();
        self.keypad.release_all();
        self.screen.clear();
        self.rng = new_rng(self.seed);
        self.frame_dirty = true;
        self.sound_event = None;
    }

    /// Reset the machine and copy a program into memory at 0x200.
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        self.reset();
        self.memory.load_rom(program)?;
        log::debug!("Loaded {} byte program", program.len());
        Ok(())
    }

    /// The instruction word at the program counter.
    pub fn current_opcode(&self) -> Opcode {
        Opcode::from_bytes(
            self.memory.read(self.program_counter),
            self.memory.read(self.program_counter.wrapping_add(1)),
        )
    }

    /// Fetch, decode and execute a single instruction.
    /// The program counter is moved past the instruction before it executes.
    pub fn step(&mut self) -> Result<()> {
        let address = self.program_counter;
        let instruction = Instruction::decode(self.current_opcode(), address)?;

        log::trace!("{:#05x}: {}", address, instruction);

        self.program_counter = memory::wrap(address.wrapping_add(2));
        self.execute(instruction)
    }

    /// Execute many instructions in order, stopping at the first error.
    pub fn execute_many(&mut self, instructions: &[Instruction]) -> Result<()> {
        for &instruction in instructions {
            self.execute(instruction)?;
        }
        Ok(())
    }

    /// Execute a single instruction, as if it was just fetched.
    pub fn execute(&mut self, instruction: Instruction) -> Result<()> {
        match instruction {

            // Clear the screen
            Instruction::ClearScreen => {
                self.screen.clear();
                self.frame_dirty = true;
            }

            // Return to the previous call site via the stack
            Instruction::Return => {
                if self.stack_pointer == 0 {
                    return Err(Error::StackUnderflow {
                        address: self.instruction_address(),
                    });
                }
                self.stack_pointer -= 1;
                self.program_counter = self.stack[self.stack_pointer];
            }

            Instruction::Jump(Addr(addr)) => {
                self.program_counter = memory::wrap(addr);
            }

            // Push the address of the next instruction, then jump
            Instruction::Call(Addr(addr)) => {
                if self.stack_pointer == STACK_SIZE {
                    return Err(Error::StackOverflow {
                        address: self.instruction_address(),
                    });
                }
                self.stack[self.stack_pointer] = self.program_counter;
                self.stack_pointer += 1;
                self.program_counter = memory::wrap(addr);
            }

            Instruction::SkipIfEqConst(Reg(x), Const(n)) => {
                self.skip_if(self.registers[x as usize] == n);
            }

            Instruction::SkipIfNeqConst(Reg(x), Const(n)) => {
                self.skip_if(self.registers[x as usize] != n);
            }

            Instruction::SkipIfEqReg(Reg(x), Reg(y)) => {
                self.skip_if(self.registers[x as usize] == self.registers[y as usize]);
            }

            Instruction::SkipIfNeqReg(Reg(x), Reg(y)) => {
                self.skip_if(self.registers[x as usize] != self.registers[y as usize]);
            }

            Instruction::SetConst(Reg(x), Const(n)) => {
                self.registers[x as usize] = n;
            }

            // No carry flag for this one
            Instruction::AddConst(Reg(x), Const(n)) => {
                self.registers[x as usize] = self.registers[x as usize].wrapping_add(n);
            }

            Instruction::SetReg(Reg(x), Reg(y)) => {
                self.registers[x as usize] = self.registers[y as usize];
            }

            Instruction::Or(Reg(x), Reg(y)) => {
                self.registers[x as usize] |= self.registers[y as usize];
                self.reset_flag_after_logic();
            }

            Instruction::And(Reg(x), Reg(y)) => {
                self.registers[x as usize] &= self.registers[y as usize];
                self.reset_flag_after_logic();
            }

            Instruction::Xor(Reg(x), Reg(y)) => {
                self.registers[x as usize] ^= self.registers[y as usize];
                self.reset_flag_after_logic();
            }

            // The flag is written last, so it wins when X is F
            Instruction::AddReg(Reg(x), Reg(y)) => {
                let (sum, carry) = self.registers[x as usize].overflowing_add(self.registers[y as usize]);
                self.registers[x as usize] = sum;
                self.registers[FLAG] = carry as u8;
            }

            Instruction::SubReg(Reg(x), Reg(y)) => {
                let (vx, vy) = (self.registers[x as usize], self.registers[y as usize]);
                self.registers[x as usize] = vx.wrapping_sub(vy);
                self.registers[FLAG] = (vx >= vy) as u8;
            }

            Instruction::SubFromReg(Reg(x), Reg(y)) => {
                let (vx, vy) = (self.registers[x as usize], self.registers[y as usize]);
                self.registers[x as usize] = vy.wrapping_sub(vx);
                self.registers[FLAG] = (vy >= vx) as u8;
            }

            Instruction::ShiftRight(x, y) => {
                let source = self.shift_source(x, y);
                self.registers[x.0 as usize] = source >> 1;
                self.registers[FLAG] = source & 1;
            }

            Instruction::ShiftLeft(x, y) => {
                let source = self.shift_source(x, y);
                self.registers[x.0 as usize] = source << 1;
                self.registers[FLAG] = source >> 7;
            }

            Instruction::SetIndex(Addr(addr)) => {
                self.i = memory::wrap(addr);
            }

            Instruction::JumpWithOffset(Addr(addr)) => {
                let reg = if self.quirks.jump { (addr >> 8) & 0xF } else { 0 };
                let offset = self.registers[reg as usize] as u16;
                self.program_counter = memory::wrap(addr + offset);
            }

            Instruction::Random(Reg(x), Const(n)) => {
                self.registers[x as usize] = self.rng.gen::<u8>() & n;
            }

            Instruction::Draw(Reg(x), Reg(y), Const(height)) => {
                let height = height as usize;

                // Each sprite row is one byte, starting at I
                let mut sprite = [0; MAX_SPRITE_HEIGHT];
                for (row, byte) in sprite.iter_mut().enumerate().take(height) {
                    *byte = self.memory.read(self.i.wrapping_add(row as u16));
                }

                let collision = self.screen.draw_sprite(
                    self.registers[x as usize] as usize,
                    self.registers[y as usize] as usize,
                    &sprite[..height],
                );
                self.registers[FLAG] = collision as u8;
                self.frame_dirty = true;
            }

            Instruction::SkipIfKey(Reg(x)) => {
                self.skip_if(self.keypad.is_pressed(self.registers[x as usize]));
            }

            Instruction::SkipIfNotKey(Reg(x)) => {
                self.skip_if(!self.keypad.is_pressed(self.registers[x as usize]));
            }

            Instruction::GetDelayTimer(Reg(x)) => {
                self.registers[x as usize] = self.timers.delay;
            }

            // Block by running this instruction again until a key is held
            Instruction::WaitForKey(Reg(x)) => match self.keypad.first_pressed() {
                Some(key) => self.registers[x as usize] = key,
                None => self.program_counter = self.instruction_address(),
            },

            Instruction::SetDelayTimer(Reg(x)) => {
                self.timers.delay = self.registers[x as usize];
            }

            Instruction::SetSoundTimer(Reg(x)) => {
                if let Some(event) = self.timers.set_sound(self.registers[x as usize]) {
                    self.sound_event = Some(event);
                }
            }

            Instruction::AddToIndex(Reg(x)) => {
                self.i = memory::wrap(self.i + self.registers[x as usize] as u16);
            }

            // Each font glyph is 5 bytes
            Instruction::FontCharacter(Reg(x)) => {
                self.i = memory::wrap(FONT_START + GLYPH_SIZE * self.registers[x as usize] as u16);
            }

            Instruction::StoreBcd(Reg(x)) => {
                let value = self.registers[x as usize];
                self.memory.write(self.i, value / 100);
                self.memory.write(self.i.wrapping_add(1), (value / 10) % 10);
                self.memory.write(self.i.wrapping_add(2), value % 10);
            }

            // Dump register values up to Vx
            Instruction::StoreRegisters(Reg(x)) => {
                for reg in 0..=x as u16 {
                    self.memory.write(self.i.wrapping_add(reg), self.registers[reg as usize]);
                }
                self.advance_index_after_transfer(x);
            }

            // Load register values up to Vx
            Instruction::LoadRegisters(Reg(x)) => {
                for reg in 0..=x as u16 {
                    self.registers[reg as usize] = self.memory.read(self.i.wrapping_add(reg));
                }
                self.advance_index_after_transfer(x);
            }
        };

        Ok(())
    }

    /// Count the delay and sound timers down by one. Called at 60Hz.
    pub fn tick_timers(&mut self) {
        if let Some(event) = self.timers.tick() {
            self.sound_event = Some(event);
        }
    }

    /// Press or release a key on the keypad.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keypad.set_key(key, pressed);
    }

    /// Whether the screen changed since the last call.
    pub fn take_frame_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.frame_dirty, false)
    }

    /// The sound change since the last call, if any.
    pub fn take_sound_event(&mut self) -> Option<SoundEvent> {
        self.sound_event.take()
    }

    /// Whether the next instruction is `FX0A` and no key is held.
    pub fn is_waiting_for_key(&self) -> bool {
        let waiting = matches!(self.current_opcode().nibbles(), (0xF, _, 0, 0xA));
        waiting && self.keypad.first_pressed().is_none()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.screen
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn registers(&self) -> &[u8; NUM_REGISTERS] {
        &self.registers
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn timers(&self) -> Timers {
        self.timers
    }

    /// Copy out the registers, stack, timers and upcoming instruction.
    pub fn snapshot(&self) -> Snapshot {
        let opcode = self.current_opcode();
        Snapshot {
            registers: self.registers,
            i: self.i,
            program_counter: self.program_counter,
            stack_pointer: self.stack_pointer,
            stack: self.stack,
            delay_timer: self.timers.delay,
            sound_timer: self.timers.sound,
            opcode: opcode.as_u16(),
            instruction: Instruction::decode(opcode, self.program_counter).ok(),
        }
    }

    /// Address of the instruction being executed. The program counter has
    /// already moved past it.
    fn instruction_address(&self) -> u16 {
        self.program_counter.wrapping_sub(2) & ADDR_MASK
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = memory::wrap(self.program_counter + 2);
        }
    }

    fn shift_source(&self, Reg(x): Reg, Reg(y): Reg) -> u8 {
        if self.quirks.shift {
            self.registers[x as usize]
        } else {
            self.registers[y as usize]
        }
    }

    fn reset_flag_after_logic(&mut self) {
        if self.quirks.logic {
            self.registers[FLAG] = 0;
        }
    }

    fn advance_index_after_transfer(&mut self, x: u8) {
        if self.quirks.load_store {
            self.i = memory::wrap(self.i + x as u16 + 1);
        }
    }
}

fn new_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::emulator::display::{SCREEN_HEIGHT, SCREEN_WIDTH};
    use proptest::prelude::*;
    use test_case::test_case;

    fn emulator_with(program: &[u8], quirks: Quirks) -> Emulator {
        let mut emulator = Emulator::with_seed(quirks, 0);
        emulator.load(program).unwrap();
        emulator
    }

    fn run(program: &[u8], steps: usize) -> Emulator {
        let mut emulator = emulator_with(program, Quirks::default());
        for _ in 0..steps {
            emulator.step().unwrap();
        }
        emulator
    }

    #[test]
    fn starts_at_program_start_with_font_loaded() {
        let emulator = Emulator::new(Quirks::default());
        assert_eq!(emulator.program_counter(), 0x200);
        assert_eq!(emulator.memory().read(0x50), 0xF0);
        assert_eq!(emulator.registers(), &[0; 16]);
    }

    #[test]
    fn goto_goes_to() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.execute(Instruction::Jump(Addr(0x250))).unwrap();
        assert_eq!(emulator.program_counter, 0x250);
    }

    #[test]
    fn load_then_add_constant() {
        let emulator = run(&[0x60, 0x05, 0x70, 0x03], 2);
        assert_eq!(emulator.registers[0], 8);
        assert_eq!(emulator.program_counter, 0x204);
    }

    #[test]
    fn add_constant_wraps_without_touching_flag() {
        let emulator = run(&[0x60, 0xFF, 0x70, 0x02], 2);
        assert_eq!(emulator.registers[0], 1);
        assert_eq!(emulator.registers[0xF], 0);
    }

    #[test]
    fn return_after_call_is_neutral() {
        let program = [
            0x22, 0x06, // 0x200, call 0x206
            0x00, 0x00, // 0x202
            0x00, 0x00, // 0x204
            0x00, 0xEE, // 0x206, return
        ];
        let mut emulator = emulator_with(&program, Quirks::default());

        emulator.step().unwrap(); // Call 0x206
        assert_eq!(emulator.program_counter, 0x206);
        assert_eq!(emulator.snapshot().call_stack(), &[0x202]);
        emulator.step().unwrap(); // Return to 0x202
        assert_eq!(emulator.program_counter, 0x202);
        assert_eq!(emulator.stack_pointer, 0);
    }

    #[test]
    fn seventeenth_nested_call_overflows() {
        // 0x200: call 0x200, forever
        let mut emulator = emulator_with(&[0x22, 0x00], Quirks::default());
        for _ in 0..STACK_SIZE {
            emulator.step().unwrap();
        }
        match emulator.step() {
            Err(Error::StackOverflow { address }) => assert_eq!(address, 0x200),
            other => panic!("expected StackOverflow, got {:?}", other),
        }
        assert_eq!(emulator.stack_pointer, STACK_SIZE);
    }

    #[test]
    fn return_with_empty_stack_underflows() {
        let mut emulator = emulator_with(&[0x00, 0xEE], Quirks::default());
        match emulator.step() {
            Err(Error::StackUnderflow { address }) => assert_eq!(address, 0x200),
            other => panic!("expected StackUnderflow, got {:?}", other),
        }
    }

    #[test]
    fn invalid_opcode_is_reported_with_its_address() {
        let mut emulator = emulator_with(&[0x60, 0x01, 0xFF, 0xFF], Quirks::default());
        emulator.step().unwrap();
        match emulator.step() {
            Err(Error::InvalidOpcode { opcode, address }) => {
                assert_eq!(opcode, 0xFFFF);
                assert_eq!(address, 0x202);
            }
            other => panic!("expected InvalidOpcode, got {:?}", other),
        }
        assert_eq!(emulator.program_counter, 0x202);
    }

    #[test]
    fn loading_a_program_discards_previous_state() {
        let mut emulator = run(&[0x6A, 0x42, 0xA1, 0x23, 0x00, 0xE0], 3);
        emulator.set_key(3, true);
        emulator.load(&[0x12, 0x00]).unwrap();
        assert_eq!(emulator.registers, [0; 16]);
        assert_eq!(emulator.i, 0);
        assert_eq!(emulator.program_counter, 0x200);
        assert_eq!(emulator.memory().read(0x202), 0);
        assert_eq!(emulator.keypad().first_pressed(), None);
    }

    #[test]
    fn oversized_program_is_rejected() {
        let mut emulator = Emulator::new(Quirks::default());
        let program = vec![0; 4096 - 0x200 + 1];
        assert!(matches!(emulator.load(&program), Err(Error::RomTooLarge { .. })));
    }

    #[test_case(0x30, 0x05 => 0x204 ; "skip if equal const taken")]
    #[test_case(0x30, 0x06 => 0x202 ; "skip if equal const not taken")]
    #[test_case(0x40, 0x06 => 0x204 ; "skip if not equal const taken")]
    #[test_case(0x40, 0x05 => 0x202 ; "skip if not equal const not taken")]
    #[test_case(0x50, 0x10 => 0x204 ; "skip if equal reg taken")]
    #[test_case(0x50, 0x20 => 0x202 ; "skip if equal reg not taken")]
    #[test_case(0x90, 0x20 => 0x204 ; "skip if not equal reg taken")]
    #[test_case(0x90, 0x10 => 0x202 ; "skip if not equal reg not taken")]
    fn skips(high: u8, low: u8) -> u16 {
        // V0 = V1 = 5, V2 = 6
        let mut emulator = emulator_with(&[high, low], Quirks::default());
        emulator.registers[0] = 5;
        emulator.registers[1] = 5;
        emulator.registers[2] = 6;
        emulator.step().unwrap();
        emulator.program_counter
    }

    #[test_case(1, 0b1100_1010 ; "or")]
    #[test_case(2, 0b1000_0000 ; "and")]
    #[test_case(3, 0b0100_1010 ; "xor")]
    fn bitwise_operations(operation: u8, expected: u8) {
        for &logic in &[false, true] {
            // 8 0 1 N: V0 = V0 op V1
            let quirks = Quirks { logic, ..Quirks::default() };
            let mut emulator = emulator_with(&[0x80, 0x10 | operation], quirks);
            emulator.registers[0] = 0b1000_1000;
            emulator.registers[1] = 0b1100_0010;
            emulator.registers[0xF] = 7;
            emulator.step().unwrap();
            assert_eq!(emulator.registers[0], expected);
            assert_eq!(emulator.registers[0xF], if logic { 0 } else { 7 });
        }
    }

    proptest! {
        #[test]
        fn add_sets_carry(a in any::<u8>(), b in any::<u8>()) {
            let mut emulator = Emulator::with_seed(Quirks::default(), 0);
            emulator.registers[1] = a;
            emulator.registers[2] = b;
            emulator.execute(Instruction::AddReg(Reg(1), Reg(2))).unwrap();
            prop_assert_eq!(emulator.registers[1], a.wrapping_add(b));
            prop_assert_eq!(emulator.registers[0xF], (a as u16 + b as u16 > 255) as u8);
        }

        #[test]
        fn sub_sets_no_borrow(a in any::<u8>(), b in any::<u8>()) {
            let mut emulator = Emulator::with_seed(Quirks::default(), 0);
            emulator.registers[1] = a;
            emulator.registers[2] = b;
            emulator.execute(Instruction::SubReg(Reg(1), Reg(2))).unwrap();
            prop_assert_eq!(emulator.registers[1], a.wrapping_sub(b));
            prop_assert_eq!(emulator.registers[0xF], (a >= b) as u8);
        }

        #[test]
        fn reverse_sub_sets_no_borrow(a in any::<u8>(), b in any::<u8>()) {
            let mut emulator = Emulator::with_seed(Quirks::default(), 0);
            emulator.registers[1] = a;
            emulator.registers[2] = b;
            emulator.execute(Instruction::SubFromReg(Reg(1), Reg(2))).unwrap();
            prop_assert_eq!(emulator.registers[1], b.wrapping_sub(a));
            prop_assert_eq!(emulator.registers[0xF], (b >= a) as u8);
        }

        #[test]
        fn shifts_move_the_lost_bit_into_flag(a in any::<u8>(), shift in any::<bool>()) {
            let quirks = Quirks { shift, ..Quirks::default() };
            let mut emulator = Emulator::with_seed(quirks, 0);
            emulator.registers[1] = a;
            emulator.registers[2] = a;
            emulator.execute(Instruction::ShiftRight(Reg(1), Reg(2))).unwrap();
            prop_assert_eq!(emulator.registers[1], a >> 1);
            prop_assert_eq!(emulator.registers[0xF], a & 1);

            emulator.registers[1] = a;
            emulator.execute(Instruction::ShiftLeft(Reg(1), Reg(2))).unwrap();
            prop_assert_eq!(emulator.registers[1], a << 1);
            prop_assert_eq!(emulator.registers[0xF], a >> 7);
        }

        #[test]
        fn bcd_digits(value in any::<u8>()) {
            let mut emulator = Emulator::with_seed(Quirks::default(), 0);
            emulator.registers[3] = value;
            emulator.i = 0x300;
            emulator.execute(Instruction::StoreBcd(Reg(3))).unwrap();
            let digits = [emulator.memory.read(0x300), emulator.memory.read(0x301), emulator.memory.read(0x302)];
            prop_assert_eq!(digits[0] as u32 * 100 + digits[1] as u32 * 10 + digits[2] as u32, value as u32);
            prop_assert!(digits.iter().all(|&d| d < 10));
        }
    }

    #[test]
    fn carry_flag_wins_when_target_is_vf() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.registers[0xF] = 0x80;
        emulator.execute(Instruction::AddReg(Reg(0xF), Reg(0xF))).unwrap();
        assert_eq!(emulator.registers[0xF], 1);
    }

    #[test]
    fn subtracting_equal_values_sets_no_borrow() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.registers[1] = 9;
        emulator.registers[2] = 9;
        emulator.execute(Instruction::SubReg(Reg(1), Reg(2))).unwrap();
        assert_eq!(emulator.registers[1], 0);
        assert_eq!(emulator.registers[0xF], 1);
    }

    #[test]
    fn shift_uses_vy_without_quirk() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.registers[1] = 0b0000_0001;
        emulator.registers[2] = 0b1000_0010;
        emulator.execute(Instruction::ShiftRight(Reg(1), Reg(2))).unwrap();
        assert_eq!(emulator.registers[1], 0b0100_0001);
        assert_eq!(emulator.registers[0xF], 0);
        assert_eq!(emulator.registers[2], 0b1000_0010);
    }

    #[test]
    fn shift_ignores_vy_with_quirk() {
        let quirks = Quirks { shift: true, ..Quirks::default() };
        let mut emulator = Emulator::new(quirks);
        emulator.registers[1] = 0b1000_0001;
        emulator.registers[2] = 0b0000_0010;
        emulator.execute(Instruction::ShiftLeft(Reg(1), Reg(2))).unwrap();
        assert_eq!(emulator.registers[1], 0b0000_0010);
        assert_eq!(emulator.registers[0xF], 1);
    }

    #[test_case(false => 0x310 ; "jump adds v0")]
    #[test_case(true => 0x320 ; "jump adds vx")]
    fn jump_with_offset(jump: bool) -> u16 {
        let quirks = Quirks { jump, ..Quirks::default() };
        let mut emulator = Emulator::new(quirks);
        emulator.registers[0] = 0x10;
        emulator.registers[3] = 0x20;
        emulator.execute(Instruction::JumpWithOffset(Addr(0x300))).unwrap();
        emulator.program_counter
    }

    #[test]
    fn jump_with_offset_wraps_into_memory() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.registers[0] = 0xFF;
        emulator.execute(Instruction::JumpWithOffset(Addr(0xFFF))).unwrap();
        assert_eq!(emulator.program_counter, 0x0FE);
    }

    #[test]
    fn random_is_masked() {
        let mut emulator = Emulator::new(Quirks::default());
        for _ in 0..100 {
            emulator.execute(Instruction::Random(Reg(4), Const(0x0F))).unwrap();
            assert!(emulator.registers[4] <= 0x0F);
        }
        emulator.execute(Instruction::Random(Reg(4), Const(0))).unwrap();
        assert_eq!(emulator.registers[4], 0);
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let draw = |seed| {
            let mut emulator = Emulator::with_seed(Quirks::default(), seed);
            (0..8)
                .map(|_| {
                    emulator.execute(Instruction::Random(Reg(0), Const(0xFF))).unwrap();
                    emulator.registers[0]
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn clear_screen_clears_screen() {
        // Draw the glyph for 0, then clear
        let mut emulator = run(&[0xA0, 0x50, 0xD0, 0x05, 0x00, 0xE0], 2);
        assert!(!emulator.framebuffer().is_blank());
        emulator.step().unwrap();
        assert!(emulator.framebuffer().is_blank());
        assert!(emulator.take_frame_dirty());
        assert!(!emulator.take_frame_dirty());
    }

    #[test]
    fn drawing_a_sprite_twice_erases_it() {
        let program = [
            0xA0, 0x50, // I = glyph 0
            0x60, 0x0A, // V0 = 10
            0x61, 0x05, // V1 = 5
            0xD0, 0x15, // draw
            0xD0, 0x15, // draw again
        ];
        let mut emulator = run(&program, 4);
        assert_eq!(emulator.registers[0xF], 0);
        assert_eq!(emulator.framebuffer().get(10, 5), 1);
        emulator.step().unwrap();
        assert_eq!(emulator.registers[0xF], 1);
        assert!(emulator.framebuffer().is_blank());
    }

    #[test]
    fn draw_origin_wraps_and_sprite_reads_from_i() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.memory.write(0x300, 0b1100_0000);
        emulator.i = 0x300;
        emulator.registers[0] = (SCREEN_WIDTH + 1) as u8;
        emulator.registers[1] = (SCREEN_HEIGHT + 2) as u8;
        emulator.execute(Instruction::Draw(Reg(0), Reg(1), Const(1))).unwrap();
        assert_eq!(emulator.framebuffer().get(1, 2), 1);
        assert_eq!(emulator.framebuffer().get(2, 2), 1);
        assert_eq!(emulator.framebuffer().get(3, 2), 0);
    }

    #[test]
    fn draw_resets_flag_without_collision() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.registers[0xF] = 1;
        emulator.i = 0x50;
        emulator.execute(Instruction::Draw(Reg(0), Reg(0), Const(5))).unwrap();
        assert_eq!(emulator.registers[0xF], 0);
    }

    #[test]
    fn key_skips() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.registers[0] = 0xA;
        emulator.set_key(0xA, true);
        emulator.execute(Instruction::SkipIfKey(Reg(0))).unwrap();
        assert_eq!(emulator.program_counter, 0x202);
        emulator.execute(Instruction::SkipIfNotKey(Reg(0))).unwrap();
        assert_eq!(emulator.program_counter, 0x202);
        emulator.set_key(0xA, false);
        emulator.execute(Instruction::SkipIfNotKey(Reg(0))).unwrap();
        assert_eq!(emulator.program_counter, 0x204);
    }

    #[test]
    fn wait_for_key_repeats_until_a_key_is_held() {
        let mut emulator = emulator_with(&[0xF3, 0x0A], Quirks::default());
        assert!(emulator.is_waiting_for_key());
        emulator.step().unwrap();
        emulator.step().unwrap();
        assert_eq!(emulator.program_counter, 0x200);

        emulator.set_key(0xE, true);
        emulator.set_key(0x7, true);
        assert!(!emulator.is_waiting_for_key());
        emulator.step().unwrap();
        assert_eq!(emulator.program_counter, 0x202);
        assert_eq!(emulator.registers[3], 0x7);
    }

    #[test]
    fn timers_are_set_and_read() {
        let mut emulator = run(&[0x65, 0x0A, 0xF5, 0x15, 0xF5, 0x18], 3);
        assert_eq!(emulator.timers().delay, 10);
        assert_eq!(emulator.timers().sound, 10);
        assert!(matches!(emulator.take_sound_event(), Some(SoundEvent::Beep(_))));

        emulator.tick_timers();
        emulator.execute(Instruction::GetDelayTimer(Reg(2))).unwrap();
        assert_eq!(emulator.registers[2], 9);
    }

    #[test]
    fn delay_timer_counts_down_to_zero() {
        let mut emulator = run(&[0x60, 0x0A, 0xF0, 0x15], 2);
        for _ in 0..10 {
            emulator.tick_timers();
        }
        assert_eq!(emulator.timers().delay, 0);
        emulator.tick_timers();
        assert_eq!(emulator.timers().delay, 0);
    }

    #[test]
    fn sound_timer_running_out_is_signalled() {
        let mut emulator = run(&[0x60, 0x01, 0xF0, 0x18], 2);
        emulator.take_sound_event();
        emulator.tick_timers();
        assert_eq!(emulator.take_sound_event(), Some(SoundEvent::Silence));
        emulator.tick_timers();
        assert_eq!(emulator.take_sound_event(), None);
    }

    #[test]
    fn add_to_index_wraps_into_memory() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.i = 0xFFE;
        emulator.registers[0] = 4;
        emulator.execute(Instruction::AddToIndex(Reg(0))).unwrap();
        assert_eq!(emulator.i, 0x002);
    }

    #[test_case(0x0 => 0x50 ; "glyph 0")]
    #[test_case(0xA => 0x82 ; "glyph a")]
    #[test_case(0xF => 0x9B ; "glyph f")]
    fn font_character_address(digit: u8) -> u16 {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.registers[5] = digit;
        emulator.execute(Instruction::FontCharacter(Reg(5))).unwrap();
        emulator.i
    }

    #[test]
    fn bcd_of_255() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.registers[0] = 255;
        emulator.i = 0x400;
        emulator.execute(Instruction::StoreBcd(Reg(0))).unwrap();
        assert_eq!(
            [emulator.memory.read(0x400), emulator.memory.read(0x401), emulator.memory.read(0x402)],
            [2, 5, 5]
        );
    }

    #[test_case(false => 0x400 ; "index unchanged")]
    #[test_case(true => 0x404 ; "index advanced")]
    fn store_then_load_round_trips(load_store: bool) -> u16 {
        let quirks = Quirks { load_store, ..Quirks::default() };
        let mut emulator = Emulator::new(quirks);
        let original = [9, 8, 7, 6];
        emulator.registers[..4].copy_from_slice(&original);
        emulator.registers[4] = 0x55;
        emulator.i = 0x400;

        emulator.execute(Instruction::StoreRegisters(Reg(3))).unwrap();
        let index_after_store = emulator.i;
        assert_eq!(emulator.memory.read(0x404), 0);

        emulator.registers = [0; NUM_REGISTERS];
        emulator.i = 0x400;
        emulator.execute(Instruction::LoadRegisters(Reg(3))).unwrap();
        assert_eq!(&emulator.registers[..4], &original);
        assert_eq!(emulator.registers[4], 0);
        assert_eq!(emulator.i, index_after_store);
        emulator.i
    }

    #[test]
    fn store_wraps_at_end_of_memory() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.registers[0] = 1;
        emulator.registers[1] = 2;
        emulator.i = 0xFFF;
        emulator.execute(Instruction::StoreRegisters(Reg(1))).unwrap();
        assert_eq!(emulator.memory.read(0xFFF), 1);
        assert_eq!(emulator.memory.read(0x000), 2);
    }

    #[test]
    fn program_counter_wraps_at_end_of_memory() {
        let mut emulator = Emulator::new(Quirks::default());
        emulator.execute(Instruction::Jump(Addr(0xFFE))).unwrap();
        // 0xFFE holds 0x0000, which is not a valid instruction
        assert!(emulator.step().is_err());
        emulator.memory.write(0xFFE, 0x6A);
        emulator.memory.write(0xFFF, 0x01);
        emulator.step().unwrap();
        assert_eq!(emulator.program_counter, 0x000);
    }

    #[test]
    fn snapshot_copies_state() {
        let mut emulator = run(&[0x6A, 0x42, 0xA1, 0x23, 0x22, 0x08, 0x00, 0x00, 0x00, 0xE0], 3);
        let snapshot = emulator.snapshot();
        assert_eq!(snapshot.registers[0xA], 0x42);
        assert_eq!(snapshot.i, 0x123);
        assert_eq!(snapshot.program_counter, 0x208);
        assert_eq!(snapshot.call_stack(), &[0x206]);
        assert_eq!(snapshot.opcode, 0x00E0);
        assert_eq!(snapshot.instruction, Some(Instruction::ClearScreen));

        emulator.step().unwrap();
        assert_eq!(snapshot.program_counter, 0x208);
        assert!(snapshot.to_string().contains("OPCODE = 00E0 (CLS)"));
    }
}
