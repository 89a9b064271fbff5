use super::instruction::Instruction;
use std::fmt;

/// A copy of the machine state, for debuggers and status displays.
/// Changing it has no effect on the emulator it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub registers: [u8; 16],
    pub i: u16,
    pub program_counter: u16,
    pub stack_pointer: usize,
    pub stack: [u16; 16],
    pub delay_timer: u8,
    pub sound_timer: u8,
    /// The instruction word at the program counter, i.e. the next one to run.
    pub opcode: u16,
    /// `opcode` decoded, if it is a valid instruction.
    pub instruction: Option<Instruction>,
}

impl Snapshot {

    /// The return addresses currently on the stack, oldest first.
    pub fn call_stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer]
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "REGISTERS")?;
        for reg in 0..self.registers.len() {
            write!(f, "V{:X} ", reg)?;
        }
        writeln!(f)?;
        for value in self.registers.iter() {
            write!(f, "{:02X} ", value)?;
        }
        writeln!(f)?;

        write!(f, "PC = {:#05X}  OPCODE = {:04X}", self.program_counter, self.opcode)?;
        match self.instruction {
            Some(instruction) => writeln!(f, " ({})", instruction)?,
            None => writeln!(f, " (invalid)")?,
        }
        writeln!(f, "I = {:#05X}", self.i)?;
        writeln!(f, "DELAY TIMER = {}", self.delay_timer)?;
        writeln!(f, "SOUND TIMER = {}", self.sound_timer)?;

        write!(f, "STACK [{}]", self.stack_pointer)?;
        for addr in self.call_stack() {
            write!(f, " {:03X}", addr)?;
        }
        writeln!(f)
    }
}
