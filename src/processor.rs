use log::{trace, warn};

use crate::decode;
use crate::execute;
use crate::memory::Memory;
use crate::operation::Operation;
use crate::registers::RegisterFile;

/// Drives the fetch-decode-execute loop over one machine.
///
/// The processor owns the register file and memory; the host loads an image
/// into [`Memory`] first and then steps or runs to completion. Once `HLT`
/// latches the halt state, further steps are no-ops.
pub struct Processor {
    regs: RegisterFile,
    mem: Memory,
    steps: u64,
    unsupported: u64,
    last_unsupported: Option<u8>,
}

impl Processor {
    /// Wrap a pre-populated memory image. Execution starts at address 0.
    pub fn new(mem: Memory) -> Self {
        Processor {
            regs: RegisterFile::new(),
            mem,
            steps: 0,
            unsupported: 0,
            last_unsupported: None,
        }
    }

    pub fn halted(&self) -> bool {
        self.regs.halted
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Unsupported opcodes encountered so far.
    pub fn unsupported(&self) -> u64 {
        self.unsupported
    }

    /// The most recent unsupported opcode, if any were hit.
    pub fn last_unsupported(&self) -> Option<u8> {
        self.last_unsupported
    }

    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    pub fn mem(&self) -> &Memory {
        &self.mem
    }

    pub fn mem_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    /// Fetch, decode and execute a single instruction.
    pub fn step(&mut self) {
        if self.regs.halted {
            return;
        }
        let at = self.regs.pc;
        let op = decode::next_operation(&mut self.regs, &self.mem);
        if let Operation::Unsupported(opcode) = op {
            self.unsupported += 1;
            self.last_unsupported = Some(opcode);
            warn!("unsupported opcode {opcode:02X} at {at}, treated as NOP");
        }
        trace!("{at}  {op:?}");
        execute::apply(op, &mut self.regs, &mut self.mem);
        self.steps += 1;
    }

    /// Run until the program halts.
    pub fn run(&mut self) {
        while !self.regs.halted {
            self.step();
        }
    }

    /// Run at most `limit` further instructions. Returns whether the machine
    /// has halted, so callers can tell a finished program from a runaway one.
    pub fn run_bounded(&mut self, limit: u64) -> bool {
        for _ in 0..limit {
            if self.regs.halted {
                break;
            }
            self.step();
        }
        self.regs.halted
    }
}
