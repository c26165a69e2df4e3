//! Instruction execution.
//!
//! [`apply`] is total over [`Operation`]: no variant panics or reports an
//! error. Each arm writes back exactly the flags its instruction family
//! defines and leaves the rest untouched.

use crate::alu::{self, AluResult};
use crate::memory::Memory;
use crate::operation::{Operation, Pair, Reg};
use crate::registers::{Flags, RegisterFile};
use crate::word::Word;

/// Apply one decoded operation to the machine state.
pub fn apply(op: Operation, regs: &mut RegisterFile, mem: &mut Memory) {
    match op {
        Operation::Mov { dst, src } => {
            let value = regs.get(src, mem);
            regs.set(dst, value, mem);
        }
        Operation::Mvi { dst, value } => regs.set(dst, value, mem),
        Operation::Lxi { pair, value } => regs.set_pair(pair, value),
        Operation::Lda(addr) => regs.a = mem.read(addr),
        Operation::Sta(addr) => mem.write(addr, regs.a),
        Operation::Lhld(addr) => {
            let value = mem.read_word(addr);
            regs.set_pair(Pair::Hl, value);
        }
        Operation::Shld(addr) => mem.write_word(addr, regs.pair(Pair::Hl)),
        Operation::Ldax(pair) => regs.a = mem.read(regs.pair(pair)),
        Operation::Stax(pair) => mem.write(regs.pair(pair), regs.a),
        Operation::Xchg => {
            std::mem::swap(&mut regs.h, &mut regs.d);
            std::mem::swap(&mut regs.l, &mut regs.e);
        }
        Operation::Xthl => {
            let stacked = mem.read_word(regs.sp);
            mem.write_word(regs.sp, regs.pair(Pair::Hl));
            regs.set_pair(Pair::Hl, stacked);
        }
        Operation::Sphl => regs.sp = regs.pair(Pair::Hl),
        Operation::Push(pair) => {
            let value = regs.stack_pair(pair);
            push(regs, mem, value);
        }
        Operation::Pop(pair) => {
            let value = pop(regs, mem);
            regs.set_stack_pair(pair, value);
        }

        Operation::Add(reg) => {
            let result = alu::add(regs.a, regs.get(reg, mem));
            write_acc(regs, result);
        }
        Operation::Adc(reg) => {
            let result = alu::adc(regs.a, regs.get(reg, mem), regs.flags.carry);
            write_acc(regs, result);
        }
        Operation::Sub(reg) => {
            let result = alu::sub(regs.a, regs.get(reg, mem));
            write_acc(regs, result);
        }
        Operation::Sbb(reg) => {
            let result = alu::sbb(regs.a, regs.get(reg, mem), regs.flags.carry);
            write_acc(regs, result);
        }
        Operation::Ana(reg) => {
            let result = alu::and(regs.a, regs.get(reg, mem));
            write_acc(regs, result);
        }
        Operation::Xra(reg) => {
            let result = alu::xor(regs.a, regs.get(reg, mem));
            write_acc(regs, result);
        }
        Operation::Ora(reg) => {
            let result = alu::or(regs.a, regs.get(reg, mem));
            write_acc(regs, result);
        }
        // Compare discards the difference and keeps only the flags.
        Operation::Cmp(reg) => regs.flags = alu::cmp(regs.a, regs.get(reg, mem)).flags,
        Operation::Adi(value) => write_acc(regs, alu::add(regs.a, value)),
        Operation::Aci(value) => {
            let result = alu::adc(regs.a, value, regs.flags.carry);
            write_acc(regs, result);
        }
        Operation::Sui(value) => write_acc(regs, alu::sub(regs.a, value)),
        Operation::Sbi(value) => {
            let result = alu::sbb(regs.a, value, regs.flags.carry);
            write_acc(regs, result);
        }
        Operation::Ani(value) => write_acc(regs, alu::and(regs.a, value)),
        Operation::Xri(value) => write_acc(regs, alu::xor(regs.a, value)),
        Operation::Ori(value) => write_acc(regs, alu::or(regs.a, value)),
        Operation::Cpi(value) => regs.flags = alu::cmp(regs.a, value).flags,
        Operation::Daa => {
            let result = alu::decimal_adjust(regs.a, regs.flags.carry, regs.flags.aux);
            write_acc(regs, result);
        }

        // INR and DCR never touch the carry.
        Operation::Inr(reg) => {
            let result = alu::increment(regs.get(reg, mem));
            regs.set(reg, result.value, mem);
            write_szp_aux(&mut regs.flags, result.flags);
        }
        Operation::Dcr(reg) => {
            let result = alu::decrement(regs.get(reg, mem));
            regs.set(reg, result.value, mem);
            write_szp_aux(&mut regs.flags, result.flags);
        }
        // INX and DCX touch no flags at all.
        Operation::Inx(pair) => {
            let (value, _) = regs.pair(pair).increment();
            regs.set_pair(pair, value);
        }
        Operation::Dcx(pair) => {
            let (value, _) = regs.pair(pair).decrement();
            regs.set_pair(pair, value);
        }
        Operation::Dad(pair) => {
            let (sum, carry) = regs.pair(Pair::Hl).add(regs.pair(pair));
            regs.set_pair(Pair::Hl, sum);
            regs.flags.carry = carry;
        }

        Operation::Rlc => {
            let result = alu::rotate_left(regs.a);
            write_rotated(regs, result);
        }
        Operation::Rrc => {
            let result = alu::rotate_right(regs.a);
            write_rotated(regs, result);
        }
        Operation::Ral => {
            let result = alu::rotate_left_carry(regs.a, regs.flags.carry);
            write_rotated(regs, result);
        }
        Operation::Rar => {
            let result = alu::rotate_right_carry(regs.a, regs.flags.carry);
            write_rotated(regs, result);
        }
        // CMA refreshes zero, sign and parity but keeps carry and aux.
        Operation::Cma => {
            let result = alu::complement(regs.a);
            regs.a = result.value;
            write_szp(&mut regs.flags, result.flags);
        }
        Operation::Cmc => regs.flags.carry = !regs.flags.carry,
        Operation::Stc => regs.flags.carry = true,

        Operation::Jmp(addr) => regs.pc = addr,
        Operation::JmpIf(cond, addr) => {
            if cond.holds(&regs.flags) {
                regs.pc = addr;
            }
        }
        Operation::Pchl => regs.pc = regs.pair(Pair::Hl),
        Operation::Call(addr) => {
            let ret = regs.pc;
            push(regs, mem, ret);
            regs.pc = addr;
        }
        Operation::CallIf(cond, addr) => {
            if cond.holds(&regs.flags) {
                let ret = regs.pc;
                push(regs, mem, ret);
                regs.pc = addr;
            }
        }
        Operation::Ret => regs.pc = pop(regs, mem),
        Operation::RetIf(cond) => {
            if cond.holds(&regs.flags) {
                regs.pc = pop(regs, mem);
            }
        }

        Operation::Hlt => regs.halted = true,
        Operation::Nop | Operation::Unsupported(_) => {}
    }
}

/// Stack push: the high byte lands at SP-1, the low byte at SP-2, and SP
/// ends up two lower.
fn push(regs: &mut RegisterFile, mem: &mut Memory, value: Word) {
    let (sp, _) = regs.sp.decrement();
    let (sp, _) = sp.decrement();
    regs.sp = sp;
    mem.write_word(sp, value);
}

fn pop(regs: &mut RegisterFile, mem: &Memory) -> Word {
    let value = mem.read_word(regs.sp);
    regs.sp = regs.sp.offset(2);
    value
}

fn write_acc(regs: &mut RegisterFile, result: AluResult) {
    regs.a = result.value;
    regs.flags = result.flags;
}

fn write_rotated(regs: &mut RegisterFile, result: AluResult) {
    regs.a = result.value;
    regs.flags.carry = result.flags.carry;
}

fn write_szp(flags: &mut Flags, from: Flags) {
    flags.zero = from.zero;
    flags.sign = from.sign;
    flags.parity = from.parity;
}

fn write_szp_aux(flags: &mut Flags, from: Flags) {
    write_szp(flags, from);
    flags.aux = from.aux;
}
