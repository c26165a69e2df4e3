use std::fmt;

use crate::operation::Condition;
use crate::span::Span;

/// One parsed source line: optional label, optional instruction, optional
/// comment. Both assembler passes walk this shape; neither re-reads the
/// source text.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceLine {
    pub label: Option<Label>,
    pub instr: Option<Instr>,
    pub comment: Option<Span>,
}

/// A label binding, already upper-cased.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Label {
    pub name: String,
    pub span: Span,
}

/// A mnemonic with its operand list. The span covers the mnemonic only.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instr {
    pub mnemonic: Mnemonic,
    pub operands: Vec<Operand>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Operand {
    pub kind: OperandKind,
    pub span: Span,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum OperandKind {
    /// Numeric literal, already radix-decoded.
    Number(u32),
    /// Register name or label reference, already upper-cased. Resolved
    /// against the symbol map in pass 2.
    Name(String),
}

/// The closed set of assembler mnemonics. Conditional jumps, calls and
/// returns fold their condition into the variant so the encoder and the
/// decoder share one [`Condition`] vocabulary.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mnemonic {
    Mov,
    Mvi,
    Lxi,
    Lda,
    Sta,
    Lhld,
    Shld,
    Ldax,
    Stax,
    Xchg,
    Xthl,
    Sphl,
    Push,
    Pop,
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
    Adi,
    Aci,
    Sui,
    Sbi,
    Ani,
    Xri,
    Ori,
    Cpi,
    Inr,
    Dcr,
    Inx,
    Dcx,
    Dad,
    Daa,
    Rlc,
    Rrc,
    Ral,
    Rar,
    Cma,
    Cmc,
    Stc,
    Jmp,
    JmpIf(Condition),
    Pchl,
    Call,
    CallIf(Condition),
    Ret,
    RetIf(Condition),
    Nop,
    Hlt,
}

impl Mnemonic {
    /// Look up an upper-cased name. Returns `None` for anything outside the
    /// instruction set.
    pub fn parse(name: &str) -> Option<Mnemonic> {
        use Condition::*;
        use Mnemonic::*;
        let mnemonic = match name {
            "MOV" => Mov,
            "MVI" => Mvi,
            "LXI" => Lxi,
            "LDA" => Lda,
            "STA" => Sta,
            "LHLD" => Lhld,
            "SHLD" => Shld,
            "LDAX" => Ldax,
            "STAX" => Stax,
            "XCHG" => Xchg,
            "XTHL" => Xthl,
            "SPHL" => Sphl,
            "PUSH" => Push,
            "POP" => Pop,
            "ADD" => Add,
            "ADC" => Adc,
            "SUB" => Sub,
            "SBB" => Sbb,
            "ANA" => Ana,
            "XRA" => Xra,
            "ORA" => Ora,
            "CMP" => Cmp,
            "ADI" => Adi,
            "ACI" => Aci,
            "SUI" => Sui,
            "SBI" => Sbi,
            "ANI" => Ani,
            "XRI" => Xri,
            "ORI" => Ori,
            "CPI" => Cpi,
            "INR" => Inr,
            "DCR" => Dcr,
            "INX" => Inx,
            "DCX" => Dcx,
            "DAD" => Dad,
            "DAA" => Daa,
            "RLC" => Rlc,
            "RRC" => Rrc,
            "RAL" => Ral,
            "RAR" => Rar,
            "CMA" => Cma,
            "CMC" => Cmc,
            "STC" => Stc,
            "JMP" => Jmp,
            "JNZ" => JmpIf(Nz),
            "JZ" => JmpIf(Z),
            "JNC" => JmpIf(Nc),
            "JC" => JmpIf(C),
            "JPO" => JmpIf(Po),
            "JPE" => JmpIf(Pe),
            "JP" => JmpIf(P),
            "JM" => JmpIf(M),
            "PCHL" => Pchl,
            "CALL" => Call,
            "CNZ" => CallIf(Nz),
            "CZ" => CallIf(Z),
            "CNC" => CallIf(Nc),
            "CC" => CallIf(C),
            "CPO" => CallIf(Po),
            "CPE" => CallIf(Pe),
            "CP" => CallIf(P),
            "CM" => CallIf(M),
            "RET" => Ret,
            "RNZ" => RetIf(Nz),
            "RZ" => RetIf(Z),
            "RNC" => RetIf(Nc),
            "RC" => RetIf(C),
            "RPO" => RetIf(Po),
            "RPE" => RetIf(Pe),
            "RP" => RetIf(P),
            "RM" => RetIf(M),
            "NOP" => Nop,
            "HLT" => Hlt,
            _ => return None,
        };
        Some(mnemonic)
    }

    /// Encoded length in bytes; pass 1 advances the address counter by this.
    pub fn encoded_len(self) -> u16 {
        use Mnemonic::*;
        match self {
            Lxi | Lda | Sta | Lhld | Shld | Jmp | JmpIf(_) | Call | CallIf(_) => 3,
            Mvi | Adi | Aci | Sui | Sbi | Ani | Xri | Ori | Cpi => 2,
            _ => 1,
        }
    }

    /// Number of operands the encoder expects.
    pub fn arity(self) -> usize {
        use Mnemonic::*;
        match self {
            Mov | Mvi | Lxi => 2,
            Lda | Sta | Lhld | Shld | Ldax | Stax | Push | Pop | Add | Adc | Sub | Sbb | Ana
            | Xra | Ora | Cmp | Adi | Aci | Sui | Sbi | Ani | Xri | Ori | Cpi | Inr | Dcr | Inx
            | Dcx | Dad | Jmp | JmpIf(_) | Call | CallIf(_) => 1,
            Xchg | Xthl | Sphl | Daa | Rlc | Rrc | Ral | Rar | Cma | Cmc | Stc | Pchl | Ret
            | RetIf(_) | Nop | Hlt => 0,
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Mnemonic::*;
        let name = match self {
            Mov => "MOV",
            Mvi => "MVI",
            Lxi => "LXI",
            Lda => "LDA",
            Sta => "STA",
            Lhld => "LHLD",
            Shld => "SHLD",
            Ldax => "LDAX",
            Stax => "STAX",
            Xchg => "XCHG",
            Xthl => "XTHL",
            Sphl => "SPHL",
            Push => "PUSH",
            Pop => "POP",
            Add => "ADD",
            Adc => "ADC",
            Sub => "SUB",
            Sbb => "SBB",
            Ana => "ANA",
            Xra => "XRA",
            Ora => "ORA",
            Cmp => "CMP",
            Adi => "ADI",
            Aci => "ACI",
            Sui => "SUI",
            Sbi => "SBI",
            Ani => "ANI",
            Xri => "XRI",
            Ori => "ORI",
            Cpi => "CPI",
            Inr => "INR",
            Dcr => "DCR",
            Inx => "INX",
            Dcx => "DCX",
            Dad => "DAD",
            Daa => "DAA",
            Rlc => "RLC",
            Rrc => "RRC",
            Ral => "RAL",
            Rar => "RAR",
            Cma => "CMA",
            Cmc => "CMC",
            Stc => "STC",
            Jmp => "JMP",
            JmpIf(cond) => return write!(f, "J{}", condition_suffix(*cond)),
            Pchl => "PCHL",
            Call => "CALL",
            CallIf(cond) => return write!(f, "C{}", condition_suffix(*cond)),
            Ret => "RET",
            RetIf(cond) => return write!(f, "R{}", condition_suffix(*cond)),
            Nop => "NOP",
            Hlt => "HLT",
        };
        f.write_str(name)
    }
}

fn condition_suffix(cond: Condition) -> &'static str {
    match cond {
        Condition::Nz => "NZ",
        Condition::Z => "Z",
        Condition::Nc => "NC",
        Condition::C => "C",
        Condition::Po => "PO",
        Condition::Pe => "PE",
        Condition::P => "P",
        Condition::M => "M",
    }
}
