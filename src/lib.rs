// Assembling
mod assembler;
pub use assembler::{assemble, assemble_with_symbols, parse_lines};
mod parser;
pub use parser::AsmParser;
mod codegen;
mod error;
mod lexer;
mod line;
pub use line::{Instr, Label, Mnemonic, Operand, OperandKind, SourceLine};
mod span;
pub use span::Span;
mod symbol;
pub use symbol::{build_symbol_map, SymbolMap};

// Running
mod alu;
mod decode;
mod execute;
mod memory;
pub use memory::{Memory, MEMORY_SIZE};
mod operation;
pub use operation::{Condition, Operation, Pair, Reg, StackPair};
mod processor;
pub use processor::Processor;
mod registers;
pub use registers::{Flags, RegisterFile};
mod word;
pub use word::Word;

/// Lines of context rendered on each side of a diagnostic's focus line.
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 8;
