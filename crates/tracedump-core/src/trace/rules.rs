//! Opcode patterns that drive annotation and termination.
//!
//! Both sets are small hand-picked byte patterns, not a general instruction
//! classifier. A call or jump encoded any other way (`CALL [reg]`,
//! `CALL ECX`, a `MOV`/`CALL` pair through another register, ...) is traced
//! but never annotated.

use tracing::debug;

use crate::memory::MemoryReader;
use crate::types::Address;

/// One control-transfer pattern and how to compute its destination.
pub struct AnnotationRule
{
    /// Short name, used in logs
    pub name: &'static str,
    /// Whether the code window starts with this pattern
    pub matches: fn(&[u8]) -> bool,
    /// Destination of the transfer, if it can be computed
    pub target: fn(Address, &[u8], &dyn MemoryReader) -> Option<Address>,
}

/// Annotation rules in evaluation order; the first matching rule decides.
pub const ANNOTATION_RULES: &[AnnotationRule] = &[
    AnnotationRule {
        name: "call-rel32",
        matches: is_call_rel32,
        target: call_rel32_target,
    },
    AnnotationRule {
        name: "jmp-indirect-abs",
        matches: is_jmp_indirect_abs,
        target: jmp_indirect_abs_target,
    },
    AnnotationRule {
        name: "mov-eax-call-eax",
        matches: is_mov_eax_call_eax,
        target: mov_eax_call_eax_target,
    },
];

// E8 rel32: CALL rel32
fn is_call_rel32(code: &[u8]) -> bool
{
    code.first() == Some(&0xe8)
}

fn call_rel32_target(address: Address, code: &[u8], _: &dyn MemoryReader) -> Option<Address>
{
    let displacement = le_u32(code, 1)?;
    Some(address + displacement + 5)
}

// FF 25 ptr32: JMP DWORD PTR [ptr32]
fn is_jmp_indirect_abs(code: &[u8]) -> bool
{
    code.starts_with(&[0xff, 0x25])
}

fn jmp_indirect_abs_target(address: Address, code: &[u8], memory: &dyn MemoryReader) -> Option<Address>
{
    let cell = Address::new(le_u32(code, 2)?);
    match memory.read_u32(cell) {
        Ok(destination) => Some(Address::new(destination)),
        Err(err) => {
            debug!(%address, %cell, error = %err, "jump table cell is not readable");
            None
        }
    }
}

// B8 imm32 / FF D0: MOV EAX, imm32; CALL EAX
fn is_mov_eax_call_eax(code: &[u8]) -> bool
{
    code.first() == Some(&0xb8) && code.get(5..7) == Some(&[0xff, 0xd0][..])
}

fn mov_eax_call_eax_target(_: Address, code: &[u8], _: &dyn MemoryReader) -> Option<Address>
{
    le_u32(code, 1).map(Address::new)
}

/// Destination to annotate for the instruction at the start of `code`.
///
/// Returns `None` when no rule matches, or when the first matching rule cannot
/// compute its destination.
pub fn annotation_target(address: Address, code: &[u8], memory: &dyn MemoryReader) -> Option<Address>
{
    let rule = ANNOTATION_RULES.iter().find(|rule| (rule.matches)(code))?;
    let target = (rule.target)(address, code, memory);
    if target.is_none() {
        debug!(%address, rule = rule.name, "annotation target unavailable");
    }
    target
}

/// Whether the walk ends after the instruction at the start of `code`.
///
/// `C2`/`C3` are returns. After `FF` the second byte is matched against `25`
/// (`JMP [ptr32]`) and the register forms `E0`/`E1` (`JMP EAX`, `JMP ECX`);
/// other indirect jump encodings do not stop the walk.
pub fn is_terminal(code: &[u8]) -> bool
{
    matches!(code, [0xc2 | 0xc3, ..] | [0xff, 0x25 | 0xe0 | 0xe1, ..])
}

fn le_u32(code: &[u8], at: usize) -> Option<u32>
{
    let bytes = code.get(at..at.checked_add(4)?)?;
    bytes.try_into().ok().map(u32::from_le_bytes)
}
