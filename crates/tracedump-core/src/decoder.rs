//! # Instruction Decoding
//!
//! The trace walker treats the decoder as a black box: given a code window it
//! must produce exactly one instruction, with its length and three pieces of
//! text (mnemonic, operands, raw bytes as hex). [`IcedDecoder`] provides that
//! over `iced-x86`; hosts can plug in any other decoder through
//! [`InstructionDecoder`].

use std::fmt::Write as _;

use iced_x86::{Decoder, DecoderError, DecoderOptions, Formatter, IntelFormatter};
use smallvec::SmallVec;

use crate::types::Address;

/// Decoding mode (operand/address width of the code being traced)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode
{
    /// 32-bit protected mode code
    Bits32,
}

impl DecodeMode
{
    /// Bitness as understood by `iced-x86`.
    pub fn bitness(self) -> u32
    {
        match self {
            DecodeMode::Bits32 => 32,
        }
    }
}

/// Outcome classification reported by a decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus
{
    /// Every requested byte was consumed by whole instructions
    Success,
    /// The window ended inside an instruction
    BufferTooShort,
    /// The bytes do not encode a valid instruction
    Failure,
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction
{
    /// Encoded length in bytes
    pub length: u32,
    /// Mnemonic text, e.g. `MOV`
    pub mnemonic: String,
    /// Operand list, e.g. `EAX, 0x7c81e079`
    pub operands: String,
    /// Raw bytes as lower-case hex, e.g. `b879e0817c`
    pub hex: String,
}

/// Status plus whatever instructions the decoder produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult
{
    /// Decoder status
    pub status: DecodeStatus,
    /// Decoded instructions (the walker accepts exactly one)
    pub instructions: SmallVec<[DecodedInstruction; 1]>,
}

impl DecodeResult
{
    /// A result carrying no instruction.
    pub fn failed(status: DecodeStatus) -> Self
    {
        Self {
            status,
            instructions: SmallVec::new(),
        }
    }

    /// A successful single-instruction result.
    pub fn single(instruction: DecodedInstruction) -> Self
    {
        let mut instructions = SmallVec::new();
        instructions.push(instruction);
        Self {
            status: DecodeStatus::Success,
            instructions,
        }
    }

    /// The instruction, when the status is acceptable and exactly one was produced.
    ///
    /// Running past the end of the window is tolerated: only one instruction is
    /// ever needed.
    pub fn into_single(self) -> Option<DecodedInstruction>
    {
        let acceptable = matches!(self.status, DecodeStatus::Success | DecodeStatus::BufferTooShort);
        if !acceptable || self.instructions.len() != 1 {
            return None;
        }
        self.instructions.into_iter().next()
    }
}

/// Decodes a single instruction from a code window.
pub trait InstructionDecoder
{
    /// Decode the first instruction of `code`, which was read from `address`.
    fn decode(&self, address: Address, code: &[u8], mode: DecodeMode) -> DecodeResult;
}

impl<D: InstructionDecoder + ?Sized> InstructionDecoder for &D
{
    fn decode(&self, address: Address, code: &[u8], mode: DecodeMode) -> DecodeResult
    {
        (**self).decode(address, code, mode)
    }
}

/// `iced-x86` decoder with Intel syntax output.
///
/// Mnemonics and registers are upper-case, numbers are `0x`-prefixed lower-case
/// hex, and operands are separated by `", "`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IcedDecoder;

impl IcedDecoder
{
    /// Create a decoder.
    pub fn new() -> Self
    {
        IcedDecoder
    }

    fn formatter() -> IntelFormatter
    {
        let mut formatter = IntelFormatter::new();
        let options = formatter.options_mut();
        options.set_uppercase_mnemonics(true);
        options.set_uppercase_registers(true);
        options.set_uppercase_hex(false);
        options.set_hex_prefix("0x");
        options.set_hex_suffix("");
        options.set_space_after_operand_separator(true);
        formatter
    }
}

impl InstructionDecoder for IcedDecoder
{
    fn decode(&self, address: Address, code: &[u8], mode: DecodeMode) -> DecodeResult
    {
        if code.is_empty() {
            return DecodeResult::failed(DecodeStatus::BufferTooShort);
        }

        let mut decoder = Decoder::with_ip(
            mode.bitness(),
            code,
            u64::from(address.value()),
            DecoderOptions::NONE,
        );
        let instruction = decoder.decode();
        match decoder.last_error() {
            DecoderError::None => {}
            DecoderError::NoMoreBytes => return DecodeResult::failed(DecodeStatus::BufferTooShort),
            _ => return DecodeResult::failed(DecodeStatus::Failure),
        }

        let length = instruction.len();
        let mut formatter = Self::formatter();
        let mut mnemonic = String::new();
        formatter.format_mnemonic(&instruction, &mut mnemonic);
        let mut operands = String::new();
        formatter.format_all_operands(&instruction, &mut operands);

        let mut hex = String::with_capacity(length * 2);
        for byte in &code[..length] {
            let _ = write!(hex, "{byte:02x}");
        }

        DecodeResult::single(DecodedInstruction {
            // x86 instructions are at most 15 bytes.
            length: length as u32,
            mnemonic,
            operands,
            hex,
        })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn decode(code: &[u8]) -> DecodeResult
    {
        IcedDecoder::new().decode(Address::new(0x40_1000), code, DecodeMode::Bits32)
    }

    #[test]
    fn test_decode_mov_eax_imm32()
    {
        let instruction = decode(&[0xb8, 0x79, 0xe0, 0x81, 0x7c, 0xff, 0xd0]).into_single().unwrap();
        assert_eq!(instruction.length, 5);
        assert_eq!(instruction.mnemonic, "MOV");
        assert!(instruction.operands.starts_with("EAX, "));
        assert!(instruction.operands.contains("7c81e079"));
        assert_eq!(instruction.hex, "b879e0817c");
    }

    #[test]
    fn test_decode_ret()
    {
        let instruction = decode(&[0xc3, 0x90, 0x90]).into_single().unwrap();
        assert_eq!(instruction.length, 1);
        assert_eq!(instruction.mnemonic, "RET");
        assert_eq!(instruction.operands, "");
        assert_eq!(instruction.hex, "c3");
    }

    #[test]
    fn test_truncated_instruction()
    {
        let result = decode(&[0xe8, 0x00, 0x00]);
        assert_eq!(result.status, DecodeStatus::BufferTooShort);
        assert!(result.into_single().is_none());
    }

    #[test]
    fn test_empty_window()
    {
        assert_eq!(decode(&[]).status, DecodeStatus::BufferTooShort);
    }

    #[test]
    fn test_into_single_rejects_failure_status()
    {
        let mut result = decode(&[0x90]);
        result.status = DecodeStatus::Failure;
        assert!(result.into_single().is_none());
    }

    #[test]
    fn test_into_single_tolerates_buffer_too_short()
    {
        let mut result = decode(&[0x90]);
        result.status = DecodeStatus::BufferTooShort;
        assert_eq!(result.into_single().unwrap().mnemonic, "NOP");
    }
}
