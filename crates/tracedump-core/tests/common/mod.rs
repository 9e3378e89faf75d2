//! Shared fixtures: synthetic PE32 images in a [`SparseMemory`] and a scripted decoder.

#![allow(dead_code)]

use std::collections::HashMap;

use tracedump_core::decoder::{DecodeMode, DecodeResult, DecodeStatus, DecodedInstruction, InstructionDecoder};
use tracedump_core::memory::SparseMemory;
use tracedump_core::symbols::ModuleTable;
use tracedump_core::types::Address;

/// Base of the default fixture module.
pub const KERNEL32_BASE: Address = Address::new(0x7c80_0000);
/// Path the host reports for the default fixture module.
pub const KERNEL32_PATH: &str = r"C:\WINDOWS\system32\kernel32.dll";

pub const EXIT_PROCESS_RVA: u32 = 0x1100;
pub const GET_TICK_COUNT_RVA: u32 = 0x1200;
/// First byte of code the tests may overwrite.
pub const CODE_RVA: u32 = 0x2000;

const NT_OFFSET: u32 = 0x80;
const OPTIONAL_HEADER: u32 = NT_OFFSET + 24;
const EXPORT_DIRECTORY_RVA: u32 = 0x200;

/// Builds a minimal PE32 image: DOS header, NT headers, one export directory.
///
/// Function, name, and ordinal tables and the name strings are all placed
/// inside the export directory's declared range.
pub struct ImageBuilder
{
    size_of_image: u32,
    exports: Vec<(String, u32)>,
    code: Vec<(u32, Vec<u8>)>,
}

impl ImageBuilder
{
    pub fn new(size_of_image: u32) -> Self
    {
        Self {
            size_of_image,
            exports: Vec::new(),
            code: Vec::new(),
        }
    }

    /// Add a named export at `rva`, after the ones already added.
    pub fn export(mut self, name: &str, rva: u32) -> Self
    {
        self.exports.push((name.to_string(), rva));
        self
    }

    /// Place raw bytes at `rva`.
    pub fn code(mut self, rva: u32, bytes: &[u8]) -> Self
    {
        self.code.push((rva, bytes.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8>
    {
        let mut image = vec![0u8; self.size_of_image as usize];

        // DOS header
        image[0..2].copy_from_slice(b"MZ");
        put_u32(&mut image, 0x3c, NT_OFFSET);

        // PE signature and file header
        image[NT_OFFSET as usize..NT_OFFSET as usize + 4].copy_from_slice(b"PE\0\0");
        put_u16(&mut image, NT_OFFSET + 4, 0x014c);
        put_u16(&mut image, NT_OFFSET + 20, 0x00e0);
        put_u16(&mut image, NT_OFFSET + 22, 0x2102);

        // Optional header
        put_u16(&mut image, OPTIONAL_HEADER, 0x010b);
        put_u32(&mut image, OPTIONAL_HEADER + 28, 0x0040_0000);
        put_u32(&mut image, OPTIONAL_HEADER + 32, 0x1000);
        put_u32(&mut image, OPTIONAL_HEADER + 36, 0x200);
        put_u32(&mut image, OPTIONAL_HEADER + 56, self.size_of_image);
        put_u32(&mut image, OPTIONAL_HEADER + 60, 0x400);
        put_u32(&mut image, OPTIONAL_HEADER + 92, 16);

        if !self.exports.is_empty() {
            let directory_size = self.write_exports(&mut image);
            put_u32(&mut image, OPTIONAL_HEADER + 96, EXPORT_DIRECTORY_RVA);
            put_u32(&mut image, OPTIONAL_HEADER + 100, directory_size);
        }

        for (rva, bytes) in &self.code {
            let start = *rva as usize;
            image[start..start + bytes.len()].copy_from_slice(bytes);
        }
        image
    }

    fn write_exports(&self, image: &mut [u8]) -> u32
    {
        let count = self.exports.len() as u32;
        let functions = EXPORT_DIRECTORY_RVA + 40;
        let names = functions + 4 * count;
        let ordinals = names + 4 * count;
        let mut strings = ordinals + 2 * count;

        put_u32(image, EXPORT_DIRECTORY_RVA + 16, 1);
        put_u32(image, EXPORT_DIRECTORY_RVA + 20, count);
        put_u32(image, EXPORT_DIRECTORY_RVA + 24, count);
        put_u32(image, EXPORT_DIRECTORY_RVA + 28, functions);
        put_u32(image, EXPORT_DIRECTORY_RVA + 32, names);
        put_u32(image, EXPORT_DIRECTORY_RVA + 36, ordinals);

        for (index, (name, rva)) in self.exports.iter().enumerate() {
            let index = index as u32;
            put_u32(image, functions + 4 * index, *rva);
            put_u32(image, names + 4 * index, strings);
            put_u16(image, ordinals + 2 * index, index as u16);

            let start = strings as usize;
            image[start..start + name.len()].copy_from_slice(name.as_bytes());
            strings += name.len() as u32 + 1;
        }

        strings - EXPORT_DIRECTORY_RVA
    }
}

pub fn put_u16(image: &mut [u8], at: u32, value: u16)
{
    let at = at as usize;
    image[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn put_u32(image: &mut [u8], at: u32, value: u32)
{
    let at = at as usize;
    image[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// `kernel32.dll` with `ExitProcess` and `GetTickCount`, and room for code at [`CODE_RVA`].
pub fn kernel32() -> ImageBuilder
{
    ImageBuilder::new(0x3000)
        .export("ExitProcess", EXIT_PROCESS_RVA)
        .export("GetTickCount", GET_TICK_COUNT_RVA)
        .code(EXIT_PROCESS_RVA, &[0x8b, 0xff, 0xc3])
        .code(GET_TICK_COUNT_RVA, &[0x8b, 0xff, 0xc3])
}

/// A process with `image` mapped at `base` and registered under `path`.
pub fn process_with(base: Address, image: &ImageBuilder, path: &str) -> (SparseMemory, ModuleTable)
{
    let mut memory = SparseMemory::new();
    memory
        .map_file(base, image.build(), path)
        .expect("fixture image should map");
    let mut modules = ModuleTable::new();
    modules.insert(base, path);
    (memory, modules)
}

/// The default process: [`kernel32`] at [`KERNEL32_BASE`].
pub fn process() -> (SparseMemory, ModuleTable)
{
    process_with(KERNEL32_BASE, &kernel32(), KERNEL32_PATH)
}

/// Decoder that answers from a script keyed by address.
///
/// Unscripted addresses fail to decode.
#[derive(Default)]
pub struct ScriptedDecoder
{
    script: HashMap<Address, DecodeResult>,
}

impl ScriptedDecoder
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Decode `length` bytes at `address` as `mnemonic operands`.
    pub fn instruction(mut self, address: Address, hex: &str, mnemonic: &str, operands: &str) -> Self
    {
        let instruction = DecodedInstruction {
            length: (hex.len() / 2) as u32,
            mnemonic: mnemonic.to_string(),
            operands: operands.to_string(),
            hex: hex.to_string(),
        };
        self.script.insert(address, DecodeResult::single(instruction));
        self
    }

    /// Answer `address` with an arbitrary result.
    pub fn result(mut self, address: Address, result: DecodeResult) -> Self
    {
        self.script.insert(address, result);
        self
    }
}

impl InstructionDecoder for ScriptedDecoder
{
    fn decode(&self, address: Address, _code: &[u8], mode: DecodeMode) -> DecodeResult
    {
        assert_eq!(mode, DecodeMode::Bits32);
        self.script
            .get(&address)
            .cloned()
            .unwrap_or_else(|| DecodeResult::failed(DecodeStatus::Failure))
    }
}
