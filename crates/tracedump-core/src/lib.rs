//! # tracedump-core
//!
//! Instruction-stream tracer with export-table symbolication for 32-bit x86
//! processes.
//!
//! Given an address inside the running process, the tracer decodes and
//! reports instructions one at a time until a return or an unconditional
//! indirect jump. Direct calls, jumps through a pointer cell, and the
//! `MOV EAX, imm32; CALL EAX` idiom are annotated with their destination and,
//! when the destination is exactly an exported function, its `module!export`
//! name read from the owning module's in-memory export directory.
//!
//! ## Building Blocks
//!
//! - [`symbols::SymbolResolver`]: address → image base → `module!export`
//! - [`trace::TraceWalker`]: the decode/annotate/report loop
//! - [`decoder::InstructionDecoder`]: the decoder seam, [`decoder::IcedDecoder`] by default
//! - [`memory::MemoryReader`] and [`symbols::ModuleHost`]: what the tracer needs from the process
//! - [`report::Report`]: where lines go, [`report::TracingReport`] by default
//!
//! ## Why unsafe code is needed
//!
//! The live backend reads the traced address space in place. Every read is
//! preceded by a region check, but the copy itself is a raw pointer read.

#![allow(unsafe_code)] // Required to read the traced address space in place

pub mod config;
pub mod decoder;
pub mod error;
pub mod memory;
pub mod platform;
pub mod prelude;
pub mod report;
pub mod symbols;
pub mod trace;
pub mod types;

pub use config::{ScanLimits, TraceConfig};
pub use decoder::{IcedDecoder, InstructionDecoder};
// Re-export commonly used types
pub use error::{Result, TraceError};
pub use report::{Report, TracingReport};
pub use symbols::SymbolResolver;
pub use trace::{TraceOutcome, TraceWalker, WalkState};
pub use types::Address;

/// Resolve `address` in the current process to `module!export`.
///
/// Returns `None` when the address is not exactly an export's entry point of
/// a loaded module.
#[cfg(target_os = "linux")]
pub fn symbol(address: Address) -> Option<String>
{
    let live = live_snapshot();
    SymbolResolver::new(&live, &live).symbol(address)
}

/// Trace the current process from `start`, reporting through `tracing`.
///
/// The header line carries `label`; every outcome, including a decode
/// failure, is only visible in the reported lines.
#[cfg(target_os = "linux")]
pub fn trace_dump(start: Address, label: &str)
{
    let live = live_snapshot();
    let resolver = SymbolResolver::new(&live, &live);
    TraceWalker::new(resolver, IcedDecoder::new(), TracingReport).run(start, label);
}

/// One snapshot per public call; an unreadable maps file leaves nothing readable.
#[cfg(target_os = "linux")]
fn live_snapshot() -> platform::linux::LiveProcess
{
    platform::linux::LiveProcess::new().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "cannot snapshot the address space");
        platform::linux::LiveProcess::default()
    })
}
