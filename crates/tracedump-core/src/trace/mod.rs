//! # Trace Walker
//!
//! Follows straight-line execution from a start address, one instruction at a
//! time, reporting a line per instruction until a return or an unconditional
//! indirect jump.
//!
//! ## State Machine
//!
//! - `Running` → `Running`: an instruction decoded and was not terminal
//! - `Running` → `StoppedByTerminalOpcode`: `RET`/`RET imm16` or one of the
//!   `FF`-prefixed jumps in [`rules::is_terminal`]
//! - `Running` → `StoppedByDecodeFailure`: the decoder did not produce exactly
//!   one instruction, or produced one with zero length
//!
//! Both stopped states are final. There is no instruction limit: a stream that
//! never reaches a terminal opcode is walked for as long as it decodes.

mod line;
pub mod rules;

pub use line::{Annotation, TraceLine};
use tracing::{debug, trace};

use crate::decoder::{DecodeMode, InstructionDecoder};
use crate::error::TraceError;
use crate::memory::MemoryReader;
use crate::report::Report;
use crate::symbols::{ModuleHost, SymbolResolver};
use crate::types::Address;

/// Where a walk is, or why it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState
{
    /// Still decoding
    Running,
    /// Stopped after reporting a return or indirect jump
    StoppedByTerminalOpcode,
    /// Stopped because an instruction could not be decoded
    StoppedByDecodeFailure,
}

/// Summary of a finished walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceOutcome
{
    /// Final state (never `Running`)
    pub state: WalkState,
    /// Number of instruction lines reported
    pub lines: usize,
    /// Address of the last instruction examined
    pub last_address: Address,
}

/// Per-walk state: the current address and how far we got.
struct TraceSession
{
    address: Address,
    state: WalkState,
    lines: usize,
}

/// Decodes and reports instructions, annotating recognised control transfers.
pub struct TraceWalker<M, H, D, R>
{
    resolver: SymbolResolver<M, H>,
    decoder: D,
    report: R,
}

impl<M, H, D, R> TraceWalker<M, H, D, R>
where
    M: MemoryReader,
    H: ModuleHost,
    D: InstructionDecoder,
    R: Report,
{
    /// Create a walker over the resolver's memory.
    pub fn new(resolver: SymbolResolver<M, H>, decoder: D, report: R) -> Self
    {
        Self {
            resolver,
            decoder,
            report,
        }
    }

    /// Resolver used for annotations.
    pub fn resolver(&self) -> &SymbolResolver<M, H>
    {
        &self.resolver
    }

    /// Give back the report sink.
    pub fn into_report(self) -> R
    {
        self.report
    }

    /// Walk from `start`, reporting a header line tagged with `label` and one
    /// line per instruction.
    pub fn run(&mut self, start: Address, label: &str) -> TraceOutcome
    {
        self.report.report(format_args!("[x] Disassembling {start}: {label}"));

        let mut session = TraceSession {
            address: start,
            state: WalkState::Running,
            lines: 0,
        };
        while session.state == WalkState::Running {
            self.step(&mut session);
        }

        debug!(%start, lines = session.lines, state = ?session.state, "trace finished");
        TraceOutcome {
            state: session.state,
            lines: session.lines,
            last_address: session.address,
        }
    }

    fn step(&mut self, session: &mut TraceSession)
    {
        let address = session.address;
        let code = self.fetch(address);

        let result = self.decoder.decode(address, &code, DecodeMode::Bits32);
        let status = result.status;
        let count = result.instructions.len();
        // A zero-length instruction would never advance the walk.
        let Some(instruction) = result.into_single().filter(|instruction| instruction.length > 0) else {
            let err = TraceError::DecodeFailure { address, status, count };
            debug!(error = %err, "stopping trace");
            self.report.report(format_args!("[-] Disassembly failed"));
            session.state = WalkState::StoppedByDecodeFailure;
            return;
        };

        let annotation = rules::annotation_target(address, &code, self.resolver.memory()).map(|target| {
            let symbol = match self.resolver.resolve(target) {
                Ok(symbol) => Some(symbol),
                Err(err) => {
                    trace!(%address, %target, error = %err, "annotation target has no symbol");
                    None
                }
            };
            Annotation { target, symbol }
        });

        let length = instruction.length;
        let line = TraceLine::new(address, instruction, annotation, self.resolver.config());
        self.report.report(format_args!("{line}"));
        session.lines += 1;

        if rules::is_terminal(&code) {
            session.state = WalkState::StoppedByTerminalOpcode;
        } else {
            session.address = address + length;
        }
    }

    /// Code window at `address`, cut short at the end of its readable region.
    fn fetch(&self, address: Address) -> Vec<u8>
    {
        let memory = self.resolver.memory();
        let len = memory.readable_len(address, self.resolver.config().max_instruction_len);
        if len == 0 {
            return Vec::new();
        }
        match memory.read_bytes(address, len as usize) {
            Ok(code) => code,
            Err(err) => {
                trace!(%address, error = %err, "code window unreadable");
                Vec::new()
            }
        }
    }
}
