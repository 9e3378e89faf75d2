//! Common module for library exports

pub use crate::config::{ScanLimits, TraceConfig};
pub use crate::decoder::{DecodeMode, DecodeResult, DecodeStatus, DecodedInstruction, IcedDecoder, InstructionDecoder};
pub use crate::error::{Result, TraceError};
pub use crate::memory::{MemoryReader, SparseMemory};
#[cfg(target_os = "linux")]
pub use crate::platform::linux::LiveProcess;
pub use crate::report::{Report, TracingReport};
pub use crate::symbols::{ModuleHost, ModuleTable, PeImage, SymbolResolver};
pub use crate::trace::{Annotation, TraceLine, TraceOutcome, TraceWalker, WalkState};
pub use crate::types::{Address, ExportEntry, MemoryRegion, ResolvedSymbol};
