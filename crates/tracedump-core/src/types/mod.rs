//! # Types
//!
//! Plain data types shared by the symbol resolver and the trace walker.
//!
//! Everything here is derived data: addresses are bare numbers, regions and
//! exports describe memory the process owns, and nothing is cached between
//! calls.

pub mod address;
pub mod memory;
pub mod symbols;

// Re-export all public types
pub use address::{Address, PAGE_SIZE};
pub use memory::MemoryRegion;
pub use symbols::{ExportEntry, ResolvedSymbol};
