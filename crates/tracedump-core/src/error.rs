//! # Error Types
//!
//! General error handling for symbol resolution and instruction tracing.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::decoder::DecodeStatus;
use crate::types::Address;

/// Main error type for tracer operations
///
/// None of these ever leave the tracer as a panic. Resolution failures are
/// absorbed by the trace walker and turn into an annotation without a name;
/// a decode failure ends the current walk with a single report line.
///
/// ## Error Categories
///
/// 1. **Resolution errors**: NoOwningModule, NoMatchingExport, MalformedImage
/// 2. **Memory errors**: Unmapped
/// 3. **Decode errors**: DecodeFailure
/// 4. **Platform errors**: InvalidArgument, Io
#[derive(Error, Debug)]
pub enum TraceError
{
    /// No image header was found at or below the address
    ///
    /// This happens when:
    /// - The backward page scan reached an unmapped or unreadable page
    /// - The scan bound was exhausted before an `MZ` signature appeared
    /// - The scan would have wrapped below address zero
    #[error("No owning module for address {0}")]
    NoOwningModule(Address),

    /// The owning module has no export at exactly this address
    ///
    /// Common and expected: most call targets are not export entry points.
    #[error("No export matches address {0}")]
    NoMatchingExport(Address),

    /// The module's headers or export directory failed validation
    #[error("Malformed image at {base}: {reason}")]
    MalformedImage
    {
        /// Image base the headers were read from
        base: Address,
        /// What failed to validate
        reason: String,
    },

    /// A read touched memory outside the readable regions
    #[error("Unmapped memory: {len} bytes at {address}")]
    Unmapped
    {
        /// First byte of the failed read
        address: Address,
        /// Requested length
        len: usize,
    },

    /// The decoder did not produce exactly one instruction
    #[error("Failed to decode instruction at {address}: {status:?} ({count} instructions)")]
    DecodeFailure
    {
        /// Address of the failed instruction
        address: Address,
        /// Status reported by the decoder
        status: DecodeStatus,
        /// Number of instructions the decoder produced
        count: usize,
    },

    /// Invalid argument passed to a tracer or platform function
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error (reading `/proc/self/maps`, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TraceError
{
    /// Shorthand for a [`TraceError::MalformedImage`].
    pub(crate) fn malformed(base: Address, reason: impl Into<String>) -> Self
    {
        TraceError::MalformedImage {
            base,
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for `Result<T, TraceError>`
///
/// ```rust
/// use tracedump_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, TraceError>;
