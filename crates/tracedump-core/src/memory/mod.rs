//! # Process Memory
//!
//! Read-only access to the traced address space.
//!
//! The tracer never dereferences an address it has not first asked about:
//! [`MemoryReader::region`] reports whether a byte is mapped and readable, and
//! every read goes through [`MemoryReader::read_exact`]. Implementations:
//!
//! - [`SparseMemory`]: byte-vector regions, for snapshots and tests
//! - `platform::linux::LiveProcess`: the current process, via `/proc/self/maps`

mod sparse;

pub use sparse::SparseMemory;

use crate::error::{Result, TraceError};
use crate::types::{Address, MemoryRegion};

/// Read access to a 32-bit address space
pub trait MemoryReader
{
    /// Region containing `address`, if it is mapped
    fn region(&self, address: Address) -> Option<MemoryRegion>;

    /// Fill `buf` with the bytes starting at `address`
    ///
    /// ## Errors
    ///
    /// - `Unmapped`: some byte of the range is not readable
    fn read_exact(&self, address: Address, buf: &mut [u8]) -> Result<()>;

    /// Whether `len` bytes starting at `address` can be read
    ///
    /// The default implementation only accepts ranges that lie inside a single
    /// readable region.
    fn is_readable(&self, address: Address, len: u32) -> bool
    {
        match self.region(address) {
            Some(region) if region.readable => region.remaining_from(address) >= len,
            _ => false,
        }
    }

    /// Number of readable bytes at `address`, capped at `max`
    fn readable_len(&self, address: Address, max: u32) -> u32
    {
        match self.region(address) {
            Some(region) if region.readable => region.remaining_from(address).min(max),
            _ => 0,
        }
    }

    /// Read `len` bytes into a fresh buffer
    fn read_bytes(&self, address: Address, len: usize) -> Result<Vec<u8>>
    {
        let mut buf = vec![0u8; len];
        self.read_exact(address, &mut buf)?;
        Ok(buf)
    }

    /// Read a little-endian `u16`
    fn read_u16(&self, address: Address) -> Result<u16>
    {
        let mut buf = [0u8; 2];
        self.read_exact(address, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Read a little-endian `u32`
    fn read_u32(&self, address: Address) -> Result<u32>
    {
        let mut buf = [0u8; 4];
        self.read_exact(address, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

impl<M: MemoryReader + ?Sized> MemoryReader for &M
{
    fn region(&self, address: Address) -> Option<MemoryRegion>
    {
        (**self).region(address)
    }

    fn read_exact(&self, address: Address, buf: &mut [u8]) -> Result<()>
    {
        (**self).read_exact(address, buf)
    }
}

/// Error for a read that could not be satisfied.
pub(crate) fn unmapped(address: Address, len: usize) -> TraceError
{
    TraceError::Unmapped { address, len }
}
