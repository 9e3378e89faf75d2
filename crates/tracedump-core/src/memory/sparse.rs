//! Snapshot memory made of byte-vector regions.

use std::collections::BTreeMap;

use super::{unmapped, MemoryReader};
use crate::error::{Result, TraceError};
use crate::types::{Address, MemoryRegion};

#[derive(Debug, Clone)]
struct Mapping
{
    bytes: Vec<u8>,
    readable: bool,
    path: Option<String>,
}

/// An address space made of non-overlapping byte regions
///
/// Used to replay a copied set of pages or to build synthetic modules.
///
/// ```rust
/// use tracedump_core::memory::{MemoryReader, SparseMemory};
/// use tracedump_core::types::Address;
///
/// let mut memory = SparseMemory::new();
/// memory.map(Address::new(0x1000), vec![0xc3; 0x10])?;
/// assert_eq!(memory.read_bytes(Address::new(0x1004), 2)?, vec![0xc3, 0xc3]);
/// assert!(!memory.is_readable(Address::new(0x100f), 2));
/// # Ok::<(), tracedump_core::error::TraceError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SparseMemory
{
    mappings: BTreeMap<u32, Mapping>,
}

impl SparseMemory
{
    /// Create an empty address space.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Map readable bytes at `start`.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: the range is empty, wraps past 4 GiB, or overlaps an existing mapping
    pub fn map(&mut self, start: Address, bytes: Vec<u8>) -> Result<()>
    {
        self.insert(start, bytes, true, None)
    }

    /// Map readable bytes at `start` that are backed by the file at `path`.
    pub fn map_file(&mut self, start: Address, bytes: Vec<u8>, path: impl Into<String>) -> Result<()>
    {
        self.insert(start, bytes, true, Some(path.into()))
    }

    /// Reserve `len` bytes at `start` that are mapped but cannot be read (a guard page).
    pub fn map_guard(&mut self, start: Address, len: u32) -> Result<()>
    {
        self.insert(start, vec![0; len as usize], false, None)
    }

    /// Mutable view of mapped bytes, for patching a snapshot in place.
    pub fn bytes_mut(&mut self, address: Address, len: usize) -> Option<&mut [u8]>
    {
        let (&start, mapping) = self.mappings.range_mut(..=address.value()).next_back()?;
        let offset = (address.value() - start) as usize;
        mapping.bytes.get_mut(offset..offset.checked_add(len)?)
    }

    fn insert(&mut self, start: Address, bytes: Vec<u8>, readable: bool, path: Option<String>) -> Result<()>
    {
        let len = u32::try_from(bytes.len())
            .ok()
            .filter(|len| *len > 0)
            .ok_or_else(|| TraceError::InvalidArgument(format!("bad mapping length at {start}")))?;
        let end = start
            .checked_add(len)
            .ok_or_else(|| TraceError::InvalidArgument(format!("mapping at {start} wraps the address space")))?;

        let overlaps_prev = self
            .mappings
            .range(..end.value())
            .next_back()
            .is_some_and(|(&prev, mapping)| prev as u64 + mapping.bytes.len() as u64 > start.value() as u64);
        if overlaps_prev {
            return Err(TraceError::InvalidArgument(format!("mapping at {start} overlaps an existing region")));
        }

        self.mappings.insert(start.value(), Mapping { bytes, readable, path });
        Ok(())
    }

    fn mapping_at(&self, address: Address) -> Option<(u32, &Mapping)>
    {
        let (&start, mapping) = self.mappings.range(..=address.value()).next_back()?;
        let offset = (address.value() - start) as usize;
        (offset < mapping.bytes.len()).then_some((start, mapping))
    }
}

impl MemoryReader for SparseMemory
{
    fn region(&self, address: Address) -> Option<MemoryRegion>
    {
        let (start, mapping) = self.mapping_at(address)?;
        let start = Address::new(start);
        // Mappings never wrap, so the length fits.
        let end = start + mapping.bytes.len() as u32;
        Some(MemoryRegion::new(start, end, mapping.readable, mapping.path.clone()))
    }

    fn read_exact(&self, address: Address, buf: &mut [u8]) -> Result<()>
    {
        let (start, mapping) = self
            .mapping_at(address)
            .filter(|(_, mapping)| mapping.readable)
            .ok_or_else(|| unmapped(address, buf.len()))?;
        let offset = (address.value() - start) as usize;
        let src = offset
            .checked_add(buf.len())
            .and_then(|end| mapping.bytes.get(offset..end))
            .ok_or_else(|| unmapped(address, buf.len()))?;
        buf.copy_from_slice(src);
        Ok(())
    }
}
