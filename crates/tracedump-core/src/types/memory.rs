//! Memory region type.

use super::Address;

/// A contiguous mapping in the traced process
///
/// Regions are half-open: `start` is inside, `end` is the first byte past the
/// mapping. `path` carries the backing file when the host knows it (for image
/// mappings this is the module's on-disk path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion
{
    /// First mapped byte
    pub start: Address,
    /// First byte past the mapping
    pub end: Address,
    /// Whether the mapping can be read without faulting
    pub readable: bool,
    /// Backing file, if any
    pub path: Option<String>,
}

impl MemoryRegion
{
    /// Create a new region description
    pub fn new(start: Address, end: Address, readable: bool, path: Option<String>) -> Self
    {
        Self {
            start,
            end,
            readable,
            path,
        }
    }

    /// Size of the region in bytes
    pub fn size(&self) -> u32
    {
        self.end.value().saturating_sub(self.start.value())
    }

    /// Whether `address` falls inside the region
    pub fn contains(&self, address: Address) -> bool
    {
        address >= self.start && address < self.end
    }

    /// Number of bytes from `address` to the end of the region
    ///
    /// Returns 0 when `address` is outside the region.
    pub fn remaining_from(&self, address: Address) -> u32
    {
        if self.contains(address) {
            self.end.value() - address.value()
        } else {
            0
        }
    }
}
