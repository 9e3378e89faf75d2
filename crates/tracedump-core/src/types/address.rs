//! Code address type.

use std::fmt;
use std::ops::{Add, Sub};

/// Size of a page in the traced process, as assumed by the module scan.
pub const PAGE_SIZE: u32 = 0x1000;

/// Strongly typed 32-bit code address
///
/// This wrapper around `u32` identifies a byte in the traced process's address
/// space. It carries no ownership: it is a bare numeric identifier, never a
/// resource. Tracing is scoped to 32-bit processes, so every address fits in a
/// `u32` and arithmetic wraps the way the CPU's instruction pointer does.
///
/// ## Example
///
/// ```rust
/// use tracedump_core::types::Address;
///
/// let addr = Address::from(0x7c81_e079);
/// assert_eq!(addr.page_align_down(), Address::new(0x7c81_e000));
/// assert_eq!(format!("{addr}"), "0x7c81e079");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u32);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u32` value
    ///
    /// Equivalent to `Address::from(value)` but usable in const contexts.
    pub const fn new(value: u32) -> Self
    {
        Address(value)
    }

    /// Get the raw `u32` value of this address
    pub const fn value(self) -> u32
    {
        self.0
    }

    /// Clear the low 12 bits, giving the start of the containing page
    ///
    /// ```rust
    /// use tracedump_core::types::Address;
    ///
    /// assert_eq!(Address::new(0x1000_0fff).page_align_down(), Address::new(0x1000_0000));
    /// assert_eq!(Address::new(0x1000_0000).page_align_down(), Address::new(0x1000_0000));
    /// ```
    pub const fn page_align_down(self) -> Self
    {
        Address(self.0 & !(PAGE_SIZE - 1))
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use tracedump_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u32::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u32) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Subtract an offset from this address, checking for underflow
    pub fn checked_sub(self, offset: u32) -> Option<Self>
    {
        self.0.checked_sub(offset).map(Address)
    }

    /// Distance in bytes from `base` to this address, if this address is not below it
    pub fn offset_from(self, base: Address) -> Option<u32>
    {
        self.0.checked_sub(base.0)
    }

    /// Host pointer value for reading the current address space
    pub(crate) fn as_usize(self) -> usize
    {
        self.0 as usize
    }
}

impl From<u32> for Address
{
    fn from(value: u32) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u32
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:08x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<u32> for Address
{
    type Output = Address;

    fn add(self, rhs: u32) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u32> for Address
{
    type Output = Address;

    fn sub(self, rhs: u32) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}
