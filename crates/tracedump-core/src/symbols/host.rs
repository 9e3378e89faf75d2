//! Module path lookup.

use std::collections::HashMap;

use crate::types::Address;

/// Host capability that names the module mapped at an image base.
///
/// This is the loader's "file name of the module at this base" query. It is
/// only consulted after the image base has been found.
pub trait ModuleHost
{
    /// On-disk path of the module whose image starts at `base`
    fn path_of(&self, base: Address) -> Option<String>;
}

impl<H: ModuleHost + ?Sized> ModuleHost for &H
{
    fn path_of(&self, base: Address) -> Option<String>
    {
        (**self).path_of(base)
    }
}

/// Module paths registered by the host ahead of time.
///
/// ```rust
/// use tracedump_core::symbols::{ModuleHost, ModuleTable};
/// use tracedump_core::types::Address;
///
/// let mut modules = ModuleTable::new();
/// modules.insert(Address::new(0x7c80_0000), r"C:\WINDOWS\system32\kernel32.dll");
/// assert!(modules.path_of(Address::new(0x7c80_0000)).is_some());
/// assert!(modules.path_of(Address::new(0x7c90_0000)).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModuleTable
{
    paths: HashMap<Address, String>,
}

impl ModuleTable
{
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Register the module loaded at `base`.
    pub fn insert(&mut self, base: Address, path: impl Into<String>)
    {
        self.paths.insert(base, path.into());
    }
}

impl ModuleHost for ModuleTable
{
    fn path_of(&self, base: Address) -> Option<String>
    {
        self.paths.get(&base).cloned()
    }
}
