//! Export and resolved-symbol types.

use std::fmt;

use super::Address;

/// One named entry of a module's export directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry
{
    /// Exported name
    pub name: String,
    /// Index into the export address table (the name-ordinal value)
    pub ordinal_index: u16,
    /// Absolute address of the export in the traced process
    pub address: Address,
}

/// A `module!export` name for an exact export address.
///
/// Recomputed on every lookup; nothing about it is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol
{
    module: String,
    export: String,
}

impl ResolvedSymbol
{
    /// Build from a module path and an export name.
    ///
    /// The path is trimmed to its final component, splitting on either `\` or `/`.
    ///
    /// ```rust
    /// use tracedump_core::types::ResolvedSymbol;
    ///
    /// let symbol = ResolvedSymbol::new(r"C:\WINDOWS\system32\kernel32.dll", "ExitProcess");
    /// assert_eq!(symbol.to_string(), "kernel32.dll!ExitProcess");
    /// ```
    pub fn new(module_path: &str, export: impl Into<String>) -> Self
    {
        Self {
            module: file_name(module_path).to_string(),
            export: export.into(),
        }
    }

    /// File name of the owning module.
    pub fn module(&self) -> &str
    {
        &self.module
    }

    /// Exported name.
    pub fn export(&self) -> &str
    {
        &self.export
    }
}

impl fmt::Display for ResolvedSymbol
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}!{}", self.module, self.export)
    }
}

/// Final path component, accepting both Windows and Unix separators.
pub fn file_name(path: &str) -> &str
{
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}
