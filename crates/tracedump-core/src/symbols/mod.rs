//! # Symbol Resolution
//!
//! Turns a bare code address into a `module!export` name by walking the
//! traced process's memory. No debug information is involved:
//!
//! 1. Find the owning image base with a backward, page-aligned scan for the
//!    `MZ` signature
//! 2. Ask the [`ModuleHost`] for the module's path
//! 3. Parse the image headers and walk the export directory for an entry whose
//!    address is exactly the target
//!
//! Nothing is cached: every lookup re-reads the headers, so a module that was
//! unloaded or replaced between two calls is never reported stale.
//!
//! ## Usage
//!
//! ```rust
//! use tracedump_core::memory::SparseMemory;
//! use tracedump_core::symbols::{ModuleTable, SymbolResolver};
//! use tracedump_core::types::Address;
//!
//! let resolver = SymbolResolver::new(SparseMemory::new(), ModuleTable::new());
//! assert_eq!(resolver.symbol(Address::new(0x401000)), None);
//! ```

mod host;
mod image;

pub use host::{ModuleHost, ModuleTable};
pub use image::PeImage;
use tracing::{debug, trace};

use crate::config::TraceConfig;
use crate::error::{Result, TraceError};
use crate::memory::MemoryReader;
use crate::types::{Address, ResolvedSymbol, PAGE_SIZE};

/// Resolves code addresses to exported names of the module that owns them.
#[derive(Debug, Clone)]
pub struct SymbolResolver<M, H>
{
    memory: M,
    host: H,
    config: TraceConfig,
}

impl<M: MemoryReader, H: ModuleHost> SymbolResolver<M, H>
{
    /// Create a resolver with the default configuration.
    pub fn new(memory: M, host: H) -> Self
    {
        Self::with_config(memory, host, TraceConfig::default())
    }

    /// Create a resolver with an explicit configuration.
    pub fn with_config(memory: M, host: H, config: TraceConfig) -> Self
    {
        Self { memory, host, config }
    }

    /// Memory the resolver reads from.
    pub fn memory(&self) -> &M
    {
        &self.memory
    }

    /// Active configuration.
    pub fn config(&self) -> &TraceConfig
    {
        &self.config
    }

    /// Find the image base of the module containing `address`
    ///
    /// Starts at the page containing `address` and walks down one page at a
    /// time until the first two bytes of a page are `MZ`. Each candidate page
    /// is read through [`MemoryReader::read_exact`], which refuses unreadable
    /// memory, and at most
    /// [`ScanLimits::max_pages`](crate::config::ScanLimits) pages are tried.
    ///
    /// ## Errors
    ///
    /// - `NoOwningModule`: an unreadable page, the bound, or address zero was
    ///   reached before a signature
    pub fn locate_module(&self, address: Address) -> Result<Address>
    {
        let mut candidate = address.page_align_down();

        for _ in 0..self.config.scan.max_pages {
            // An unreadable page fails the read.
            let mut signature = [0u8; 2];
            if let Err(err) = self.memory.read_exact(candidate, &mut signature) {
                trace!(%address, page = %candidate, error = %err, "module scan reached an unreadable page");
                return Err(TraceError::NoOwningModule(address));
            }
            if &signature == b"MZ" {
                return Ok(candidate);
            }

            match candidate.checked_sub(PAGE_SIZE) {
                Some(previous) => candidate = previous,
                None => break,
            }
        }

        trace!(%address, "module scan exhausted");
        Err(TraceError::NoOwningModule(address))
    }

    /// Parse the image headers of the module at `base`.
    pub fn image(&self, base: Address) -> Result<PeImage<'_, M>>
    {
        PeImage::parse(&self.memory, base, self.config.header_window)
    }

    /// Resolve `address` to `module!export` when it is exactly an export's entry point
    ///
    /// ## Errors
    ///
    /// - `NoOwningModule`: no image contains the address
    /// - `MalformedImage`: the owning image failed header validation
    /// - `NoMatchingExport`: no export starts at exactly this address
    pub fn resolve(&self, address: Address) -> Result<ResolvedSymbol>
    {
        let base = self.locate_module(address)?;
        let path = self.host.path_of(base).unwrap_or_else(|| {
            debug!(%base, "host could not name module");
            String::new()
        });

        let image = self.image(base)?;
        match image.find_export(address)? {
            Some(entry) => Ok(ResolvedSymbol::new(&path, entry.name)),
            None => Err(TraceError::NoMatchingExport(address)),
        }
    }

    /// Resolve `address` to a `module!export` string, or `None` when there is no symbol.
    pub fn symbol(&self, address: Address) -> Option<String>
    {
        match self.resolve(address) {
            Ok(symbol) => Some(symbol.to_string()),
            Err(err) => {
                trace!(%address, error = %err, "no symbol");
                None
            }
        }
    }
}
