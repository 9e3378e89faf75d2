//! # Linux Live Process
//!
//! Reads the address space of the current process, which is where the tracer
//! runs when it is loaded into the program under analysis (natively, or inside
//! a Wine-hosted 32-bit PE process).
//!
//! A [`LiveProcess`] is a snapshot of `/proc/self/maps` taken when it is
//! created. Every region check, module scan and header parse made through it
//! runs against that one snapshot; the public entry points take a fresh one per
//! call, so nothing outlives a single `symbol` or `trace_dump`. Adjacent
//! readable mappings are treated as one span, because a PE image is mapped
//! section by section with different protections.
//!
//! ## References
//!
//! - [proc_pid_maps(5) man page](https://man7.org/linux/man-pages/man5/proc_pid_maps.5.html)

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::error::Result;
use crate::memory::{unmapped, MemoryReader};
use crate::symbols::ModuleHost;
use crate::types::{Address, MemoryRegion, PAGE_SIZE};

const MAPS_PATH: &str = "/proc/self/maps";

static SYSTEM_PAGE_SIZE: Lazy<u64> = Lazy::new(|| {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size <= 0 {
        u64::from(PAGE_SIZE)
    } else {
        size as u64
    }
});

/// One line of `/proc/self/maps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MapsEntry
{
    pub start: u64,
    pub end: u64,
    pub readable: bool,
    pub path: Option<String>,
}

impl MapsEntry
{
    fn to_region(&self) -> Option<MemoryRegion>
    {
        let start = u32::try_from(self.start).ok()?;
        // A mapping that ends exactly at 4 GiB loses its last byte.
        let end = u32::try_from(self.end).unwrap_or(u32::MAX);
        Some(MemoryRegion::new(
            Address::new(start),
            Address::new(end),
            self.readable,
            self.path.clone(),
        ))
    }
}

fn next_field(line: &str) -> (&str, &str)
{
    let line = line.trim_start();
    let end = line.find(char::is_whitespace).unwrap_or(line.len());
    line.split_at(end)
}

/// Parse `start-end perms offset dev inode [path]`.
pub(crate) fn parse_maps_line(line: &str) -> Option<MapsEntry>
{
    let (range, rest) = next_field(line);
    let (perms, rest) = next_field(rest);
    let (_offset, rest) = next_field(rest);
    let (_dev, rest) = next_field(rest);
    let (inode, rest) = next_field(rest);
    if inode.is_empty() {
        return None;
    }

    let (start, end) = range.split_once('-')?;
    let start = u64::from_str_radix(start, 16).ok()?;
    let end = u64::from_str_radix(end, 16).ok()?;
    if end <= start {
        return None;
    }

    let path = rest.trim();
    Some(MapsEntry {
        start,
        end,
        readable: perms.starts_with('r'),
        path: (!path.is_empty()).then(|| path.to_string()),
    })
}

pub(crate) fn parse_maps(text: &str) -> Vec<MapsEntry>
{
    text.lines().filter_map(parse_maps_line).collect()
}

/// Bytes readable from `address` across adjacent readable mappings.
pub(crate) fn readable_span(entries: &[MapsEntry], address: u64) -> u64
{
    let Some(index) = entries.iter().position(|e| e.start <= address && address < e.end) else {
        return 0;
    };

    let mut end = address;
    for entry in &entries[index..] {
        if !entry.readable || entry.start > end {
            break;
        }
        end = entry.end;
    }
    end - address
}

/// Snapshot of the current process's address space.
#[derive(Debug, Clone, Default)]
pub struct LiveProcess
{
    entries: Vec<MapsEntry>,
}

impl LiveProcess
{
    /// Snapshot `/proc/self/maps`.
    ///
    /// ## Errors
    ///
    /// - `Io`: the maps file could not be read
    pub fn new() -> Result<Self>
    {
        if *SYSTEM_PAGE_SIZE != u64::from(PAGE_SIZE) {
            warn!(
                page_size = *SYSTEM_PAGE_SIZE,
                "system page size differs from the 4 KiB image scan step"
            );
        }
        Self::load(Path::new(MAPS_PATH))
    }

    pub(crate) fn load(path: &Path) -> Result<Self>
    {
        let text = fs::read_to_string(path)?;
        let entries = parse_maps(&text);
        debug!(mappings = entries.len(), "took address space snapshot");
        Ok(Self { entries })
    }

    #[cfg(test)]
    fn from_entries(entries: Vec<MapsEntry>) -> Self
    {
        Self { entries }
    }

    fn span(&self, address: Address) -> u64
    {
        readable_span(&self.entries, u64::from(address.value()))
    }
}

impl MemoryReader for LiveProcess
{
    fn region(&self, address: Address) -> Option<MemoryRegion>
    {
        let address = u64::from(address.value());
        self.entries
            .iter()
            .find(|entry| entry.start <= address && address < entry.end)
            .and_then(MapsEntry::to_region)
    }

    fn read_exact(&self, address: Address, buf: &mut [u8]) -> Result<()>
    {
        if self.span(address) < buf.len() as u64 {
            return Err(unmapped(address, buf.len()));
        }
        if buf.is_empty() {
            return Ok(());
        }

        // SAFETY: the range lies inside readable mappings of the snapshot. A
        // concurrent unmap after the snapshot faults, which is the accepted
        // risk of tracing in place.
        unsafe {
            std::ptr::copy_nonoverlapping(address.as_usize() as *const u8, buf.as_mut_ptr(), buf.len());
        }
        Ok(())
    }

    fn is_readable(&self, address: Address, len: u32) -> bool
    {
        self.span(address) >= u64::from(len)
    }

    fn readable_len(&self, address: Address, max: u32) -> u32
    {
        u32::try_from(self.span(address).min(u64::from(max))).unwrap_or(max)
    }
}

impl ModuleHost for LiveProcess
{
    fn path_of(&self, base: Address) -> Option<String>
    {
        let base = u64::from(base.value());
        self.entries
            .iter()
            .find(|entry| entry.start == base)
            .and_then(|entry| entry.path.clone())
            .filter(|path| !path.starts_with('['))
    }
}
