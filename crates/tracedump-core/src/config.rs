//! Tracer configuration.
//!
//! There is no file-based configuration; hosts build a [`TraceConfig`] in code.
//! The defaults reproduce the behaviour the tracer was designed around.

/// Limits for the backward `MZ` scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits
{
    /// Maximum number of pages inspected, including the starting page
    pub max_pages: u32,
}

impl ScanLimits
{
    /// 64 MiB worth of 4 KiB pages.
    pub const DEFAULT_MAX_PAGES: u32 = 0x4000;
}

impl Default for ScanLimits
{
    fn default() -> Self
    {
        Self {
            max_pages: Self::DEFAULT_MAX_PAGES,
        }
    }
}

/// Settings shared by the symbol resolver and the trace walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig
{
    /// Bytes handed to the decoder per instruction (the x86 maximum is 15)
    pub max_instruction_len: u32,
    /// Column width the hex bytes are left-justified to
    pub hex_column_width: usize,
    /// Upper bound on the rendered hex text (16 bytes)
    pub hex_max_width: usize,
    /// Bytes read from the image base when parsing headers
    pub header_window: u32,
    /// Module scan limits
    pub scan: ScanLimits,
}

impl Default for TraceConfig
{
    fn default() -> Self
    {
        Self {
            max_instruction_len: 16,
            hex_column_width: 12,
            hex_max_width: 32,
            header_window: 0x1000,
            scan: ScanLimits::default(),
        }
    }
}

impl TraceConfig
{
    /// Override the module scan bound.
    #[must_use]
    pub fn with_scan_limits(mut self, scan: ScanLimits) -> Self
    {
        self.scan = scan;
        self
    }

    /// Override the hex column width.
    #[must_use]
    pub fn with_hex_column_width(mut self, width: usize) -> Self
    {
        self.hex_column_width = width;
        self
    }

    /// Override the header window size.
    #[must_use]
    pub fn with_header_window(mut self, bytes: u32) -> Self
    {
        self.header_window = bytes;
        self
    }
}
