//! Reporting sinks for trace output.
//!
//! The walker renders every line through [`Report::report`] and never looks at
//! a return value; where the line ends up is the host's business.

use std::fmt;

use tracing::info;

/// Destination for formatted trace lines.
pub trait Report
{
    /// Emit one line.
    fn report(&mut self, args: fmt::Arguments<'_>);
}

impl<R: Report + ?Sized> Report for &mut R
{
    fn report(&mut self, args: fmt::Arguments<'_>)
    {
        (**self).report(args);
    }
}

/// Collects rendered lines, one `String` per report.
impl Report for Vec<String>
{
    fn report(&mut self, args: fmt::Arguments<'_>)
    {
        self.push(args.to_string());
    }
}

/// Forwards each line to `tracing` at `INFO` under the `tracedump::report` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReport;

impl Report for TracingReport
{
    fn report(&mut self, args: fmt::Arguments<'_>)
    {
        info!(target: "tracedump::report", "{}", args);
    }
}
