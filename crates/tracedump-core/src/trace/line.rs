//! Rendering of a single trace line.

use std::fmt;

use crate::config::TraceConfig;
use crate::decoder::DecodedInstruction;
use crate::types::{Address, ResolvedSymbol};

/// Destination of a recognised control transfer, with its name if one resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation
{
    /// Computed destination
    pub target: Address,
    /// Export at the destination
    pub symbol: Option<ResolvedSymbol>,
}

impl fmt::Display for Annotation
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match &self.symbol {
            Some(symbol) => write!(f, "; {} {}", self.target, symbol),
            None => write!(f, "; {}", self.target),
        }
    }
}

/// One decoded instruction as it appears in the trace.
///
/// Renders as `<address> <hex> <mnemonic> <operands>`, with ` <annotation>`
/// appended only when a rule fired. The hex column is left-justified to the
/// configured width and cut at the configured maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine
{
    /// Address of the instruction
    pub address: Address,
    /// Decoder output
    pub instruction: DecodedInstruction,
    /// Control-transfer annotation
    pub annotation: Option<Annotation>,
    hex_width: usize,
    hex_max_width: usize,
}

impl TraceLine
{
    /// Build a line using the column settings of `config`.
    pub fn new(
        address: Address,
        instruction: DecodedInstruction,
        annotation: Option<Annotation>,
        config: &TraceConfig,
    ) -> Self
    {
        Self {
            address,
            instruction,
            annotation,
            hex_width: config.hex_column_width,
            hex_max_width: config.hex_max_width,
        }
    }
}

impl fmt::Display for TraceLine
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let hex = &self.instruction.hex;
        let cut = hex
            .char_indices()
            .nth(self.hex_max_width)
            .map_or(hex.len(), |(index, _)| index);
        let hex = &hex[..cut];
        write!(
            f,
            "{} {:<width$} {} {}",
            self.address,
            hex,
            self.instruction.mnemonic,
            self.instruction.operands,
            width = self.hex_width
        )?;

        if let Some(annotation) = &self.annotation {
            write!(f, " {annotation}")?;
        }
        Ok(())
    }
}
