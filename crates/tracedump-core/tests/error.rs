//! Tests for error handling

use std::io;

use tracedump_core::decoder::DecodeStatus;
use tracedump_core::error::{Result, TraceError};
use tracedump_core::memory::{MemoryReader, SparseMemory};
use tracedump_core::types::Address;

#[test]
fn test_no_owning_module_message()
{
    let error = TraceError::NoOwningModule(Address::new(0x1234_5678));
    let message = format!("{}", error);
    assert!(message.contains("No owning module"));
    assert!(message.contains("0x12345678"));
}

#[test]
fn test_no_matching_export_message()
{
    let error = TraceError::NoMatchingExport(Address::new(0x7c80_1101));
    assert_eq!(error.to_string(), "No export matches address 0x7c801101");
}

#[test]
fn test_malformed_image_message()
{
    let error = TraceError::MalformedImage {
        base: Address::new(0x7c80_0000),
        reason: "Invalid PE magic".to_string(),
    };
    let message = error.to_string();
    assert!(message.contains("0x7c800000"));
    assert!(message.contains("Invalid PE magic"));
}

#[test]
fn test_decode_failure_message()
{
    let error = TraceError::DecodeFailure {
        address: Address::new(0x40_1000),
        status: DecodeStatus::Failure,
        count: 0,
    };
    let message = error.to_string();
    assert!(message.contains("0x00401000"));
    assert!(message.contains("Failure"));
}

#[test]
fn test_unmapped_read_error()
{
    let memory = SparseMemory::new();
    match memory.read_u32(Address::new(0x1000)) {
        Err(TraceError::Unmapped { address, len }) => {
            assert_eq!(address, Address::new(0x1000));
            assert_eq!(len, 4);
        }
        other => panic!("Expected Unmapped error, got {:?}", other),
    }
}

#[test]
fn test_io_error_conversion()
{
    let io_err = io::Error::new(io::ErrorKind::NotFound, "maps not found");
    let trace_err: TraceError = io_err.into();

    match trace_err {
        TraceError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
        _ => panic!("Expected Io error"),
    }
}

#[test]
fn test_result_type_alias()
{
    fn resolve_nothing() -> Result<Address>
    {
        Err(TraceError::InvalidArgument("no address".to_string()))
    }

    fn resolve_base() -> Result<Address>
    {
        Ok(Address::new(0x7c80_0000))
    }

    assert!(resolve_nothing().is_err());
    assert_eq!(resolve_base().unwrap(), Address::new(0x7c80_0000));
}
