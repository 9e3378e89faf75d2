//! Tests for platform-agnostic types

use tracedump_core::memory::{MemoryReader, SparseMemory};
use tracedump_core::types::{Address, MemoryRegion, ResolvedSymbol, PAGE_SIZE};

#[test]
fn test_address_from_u32()
{
    let addr = Address::from(0x7c81_e079);
    assert_eq!(addr.value(), 0x7c81_e079);
}

#[test]
fn test_address_to_u32()
{
    let value: u32 = Address::new(0x40_1000).into();
    assert_eq!(value, 0x40_1000);
}

#[test]
fn test_address_display_is_zero_padded()
{
    assert_eq!(Address::new(0x1000).to_string(), "0x00001000");
    assert_eq!(Address::ZERO.to_string(), "0x00000000");
    assert_eq!(format!("{:x}", Address::new(0xbeef)), "beef");
}

#[test]
fn test_address_arithmetic_wraps()
{
    assert_eq!(Address::new(0xffff_fffe) + 5, Address::new(3));
    assert_eq!(Address::new(2) - 3, Address::new(0xffff_ffff));
    assert_eq!(Address::new(0xffff_fffe).checked_add(5), None);
    assert_eq!(Address::new(0x1000).checked_sub(PAGE_SIZE), Some(Address::ZERO));
    assert_eq!(Address::ZERO.checked_sub(1), None);
}

#[test]
fn test_address_offset_from()
{
    let base = Address::new(0x7c80_0000);
    assert_eq!(Address::new(0x7c80_1100).offset_from(base), Some(0x1100));
    assert_eq!(Address::new(0x7c7f_ffff).offset_from(base), None);
}

#[test]
fn test_memory_region_new()
{
    let region = MemoryRegion::new(
        Address::new(0x1000),
        Address::new(0x3000),
        true,
        Some("/usr/lib/wine/kernel32.dll".to_string()),
    );

    assert_eq!(region.size(), 0x2000);
    assert!(region.readable);
    assert_eq!(region.path.as_deref(), Some("/usr/lib/wine/kernel32.dll"));
}

#[test]
fn test_memory_region_bounds_are_half_open()
{
    let region = MemoryRegion::new(Address::new(0x1000), Address::new(0x2000), true, None);

    assert!(region.contains(Address::new(0x1000)));
    assert!(region.contains(Address::new(0x1fff)));
    assert!(!region.contains(Address::new(0x2000)));
    assert_eq!(region.remaining_from(Address::new(0x1ff0)), 0x10);
    assert_eq!(region.remaining_from(Address::new(0x2000)), 0);
}

#[test]
fn test_resolved_symbol_display()
{
    let windows = ResolvedSymbol::new(r"C:\WINDOWS\system32\ntdll.dll", "RtlExitUserProcess");
    assert_eq!(windows.to_string(), "ntdll.dll!RtlExitUserProcess");

    let unix = ResolvedSymbol::new("/opt/wine/lib/wine/i386-windows/user32.dll", "MessageBoxA");
    assert_eq!(unix.to_string(), "user32.dll!MessageBoxA");

    let bare = ResolvedSymbol::new("msvcrt.dll", "exit");
    assert_eq!(bare.module(), "msvcrt.dll");
}

#[test]
fn test_sparse_memory_reads()
{
    let mut memory = SparseMemory::new();
    memory.map(Address::new(0x1000), vec![0x4d, 0x5a, 0x90, 0x00, 0x03, 0x00, 0x00, 0x00]).unwrap();

    assert_eq!(memory.read_u16(Address::new(0x1000)).unwrap(), 0x5a4d);
    assert_eq!(memory.read_u32(Address::new(0x1004)).unwrap(), 3);
    assert!(memory.is_readable(Address::new(0x1000), 8));
    assert!(!memory.is_readable(Address::new(0x1000), 9));
    assert_eq!(memory.readable_len(Address::new(0x1006), 16), 2);
    assert!(memory.read_u32(Address::new(0x1006)).is_err());
}

#[test]
fn test_sparse_memory_guard_region()
{
    let mut memory = SparseMemory::new();
    memory.map_guard(Address::new(0x2000), 0x1000).unwrap();

    let region = memory.region(Address::new(0x2800)).unwrap();
    assert!(!region.readable);
    assert!(!memory.is_readable(Address::new(0x2800), 1));
    assert_eq!(memory.readable_len(Address::new(0x2800), 16), 0);
}

#[test]
fn test_sparse_memory_rejects_overlap()
{
    let mut memory = SparseMemory::new();
    memory.map(Address::new(0x1000), vec![0; 0x1000]).unwrap();

    assert!(memory.map(Address::new(0x1800), vec![0; 0x10]).is_err());
    assert!(memory.map(Address::new(0x0800), vec![0; 0x1000]).is_err());
    assert!(memory.map(Address::new(0x2000), vec![0; 0x10]).is_ok());
    assert!(memory.map(Address::new(0x3000), Vec::new()).is_err());
}
