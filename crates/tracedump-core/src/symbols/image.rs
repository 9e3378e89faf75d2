//! Validated view over a PE image mapped in the traced process.

use object::pe::{ImageDosHeader, ImageNtHeaders32, IMAGE_DIRECTORY_ENTRY_EXPORT};
use object::read::pe::{ExportTable, ImageNtHeaders, ImageOptionalHeader};
use object::LittleEndian as LE;

use crate::error::{Result, TraceError};
use crate::memory::MemoryReader;
use crate::types::{Address, ExportEntry};

/// Longest export name read outside the export directory.
const MAX_NAME_LEN: u32 = 0x1000;

/// Header fields of a mapped 32-bit PE module.
///
/// Parsing reads a header window from the image base, then checks the DOS
/// magic, the `PE\0\0` signature and the PE32 optional header magic before any
/// field is trusted. Every relative address taken from the headers is checked
/// against `SizeOfImage` before it is turned into an absolute address.
pub struct PeImage<'m, M: ?Sized>
{
    memory: &'m M,
    base: Address,
    size_of_image: u32,
    export_directory: Option<(u32, u32)>,
}

impl<'m, M: MemoryReader + ?Sized> PeImage<'m, M>
{
    /// Parse the headers of the image mapped at `base`.
    ///
    /// `header_window` bounds how many bytes are read from the base; the read is
    /// further clamped to the readable region so a short first mapping is not an
    /// error by itself.
    ///
    /// ## Errors
    ///
    /// - `MalformedImage`: unreadable header, bad magic, unsupported optional
    ///   header, or an export directory that lies outside the image
    pub fn parse(memory: &'m M, base: Address, header_window: u32) -> Result<Self>
    {
        let window_len = memory.readable_len(base, header_window);
        if window_len == 0 {
            return Err(TraceError::malformed(base, "image header is not readable"));
        }
        let header = memory.read_bytes(base, window_len as usize)?;
        let data = header.as_slice();

        let dos = ImageDosHeader::parse(data).map_err(|err| TraceError::malformed(base, err.to_string()))?;
        let nt_offset = dos.nt_headers_offset();
        let mut offset = u64::from(nt_offset);
        let (nt, directories) =
            ImageNtHeaders32::parse(data, &mut offset).map_err(|err| TraceError::malformed(base, err.to_string()))?;

        let size_of_image = nt.optional_header().size_of_image();
        if nt_offset >= size_of_image {
            return Err(TraceError::malformed(base, "NT headers lie past SizeOfImage"));
        }

        let export_directory = directories
            .get(IMAGE_DIRECTORY_ENTRY_EXPORT)
            .map(|dir| (dir.virtual_address.get(LE), dir.size.get(LE)))
            .filter(|&(rva, size)| rva != 0 && size != 0);

        if let Some((rva, size)) = export_directory {
            let in_bounds = rva.checked_add(size).is_some_and(|end| end <= size_of_image);
            if !in_bounds {
                return Err(TraceError::malformed(
                    base,
                    format!("export directory {rva:#x}+{size:#x} exceeds SizeOfImage {size_of_image:#x}"),
                ));
            }
        }

        Ok(Self {
            memory,
            base,
            size_of_image,
            export_directory,
        })
    }

    /// Image base address.
    pub fn base(&self) -> Address
    {
        self.base
    }

    /// `SizeOfImage` from the optional header.
    pub fn size_of_image(&self) -> u32
    {
        self.size_of_image
    }

    /// Whether the image declares an export directory.
    pub fn has_exports(&self) -> bool
    {
        self.export_directory.is_some()
    }

    /// Every named export, in name-table order.
    pub fn exports(&self) -> Result<Vec<ExportEntry>>
    {
        let entries = self.with_export_table(|table| {
            let mut entries = Vec::with_capacity(table.name_pointers().len());
            for (name_pointer, index) in table.name_iter() {
                let address = self.function_address(table, index)?;
                entries.push(self.entry(table, name_pointer, index, address)?);
            }
            Ok(entries)
        })?;
        Ok(entries.unwrap_or_default())
    }

    /// First named export whose address is exactly `target`.
    ///
    /// Names are compared in name-table order, so when several names alias one
    /// address the first of them wins. Only the matching entry's name is read.
    pub fn find_export(&self, target: Address) -> Result<Option<ExportEntry>>
    {
        let found = self.with_export_table(|table| {
            for (name_pointer, index) in table.name_iter() {
                let address = self.function_address(table, index)?;
                if address == target {
                    return self.entry(table, name_pointer, index, address).map(Some);
                }
            }
            Ok(None)
        })?;
        Ok(found.flatten())
    }

    fn with_export_table<T>(&self, visit: impl FnOnce(&ExportTable<'_>) -> Result<T>) -> Result<Option<T>>
    {
        let Some((rva, size)) = self.export_directory else {
            return Ok(None);
        };

        let data = self
            .memory
            .read_bytes(self.base + rva, size as usize)
            .map_err(|_| TraceError::malformed(self.base, "export directory is not readable"))?;
        let table = ExportTable::parse(&data, rva).map_err(|err| TraceError::malformed(self.base, err.to_string()))?;
        visit(&table).map(Some)
    }

    fn function_address(&self, table: &ExportTable<'_>, index: u16) -> Result<Address>
    {
        let rva = table
            .addresses()
            .get(usize::from(index))
            .map(|rva| rva.get(LE))
            .ok_or_else(|| {
                TraceError::malformed(self.base, format!("name ordinal {index} is outside the address table"))
            })?;
        Ok(self.base + rva)
    }

    fn entry(&self, table: &ExportTable<'_>, name_pointer: u32, index: u16, address: Address) -> Result<ExportEntry>
    {
        let name = match table.name_from_pointer(name_pointer) {
            Ok(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            // Linkers may place the strings outside the directory's declared range.
            Err(_) => self.read_name(name_pointer)?,
        };

        Ok(ExportEntry {
            name,
            ordinal_index: index,
            address,
        })
    }

    fn read_name(&self, rva: u32) -> Result<String>
    {
        if rva >= self.size_of_image {
            return Err(TraceError::malformed(self.base, format!("export name {rva:#x} lies past SizeOfImage")));
        }

        let start = self.base + rva;
        let limit = (self.size_of_image - rva).min(MAX_NAME_LEN);
        let mut name = Vec::new();
        let mut cursor = start;
        while (name.len() as u32) < limit {
            let chunk = self.memory.readable_len(cursor, (limit - name.len() as u32).min(64));
            if chunk == 0 {
                break;
            }
            let bytes = self.memory.read_bytes(cursor, chunk as usize)?;
            if let Some(nul) = bytes.iter().position(|&b| b == 0) {
                name.extend_from_slice(&bytes[..nul]);
                return Ok(String::from_utf8_lossy(&name).into_owned());
            }
            name.extend_from_slice(&bytes);
            cursor = cursor + chunk;
        }

        Err(TraceError::malformed(self.base, format!("unterminated export name at {start}")))
    }
}
