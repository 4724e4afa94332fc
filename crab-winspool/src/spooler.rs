//! The OS print spooler as seen by this crate
//!
//! Every call the adapter makes goes through [`Spooler`]. On Windows the
//! implementation is [`crate::Win32Spooler`]; tests plug in an in-memory fake.
//! Methods mirror the Win32 calls one to one and report failures as
//! `std::io::Error` carrying the raw OS error code.

use std::io;

/// `ERROR_INSUFFICIENT_BUFFER`
pub const ERROR_INSUFFICIENT_BUFFER: i32 = 122;

/// `PRINTER_ENUM_LOCAL`
pub const PRINTER_ENUM_LOCAL: u32 = 0x2;
/// `PRINTER_ENUM_CONNECTIONS`
pub const PRINTER_ENUM_CONNECTIONS: u32 = 0x4;

/// Capability codes for `DeviceCapabilitiesW`
pub const DC_PAPERS: u16 = 2;
pub const DC_PAPERSIZE: u16 = 3;
pub const DC_ENUMRESOLUTIONS: u16 = 13;
pub const DC_PAPERNAMES: u16 = 16;

/// `DocumentPropertiesW` mode: copy the current device mode to the output buffer
pub const DM_OUT_BUFFER: u32 = 2;

/// Access to the OS print spooler
pub trait Spooler {
    /// Open printer handle
    type Handle: Copy + std::fmt::Debug;

    /// `GetDefaultPrinterW`.
    ///
    /// `len` is the buffer length in UTF-16 units on input. On
    /// `ERROR_INSUFFICIENT_BUFFER` it holds the required length.
    fn get_default_printer(&self, buf: &mut [u16], len: &mut u32) -> io::Result<()>;

    /// `EnumPrintersW`. An empty `buf` asks for the required size.
    fn enum_printers(
        &self,
        flags: u32,
        level: u32,
        buf: &mut [u8],
        needed: &mut u32,
        returned: &mut u32,
    ) -> io::Result<()>;

    /// `OpenPrinterW` with no defaults
    fn open_printer(&self, name: &str) -> io::Result<Self::Handle>;

    /// `ClosePrinter`
    fn close_printer(&self, handle: Self::Handle) -> io::Result<()>;

    /// `StartDocPrinterW` with a level 1 document info. Returns the job id.
    fn start_doc_printer(&self, handle: Self::Handle, doc_name: &str, datatype: &str)
    -> io::Result<u32>;

    /// `EndDocPrinter`
    fn end_doc_printer(&self, handle: Self::Handle) -> io::Result<()>;

    /// `StartPagePrinter`
    fn start_page_printer(&self, handle: Self::Handle) -> io::Result<()>;

    /// `EndPagePrinter`
    fn end_page_printer(&self, handle: Self::Handle) -> io::Result<()>;

    /// `WritePrinter`. Returns the number of bytes the spooler accepted.
    /// `data` is never longer than `u32::MAX` bytes.
    fn write_printer(&self, handle: Self::Handle, data: &[u8]) -> io::Result<u32>;

    /// `DeviceCapabilitiesW`. `None` asks for the element count only; a
    /// negative count on that call is returned as `Ok`, not as an error.
    fn device_capabilities(
        &self,
        device: &str,
        port: &str,
        capability: u16,
        output: Option<&mut [u8]>,
    ) -> io::Result<i32>;

    /// `DocumentPropertiesW`. With `output == None` and mode 0 the OS returns
    /// the size of the device mode in bytes, or a negative value when there
    /// is none.
    fn document_properties(
        &self,
        handle: Self::Handle,
        device: &str,
        output: Option<&mut [u8]>,
        mode: u32,
    ) -> io::Result<i32>;
}

/// Whether an OS error is `ERROR_INSUFFICIENT_BUFFER`
pub(crate) fn is_insufficient_buffer(err: &io::Error) -> bool {
    err.raw_os_error() == Some(ERROR_INSUFFICIENT_BUFFER)
}

/// Byte count of one `WritePrinter` call carrying `len` bytes
pub(crate) fn write_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
