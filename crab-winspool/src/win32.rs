//! Win32 print spooler binding
//!
//! Thin unsafe wrappers over winspool. Buffers are owned by the caller and
//! only ever passed to the OS; decoding happens in safe code elsewhere.

use std::io;

use core::ffi::c_void;
use windows::Win32::Graphics::Gdi::DEVMODEW;
use windows::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, DocumentPropertiesW, EndDocPrinter, EndPagePrinter, EnumPrintersW,
    GetDefaultPrinterW, OpenPrinterW, PRINTER_HANDLE, StartDocPrinterW, StartPagePrinter,
    WritePrinter,
};
use windows::Win32::Storage::Xps::{DeviceCapabilitiesW, PRINTER_DEVICE_CAPABILITIES};
use windows::core::{PCWSTR, PWSTR};

use crate::spooler::{Spooler, write_len};

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Map a `windows` error back to the Win32 error code it wraps
fn os_error(err: windows::core::Error) -> io::Error {
    let hr = err.code().0 as u32;
    if hr & 0xFFFF_0000 == 0x8007_0000 {
        io::Error::from_raw_os_error((hr & 0xFFFF) as i32)
    } else {
        io::Error::other(err)
    }
}

fn check(ok: bool) -> io::Result<()> {
    if ok {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// The system print spooler
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Spooler;

impl Spooler for Win32Spooler {
    type Handle = PRINTER_HANDLE;

    fn get_default_printer(&self, buf: &mut [u16], len: &mut u32) -> io::Result<()> {
        let out = (!buf.is_empty()).then(|| PWSTR(buf.as_mut_ptr()));
        unsafe { check(GetDefaultPrinterW(out, len).as_bool()) }
    }

    fn enum_printers(
        &self,
        flags: u32,
        level: u32,
        buf: &mut [u8],
        needed: &mut u32,
        returned: &mut u32,
    ) -> io::Result<()> {
        let out = (!buf.is_empty()).then_some(buf);
        unsafe { EnumPrintersW(flags, None, level, out, needed, returned).map_err(os_error) }
    }

    fn open_printer(&self, name: &str) -> io::Result<Self::Handle> {
        let name_w = to_wide(name);
        let mut handle = PRINTER_HANDLE::default();
        unsafe {
            OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None).map_err(os_error)?;
        }
        Ok(handle)
    }

    fn close_printer(&self, handle: Self::Handle) -> io::Result<()> {
        unsafe { ClosePrinter(handle).map_err(os_error) }
    }

    fn start_doc_printer(
        &self,
        handle: Self::Handle,
        doc_name: &str,
        datatype: &str,
    ) -> io::Result<u32> {
        let doc_name_w = to_wide(doc_name);
        let datatype_w = to_wide(datatype);
        let doc_info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
        };

        match unsafe { StartDocPrinterW(handle, 1, &doc_info as *const DOC_INFO_1W) } {
            0 => Err(io::Error::last_os_error()),
            job => Ok(job),
        }
    }

    fn end_doc_printer(&self, handle: Self::Handle) -> io::Result<()> {
        unsafe { check(EndDocPrinter(handle).as_bool()) }
    }

    fn start_page_printer(&self, handle: Self::Handle) -> io::Result<()> {
        unsafe { check(StartPagePrinter(handle).as_bool()) }
    }

    fn end_page_printer(&self, handle: Self::Handle) -> io::Result<()> {
        unsafe { check(EndPagePrinter(handle).as_bool()) }
    }

    fn write_printer(&self, handle: Self::Handle, data: &[u8]) -> io::Result<u32> {
        let mut written: u32 = 0;
        unsafe {
            check(
                WritePrinter(
                    handle,
                    data.as_ptr() as *const c_void,
                    write_len(data.len()),
                    &mut written,
                )
                .as_bool(),
            )?;
        }
        Ok(written)
    }

    fn device_capabilities(
        &self,
        device: &str,
        port: &str,
        capability: u16,
        output: Option<&mut [u8]>,
    ) -> io::Result<i32> {
        let device_w = to_wide(device);
        let port_w = to_wide(port);
        let sizing = output.is_none();
        let out = output.map(|b| PWSTR(b.as_mut_ptr() as *mut u16));

        let n = unsafe {
            DeviceCapabilitiesW(
                PCWSTR::from_raw(device_w.as_ptr()),
                PCWSTR::from_raw(port_w.as_ptr()),
                PRINTER_DEVICE_CAPABILITIES(capability),
                out,
                None,
            )
        };
        // Negative on the sizing call means nothing to report
        if n < 0 && !sizing {
            return Err(io::Error::last_os_error());
        }
        Ok(n)
    }

    fn document_properties(
        &self,
        handle: Self::Handle,
        device: &str,
        output: Option<&mut [u8]>,
        mode: u32,
    ) -> io::Result<i32> {
        let device_w = to_wide(device);
        let sizing = output.is_none();
        let out = output.map(|b| b.as_mut_ptr() as *mut DEVMODEW);

        let n = unsafe {
            DocumentPropertiesW(
                None,
                handle,
                PCWSTR::from_raw(device_w.as_ptr()),
                out,
                None,
                mode,
            )
        };
        // Negative on the sizing call means nothing to report
        if n < 0 && !sizing {
            return Err(io::Error::last_os_error());
        }
        Ok(n)
    }
}
