//! Open printer handle and the document/page lifecycle
//!
//! Calls map one to one onto spooler calls. Ordering is not checked here:
//! `open → start_document → start_page → write* → end_page → end_document →
//! close` is the caller's job, and the spooler's error for a misplaced call
//! comes back unchanged.

use std::io;

use tracing::{debug, instrument, warn};

use crate::error::{SpoolError, SpoolResult};
use crate::spooler::{Spooler, write_len};

/// An open printer. Closed exactly once, by [`PrinterHandle::close`] or on drop.
pub struct PrinterHandle<'a, S: Spooler> {
    spooler: &'a S,
    handle: S::Handle,
    name: String,
    datatype: String,
    open: bool,
}

impl<'a, S: Spooler> PrinterHandle<'a, S> {
    #[instrument(skip(spooler, datatype))]
    pub(crate) fn open(spooler: &'a S, name: &str, datatype: &str) -> SpoolResult<Self> {
        let handle = spooler
            .open_printer(name)
            .map_err(|e| SpoolError::os("OpenPrinterW", e))?;
        debug!(?handle, "printer opened");

        Ok(Self {
            spooler,
            handle,
            name: name.to_string(),
            datatype: datatype.to_string(),
            open: true,
        })
    }

    /// Get the printer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw spooler handle
    pub fn raw(&self) -> S::Handle {
        self.handle
    }

    /// Start a print job. Returns the spooler job id.
    #[instrument(skip(self), fields(printer = %self.name))]
    pub fn start_document(&mut self, doc_name: &str, datatype: &str) -> SpoolResult<u32> {
        let job = self
            .spooler
            .start_doc_printer(self.handle, doc_name, datatype)
            .map_err(|e| SpoolError::os("StartDocPrinterW", e))?;
        debug!(job, "document started");
        Ok(job)
    }

    /// Start a print job with the configured raw datatype
    pub fn start_raw_document(&mut self, doc_name: &str) -> SpoolResult<u32> {
        let datatype = self.datatype.clone();
        self.start_document(doc_name, &datatype)
    }

    #[instrument(skip(self), fields(printer = %self.name))]
    pub fn end_document(&mut self) -> SpoolResult<()> {
        self.spooler
            .end_doc_printer(self.handle)
            .map_err(|e| SpoolError::os("EndDocPrinter", e))
    }

    #[instrument(skip(self), fields(printer = %self.name))]
    pub fn start_page(&mut self) -> SpoolResult<()> {
        self.spooler
            .start_page_printer(self.handle)
            .map_err(|e| SpoolError::os("StartPagePrinter", e))
    }

    #[instrument(skip(self), fields(printer = %self.name))]
    pub fn end_page(&mut self) -> SpoolResult<()> {
        self.spooler
            .end_page_printer(self.handle)
            .map_err(|e| SpoolError::os("EndPagePrinter", e))
    }

    /// Hand bytes to the spooler in a single call.
    ///
    /// The spooler may accept fewer bytes than given; the caller loops.
    /// At most `u32::MAX` bytes go out per call.
    #[instrument(skip(self, data), fields(printer = %self.name, data_len = data.len()))]
    pub fn write_bytes(&mut self, data: &[u8]) -> SpoolResult<usize> {
        let data = &data[..write_len(data.len()) as usize];
        let written = self
            .spooler
            .write_printer(self.handle, data)
            .map_err(|e| SpoolError::os("WritePrinter", e))?;
        if (written as usize) < data.len() {
            debug!(written, "partial write");
        }
        Ok(written as usize)
    }

    /// Release the handle
    #[instrument(skip(self), fields(printer = %self.name))]
    pub fn close(mut self) -> SpoolResult<()> {
        self.open = false;
        self.spooler
            .close_printer(self.handle)
            .map_err(|e| SpoolError::os("ClosePrinter", e))
    }
}

impl<S: Spooler> io::Write for PrinterHandle<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Spooler> Drop for PrinterHandle<'_, S> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        warn!(printer = %self.name, "printer handle dropped without close");
        if let Err(e) = self.spooler.close_printer(self.handle) {
            warn!(printer = %self.name, error = %e, "ClosePrinter failed on drop");
        }
    }
}
