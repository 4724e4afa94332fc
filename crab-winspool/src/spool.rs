//! Capability facade over a [`Spooler`]

use tracing::{debug, instrument, warn};

use crate::config::SpoolConfig;
use crate::decode::{
    self, PAPER_ID_STRIDE, PAPER_NAME_STRIDE, POINT_STRIDE, PrinterInfo,
};
use crate::devmode::{DefaultSettings, DevMode};
use crate::document::PrinterHandle;
use crate::error::SpoolResult;
use crate::query::{Counted, query_bytes, query_counted, query_sized};
use crate::spooler::{
    DC_ENUMRESOLUTIONS, DC_PAPERNAMES, DC_PAPERS, DC_PAPERSIZE, DM_OUT_BUFFER, Spooler,
};

/// `EnumPrintersW` level returning `PRINTER_INFO_5W`
const PRINTER_INFO_LEVEL: u32 = 5;

/// Printer queries and job handles on top of a spooler
#[derive(Debug)]
pub struct PrintSpool<S: Spooler> {
    spooler: S,
    config: SpoolConfig,
}

#[cfg(windows)]
impl PrintSpool<crate::win32::Win32Spooler> {
    /// Facade over the system spooler, configured from the environment
    pub fn system() -> Self {
        Self::with_config(crate::win32::Win32Spooler, SpoolConfig::from_env())
    }
}

impl<S: Spooler> PrintSpool<S> {
    pub fn new(spooler: S) -> Self {
        Self::with_config(spooler, SpoolConfig::default())
    }

    pub fn with_config(spooler: S, config: SpoolConfig) -> Self {
        Self { spooler, config }
    }

    pub fn spooler(&self) -> &S {
        &self.spooler
    }

    pub fn config(&self) -> &SpoolConfig {
        &self.config
    }

    /// Get the default printer name
    #[instrument(skip(self))]
    pub fn default_printer_name(&self) -> SpoolResult<String> {
        let buf = query_sized("GetDefaultPrinterW", |buf: &mut [u16], len| {
            self.spooler.get_default_printer(buf, len)
        })?;

        let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        Ok(String::from_utf16_lossy(&buf[..end]))
    }

    /// Enumerate printers matching the configured enumeration flags
    #[instrument(skip(self))]
    pub fn list_printers(&self) -> SpoolResult<Vec<PrinterInfo>> {
        let flags = self.config.enum_flags;
        let mut returned: u32 = 0;

        let buf = query_sized("EnumPrintersW", |buf: &mut [u8], needed| {
            self.spooler
                .enum_printers(flags, PRINTER_INFO_LEVEL, buf, needed, &mut returned)
        })?;

        let printers = decode::decode_printer_info_5(&buf, buf.as_ptr() as usize, returned as usize)?;
        debug!(count = printers.len(), "printers enumerated");
        Ok(printers)
    }

    /// List available printer names
    pub fn list_printer_names(&self) -> SpoolResult<Vec<String>> {
        Ok(self
            .list_printers()?
            .into_iter()
            .map(|p| p.name)
            .collect())
    }

    /// Port of the named printer (exact, case-sensitive name match).
    ///
    /// A name that is not enumerated yields the configured fallback port
    /// (`LPT1` by default) rather than an error.
    #[instrument(skip(self))]
    pub fn printer_port(&self, printer: &str) -> SpoolResult<String> {
        let printers = self.list_printers()?;
        match printers.into_iter().find(|p| p.name == printer) {
            Some(info) => Ok(info.port),
            None => {
                warn!(
                    fallback = %self.config.fallback_port,
                    "printer not enumerated, using fallback port"
                );
                Ok(self.config.fallback_port.clone())
            }
        }
    }

    /// Open a printer for a print job
    pub fn open(&self, printer: &str) -> SpoolResult<PrinterHandle<'_, S>> {
        PrinterHandle::open(&self.spooler, printer, &self.config.datatype)
    }

    fn capability(&self, printer: &str, port: &str, capability: u16, stride: usize) -> SpoolResult<Counted> {
        query_counted("DeviceCapabilitiesW", stride, |out| {
            self.spooler.device_capabilities(printer, port, capability, out)
        })
    }

    /// Paper names the printer offers
    #[instrument(skip(self))]
    pub fn media_names(&self, printer: &str, port: &str) -> SpoolResult<Vec<String>> {
        let counted = self.capability(printer, port, DC_PAPERNAMES, PAPER_NAME_STRIDE)?;
        decode::decode_paper_names(&counted.buf, counted.count)
    }

    /// Paper dimensions in tenths of a millimeter, flattened `X,Y,X,Y…`
    #[instrument(skip(self))]
    pub fn media_sizes(&self, printer: &str, port: &str) -> SpoolResult<Vec<u32>> {
        let counted = self.capability(printer, port, DC_PAPERSIZE, POINT_STRIDE)?;
        decode::decode_paper_sizes(&counted.buf, counted.count)
    }

    /// Paper ids (`DMPAPER_*` values) the printer offers
    #[instrument(skip(self))]
    pub fn media_ids(&self, printer: &str, port: &str) -> SpoolResult<Vec<i32>> {
        let counted = self.capability(printer, port, DC_PAPERS, PAPER_ID_STRIDE)?;
        decode::decode_paper_ids(&counted.buf, counted.count)
    }

    /// Supported resolutions in dpi, flattened `X,Y,X,Y…`
    #[instrument(skip(self))]
    pub fn resolutions(&self, printer: &str, port: &str) -> SpoolResult<Vec<i32>> {
        let counted = self.capability(printer, port, DC_ENUMRESOLUTIONS, POINT_STRIDE)?;
        decode::decode_points(&counted.buf, counted.count)
    }

    /// Current device mode settings of the printer.
    ///
    /// A paper size the printer does not list is replaced by its first listed
    /// paper id.
    #[instrument(skip(self))]
    pub fn default_settings(&self, printer: &str, port: &str) -> SpoolResult<DefaultSettings> {
        let handle = self.open(printer)?;
        let raw = handle.raw();
        let buf = query_bytes("DocumentPropertiesW", |out| {
            let mode = if out.is_some() { DM_OUT_BUFFER } else { 0 };
            self.spooler.document_properties(raw, printer, out, mode)
        });
        let closed = handle.close();
        let buf = buf?;
        closed?;

        if buf.is_empty() {
            debug!("driver reported no device mode");
            return Ok(DefaultSettings::default());
        }

        let settings = DevMode::decode(&buf)?.settings();
        if settings.paper_size.is_none() {
            return Ok(settings);
        }

        let papers = self.media_ids(printer, port)?;
        Ok(settings.with_paper_fallback(&papers))
    }
}
