//! # crab-winspool
//!
//! Windows print spooler binding - printer discovery, capability queries and
//! raw print jobs.
//!
//! ## Scope
//!
//! This crate handles:
//! - Default printer lookup and printer enumeration
//! - Port lookup for a printer name
//! - Capability queries (paper names, sizes, ids, resolutions)
//! - Default device mode settings
//! - Raw document/page lifecycle on an open printer handle
//!
//! The spooler itself sits behind the [`Spooler`] trait. On Windows,
//! [`Win32Spooler`] calls winspool directly.
//!
//! ## Example
//!
//! ```ignore
//! use crab_winspool::PrintSpool;
//!
//! let spool = PrintSpool::system();
//! let name = spool.default_printer_name()?;
//! let port = spool.printer_port(&name)?;
//! println!("{name} on {port}: {:?}", spool.media_names(&name, &port)?);
//!
//! let mut printer = spool.open(&name)?;
//! printer.start_document("test", "RAW")?;
//! printer.start_page()?;
//! printer.write_bytes(b"hello")?;
//! printer.end_page()?;
//! printer.end_document()?;
//! printer.close()?;
//! ```

mod config;
mod decode;
mod devmode;
mod document;
mod error;
mod query;
mod spool;
mod spooler;

#[cfg(windows)]
mod win32;

// Re-exports
pub use config::SpoolConfig;
pub use decode::{PAPER_NAME_LEN, PRINTER_INFO_5_STRIDE, PTR_SIZE, PrinterInfo};
pub use devmode::{
    DM_COLLATE, DM_COLOR, DM_COPIES, DM_DUPLEX, DM_MEDIATYPE, DM_ORIENTATION, DM_PAPERSIZE,
    DM_PRINTQUALITY, DM_YRESOLUTION, DefaultSettings, DevMode, NO_DEFAULT,
};
pub use document::PrinterHandle;
pub use error::{SpoolError, SpoolResult};
pub use spool::PrintSpool;

// Constants and layouts an alternative `Spooler` implementation needs
pub use spooler::{
    DC_ENUMRESOLUTIONS, DC_PAPERNAMES, DC_PAPERS, DC_PAPERSIZE, DM_OUT_BUFFER,
    ERROR_INSUFFICIENT_BUFFER, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, Spooler,
};

#[cfg(windows)]
pub use win32::Win32Spooler;
