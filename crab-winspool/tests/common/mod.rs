//! In-memory spooler producing the same buffer layouts as winspool

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;

use crab_winspool::{
    DC_ENUMRESOLUTIONS, DC_PAPERNAMES, DC_PAPERS, DC_PAPERSIZE, DM_COLLATE, DM_COLOR, DM_COPIES,
    DM_DUPLEX, DM_MEDIATYPE, DM_ORIENTATION, DM_OUT_BUFFER, DM_PAPERSIZE, DM_PRINTQUALITY,
    DM_YRESOLUTION, ERROR_INSUFFICIENT_BUFFER, PAPER_NAME_LEN, PRINTER_INFO_5_STRIDE, PTR_SIZE,
    Spooler,
};

pub const ALL_FIELDS: u32 = DM_PAPERSIZE
    | DM_MEDIATYPE
    | DM_YRESOLUTION
    | DM_PRINTQUALITY
    | DM_COPIES
    | DM_ORIENTATION
    | DM_DUPLEX
    | DM_COLLATE
    | DM_COLOR;

pub const ERROR_FILE_NOT_FOUND: i32 = 2;
pub const ERROR_INVALID_HANDLE: i32 = 6;
pub const ERROR_INVALID_PARAMETER: i32 = 87;
pub const ERROR_INVALID_PRINTER_NAME: i32 = 1801;
pub const ERROR_SPL_NO_STARTDOC: i32 = 3003;
pub const ERROR_SPL_NO_ADDJOB: i32 = 3004;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Open,
    Document,
    Page,
}

pub struct Paper {
    pub id: u16,
    pub name: &'static str,
    pub size: (u32, u32),
}

#[derive(Default)]
pub struct FakeSpooler {
    pub default_printer: Option<String>,
    /// (name, comma separated ports)
    pub printers: Vec<(String, String)>,
    pub papers: Vec<Paper>,
    pub resolutions: Vec<(i32, i32)>,
    pub devmode: Option<Vec<u8>>,
    /// Accept at most this many bytes per `WritePrinter`
    pub max_write: Option<usize>,
    /// Added to the count returned by filling `DeviceCapabilitiesW` calls
    pub fill_count_skew: i32,
    /// Sizing calls to `DeviceCapabilitiesW` and `DocumentPropertiesW`
    /// return -1, as a driver with nothing to report does
    pub sizing_returns_negative: bool,
    /// Call name -> OS error code to fail with
    pub fail: HashMap<&'static str, i32>,

    pub calls: RefCell<Vec<&'static str>>,
    pub spooled: RefCell<Vec<u8>>,
    pub jobs: RefCell<HashMap<u64, JobState>>,
    pub next_handle: Cell<u64>,
    pub next_job: Cell<u32>,
}

fn os(code: i32) -> io::Error {
    io::Error::from_raw_os_error(code)
}

fn wide_bytes(s: &str) -> Vec<u8> {
    s.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_ne_bytes)
        .collect()
}

// DEVMODEW offsets
pub const OFF_FIELDS: usize = 72;
pub const OFF_ORIENTATION: usize = 76;
pub const OFF_PAPER_SIZE: usize = 78;
pub const OFF_COPIES: usize = 86;
pub const OFF_PRINT_QUALITY: usize = 90;
pub const OFF_COLOR: usize = 92;
pub const OFF_DUPLEX: usize = 94;
pub const OFF_Y_RESOLUTION: usize = 96;
pub const OFF_COLLATE: usize = 100;
pub const OFF_MEDIA_TYPE: usize = 196;

/// A 220-byte DEVMODEW with the given presence bits and fixed field values:
/// orientation 1, copies 2, print quality 600, color 2, duplex 1,
/// Y resolution 600, collate 1, media type 1
pub fn devmode_bytes(fields: u32, paper_size: i16) -> Vec<u8> {
    let mut buf = vec![0u8; 220];
    let name = wide_bytes("Fake Printer");
    buf[..name.len()].copy_from_slice(&name);
    buf[68..70].copy_from_slice(&220u16.to_ne_bytes());
    buf[OFF_FIELDS..OFF_FIELDS + 4].copy_from_slice(&fields.to_ne_bytes());
    for (off, v) in [
        (OFF_ORIENTATION, 1i16),
        (OFF_PAPER_SIZE, paper_size),
        (OFF_COPIES, 2),
        (OFF_PRINT_QUALITY, 600),
        (OFF_COLOR, 2),
        (OFF_DUPLEX, 1),
        (OFF_Y_RESOLUTION, 600),
        (OFF_COLLATE, 1),
    ] {
        buf[off..off + 2].copy_from_slice(&v.to_ne_bytes());
    }
    buf[OFF_MEDIA_TYPE..OFF_MEDIA_TYPE + 4].copy_from_slice(&1u32.to_ne_bytes());
    buf
}

impl FakeSpooler {
    /// Two printers, three papers, two resolutions, a full device mode with
    /// paper size 9 (A4)
    pub fn office() -> Self {
        Self {
            default_printer: Some("Office Laser".to_string()),
            printers: vec![
                ("Office Laser".to_string(), "IP_10.0.0.20,IP_10.0.0.21".to_string()),
                ("Kitchen".to_string(), "USB001".to_string()),
            ],
            papers: vec![
                Paper {
                    id: 1,
                    name: "Letter",
                    size: (2159, 2794),
                },
                Paper {
                    id: 5,
                    name: "Legal",
                    size: (2159, 3556),
                },
                Paper {
                    id: 9,
                    name: "A4",
                    size: (2100, 2970),
                },
            ],
            resolutions: vec![(300, 300), (600, 600)],
            devmode: Some(devmode_bytes(ALL_FIELDS, 9)),
            ..Default::default()
        }
    }

    fn record(&self, call: &'static str) -> io::Result<()> {
        self.calls.borrow_mut().push(call);
        match self.fail.get(call) {
            Some(&code) => Err(os(code)),
            None => Ok(()),
        }
    }

    fn state(&self, handle: u64) -> io::Result<JobState> {
        self.jobs
            .borrow()
            .get(&handle)
            .copied()
            .ok_or_else(|| os(ERROR_INVALID_HANDLE))
    }

    fn transition(&self, handle: u64, from: JobState, to: JobState, code: i32) -> io::Result<()> {
        if self.state(handle)? != from {
            return Err(os(code));
        }
        self.jobs.borrow_mut().insert(handle, to);
        Ok(())
    }

    pub fn open_handles(&self) -> usize {
        self.jobs.borrow().len()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn capability_count(&self, capability: u16) -> io::Result<usize> {
        match capability {
            DC_PAPERS | DC_PAPERSIZE | DC_PAPERNAMES => Ok(self.papers.len()),
            DC_ENUMRESOLUTIONS => Ok(self.resolutions.len()),
            _ => Err(os(ERROR_INVALID_PARAMETER)),
        }
    }
}

impl Spooler for FakeSpooler {
    type Handle = u64;

    fn get_default_printer(&self, buf: &mut [u16], len: &mut u32) -> io::Result<()> {
        self.record("GetDefaultPrinterW")?;
        let name = self
            .default_printer
            .as_ref()
            .ok_or_else(|| os(ERROR_FILE_NOT_FOUND))?;
        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        if (*len as usize) < wide.len() || buf.len() < wide.len() {
            *len = wide.len() as u32;
            return Err(os(ERROR_INSUFFICIENT_BUFFER));
        }
        buf[..wide.len()].copy_from_slice(&wide);
        *len = wide.len() as u32;
        Ok(())
    }

    fn enum_printers(
        &self,
        _flags: u32,
        level: u32,
        buf: &mut [u8],
        needed: &mut u32,
        returned: &mut u32,
    ) -> io::Result<()> {
        self.record("EnumPrintersW")?;
        if level != 5 {
            return Err(os(ERROR_INVALID_PARAMETER));
        }

        let records_len = self.printers.len() * PRINTER_INFO_5_STRIDE;
        let strings: Vec<(Vec<u8>, Vec<u8>)> = self
            .printers
            .iter()
            .map(|(name, ports)| (wide_bytes(name), wide_bytes(ports)))
            .collect();
        let total = records_len
            + strings
                .iter()
                .map(|(n, p)| n.len() + p.len())
                .sum::<usize>();

        *needed = total as u32;
        if buf.len() < total {
            *returned = 0;
            return Err(os(ERROR_INSUFFICIENT_BUFFER));
        }

        let base = buf.as_ptr() as usize;
        let mut cursor = records_len;
        for (i, (name, ports)) in strings.iter().enumerate() {
            let rec = i * PRINTER_INFO_5_STRIDE;
            let name_ptr = base + cursor;
            buf[cursor..cursor + name.len()].copy_from_slice(name);
            cursor += name.len();
            let port_ptr = base + cursor;
            buf[cursor..cursor + ports.len()].copy_from_slice(ports);
            cursor += ports.len();

            buf[rec..rec + PTR_SIZE].copy_from_slice(&name_ptr.to_ne_bytes());
            buf[rec + PTR_SIZE..rec + 2 * PTR_SIZE].copy_from_slice(&port_ptr.to_ne_bytes());
            buf[rec + 2 * PTR_SIZE..rec + 2 * PTR_SIZE + 4].copy_from_slice(&0x40u32.to_ne_bytes());
        }
        *returned = self.printers.len() as u32;
        Ok(())
    }

    fn open_printer(&self, name: &str) -> io::Result<u64> {
        self.record("OpenPrinterW")?;
        if !self.printers.iter().any(|(n, _)| n == name) {
            return Err(os(ERROR_INVALID_PRINTER_NAME));
        }
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        self.jobs.borrow_mut().insert(handle, JobState::Open);
        Ok(handle)
    }

    fn close_printer(&self, handle: u64) -> io::Result<()> {
        self.record("ClosePrinter")?;
        self.jobs
            .borrow_mut()
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| os(ERROR_INVALID_HANDLE))
    }

    fn start_doc_printer(&self, handle: u64, _doc_name: &str, _datatype: &str) -> io::Result<u32> {
        self.record("StartDocPrinterW")?;
        self.transition(handle, JobState::Open, JobState::Document, ERROR_SPL_NO_ADDJOB)?;
        let job = self.next_job.get() + 1;
        self.next_job.set(job);
        Ok(job)
    }

    fn end_doc_printer(&self, handle: u64) -> io::Result<()> {
        self.record("EndDocPrinter")?;
        self.transition(handle, JobState::Document, JobState::Open, ERROR_SPL_NO_STARTDOC)
    }

    fn start_page_printer(&self, handle: u64) -> io::Result<()> {
        self.record("StartPagePrinter")?;
        self.transition(handle, JobState::Document, JobState::Page, ERROR_SPL_NO_STARTDOC)
    }

    fn end_page_printer(&self, handle: u64) -> io::Result<()> {
        self.record("EndPagePrinter")?;
        self.transition(handle, JobState::Page, JobState::Document, ERROR_SPL_NO_STARTDOC)
    }

    fn write_printer(&self, handle: u64, data: &[u8]) -> io::Result<u32> {
        self.record("WritePrinter")?;
        if self.state(handle)? == JobState::Open {
            return Err(os(ERROR_SPL_NO_STARTDOC));
        }
        let n = self.max_write.map_or(data.len(), |max| data.len().min(max));
        self.spooled.borrow_mut().extend_from_slice(&data[..n]);
        Ok(n as u32)
    }

    fn device_capabilities(
        &self,
        device: &str,
        _port: &str,
        capability: u16,
        output: Option<&mut [u8]>,
    ) -> io::Result<i32> {
        self.record("DeviceCapabilitiesW")?;
        if !self.printers.iter().any(|(n, _)| n == device) {
            return Err(os(ERROR_INVALID_PRINTER_NAME));
        }
        if self.sizing_returns_negative && output.is_none() {
            return Ok(-1);
        }
        let count = self.capability_count(capability)?;
        let Some(out) = output else {
            return Ok(count as i32);
        };

        match capability {
            DC_PAPERS => {
                for (i, p) in self.papers.iter().enumerate() {
                    out[i * 2..i * 2 + 2].copy_from_slice(&p.id.to_ne_bytes());
                }
            }
            DC_PAPERSIZE => {
                for (i, p) in self.papers.iter().enumerate() {
                    out[i * 8..i * 8 + 4].copy_from_slice(&p.size.0.to_ne_bytes());
                    out[i * 8 + 4..i * 8 + 8].copy_from_slice(&p.size.1.to_ne_bytes());
                }
            }
            DC_PAPERNAMES => {
                let slot = PAPER_NAME_LEN * 2;
                for (i, p) in self.papers.iter().enumerate() {
                    let name = wide_bytes(p.name);
                    out[i * slot..i * slot + name.len()].copy_from_slice(&name);
                }
            }
            _ => {
                for (i, (x, y)) in self.resolutions.iter().enumerate() {
                    out[i * 8..i * 8 + 4].copy_from_slice(&x.to_ne_bytes());
                    out[i * 8 + 4..i * 8 + 8].copy_from_slice(&y.to_ne_bytes());
                }
            }
        }
        Ok(count as i32 + self.fill_count_skew)
    }

    fn document_properties(
        &self,
        handle: u64,
        _device: &str,
        output: Option<&mut [u8]>,
        mode: u32,
    ) -> io::Result<i32> {
        self.record("DocumentPropertiesW")?;
        self.state(handle)?;
        if self.sizing_returns_negative && output.is_none() {
            return Ok(-1);
        }
        let Some(devmode) = &self.devmode else {
            return Ok(0);
        };
        match output {
            None => Ok(devmode.len() as i32),
            Some(out) => {
                if mode & DM_OUT_BUFFER == 0 {
                    return Err(os(ERROR_INVALID_PARAMETER));
                }
                out[..devmode.len()].copy_from_slice(devmode);
                Ok(1)
            }
        }
    }
}
