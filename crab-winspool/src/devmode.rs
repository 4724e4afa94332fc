//! `DEVMODEW` decoding and default printer settings

use serde::Serialize;
use tracing::warn;

use crate::decode::{read_i16, read_u16, read_u32};
use crate::error::{SpoolError, SpoolResult};

/// Reported for a setting the device mode does not carry
pub const NO_DEFAULT: i32 = -50;

/// `dmFields` presence bits
pub const DM_ORIENTATION: u32 = 0x0000_0001;
pub const DM_PAPERSIZE: u32 = 0x0000_0002;
pub const DM_COPIES: u32 = 0x0000_0100;
pub const DM_PRINTQUALITY: u32 = 0x0000_0400;
pub const DM_COLOR: u32 = 0x0000_0800;
pub const DM_DUPLEX: u32 = 0x0000_1000;
pub const DM_YRESOLUTION: u32 = 0x0000_2000;
pub const DM_COLLATE: u32 = 0x0000_8000;
pub const DM_MEDIATYPE: u32 = 0x0200_0000;

// DEVMODEW byte offsets
const OFF_DEVICE_NAME: usize = 0;
const DEVICE_NAME_LEN: usize = 32;
const OFF_SPEC_VERSION: usize = 64;
const OFF_SIZE: usize = 68;
const OFF_DRIVER_EXTRA: usize = 70;
const OFF_FIELDS: usize = 72;
const OFF_ORIENTATION: usize = 76;
const OFF_PAPER_SIZE: usize = 78;
const OFF_COPIES: usize = 86;
const OFF_PRINT_QUALITY: usize = 90;
const OFF_COLOR: usize = 92;
const OFF_DUPLEX: usize = 94;
const OFF_Y_RESOLUTION: usize = 96;
const OFF_COLLATE: usize = 100;
const OFF_MEDIA_TYPE: usize = 196;

/// Smallest buffer holding the fixed header up to and including `dmFields`
pub(crate) const DEVMODE_MIN_LEN: usize = OFF_FIELDS + 4;

/// Presence bit, offset and width of each setting
const SETTING_LAYOUT: [(u32, usize, usize); 9] = [
    (DM_ORIENTATION, OFF_ORIENTATION, 2),
    (DM_PAPERSIZE, OFF_PAPER_SIZE, 2),
    (DM_COPIES, OFF_COPIES, 2),
    (DM_PRINTQUALITY, OFF_PRINT_QUALITY, 2),
    (DM_COLOR, OFF_COLOR, 2),
    (DM_DUPLEX, OFF_DUPLEX, 2),
    (DM_YRESOLUTION, OFF_Y_RESOLUTION, 2),
    (DM_COLLATE, OFF_COLLATE, 2),
    (DM_MEDIATYPE, OFF_MEDIA_TYPE, 4),
];

/// The subset of `DEVMODEW` this crate reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevMode {
    pub device_name: String,
    pub spec_version: u16,
    pub size: u16,
    pub driver_extra: u16,
    pub fields: u32,
    pub orientation: i16,
    pub paper_size: i16,
    pub copies: i16,
    pub print_quality: i16,
    pub color: i16,
    pub duplex: i16,
    pub y_resolution: i16,
    pub collate: i16,
    pub media_type: u32,
}

impl DevMode {
    /// Decode a device mode from the buffer `DocumentPropertiesW` filled.
    ///
    /// Only the first `dmSize` bytes are treated as the public record (the
    /// driver's private data follows). A setting that does not fit inside
    /// the record reads as zero and loses its presence bit, so an older,
    /// shorter `DEVMODEW` never reports bytes from the private area.
    pub fn decode(buf: &[u8]) -> SpoolResult<Self> {
        if buf.len() < DEVMODE_MIN_LEN {
            return Err(SpoolError::Decode(format!(
                "DEVMODE needs {DEVMODE_MIN_LEN} bytes, buffer has {}",
                buf.len()
            )));
        }

        let mut name = Vec::with_capacity(DEVICE_NAME_LEN);
        for i in 0..DEVICE_NAME_LEN {
            match read_u16(buf, OFF_DEVICE_NAME + i * 2)? {
                0 => break,
                unit => name.push(unit),
            }
        }

        let size = read_u16(buf, OFF_SIZE)?;
        let limit = match usize::from(size) {
            0 => buf.len(),
            n => n.min(buf.len()),
        };
        let fits = |offset: usize, width: usize| offset + width <= limit;

        let fields = SETTING_LAYOUT
            .iter()
            .filter(|(_, offset, width)| !fits(*offset, *width))
            .fold(read_u32(buf, OFF_FIELDS)?, |fields, (bit, ..)| fields & !bit);

        let short = |offset: usize| -> SpoolResult<i16> {
            if fits(offset, 2) {
                read_i16(buf, offset)
            } else {
                Ok(0)
            }
        };

        Ok(Self {
            device_name: String::from_utf16_lossy(&name),
            spec_version: read_u16(buf, OFF_SPEC_VERSION)?,
            size,
            driver_extra: read_u16(buf, OFF_DRIVER_EXTRA)?,
            fields,
            orientation: short(OFF_ORIENTATION)?,
            paper_size: short(OFF_PAPER_SIZE)?,
            copies: short(OFF_COPIES)?,
            print_quality: short(OFF_PRINT_QUALITY)?,
            color: short(OFF_COLOR)?,
            duplex: short(OFF_DUPLEX)?,
            y_resolution: short(OFF_Y_RESOLUTION)?,
            collate: short(OFF_COLLATE)?,
            media_type: if fits(OFF_MEDIA_TYPE, 4) {
                read_u32(buf, OFF_MEDIA_TYPE)?
            } else {
                0
            },
        })
    }

    fn field(&self, bit: u32, value: i32) -> Option<i32> {
        (self.fields & bit != 0).then_some(value)
    }

    /// Settings whose presence bit is set
    pub fn settings(&self) -> DefaultSettings {
        DefaultSettings {
            paper_size: self.field(DM_PAPERSIZE, self.paper_size.into()),
            media_type: self.field(DM_MEDIATYPE, self.media_type as i32),
            y_resolution: self.field(DM_YRESOLUTION, self.y_resolution.into()),
            print_quality: self.field(DM_PRINTQUALITY, self.print_quality.into()),
            copies: self.field(DM_COPIES, self.copies.into()),
            orientation: self.field(DM_ORIENTATION, self.orientation.into()),
            duplex: self.field(DM_DUPLEX, self.duplex.into()),
            collate: self.field(DM_COLLATE, self.collate.into()),
            color: self.field(DM_COLOR, self.color.into()),
        }
    }
}

/// A printer's default settings. `None` means the driver does not report the
/// setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DefaultSettings {
    pub paper_size: Option<i32>,
    pub media_type: Option<i32>,
    pub y_resolution: Option<i32>,
    pub print_quality: Option<i32>,
    pub copies: Option<i32>,
    pub orientation: Option<i32>,
    pub duplex: Option<i32>,
    pub collate: Option<i32>,
    pub color: Option<i32>,
}

impl DefaultSettings {
    /// Replace a paper size the printer does not list with its first listed
    /// paper. No-op when the paper size is unset or the list is empty.
    pub fn with_paper_fallback(mut self, papers: &[i32]) -> Self {
        if let (Some(current), Some(&first)) = (self.paper_size, papers.first())
            && !papers.contains(&current)
        {
            warn!(
                recorded = current,
                substitute = first,
                "device mode paper size not offered by printer"
            );
            self.paper_size = Some(first);
        }
        self
    }

    /// Flatten in the fixed order paper size, media type, Y resolution,
    /// print quality, copies, orientation, duplex, collate, color. Missing
    /// settings become [`NO_DEFAULT`].
    pub fn to_array(&self) -> [i32; 9] {
        [
            self.paper_size,
            self.media_type,
            self.y_resolution,
            self.print_quality,
            self.copies,
            self.orientation,
            self.duplex,
            self.collate,
            self.color,
        ]
        .map(|v| v.unwrap_or(NO_DEFAULT))
    }
}
