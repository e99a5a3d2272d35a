//! Windows ICO container packing
//!
//! Pure functions for bundling several PNG-encoded bitmaps into a single
//! `.ico` file and for reading the directory of an existing one back.
//!
//! Layout of the produced buffer:
//!
//! ```text
//! +--------------------+  offset 0
//! | header (6 bytes)   |  reserved=0, type=1, count=N
//! +--------------------+  offset 6
//! | entry 0 (16 bytes) |
//! | ...                |
//! | entry N-1          |
//! +--------------------+  offset 6 + 16*N
//! | payload 0          |
//! | ...                |
//! | payload N-1        |
//! +--------------------+
//! ```

use serde::Serialize;
use thiserror::Error;

/// Size in bytes of the ICONDIR header
pub const HEADER_LEN: usize = 6;

/// Size in bytes of one ICONDIRENTRY
pub const ENTRY_LEN: usize = 16;

/// Largest edge the one-byte width/height fields can describe (stored as 0)
pub const MAX_ICON_SIZE: u32 = 256;

/// Default favicon sizes
pub const DEFAULT_SIZES: [u32; 3] = [16, 32, 48];

const RESOURCE_TYPE_ICON: u16 = 1;
const BITS_PER_PIXEL: u16 = 32;
const COLOR_PLANES: u16 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IcoError {
    #[error("Invalid icon size {0}: must be between 1 and 256 pixels")]
    InvalidSize(u32),

    #[error("Too many images for one icon: {0}")]
    TooManyImages(usize),

    #[error("Icon payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Not an icon file")]
    NotAnIcon,

    #[error("Icon data truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// One bitmap to be stored in the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcoImage {
    /// Edge length in pixels; images are square
    pub size: u32,
    /// Encoded image bytes (PNG)
    pub data: Vec<u8>,
}

impl IcoImage {
    pub fn new(size: u32, data: Vec<u8>) -> Self {
        Self { size, data }
    }
}

/// A directory entry read back from an ICO buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IcoEntry {
    pub width: u32,
    pub height: u32,
    pub color_count: u8,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub length: u32,
    pub offset: u32,
}

/// Encode an edge length into the one-byte directory field.
///
/// 256 wraps to 0, which readers interpret as 256.
fn encode_dimension(size: u32) -> Result<u8, IcoError> {
    match size {
        0 => Err(IcoError::InvalidSize(size)),
        MAX_ICON_SIZE => Ok(0),
        s if s < MAX_ICON_SIZE => Ok(s as u8),
        s => Err(IcoError::InvalidSize(s)),
    }
}

fn decode_dimension(byte: u8) -> u32 {
    if byte == 0 {
        MAX_ICON_SIZE
    } else {
        u32::from(byte)
    }
}

/// Pack the images into an ICO container.
///
/// Entries are written in the order given, and each payload follows the
/// directory in that same order. Payload contents are not inspected.
pub fn pack_ico(images: &[IcoImage]) -> Result<Vec<u8>, IcoError> {
    let count =
        u16::try_from(images.len()).map_err(|_| IcoError::TooManyImages(images.len()))?;

    let directory_len = HEADER_LEN + ENTRY_LEN * images.len();
    let payload_len: usize = images.iter().map(|image| image.data.len()).sum();

    let mut buffer = Vec::with_capacity(directory_len + payload_len);

    buffer.extend_from_slice(&0u16.to_le_bytes());
    buffer.extend_from_slice(&RESOURCE_TYPE_ICON.to_le_bytes());
    buffer.extend_from_slice(&count.to_le_bytes());

    let mut offset = directory_len;
    for image in images {
        let dimension = encode_dimension(image.size)?;
        let length = u32::try_from(image.data.len())
            .map_err(|_| IcoError::PayloadTooLarge(image.data.len()))?;
        let entry_offset =
            u32::try_from(offset).map_err(|_| IcoError::PayloadTooLarge(offset))?;

        buffer.push(dimension); // width
        buffer.push(dimension); // height
        buffer.push(0); // palette size, none for 32bpp
        buffer.push(0); // reserved
        buffer.extend_from_slice(&COLOR_PLANES.to_le_bytes());
        buffer.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
        buffer.extend_from_slice(&length.to_le_bytes());
        buffer.extend_from_slice(&entry_offset.to_le_bytes());

        offset += image.data.len();
    }

    for image in images {
        buffer.extend_from_slice(&image.data);
    }

    Ok(buffer)
}

/// Absolute payload offsets for the given payload lengths.
///
/// Entry `i` starts at `6 + 16*N + sum(len[0..i])`.
pub fn payload_offsets(lengths: &[usize]) -> Vec<usize> {
    let mut offset = HEADER_LEN + ENTRY_LEN * lengths.len();
    lengths
        .iter()
        .map(|len| {
            let current = offset;
            offset += len;
            current
        })
        .collect()
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn ensure_len(bytes: &[u8], expected: usize) -> Result<(), IcoError> {
    if bytes.len() < expected {
        return Err(IcoError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Parse the header and directory of an ICO buffer.
///
/// Also checks that every entry's payload lies inside the buffer.
pub fn read_directory(bytes: &[u8]) -> Result<Vec<IcoEntry>, IcoError> {
    ensure_len(bytes, HEADER_LEN)?;

    if read_u16(bytes, 0) != 0 || read_u16(bytes, 2) != RESOURCE_TYPE_ICON {
        return Err(IcoError::NotAnIcon);
    }

    let count = read_u16(bytes, 4) as usize;
    ensure_len(bytes, HEADER_LEN + ENTRY_LEN * count)?;

    let mut entries = Vec::with_capacity(count);
    for index in 0..count {
        let at = HEADER_LEN + ENTRY_LEN * index;
        let entry = IcoEntry {
            width: decode_dimension(bytes[at]),
            height: decode_dimension(bytes[at + 1]),
            color_count: bytes[at + 2],
            planes: read_u16(bytes, at + 4),
            bits_per_pixel: read_u16(bytes, at + 6),
            length: read_u32(bytes, at + 8),
            offset: read_u32(bytes, at + 12),
        };
        ensure_len(bytes, entry.offset as usize + entry.length as usize)?;
        entries.push(entry);
    }

    Ok(entries)
}

/// Borrow the payload of one directory entry.
pub fn entry_payload<'a>(bytes: &'a [u8], entry: &IcoEntry) -> Result<&'a [u8], IcoError> {
    let start = entry.offset as usize;
    let end = start + entry.length as usize;
    ensure_len(bytes, end)?;
    Ok(&bytes[start..end])
}
