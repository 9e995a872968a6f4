//! Wire protocol for PMS-family particulate sensors.
//!
//! The sensor streams fixed-length binary frames over serial. Every frame
//! opens with a two-byte signature, followed by 28 payload bytes holding
//! big-endian 16-bit readings. The stream may be mid-frame at any time
//! (device power-up, buffer desync), so the reader scans byte-by-byte for
//! the signature before committing to a payload read.

use std::io::{self, Read};

/// First byte of the frame signature ('B').
pub const SIGNATURE_1: u8 = 0x42;

/// Second byte of the frame signature ('M').
pub const SIGNATURE_2: u8 = 0x4D;

/// Payload bytes following the two signature bytes.
pub const PAYLOAD_LEN: usize = 28;

/// Total frame length as returned by the synchronizer.
pub const FRAME_LEN: usize = 2 + PAYLOAD_LEN;

/// One decoded byte-pair and the labels it publishes under.
///
/// The last six size bins appear on the wire once but are published under
/// two naming schemes (the vendor datasheet's and the integration
/// snippet's), so an entry carries one or two labels and the decode logic
/// stays single-sourced.
struct FieldDef {
    offset: usize,
    labels: &'static [&'static str],
}

/// Byte offsets and labels for every reading carried in a frame.
const FIELDS: &[FieldDef] = &[
    FieldDef { offset: 4, labels: &["apm10"] },
    FieldDef { offset: 6, labels: &["apm25"] },
    FieldDef { offset: 8, labels: &["apm100"] },
    FieldDef { offset: 10, labels: &["pm10"] },
    FieldDef { offset: 12, labels: &["pm25"] },
    FieldDef { offset: 14, labels: &["pm100"] },
    FieldDef { offset: 16, labels: &["pm0.3", "gt03um"] },
    FieldDef { offset: 18, labels: &["pm0.5", "gt05um"] },
    FieldDef { offset: 20, labels: &["pm1.0", "gt10um"] },
    FieldDef { offset: 22, labels: &["pm2.5", "gt25um"] },
    FieldDef { offset: 24, labels: &["pm5.0", "gt50um"] },
    FieldDef { offset: 26, labels: &["pm10.0", "gt100um"] },
];

/// One signature-aligned 30-byte frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Raw frame bytes, signature included.
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Decode every labeled reading, in wire order.
    ///
    /// Aliased byte-pairs yield one `(label, value)` pair per label.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, u16)> + '_ {
        FIELDS.iter().flat_map(move |field| {
            let value = self.word_at(field.offset);
            field.labels.iter().map(move |label| (*label, value))
        })
    }

    fn word_at(&self, offset: usize) -> u16 {
        u16::from(self.0[offset]) * 256 + u16::from(self.0[offset + 1])
    }
}

/// Every label a frame publishes under, in decode order.
pub fn field_labels() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().flat_map(|field| field.labels.iter().copied())
}

/// Read one signature-aligned frame from `reader`.
///
/// Scans byte-by-byte until `SIGNATURE_1` is seen, checks the following
/// byte against `SIGNATURE_2`, then reads the remaining payload. On a
/// signature mismatch both candidate bytes are discarded and scanning
/// resumes at the byte after them; the mismatched second byte is never
/// reconsidered as a first signature byte.
///
/// Blocks for as long as the underlying reader does. A silent or
/// signature-free stream never returns here; starvation is bounded only by
/// the transport's own per-read timeout, which surfaces as an `Err`.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Frame> {
    loop {
        if read_byte(reader)? != SIGNATURE_1 {
            continue;
        }
        if read_byte(reader)? != SIGNATURE_2 {
            continue;
        }

        let mut frame = [0u8; FRAME_LEN];
        frame[0] = SIGNATURE_1;
        frame[1] = SIGNATURE_2;
        reader.read_exact(&mut frame[2..])?;
        return Ok(Frame(frame));
    }
}

fn read_byte<R: Read>(reader: &mut R) -> io::Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}
