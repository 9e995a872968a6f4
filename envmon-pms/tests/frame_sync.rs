//! Stream-level tests for frame synchronization.
//!
//! The unit tests cover decode and aggregation; these exercise the
//! synchronizer against stream shapes a live serial port produces: noise
//! before the first frame, back-to-back frames, and a stream that stalls
//! mid-frame (where the synchronizer must keep blocking rather than hand
//! back a partial frame).

use std::io::{self, Cursor, Read};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use envmon_pms::frame::{FRAME_LEN, PAYLOAD_LEN, SIGNATURE_1, SIGNATURE_2, read_frame};

fn frame_bytes(fill: u8) -> Vec<u8> {
    let mut bytes = vec![SIGNATURE_1, SIGNATURE_2];
    bytes.extend_from_slice(&[fill; PAYLOAD_LEN]);
    bytes
}

/// Blocking byte source fed from a channel, standing in for a serial port.
///
/// `read` blocks until the writer sends another byte; once the writer hangs
/// up, reads report EOF.
struct ChannelReader(mpsc::Receiver<u8>);

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.0.recv() {
            Ok(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            Err(_) => Ok(0),
        }
    }
}

#[test]
fn noise_prefixed_stream_yields_the_embedded_frame() {
    let mut bytes = vec![0x13, 0x37, SIGNATURE_2, 0x00, SIGNATURE_1, 0x00];
    bytes.extend_from_slice(&frame_bytes(0x5A));

    let mut cursor = Cursor::new(bytes);
    let frame = read_frame(&mut cursor).unwrap();

    assert_eq!(frame.as_bytes()[..2], [SIGNATURE_1, SIGNATURE_2]);
    assert_eq!(frame.as_bytes()[2..], [0x5A; PAYLOAD_LEN]);
}

#[test]
fn back_to_back_frames_parse_in_order() {
    let mut bytes = frame_bytes(0x01);
    bytes.extend_from_slice(&frame_bytes(0x02));

    let mut cursor = Cursor::new(bytes);
    let first = read_frame(&mut cursor).unwrap();
    let second = read_frame(&mut cursor).unwrap();

    assert_eq!(first.as_bytes()[2], 0x01);
    assert_eq!(second.as_bytes()[2], 0x02);
}

#[test]
fn truncated_frame_blocks_until_more_bytes_arrive() {
    let (byte_tx, byte_rx) = mpsc::channel();
    let (result_tx, result_rx) = mpsc::channel();

    thread::spawn(move || {
        let mut reader = ChannelReader(byte_rx);
        let result = read_frame(&mut reader);
        let _ = result_tx.send(result.map(|f| *f.as_bytes()));
    });

    // Signature plus ten payload bytes, then the stream goes silent.
    for byte in [SIGNATURE_1, SIGNATURE_2].into_iter().chain([0x42u8; 10]) {
        byte_tx.send(byte).unwrap();
    }

    // No partial frame may come back while the stream is stalled.
    assert!(
        result_rx
            .recv_timeout(Duration::from_millis(500))
            .is_err(),
        "synchronizer returned on a truncated frame"
    );

    // Delivering the rest of the payload releases the blocked read.
    for byte in [0x24u8; PAYLOAD_LEN - 10] {
        byte_tx.send(byte).unwrap();
    }

    let frame = result_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("synchronizer did not finish after the frame completed")
        .expect("completed frame failed to parse");
    assert_eq!(frame.len(), FRAME_LEN);
    assert_eq!(frame[2], 0x42);
    assert_eq!(frame[12], 0x24);
}
