//! Wrapping serialized messages into a transport frame

use crate::transport::{END_MARKER, ESCAPE, ESCAPE_SEQUENCE, START_SEQUENCE};
use bytes::{BufMut, Bytes, BytesMut};
use sml_codec::crc16;

/// Wrap one or more serialized messages into a single transport frame
///
/// Sentinel runs inside the payload are escaped, the payload is zero-padded
/// to a multiple of four bytes, and the end sequence carries the padding
/// count and the CRC16 over everything before it.
pub fn box_messages<B: AsRef<[u8]>>(buffers: &[B]) -> Bytes {
    let size: usize = buffers.iter().map(|b| b.as_ref().len()).sum();
    let mut out = BytesMut::with_capacity(size + START_SEQUENCE.len() + 12);
    out.put_slice(&START_SEQUENCE);

    let mut run = 0usize;
    for buffer in buffers {
        for &byte in buffer.as_ref() {
            out.put_u8(byte);
            if byte == ESCAPE {
                run += 1;
                if run == ESCAPE_SEQUENCE.len() {
                    out.put_slice(&ESCAPE_SEQUENCE);
                    run = 0;
                }
            } else {
                run = 0;
            }
        }
    }

    let pad_count = (4 - out.len() % 4) % 4;
    out.put_bytes(0x00, pad_count);

    out.put_slice(&ESCAPE_SEQUENCE);
    out.put_u8(END_MARKER);
    out.put_u8(pad_count as u8);
    let crc = crc16::checksum(&out);
    out.put_u16(crc);

    log::trace!("boxed {} payload bytes into {} bytes", size, out.len());
    out.freeze()
}
