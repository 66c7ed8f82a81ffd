//! Binary encoding shared by every drivehud wire format
//!
//! Payloads are bincode with fixed-width little-endian integers. Stream
//! transports prefix each payload with its length as a little-endian `u32`.

use std::io::{Read, Write};

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{TransportError, TransportResult};

/// Upper bound for a single framed packet
pub const MAX_PACKET_SIZE: usize = 1024 * 1024;

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_PACKET_SIZE as u64)
}

/// Serialize a value into a standalone payload
pub fn encode<T: Serialize>(value: &T) -> TransportResult<Vec<u8>> {
    Ok(wire_options().serialize(value)?)
}

/// Deserialize a standalone payload; trailing bytes are rejected
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> TransportResult<T> {
    Ok(wire_options().reject_trailing_bytes().deserialize(bytes)?)
}

/// Write one length-prefixed packet
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, value: &T) -> TransportResult<()> {
    let payload = encode(value)?;
    if payload.len() > MAX_PACKET_SIZE {
        return Err(TransportError::MessageTooLarge {
            size: payload.len(),
            max_size: MAX_PACKET_SIZE,
        });
    }
    let len = payload.len() as u32;

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read one length-prefixed packet
///
/// End of stream (including a zero-length read at a packet boundary)
/// surfaces as [`TransportError::ConnectionClosed`].
pub fn read_frame<R: Read, T: DeserializeOwned>(
    reader: &mut R,
    max_size: usize,
) -> TransportResult<T> {
    let mut header = [0u8; 4];
    reader.read_exact(&mut header)?;
    let len = u32::from_le_bytes(header) as usize;

    if len == 0 {
        return Err(TransportError::InvalidMessage("empty packet".to_string()));
    }
    if len > max_size {
        return Err(TransportError::MessageTooLarge {
            size: len,
            max_size,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    decode(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    enum Sample {
        Ping(u32),
        Named { id: u8, label: String },
    }

    #[test]
    fn test_frame_header_is_little_endian_length() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Sample::Ping(7)).unwrap();

        let len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(len, buf.len() - 4);
        // fixint: u32 variant tag + u32 payload
        assert_eq!(len, 8);
    }

    #[test]
    fn test_consecutive_frames_read_in_order() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Sample::Ping(1)).unwrap();
        write_frame(
            &mut buf,
            &Sample::Named {
                id: 2,
                label: "secondary".to_string(),
            },
        )
        .unwrap();

        let mut cursor = Cursor::new(buf);
        let first: Sample = read_frame(&mut cursor, MAX_PACKET_SIZE).unwrap();
        let second: Sample = read_frame(&mut cursor, MAX_PACKET_SIZE).unwrap();
        assert_eq!(first, Sample::Ping(1));
        assert_eq!(
            second,
            Sample::Named {
                id: 2,
                label: "secondary".to_string()
            }
        );

        let eof = read_frame::<_, Sample>(&mut cursor, MAX_PACKET_SIZE);
        assert!(matches!(eof, Err(TransportError::ConnectionClosed)));
    }

    #[test]
    fn test_truncated_payload_is_connection_closed() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Sample::Ping(1)).unwrap();
        buf.truncate(buf.len() - 2);

        let result = read_frame::<_, Sample>(&mut Cursor::new(buf), MAX_PACKET_SIZE);
        assert!(matches!(result, Err(TransportError::ConnectionClosed)));
    }

    #[test]
    fn test_oversized_header_is_rejected_before_reading() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(64u32).to_le_bytes());
        buf.extend_from_slice(&[0u8; 64]);

        let result = read_frame::<_, Sample>(&mut Cursor::new(buf), 16);
        assert!(matches!(
            result,
            Err(TransportError::MessageTooLarge { size: 64, max_size: 16 })
        ));
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let mut payload = encode(&Sample::Ping(3)).unwrap();
        payload.push(0xFF);
        assert!(matches!(
            decode::<Sample>(&payload),
            Err(TransportError::Serialization(_))
        ));
    }
}
