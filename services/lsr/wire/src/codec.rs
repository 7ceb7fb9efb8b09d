//! Frame encoding and decoding.
//!
//! A frame is a fixed 8-byte header (body length and CRC-32 of the body)
//! followed by the CBOR encoding of a [`Packet`].

use crate::error::WireError;
use crate::packet::Packet;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the fixed frame header
pub const FRAME_HEADER_SIZE: usize = 8;

/// Maximum body size (1 MiB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Encode a packet into a single frame
pub fn encode(packet: &Packet) -> Result<Bytes, WireError> {
    let mut body = Vec::new();
    ciborium::into_writer(packet, &mut body).map_err(|e| WireError::Encode(e.to_string()))?;

    if body.len() > MAX_FRAME_SIZE {
        return Err(WireError::Size(body.len()));
    }

    let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + body.len());
    buf.put_u32(body.len() as u32);
    buf.put_u32(crc32fast::hash(&body));
    buf.put_slice(&body);

    Ok(buf.freeze())
}

/// Decode exactly one frame into a packet
pub fn decode(mut frame: &[u8]) -> Result<Packet, WireError> {
    if frame.len() < FRAME_HEADER_SIZE {
        return Err(WireError::Incomplete);
    }

    let body_len = frame.get_u32() as usize;
    if body_len > MAX_FRAME_SIZE {
        return Err(WireError::Size(body_len));
    }

    let expected = frame.get_u32();
    if frame.len() < body_len {
        return Err(WireError::Incomplete);
    }
    if frame.len() > body_len {
        return Err(WireError::Trailing(frame.len() - body_len));
    }

    let actual = crc32fast::hash(frame);
    if actual != expected {
        return Err(WireError::Checksum { expected, actual });
    }

    ciborium::from_reader::<Packet, _>(frame).map_err(|e| WireError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Address, LinkSet};
    use crate::packet::LinkStateAdvertisement;

    fn sample_routing_packet() -> Packet {
        let mut links = LinkSet::new();
        links.insert(Address::from("B"), 1);
        links.insert(Address::from("C"), 4);
        let lsa = LinkStateAdvertisement::new(Address::from("A"), 7, links);
        Packet::routing(Address::from("A"), Address::from("B"), lsa)
    }

    #[test]
    fn test_encode_decode_routing_packet() {
        let packet = sample_routing_packet();
        let frame = encode(&packet).unwrap();

        assert!(frame.len() > FRAME_HEADER_SIZE);
        assert_eq!(decode(&frame).unwrap(), packet);
    }

    #[test]
    fn test_decode_data_packet_keeps_payload() {
        let packet = Packet::data(
            Address::from("A"),
            Address::from("C"),
            Bytes::from_static(b"\x00\x01payload"),
        );
        let frame = encode(&packet).unwrap();

        match decode(&frame).unwrap() {
            Packet::Data(data) => assert_eq!(data.payload.as_ref(), b"\x00\x01payload"),
            other => panic!("unexpected packet {:?}", other),
        }
    }

    #[test]
    fn test_truncated_frame() {
        let frame = encode(&sample_routing_packet()).unwrap();

        assert_eq!(decode(&frame[..4]), Err(WireError::Incomplete));
        assert_eq!(decode(&frame[..frame.len() - 1]), Err(WireError::Incomplete));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut frame = encode(&sample_routing_packet()).unwrap().to_vec();
        frame.extend_from_slice(&[0, 0]);

        assert_eq!(decode(&frame), Err(WireError::Trailing(2)));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut frame = encode(&sample_routing_packet()).unwrap().to_vec();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;

        assert!(matches!(decode(&frame), Err(WireError::Checksum { .. })));
    }

    #[test]
    fn test_garbage_body_with_valid_checksum() {
        let body = b"not cbor at all";
        let mut frame = Vec::new();
        frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
        frame.extend_from_slice(&crc32fast::hash(body).to_be_bytes());
        frame.extend_from_slice(body);

        assert!(matches!(decode(&frame), Err(WireError::Decode(_))));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&((MAX_FRAME_SIZE as u32) + 1).to_be_bytes());
        frame.extend_from_slice(&0u32.to_be_bytes());

        assert_eq!(decode(&frame), Err(WireError::Size(MAX_FRAME_SIZE + 1)));
    }
}
