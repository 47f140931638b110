//! E1.31 (sACN) packet assembly.
//!
//! The layout is fixed, so packets are built by direct byte-offset writes
//! rather than a struct serializer.

/// UDP port sACN receivers listen on.
pub const SACN_PORT: u16 = 5568;

/// Largest possible packet: full 126-byte header plus 512 channels.
pub const MAX_PACKET_SIZE: usize = 638;

/// Bytes preceding the DMX data.
pub const HEADER_LENGTH: usize = 126;

/// ACN packet identifier carried at offset 4.
pub const ACN_PACKET_IDENTIFIER: [u8; 12] = *b"ASC-E1.17\0\0\0";

const ROOT_PREAMBLE_SIZE: u16 = 0x0010;
const ROOT_POSTAMBLE_SIZE: u16 = 0x0000;
const ROOT_VECTOR: u32 = 0x0000_0004;
const FRAMING_VECTOR: u32 = 0x0000_0002;
const DMP_VECTOR: u8 = 0x02;
const ADDRESS_AND_DATA_TYPE: u8 = 0xa1;
const DMX_START_CODE: u8 = 0x00;

/// Default sACN priority.
pub const DEFAULT_PRIORITY: u8 = 100;

/// Options-field bit signalling stream termination.
pub const STREAM_TERMINATED: u8 = 1 << 6;

/// Encode a PDU flags+length field: high nibble `0x7`, low 12 bits length,
/// big-endian.
pub fn flags_and_length(length: u16) -> [u8; 2] {
    let value = 0x7000 | (length & 0x0fff);
    value.to_be_bytes()
}

/// Assemble one E1.31 data packet.
///
/// `data` is the DMX channel payload (at most 512 bytes); the returned packet
/// is `HEADER_LENGTH + data.len()` bytes.
pub fn build_packet(
    cid: &[u8; 16],
    source_name: &str,
    priority: u8,
    sequence: u8,
    options: u8,
    universe: u16,
    data: &[u8],
) -> Vec<u8> {
    debug_assert!(data.len() <= 512);
    let data_len = data.len() as u16;
    let mut packet = vec![0u8; HEADER_LENGTH + data.len()];

    // Root layer preamble.
    packet[0..2].copy_from_slice(&ROOT_PREAMBLE_SIZE.to_be_bytes());
    packet[2..4].copy_from_slice(&ROOT_POSTAMBLE_SIZE.to_be_bytes());
    packet[4..16].copy_from_slice(&ACN_PACKET_IDENTIFIER);

    // Root layer PDU.
    packet[16..18].copy_from_slice(&flags_and_length(data_len + 110));
    packet[18..22].copy_from_slice(&ROOT_VECTOR.to_be_bytes());
    packet[22..38].copy_from_slice(cid);

    // Framing layer PDU.
    packet[38..40].copy_from_slice(&flags_and_length(data_len + 88));
    packet[40..44].copy_from_slice(&FRAMING_VECTOR.to_be_bytes());
    let name_bytes = source_name.as_bytes();
    let name_len = name_bytes.len().min(64);
    packet[44..44 + name_len].copy_from_slice(&name_bytes[..name_len]);

    packet[108] = priority;
    // Sync address stays zero (109..111).
    packet[111] = sequence;
    packet[112] = options;
    packet[113..115].copy_from_slice(&universe.to_be_bytes());

    // DMP layer.
    packet[115] = 0x72;
    packet[116] = 0x0b;
    packet[117] = DMP_VECTOR;
    packet[118] = ADDRESS_AND_DATA_TYPE;
    // First property address = 0 (119..121), address increment = 1 (121..123).
    packet[121..123].copy_from_slice(&1u16.to_be_bytes());
    packet[123..125].copy_from_slice(&(data_len + 1).to_be_bytes());
    packet[125] = DMX_START_CODE;

    packet[HEADER_LENGTH..].copy_from_slice(data);
    packet
}

#[cfg(test)]
#[path = "../../tests/unit/sacn/packet.rs"]
mod tests;
