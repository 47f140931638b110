use super::*;

fn sample_packet(data: &[u8]) -> Vec<u8> {
    let cid = [7u8; 16];
    build_packet(&cid, "pixelcast", DEFAULT_PRIORITY, 42, 0, 258, data)
}

#[test]
fn flags_and_length_masks_twelve_bits() {
    assert_eq!(flags_and_length(0x020b), [0x72, 0x0b]);
    assert_eq!(flags_and_length(622), [0x72, 0x6e]);
    // Length is masked to 12 bits.
    assert_eq!(flags_and_length(0xf123), [0x71, 0x23]);
}

#[test]
fn header_layout() {
    let data = [0u8; 512];
    let packet = sample_packet(&data);
    assert_eq!(packet.len(), HEADER_LENGTH + 512);
    assert!(packet.len() <= MAX_PACKET_SIZE);

    // Preamble, postamble, identifier.
    assert_eq!(&packet[0..2], &[0x00, 0x10]);
    assert_eq!(&packet[2..4], &[0x00, 0x00]);
    assert_eq!(&packet[4..16], b"ASC-E1.17\0\0\0");

    // Root PDU: length = 512 + 110 = 622.
    assert_eq!(&packet[16..18], &flags_and_length(622));
    assert_eq!(&packet[18..22], &[0x00, 0x00, 0x00, 0x04]);
    assert_eq!(&packet[22..38], &[7u8; 16]);

    // Framing PDU: length = 512 + 88 = 600.
    assert_eq!(&packet[38..40], &flags_and_length(600));
    assert_eq!(&packet[40..44], &[0x00, 0x00, 0x00, 0x02]);
    assert_eq!(&packet[44..53], b"pixelcast");
    assert!(packet[53..108].iter().all(|&b| b == 0), "name null-padded");

    assert_eq!(packet[108], DEFAULT_PRIORITY);
    assert_eq!(&packet[109..111], &[0x00, 0x00]);
    assert_eq!(packet[111], 42);
    assert_eq!(packet[112], 0x00);
    // Universe 258 = 0x0102, big-endian.
    assert_eq!(&packet[113..115], &[0x01, 0x02]);

    // DMP layer.
    assert_eq!(&packet[115..117], &[0x72, 0x0b]);
    assert_eq!(packet[117], 0x02);
    assert_eq!(packet[118], 0xa1);
    assert_eq!(&packet[119..121], &[0x00, 0x00]);
    assert_eq!(&packet[121..123], &[0x00, 0x01]);
    // Property value count = 512 + 1.
    assert_eq!(&packet[123..125], &513u16.to_be_bytes());
    assert_eq!(packet[125], 0x00);
}

#[test]
fn dmx_payload_is_copied_verbatim() {
    let mut data = [0u8; 512];
    data[0] = 0xaa;
    data[511] = 0x55;
    let packet = sample_packet(&data);
    assert_eq!(packet[HEADER_LENGTH], 0xaa);
    assert_eq!(packet[HEADER_LENGTH + 511], 0x55);
}

#[test]
fn short_payload_shrinks_packet_and_lengths() {
    let data = [1u8, 2, 3];
    let packet = sample_packet(&data);
    assert_eq!(packet.len(), HEADER_LENGTH + 3);
    assert_eq!(&packet[16..18], &flags_and_length(113));
    assert_eq!(&packet[38..40], &flags_and_length(91));
    assert_eq!(&packet[123..125], &4u16.to_be_bytes());
}

#[test]
fn terminated_option_bit() {
    let cid = [0u8; 16];
    let packet = build_packet(&cid, "x", 100, 1, STREAM_TERMINATED, 1, &[0u8; 1]);
    assert_eq!(packet[112], 0x40);
}

#[test]
fn long_source_name_is_truncated() {
    let cid = [0u8; 16];
    let name = "n".repeat(100);
    let packet = build_packet(&cid, &name, 100, 1, 0, 1, &[]);
    assert_eq!(&packet[44..108], "n".repeat(64).as_bytes());
}
