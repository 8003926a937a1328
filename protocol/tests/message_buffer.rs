use netmsg::{
    BufferError, BufferLimits, INITIAL_BUFFER_POSITION, MessageBuffer, NETWORKMESSAGE_MAXSIZE,
    Position,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rewound(mut msg: MessageBuffer) -> MessageBuffer {
    msg.set_buffer_position(INITIAL_BUFFER_POSITION);
    msg
}

#[test]
fn byte_roundtrip() {
    init_logging();
    let mut msg = MessageBuffer::new();
    msg.add_byte(0x64);

    let mut msg = rewound(msg);
    assert_eq!(msg.get_byte(), 0x64);
}

#[test]
fn string_roundtrip() {
    init_logging();
    let mut msg = MessageBuffer::new();
    msg.add_string("TestString");

    let mut msg = rewound(msg);
    assert_eq!(msg.get_string_lossy(), "TestString");
}

#[test]
fn empty_string_roundtrip() {
    init_logging();
    let mut msg = MessageBuffer::new();
    msg.add_string("");

    let mut msg = rewound(msg);
    assert_eq!(msg.get_string(), Vec::<u8>::new());
    assert_eq!(msg.length(), 2);
}

#[test]
fn oversized_string_leaves_buffer_unchanged() {
    init_logging();
    let mut msg = MessageBuffer::new();
    let oversized = vec![b'a'; NETWORKMESSAGE_MAXSIZE + 1];
    msg.add_string(&oversized);
    assert_eq!(msg.length(), 0);
    assert_eq!(msg.buffer_position(), INITIAL_BUFFER_POSITION);

    let mut msg = rewound(msg);
    assert!(msg.get_string().is_empty());
}

#[test]
fn string_one_past_configured_ceiling_is_field_error() {
    init_logging();
    let limits = BufferLimits::new(1024, 32, 8);
    let mut msg = MessageBuffer::with_limits(limits).unwrap();

    let err = msg.try_add_string(&[b'x'; 33]).unwrap_err();
    assert_eq!(
        err,
        BufferError::FieldTooLarge {
            field: "string",
            size: 33,
            limit: 32
        }
    );
    assert!(msg.try_add_string(&[b'x'; 32]).is_ok());
    assert_eq!(msg.length(), 34);
}

#[test]
fn can_add_respects_capacity() {
    let msg = MessageBuffer::new();
    assert!(msg.can_add(NETWORKMESSAGE_MAXSIZE - msg.buffer_position()));
    assert!(!msg.can_add(NETWORKMESSAGE_MAXSIZE - msg.buffer_position() + 1));
    assert!(!msg.can_add(NETWORKMESSAGE_MAXSIZE + 1));
}

#[test]
fn double_is_scaled_and_offset() {
    init_logging();
    let mut msg = MessageBuffer::new();
    msg.add_double(12345.6789, 2);

    let mut msg = rewound(msg);
    assert_eq!(msg.get_byte(), 2);
    assert_eq!(msg.get::<u32>(), 1_234_568 + i32::MAX as u32);
}

#[test]
fn negative_double_roundtrip() {
    let mut msg = MessageBuffer::new();
    msg.add_double(-250.5, 1);

    let mut msg = rewound(msg);
    assert_eq!(msg.get_double(), -250.5);
}

#[test]
fn position_roundtrip() {
    let mut msg = MessageBuffer::new();
    let pos = Position::new(100, 200, 7);
    msg.add_position(pos);

    let mut msg = rewound(msg);
    assert_eq!(msg.get_position(), pos);
}

#[test]
fn reset_clears_length() {
    let mut msg = MessageBuffer::new();
    msg.add_byte(0x64);
    msg.add_string("abc");
    msg.reset();
    assert_eq!(msg.length(), 0);
    assert_eq!(msg.buffer_position(), INITIAL_BUFFER_POSITION);
}

#[test]
fn reset_buffer_is_reusable() {
    let mut msg = MessageBuffer::new();
    msg.add_string("first message");
    msg.reset();
    msg.add_byte(9);

    let mut msg = rewound(msg);
    assert_eq!(msg.get_byte(), 9);
    assert_eq!(msg.get_byte(), 0);
}

#[test]
fn append_merges_messages_in_order() {
    init_logging();
    let mut msg1 = MessageBuffer::new();
    let mut msg2 = MessageBuffer::new();
    msg1.add_byte(0x64);
    msg1.add_string("Hello");
    msg2.add_byte(0x32);
    msg2.add_string("World");

    msg1.append(&msg2);

    let mut msg1 = rewound(msg1);
    assert_eq!(msg1.get_byte(), 0x64);
    assert_eq!(msg1.get_string(), b"Hello");
    assert_eq!(msg1.get_byte(), 0x32);
    assert_eq!(msg1.get_string(), b"World");
}

#[test]
fn append_that_does_not_fit_is_dropped() {
    let limits = BufferLimits::new(32, 16, 8);
    let mut small = MessageBuffer::with_limits(limits).unwrap();
    small.add_bytes(&[1; 20]);

    let mut big = MessageBuffer::new();
    big.add_bytes(&[2; 10]);

    assert!(matches!(
        small.try_append(&big),
        Err(BufferError::WriteOverflow { requested: 10, available: 4 })
    ));
    assert_eq!(small.length(), 20);
}

#[test]
fn get_string_out_of_bounds_is_empty() {
    init_logging();
    let mut msg = MessageBuffer::new();
    msg.add_string("Short");

    msg.set_buffer_position(msg.buffer_position() + 10);
    assert!(msg.get_string().is_empty());
    assert!(msg.is_overrun());
}

#[test]
fn decode_header_reads_little_endian_prefix() {
    let mut msg = MessageBuffer::new();
    msg.set_buffer_position(0);
    msg.add_byte(0x12);
    msg.add_byte(0x34);

    assert_eq!(msg.decode_header(), 0x3412);
}

#[test]
fn add_bytes_content() {
    let mut msg = MessageBuffer::new();
    msg.add_bytes(b"testBytes");

    let end = msg.buffer_position();
    assert_eq!(&msg.buffer()[end - 9..end], b"testBytes");
}

#[test]
fn outbound_frame_decodes_as_inbound() {
    init_logging();
    let mut out = MessageBuffer::new();
    out.add_byte(0x0A);
    out.add_position(Position::new(32000, 31000, 7));
    out.add_string("Hello");
    out.add_double(99.5, 1);
    let frame = out.encode_header().unwrap().to_vec();

    let mut inbound = MessageBuffer::new();
    inbound.buffer_mut()[..2].copy_from_slice(&frame[..2]);
    let size = inbound.decode_header() as usize;
    assert_eq!(size, frame.len() - 2);
    inbound.body_buffer_mut()[..size].copy_from_slice(&frame[2..]);

    assert_eq!(inbound.get_byte(), 0x0A);
    assert_eq!(inbound.get_position(), Position::new(32000, 31000, 7));
    assert_eq!(inbound.get_string(), b"Hello");
    assert_eq!(inbound.get_double(), 99.5);
    assert_eq!(inbound.readable(), 0);
    assert!(!inbound.is_overrun());
}
