//! Tests for the wire protocol codec
//!
//! These tests verify:
//! - Command and response frames round-trip
//! - Malformed frames are rejected with protocol errors
//! - LIST and FETCH response payload helpers
//! - Stream helpers leave upload bytes on the stream

use std::io::{Cursor, Read};

use fsstore::protocol::{
    decode_command, decode_fetch_size, decode_records, decode_response, encode_command,
    encode_fetch_size, encode_records, encode_response, read_command, read_response,
    write_command, write_response, Command, CommandType, Response, Status, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
use fsstore::{FileRecord, FsStoreError};

// =============================================================================
// Helper Functions
// =============================================================================

fn roundtrip_command(command: Command) {
    let bytes = encode_command(&command).unwrap();
    let decoded = decode_command(&bytes).unwrap();
    assert_eq!(decoded, command);
}

fn frame(type_byte: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![type_byte];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_command_roundtrips() {
    roundtrip_command(Command::Upload {
        name: "a.txt".to_string(),
        size: 4,
        overwrite: false,
    });
    roundtrip_command(Command::Upload {
        name: "n".repeat(300),
        size: u64::MAX,
        overwrite: true,
    });
    roundtrip_command(Command::Delete {
        name: "a.txt".to_string(),
    });
    roundtrip_command(Command::List { limit: 0 });
    roundtrip_command(Command::List { limit: 255 });
    roundtrip_command(Command::Fetch {
        name: "dir/file".to_string(),
    });
    roundtrip_command(Command::Ping);
}

#[test]
fn test_upload_frame_layout() {
    let command = Command::Upload {
        name: "ab".to_string(),
        size: 7,
        overwrite: true,
    };

    let bytes = encode_command(&command).unwrap();

    assert_eq!(
        bytes,
        vec![
            0x01, // UPLOAD
            0x00, 0x00, 0x00, 0x0D, // payload length
            0x01, // overwrite
            0x00, 0x02, b'a', b'b', // name
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x07, // size
        ]
    );
}

#[test]
fn test_ping_frame_is_header_only() {
    let bytes = encode_command(&Command::Ping).unwrap();

    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(bytes[0], CommandType::Ping as u8);
}

#[test]
fn test_command_type_bytes() {
    assert_eq!(CommandType::Upload as u8, 0x01);
    assert_eq!(CommandType::Delete as u8, 0x02);
    assert_eq!(CommandType::List as u8, 0x03);
    assert_eq!(CommandType::Fetch as u8, 0x04);
    assert_eq!(CommandType::Ping as u8, 0x05);
}

#[test]
fn test_decode_incomplete_header() {
    let result = decode_command(&[0x05, 0x00]);

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_decode_incomplete_payload() {
    let mut bytes = encode_command(&Command::Delete {
        name: "a.txt".to_string(),
    })
    .unwrap();
    bytes.truncate(bytes.len() - 1);

    let result = decode_command(&bytes);

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_decode_unknown_command_type() {
    let result = decode_command(&frame(0x7F, &[]));

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_decode_oversized_frame() {
    let mut bytes = vec![0x05];
    bytes.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());

    let result = decode_command(&bytes);

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_decode_upload_bad_overwrite_flag() {
    let mut payload = vec![0x02, 0x00, 0x01, b'a'];
    payload.extend_from_slice(&1u64.to_be_bytes());

    let result = decode_command(&frame(0x01, &payload));

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_decode_upload_missing_size() {
    let payload = vec![0x00, 0x00, 0x01, b'a', 0x00];

    let result = decode_command(&frame(0x01, &payload));

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_decode_name_longer_than_payload() {
    let payload = vec![0x00, 0x09, b'a', b'b'];

    let result = decode_command(&frame(0x04, &payload));

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_decode_delete_trailing_bytes() {
    let payload = vec![0x00, 0x01, b'a', 0xFF];

    let result = decode_command(&frame(0x02, &payload));

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_decode_non_utf8_name() {
    let payload = vec![0x00, 0x02, 0xC3, 0x28];

    let result = decode_command(&frame(0x02, &payload));

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_decode_list_wrong_length() {
    let result = decode_command(&frame(0x03, &[0x00, 0x01]));

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_decode_ping_with_payload() {
    let result = decode_command(&frame(0x05, &[0x00]));

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_encode_rejects_unencodable_name() {
    let command = Command::Delete {
        name: "n".repeat(u16::MAX as usize + 1),
    };

    assert!(matches!(
        encode_command(&command),
        Err(FsStoreError::Protocol(_))
    ));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_roundtrips() {
    let responses = vec![
        Response::ok(None),
        Response::ok(Some(vec![1, 2, 3])),
        Response::with_message(Status::NotFound, "File does not exist: a.txt"),
        Response::with_message(Status::AlreadyExists, "exists"),
        Response::with_message(Status::BadRequest, "bad"),
        Response::error("boom"),
    ];

    for response in responses {
        let bytes = encode_response(&response);
        assert_eq!(decode_response(&bytes).unwrap(), response);
    }
}

#[test]
fn test_decode_unknown_status() {
    let result = decode_response(&frame(0x09, &[]));

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
}

#[test]
fn test_response_from_error_status_mapping() {
    let cases = vec![
        (FsStoreError::DoesNotExist("a".to_string()), Status::NotFound),
        (FsStoreError::AlreadyExists("a".to_string()), Status::AlreadyExists),
        (FsStoreError::NameTooLong { len: 300 }, Status::BadRequest),
        (FsStoreError::TooLarge { size: 10, max: 5 }, Status::BadRequest),
        (FsStoreError::EmptyPayload, Status::BadRequest),
        (FsStoreError::InvalidFormat("x".to_string()), Status::Error),
        (FsStoreError::TruncatedContainer("x".to_string()), Status::Error),
    ];

    for (error, status) in cases {
        let response = Response::from_error(&error);
        assert_eq!(response.status, status, "status for {}", error);
        assert_eq!(response.message(), error.to_string());
    }
}

#[test]
fn test_response_message_empty_without_payload() {
    assert_eq!(Response::ok(None).message(), "");
}

// =============================================================================
// Payload Helper Tests
// =============================================================================

#[test]
fn test_records_roundtrip() {
    let records = vec![
        FileRecord {
            name: "a.txt".to_string(),
            size: 4,
            created_at_ms: 1_700_000_000_000,
        },
        FileRecord {
            name: "b.bin".to_string(),
            size: 1 << 40,
            created_at_ms: 0,
        },
    ];

    let payload = encode_records(&records).unwrap();

    assert_eq!(decode_records(&payload).unwrap(), records);
    assert!(decode_records(&encode_records(&[]).unwrap()).unwrap().is_empty());
}

#[test]
fn test_decode_records_garbage() {
    let result = decode_records(&[0xFF, 0xFF, 0xFF]);

    assert!(matches!(result, Err(FsStoreError::Serialization(_))));
}

#[test]
fn test_fetch_size_helpers() {
    assert_eq!(decode_fetch_size(&encode_fetch_size(42)).unwrap(), 42);
    assert!(matches!(
        decode_fetch_size(&[0x00, 0x01]),
        Err(FsStoreError::Protocol(_))
    ));
}

// =============================================================================
// Stream Helper Tests
// =============================================================================

#[test]
fn test_stream_command_leaves_upload_body() {
    let mut stream = Vec::new();
    write_command(
        &mut stream,
        &Command::Upload {
            name: "a.txt".to_string(),
            size: 4,
            overwrite: false,
        },
    )
    .unwrap();
    stream.extend_from_slice(b"data");
    write_command(&mut stream, &Command::Ping).unwrap();

    let mut reader = Cursor::new(stream);

    let first = read_command(&mut reader).unwrap();
    assert!(matches!(first, Command::Upload { size: 4, .. }));

    let mut body = [0u8; 4];
    reader.read_exact(&mut body).unwrap();
    assert_eq!(&body, b"data");

    assert_eq!(read_command(&mut reader).unwrap(), Command::Ping);
}

#[test]
fn test_stream_responses_in_sequence() {
    let mut stream = Vec::new();
    write_response(&mut stream, &Response::ok(None)).unwrap();
    write_response(&mut stream, &Response::error("boom")).unwrap();

    let mut reader = Cursor::new(stream);

    assert_eq!(read_response(&mut reader).unwrap().status, Status::Ok);
    let second = read_response(&mut reader).unwrap();
    assert_eq!(second.status, Status::Error);
    assert_eq!(second.message(), "boom");
}

#[test]
fn test_stream_read_at_eof() {
    let mut reader = Cursor::new(Vec::<u8>::new());

    let result = read_command(&mut reader);

    assert!(matches!(result, Err(FsStoreError::Io(_))));
}

#[test]
fn test_stream_rejects_oversized_frame_without_reading_it() {
    let mut bytes = vec![0x03];
    bytes.extend_from_slice(&u32::MAX.to_be_bytes());
    let mut reader = Cursor::new(bytes);

    let result = read_command(&mut reader);

    assert!(matches!(result, Err(FsStoreError::Protocol(_))));
    assert_eq!(reader.position() as usize, HEADER_SIZE);
}
