use jpeg_probe::ImageSize;
use jpeg_probe::ProbeError;
use jpeg_probe::ProbeOptions;
use jpeg_probe::formats::jpeg::{Command, JpegScanner, MarkerKind, classify};
use jpeg_probe::probe::{probe_slice, try_probe_slice};

fn sof0(height: u16, width: u16) -> Vec<u8> {
    let mut segment = vec![0xFF, 0xC0, 0x00, 0x08, 0x08];
    segment.extend_from_slice(&height.to_be_bytes());
    segment.extend_from_slice(&width.to_be_bytes());
    segment.push(0x01);
    segment
}

#[test]
fn test_minimal_jpeg() {
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend_from_slice(&sof0(100, 200));

    let size = probe_slice(&jpeg).unwrap();
    assert_eq!(size.width, 200);
    assert_eq!(size.height, 100);
    assert_eq!(size.type_tag(), "jpg");
    assert_eq!(size.mime(), "image/jpeg");
}

#[test]
fn test_minimal_jpeg_consumes_soi_and_sof_only() {
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend_from_slice(&sof0(100, 200));
    jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08]);

    let mut scanner = JpegScanner::new();
    let mut pos = 0;
    while let Command::Read(n) = scanner.command() {
        scanner.feed(&jpeg[pos..pos + n]);
        pos += n;
    }
    assert_eq!(scanner.command(), Command::Stop);
    assert_eq!(scanner.consumed(), 12);
    assert_eq!(scanner.finish().unwrap(), ImageSize::jpeg(200, 100));
}

#[test]
fn test_invalid_signature() {
    let not_jpeg = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    assert!(probe_slice(&not_jpeg).is_none());

    let mut scanner = JpegScanner::new();
    scanner.feed(&not_jpeg[..2]);
    assert_eq!(scanner.command(), Command::Stop);
    assert!(matches!(
        scanner.finish(),
        Err(ProbeError::InvalidSignature { found: [0x89, 0x50] })
    ));
}

#[test]
fn test_empty_comment_before_sof() {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x02];
    jpeg.extend_from_slice(&sof0(480, 640));
    assert_eq!(probe_slice(&jpeg), Some(ImageSize::jpeg(640, 480)));
}

#[test]
fn test_soi_then_eoi() {
    let jpeg = [0xFF, 0xD8, 0xFF, 0xD9];
    assert!(probe_slice(&jpeg).is_none());
    assert!(matches!(
        try_probe_slice(&jpeg, &ProbeOptions::default()),
        Err(ProbeError::NoFrameHeader { code: 0xD9 })
    ));
}

#[test]
fn test_sos_before_sof() {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00];
    jpeg.extend_from_slice(&sof0(1, 1));
    assert!(matches!(
        try_probe_slice(&jpeg, &ProbeOptions::default()),
        Err(ProbeError::NoFrameHeader { code: 0xDA })
    ));
}

#[test]
fn test_app_segment_skipped_exactly() {
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    jpeg.extend_from_slice(b"JFIF\x00\x01\x01\x00\x00\x48\x00\x48\x00\x00");
    jpeg.extend_from_slice(&sof0(256, 320));

    let mut scanner = JpegScanner::new();
    scanner.feed(&jpeg[0..2]);
    scanner.feed(&jpeg[2..4]);
    scanner.feed(&jpeg[4..6]);
    assert_eq!(scanner.command(), Command::Skip(14));

    assert_eq!(probe_slice(&jpeg), Some(ImageSize::jpeg(320, 256)));
}

#[test]
fn test_app_payload_containing_marker_bytes() {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x0E];
    jpeg.extend_from_slice(&sof0(9, 9)[..]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg.extend_from_slice(&sof0(1024, 1536));
    assert_eq!(probe_slice(&jpeg), Some(ImageSize::jpeg(1536, 1024)));
}

#[test]
fn test_tables_before_progressive_frame() {
    let mut jpeg = vec![0xFF, 0xD8];
    jpeg.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
    jpeg.extend_from_slice(&[10u8; 64]);
    jpeg.extend_from_slice(&[0xFF, 0xC4, 0x00, 0x05, 0x00, 0x01, 0x02]);
    jpeg.extend_from_slice(&[0xFF, 0xCC, 0x00, 0x04, 0x00, 0x00]);
    jpeg.extend_from_slice(&[0xFF, 0xC2, 0x00, 0x0B, 0x08, 0x04, 0x38, 0x07, 0x80]);
    jpeg.extend_from_slice(&[0x01, 0x01, 0x11, 0x00]);
    assert_eq!(probe_slice(&jpeg), Some(ImageSize::jpeg(1920, 1080)));
}

#[test]
fn test_malformed_marker_prefix() {
    let jpeg = [0xFF, 0xD8, 0x00, 0xC0, 0x00, 0x08];
    assert!(matches!(
        try_probe_slice(&jpeg, &ProbeOptions::default()),
        Err(ProbeError::MalformedMarker {
            prefix: 0x00,
            code: 0xC0
        })
    ));
}

#[test]
fn test_inconsistent_length() {
    let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x01];
    assert!(matches!(
        try_probe_slice(&jpeg, &ProbeOptions::default()),
        Err(ProbeError::InconsistentLength {
            code: 0xE0,
            declared: 1
        })
    ));
}

#[test]
fn test_short_frame_header_rejected() {
    let jpeg = [0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x04, 0x08, 0x00];
    assert!(matches!(
        try_probe_slice(&jpeg, &ProbeOptions::default()),
        Err(ProbeError::ShortFrameHeader { code: 0xC0, len: 2 })
    ));
}

#[test]
fn test_input_budget() {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x10, 0x00];
    jpeg.extend_from_slice(&vec![0u8; 0x0FFE]);
    jpeg.extend_from_slice(&sof0(2, 2));

    let options = ProbeOptions::new().with_max_input(1024);
    assert!(matches!(
        try_probe_slice(&jpeg, &options),
        Err(ProbeError::LimitExceeded { limit: 1024 })
    ));
    assert_eq!(
        try_probe_slice(&jpeg, &ProbeOptions::default()).unwrap(),
        ImageSize::jpeg(2, 2)
    );
}

#[test]
fn test_probe_is_repeatable() {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x05, b'h', b'i', b'!'];
    jpeg.extend_from_slice(&sof0(7, 11));
    assert_eq!(probe_slice(&jpeg), probe_slice(&jpeg));

    let garbage = [0xFF, 0xD8, 0xFF];
    assert_eq!(probe_slice(&garbage), probe_slice(&garbage));
}

#[test]
fn test_classify_marker_families() {
    assert_eq!(classify(0xC0), MarkerKind::Frame);
    assert_eq!(classify(0xC4), MarkerKind::LengthPrefixed);
    assert_eq!(classify(0xE0), MarkerKind::LengthPrefixed);
    assert_eq!(classify(0xD9), MarkerKind::Standalone);
    assert_eq!(classify(0x00), MarkerKind::Unknown);
}
