//! Hand-built and malformed containers.

use std::sync::atomic::{AtomicUsize, Ordering};

use enough::{Stop, StopReason, Unstoppable};
use zentrs::*;

const RED: u16 = 0xF800;
const GREEN: u16 = 0x07E0;
const BLUE: u16 = 0x001F;
const BLACK: [u8; 3] = [0, 0, 0];

/// Assemble a container from a file header and raw image-header records,
/// followed by `payload`.
fn container(
    version: u16,
    scan_line: u16,
    images: &[(u8, u8, u32, u32)],
    payload: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"TCSF");
    out.extend_from_slice(&(images.len() as u16).to_be_bytes());
    out.extend_from_slice(&version.to_be_bytes());
    out.extend_from_slice(&scan_line.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    for &(w, h, unpacked, packed) in images {
        out.push(w);
        out.push(h);
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&unpacked.to_be_bytes());
        out.extend_from_slice(&packed.to_be_bytes());
    }
    out.extend_from_slice(payload);
    out
}

/// Packed stream from `(screen_offset_bytes, pixels)` chunks.
fn packed_stream(chunks: &[(u16, &[u16])]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&((chunks.len() - 1) as u16).to_be_bytes());
    for (offset, pixels) in chunks {
        out.extend_from_slice(&offset.to_be_bytes());
        out.extend_from_slice(&((pixels.len() - 1) as u16).to_be_bytes());
        for p in *pixels {
            out.extend_from_slice(&p.to_be_bytes());
        }
    }
    out
}

fn raw_stream(pixels: &[u16]) -> Vec<u8> {
    pixels.iter().flat_map(|p| p.to_be_bytes()).collect()
}

fn px(image: &DecodedImage, x: usize, y: usize) -> [u8; 3] {
    let off = (y * image.width as usize + x) * 3;
    let p = image.pixels();
    [p[off], p[off + 1], p[off + 2]]
}

fn two_image_container() -> Vec<u8> {
    let a = vec![10u8; 2 * 2 * 3];
    let b = vec![200u8; 3 * 3];
    encode_rgb8(&[(&a, 2, 2), (&b, 3, 1)], Unstoppable).unwrap()
}

// ── Container-level validation ──────────────────────────────────────

#[test]
fn bad_magic_is_rejected() {
    let mut data = two_image_container();
    data[0] = b'X';
    let err = decode(&data, Unstoppable).unwrap_err();
    assert!(matches!(err, TrsError::UnrecognizedFormat));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn empty_input_is_not_a_container() {
    assert!(matches!(
        decode(&[], Unstoppable),
        Err(TrsError::UnrecognizedFormat)
    ));
}

#[test]
fn truncated_file_header() {
    let data = &two_image_container()[..9];
    let err = decode(data, Unstoppable).unwrap_err();
    assert!(matches!(err, TrsError::UnexpectedEof { .. }));
    assert_eq!(err.kind(), ErrorKind::Truncated);
}

#[test]
fn truncated_image_header_table() {
    let data = two_image_container();
    assert!(matches!(
        decode(&data[..20], Unstoppable),
        Err(TrsError::UnexpectedEof { .. })
    ));
    // probing needs the whole table, even past the first image's payload
    assert!(matches!(
        ContainerInfo::from_bytes(&data[..30]),
        Err(TrsError::UnexpectedEof { .. })
    ));
}

#[test]
fn zero_image_container_decodes_to_nothing() {
    let data = container(3, 0, &[], &[]);
    assert_eq!(data.len(), 12);
    assert!(decode(&data, Unstoppable).unwrap().is_empty());
    assert!(
        DecodeRequest::new(&data)
            .decode_each(Unstoppable)
            .unwrap()
            .is_empty()
    );
    assert_eq!(ContainerInfo::from_bytes(&data).unwrap().image_count(), 0);
}

#[test]
fn version_gate() {
    for version in [0u16, 1, 4, 0xFFFF] {
        let mut data = two_image_container();
        data[6..8].copy_from_slice(&version.to_be_bytes());
        let err = decode(&data, Unstoppable).unwrap_err();
        match err {
            TrsError::UnsupportedVersion(v) => assert_eq!(v, version),
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
        assert!(ContainerInfo::from_bytes(&data).is_err());
        assert!(DecodeRequest::new(&data).decode_each(Unstoppable).is_err());
    }
}

#[test]
fn version_2_is_accepted() {
    let mut data = two_image_container();
    data[6..8].copy_from_slice(&2u16.to_be_bytes());
    let images = decode(&data, Unstoppable).unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(ContainerInfo::from_bytes(&data).unwrap().version(), 2);
}

#[test]
fn nonzero_reserved_fields_are_tolerated() {
    let mut data = two_image_container();
    data[10..12].copy_from_slice(&0xABCDu16.to_be_bytes());
    data[14..16].copy_from_slice(&1u16.to_be_bytes());

    let info = ContainerInfo::from_bytes(&data).unwrap();
    assert_eq!(info.header.reserved, 0xABCD);
    assert_eq!(info.images[0].reserved, 1);
    assert_eq!(decode(&data, Unstoppable).unwrap().len(), 2);
}

#[test]
fn both_offsets_zero_is_a_format_error() {
    let data = container(3, 0, &[(2, 2, 0, 0)], &[]);
    let err = decode(&data, Unstoppable).unwrap_err();
    assert!(matches!(err, TrsError::MissingPayload { index: 0 }));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn truncated_raw_payload() {
    let mut data = two_image_container();
    data.pop();
    let err = decode(&data, Unstoppable).unwrap_err();
    assert!(matches!(err, TrsError::PayloadTruncated { index: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::Truncated);
}

#[test]
fn payload_offset_past_end() {
    let data = container(3, 0, &[(1, 1, 0x1000, 0)], &[]);
    assert!(matches!(
        decode(&data, Unstoppable),
        Err(TrsError::PayloadTruncated {
            index: 0,
            offset: 0x1000
        })
    ));
}

// ── Abort vs. per-image policy ──────────────────────────────────────

#[test]
fn decode_aborts_on_first_bad_image() {
    let mut data = two_image_container();
    // clear image 0's unpacked offset
    data[16..20].fill(0);
    assert!(matches!(
        decode(&data, Unstoppable),
        Err(TrsError::MissingPayload { index: 0 })
    ));
}

#[test]
fn decode_each_reports_per_image() {
    let mut data = two_image_container();
    data[16..20].fill(0);

    let results = DecodeRequest::new(&data).decode_each(Unstoppable).unwrap();
    assert_eq!(results.len(), 2);
    assert!(matches!(
        results[0],
        Err(TrsError::MissingPayload { index: 0 })
    ));
    let second = results[1].as_ref().unwrap();
    assert_eq!((second.width, second.height), (3, 1));
    assert!(second.pixels().iter().all(|&b| b.abs_diff(200) <= 4));
}

// ── Packed payloads ─────────────────────────────────────────────────

#[test]
fn packed_multi_line_with_carry() {
    // scan line 4, image 3x3:
    // red at 0; 6 px offset > 4 carries the 1 recorded pixel, green at 8;
    // 1 px offset, blue at 10
    let payload = packed_stream(&[(0, &[RED]), (12, &[GREEN]), (2, &[BLUE])]);
    let data = container(2, 4, &[(3, 3, 0, 24)], &payload);

    let image = decode(&data, Unstoppable).unwrap().remove(0);
    assert_eq!(image.payload, PayloadKind::Packed(24));
    assert_eq!((image.width, image.height), (3, 3));
    assert_eq!(px(&image, 0, 0), [255, 0, 0]);
    assert_eq!(px(&image, 1, 0), BLACK);
    assert_eq!(px(&image, 2, 0), BLACK);
    for x in 0..3 {
        assert_eq!(px(&image, x, 1), BLACK);
    }
    assert_eq!(px(&image, 0, 2), [0, 255, 0]);
    assert_eq!(px(&image, 1, 2), BLACK);
    assert_eq!(px(&image, 2, 2), [0, 0, 255]);
}

#[test]
fn packed_runs_span_scan_lines() {
    // scan line 3, image 2x2; run of 4 from x=1 covers (1,0) (2,0) (0,1) (1,1)
    let payload = packed_stream(&[(2, &[RED, GREEN, BLUE, RED])]);
    let data = container(3, 3, &[(2, 2, 0, 24)], &payload);

    let image = decode(&data, Unstoppable).unwrap().remove(0);
    assert_eq!(px(&image, 0, 0), BLACK);
    assert_eq!(px(&image, 1, 0), [255, 0, 0]);
    assert_eq!(px(&image, 0, 1), [0, 0, 255]);
    assert_eq!(px(&image, 1, 1), [255, 0, 0]);
}

#[test]
fn unpacked_wins_over_packed() {
    let raw = raw_stream(&[GREEN]);
    // packed offset points at garbage that would fail to decode
    let data = container(3, 1, &[(1, 1, 24, 26)], &[raw[0], raw[1], 0xFF]);
    let image = decode(&data, Unstoppable).unwrap().remove(0);
    assert_eq!(image.payload, PayloadKind::Unpacked(24));
    assert_eq!(image.pixels(), &[0, 255, 0]);
}

#[test]
fn packed_and_unpacked_images_in_one_container() {
    let raw = raw_stream(&[BLUE, BLUE]);
    let packed = packed_stream(&[(0, &[RED, RED])]);
    let mut payload = raw.clone();
    payload.extend_from_slice(&packed);
    let packed_at = 36 + raw.len() as u32;
    let data = container(3, 2, &[(2, 1, 36, 0), (2, 1, 0, packed_at)], &payload);

    let images = decode(&data, Unstoppable).unwrap();
    assert_eq!(images[0].pixels(), &[0, 0, 255, 0, 0, 255]);
    assert_eq!(images[1].pixels(), &[255, 0, 0, 255, 0, 0]);
}

#[test]
fn packed_with_zero_scan_line_is_rejected() {
    let payload = packed_stream(&[(0, &[RED])]);
    let data = container(3, 0, &[(1, 1, 0, 24)], &payload);
    let err = decode(&data, Unstoppable).unwrap_err();
    assert!(matches!(err, TrsError::InvalidHeader(_)));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn truncated_packed_chunk() {
    let mut payload = packed_stream(&[(0, &[RED, GREEN]), (0, &[BLUE])]);
    payload.truncate(payload.len() - 3);
    let data = container(3, 2, &[(2, 2, 0, 24)], &payload);
    assert!(matches!(
        decode(&data, Unstoppable),
        Err(TrsError::PayloadTruncated { index: 0, .. })
    ));
}

#[test]
fn truncated_packed_chunk_count() {
    let data = container(3, 2, &[(2, 2, 0, 24)], &[0x00]);
    assert!(matches!(
        decode(&data, Unstoppable),
        Err(TrsError::PayloadTruncated { index: 0, .. })
    ));
}

#[test]
fn packed_full_size_single_run() {
    // stored run 0xFFFF decodes 65536 pixels, exactly one 256x256 screen
    let mut payload = vec![0, 0, 0, 0, 0xFF, 0xFF];
    for i in 0..65536u32 {
        let v = if i == 65535 { RED } else { GREEN };
        payload.extend_from_slice(&v.to_be_bytes());
    }
    let data = container(3, 256, &[(0, 0, 0, 24)], &payload);

    let image = decode(&data, Unstoppable).unwrap().remove(0);
    assert_eq!((image.width, image.height), (256, 256));
    assert_eq!(px(&image, 0, 0), [0, 255, 0]);
    assert_eq!(px(&image, 254, 255), [0, 255, 0]);
    assert_eq!(px(&image, 255, 255), [255, 0, 0]);
}

// ── Limits ──────────────────────────────────────────────────────────

#[test]
fn image_count_limit() {
    let data = two_image_container();
    let limits = Limits {
        max_images: Some(1),
        ..Default::default()
    };
    assert!(matches!(
        DecodeRequest::new(&data).with_limits(&limits).decode(Unstoppable),
        Err(TrsError::LimitExceeded(_))
    ));
}

#[test]
fn total_pixel_limit() {
    let data = two_image_container();
    let limits = Limits {
        max_total_pixels: Some(5),
        ..Default::default()
    };
    // 4 pixels pass, 4 + 3 do not
    assert!(matches!(
        DecodeRequest::new(&data).with_limits(&limits).decode(Unstoppable),
        Err(TrsError::LimitExceeded(_))
    ));
    let generous = Limits {
        max_total_pixels: Some(7),
        ..Default::default()
    };
    assert!(
        DecodeRequest::new(&data)
            .with_limits(&generous)
            .decode(Unstoppable)
            .is_ok()
    );
}

#[test]
fn total_pixel_limit_is_checked_before_the_payload() {
    // second image's payload is missing entirely; the limit must fire first
    let payload = raw_stream(&[RED, GREEN]);
    let data = container(3, 0, &[(2, 1, 36, 0), (16, 16, 40, 0)], &payload);
    assert!(matches!(
        decode(&data, Unstoppable),
        Err(TrsError::PayloadTruncated { index: 1, .. })
    ));

    let limits = Limits {
        max_total_pixels: Some(100),
        ..Default::default()
    };
    assert!(matches!(
        DecodeRequest::new(&data).with_limits(&limits).decode(Unstoppable),
        Err(TrsError::LimitExceeded(_))
    ));
}

#[test]
fn packed_screen_memory_limit() {
    let payload = packed_stream(&[(0, &[RED])]);
    let data = container(3, 4096, &[(4, 64, 0, 24)], &payload);
    let limits = Limits {
        max_memory_bytes: Some(64 * 1024),
        ..Default::default()
    };
    assert!(matches!(
        DecodeRequest::new(&data).with_limits(&limits).decode(Unstoppable),
        Err(TrsError::LimitExceeded(_))
    ));
    assert!(decode(&data, Unstoppable).is_ok());
}

// ── Encoder validation ──────────────────────────────────────────────

#[test]
fn non_rgb_input_is_a_channel_mismatch() {
    let rgb = vec![0u8; 2 * 2 * 3];
    let rgba = vec![0u8; 2 * 2 * 4];
    let err = EncodeRequest::new()
        .add_image(&rgb, 2, 2, PixelLayout::Rgb8)
        .add_image(&rgba, 2, 2, PixelLayout::Rgba8)
        .encode(Unstoppable)
        .unwrap_err();
    assert!(matches!(
        err,
        TrsError::ChannelMismatch {
            index: 1,
            channels: 4
        }
    ));
    assert_eq!(err.kind(), ErrorKind::ChannelMismatch);

    let gray = vec![0u8; 4];
    assert!(matches!(
        EncodeRequest::new()
            .add_image(&gray, 2, 2, PixelLayout::Gray8)
            .encode(Unstoppable),
        Err(TrsError::ChannelMismatch {
            index: 0,
            channels: 1
        })
    ));
}

#[test]
fn channels_are_checked_before_dimensions() {
    let rgba = vec![0u8; 4];
    assert!(matches!(
        EncodeRequest::new()
            .add_image(&rgba, 0, 300, PixelLayout::Rgba8)
            .encode(Unstoppable),
        Err(TrsError::ChannelMismatch { .. })
    ));
}

#[test]
fn dimensions_outside_1_to_256_are_rejected() {
    let pixels = vec![0u8; 257 * 3];
    for (w, h) in [(0, 1), (1, 0), (257, 1), (1, 257)] {
        let err = EncodeRequest::new()
            .add_image(&pixels, w, h, PixelLayout::Rgb8)
            .encode(Unstoppable)
            .unwrap_err();
        match err {
            TrsError::InvalidDimensions {
                index: 0,
                width,
                height,
            } => assert_eq!((width, height), (w, h)),
            other => panic!("expected InvalidDimensions for {w}x{h}, got {other:?}"),
        }
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}

#[test]
fn short_pixel_buffer_is_rejected() {
    let pixels = vec![0u8; 11];
    assert!(matches!(
        encode_rgb8(&[(&pixels, 2, 2)], Unstoppable),
        Err(TrsError::BufferTooSmall {
            index: 0,
            needed: 12,
            actual: 11
        })
    ));
}

#[test]
fn empty_image_list_is_rejected() {
    assert!(matches!(
        EncodeRequest::new().encode(Unstoppable),
        Err(TrsError::NoImages)
    ));
}

#[test]
fn image_count_must_fit_u16() {
    let pixel = [0u8; 3];
    let request = (0..65536).fold(EncodeRequest::new(), |req, _| {
        req.add_image(&pixel, 1, 1, PixelLayout::Rgb8)
    });
    assert!(matches!(
        request.encode(Unstoppable),
        Err(TrsError::TooManyImages(65536))
    ));
}

#[test]
fn payload_offset_must_fit_u32() {
    // 65535 full-size images: image 32762 would start at exactly 2^32
    let pixels = vec![0u8; 256 * 256 * 3];
    let request = (0..65535).fold(EncodeRequest::new(), |req, _| {
        req.add_image(&pixels, 256, 256, PixelLayout::Rgb8)
    });
    let err = request.encode(Unstoppable).unwrap_err();
    match err {
        TrsError::OffsetOverflow { index, offset } => {
            assert_eq!(index, 32762);
            assert_eq!(offset, 1u64 << 32);
        }
        other => panic!("expected OffsetOverflow, got {other:?}"),
    }
}

#[test]
fn encode_image_limit() {
    let pixel = [0u8; 3];
    let limits = Limits {
        max_images: Some(1),
        ..Default::default()
    };
    assert!(matches!(
        EncodeRequest::new()
            .with_limits(&limits)
            .add_image(&pixel, 1, 1, PixelLayout::Rgb8)
            .add_image(&pixel, 1, 1, PixelLayout::Rgb8)
            .encode(Unstoppable),
        Err(TrsError::LimitExceeded(_))
    ));
}

// ── Cancellation ────────────────────────────────────────────────────

/// Allows `allowed` checks, then reports cancellation.
struct CancelAfter {
    allowed: usize,
    checks: AtomicUsize,
}

impl CancelAfter {
    fn new(allowed: usize) -> Self {
        Self {
            allowed,
            checks: AtomicUsize::new(0),
        }
    }

    fn checks(&self) -> usize {
        self.checks.load(Ordering::Relaxed)
    }
}

impl Stop for CancelAfter {
    fn check(&self) -> Result<(), StopReason> {
        if self.checks.fetch_add(1, Ordering::Relaxed) >= self.allowed {
            Err(StopReason::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[test]
fn raw_decode_checks_every_16_rows() {
    let pixels = vec![0u8; 256 * 3];
    let data = encode_rgb8(&[(&pixels, 1, 256)], Unstoppable).unwrap();

    // one check per image plus one per 16 rows
    let stop = CancelAfter::new(usize::MAX);
    decode(&data, &stop).unwrap();
    assert_eq!(stop.checks(), 1 + 16);

    assert!(decode(&data, CancelAfter::new(17)).is_ok());
    assert!(matches!(
        decode(&data, CancelAfter::new(16)),
        Err(TrsError::Cancelled(StopReason::Cancelled))
    ));
}

#[test]
fn packed_decode_checks_every_1024_chunks() {
    let red = [RED];
    let chunks: Vec<(u16, &[u16])> = (0..1025).map(|_| (0u16, &red[..])).collect();
    let payload = packed_stream(&chunks);
    let data = container(3, 1, &[(1, 1, 0, 24)], &payload);

    let stop = CancelAfter::new(usize::MAX);
    decode(&data, &stop).unwrap();
    assert_eq!(stop.checks(), 1 + 2);

    assert!(decode(&data, CancelAfter::new(3)).is_ok());
    let err = decode(&data, CancelAfter::new(2)).unwrap_err();
    assert!(matches!(err, TrsError::Cancelled(_)));
    assert_eq!(err.kind(), ErrorKind::Other);
}

#[test]
fn decode_each_fails_whole_call_on_cancel() {
    let data = two_image_container();
    // the first image's header check passes, its first row check trips
    match DecodeRequest::new(&data).decode_each(CancelAfter::new(1)) {
        Err(TrsError::Cancelled(StopReason::Cancelled)) => {}
        Ok(results) => panic!("cancellation reported per image: {results:?}"),
        Err(other) => panic!("expected Cancelled, got {other:?}"),
    }
}

#[test]
fn encode_can_be_cancelled() {
    let pixels = vec![0u8; 4 * 40 * 3];
    let request = EncodeRequest::new()
        .add_image(&pixels, 4, 40, PixelLayout::Rgb8)
        .add_image(&pixels, 4, 40, PixelLayout::Rgb8);

    assert!(matches!(
        request.encode(CancelAfter::new(0)),
        Err(TrsError::Cancelled(_))
    ));
    // past validation, inside the payload writer
    assert!(matches!(
        request.encode(CancelAfter::new(3)),
        Err(TrsError::Cancelled(_))
    ));
    assert!(request.encode(Unstoppable).is_ok());
}
