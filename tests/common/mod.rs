#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// A minimal 24-bit BMP: a 54-byte header followed by zeroed pixel rows.
/// Dimension probes read only the header, so the pixel content never
/// matters.
pub fn image_fixture(width: u32, height: u32) -> Vec<u8> {
    let stride = (3 * width + 3) & !3;
    let data_len = stride * height;
    let total = 54 + data_len;

    let mut header = [0u8; 54];
    header[..2].copy_from_slice(b"BM");
    header[2..6].copy_from_slice(&total.to_le_bytes());
    header[10..14].copy_from_slice(&54u32.to_le_bytes()); // pixel data offset
    header[14..18].copy_from_slice(&40u32.to_le_bytes()); // info header length
    header[18..22].copy_from_slice(&width.to_le_bytes());
    header[22..26].copy_from_slice(&height.to_le_bytes());
    header[26..28].copy_from_slice(&1u16.to_le_bytes()); // color planes
    header[28..30].copy_from_slice(&24u16.to_le_bytes()); // bits per pixel
    header[34..38].copy_from_slice(&data_len.to_le_bytes());

    let mut bytes = header.to_vec();
    bytes.resize(total as usize, 0);
    bytes
}

pub fn write_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, image_fixture(width, height)).expect("write image fixture");
}

pub fn assert_coords_close(actual: [f64; 4], expected: [f64; 4], eps: f64) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!(
            (a - e).abs() < eps,
            "expected {expected:?}, got {actual:?}"
        );
    }
}
