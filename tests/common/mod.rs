// Fixture builders: small generated images with hand-made EXIF blocks.
#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Every pixel distinct, so any reorientation is visible.
pub fn sample_image(width: u32, height: u32) -> DynamicImage {
    let buffer = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 40) as u8, (y * 60) as u8, ((x + y) * 10) as u8])
    });
    DynamicImage::ImageRgb8(buffer)
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// Big-endian TIFF block with an optional Orientation in IFD0 and an
/// optional GPS IFD holding GPSLatitude = (degrees, 0, 0).
pub fn tiff_block(orientation: Option<u16>, latitude_degrees: Option<u32>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"MM\0\x2A");
    out.extend_from_slice(&8u32.to_be_bytes());

    let ifd0_count = orientation.is_some() as u16 + latitude_degrees.is_some() as u16;
    let gps_offset = 8 + 2 + 12 * ifd0_count as u32 + 4;

    out.extend_from_slice(&ifd0_count.to_be_bytes());
    if let Some(value) = orientation {
        let mut inline = [0u8; 4];
        inline[..2].copy_from_slice(&value.to_be_bytes());
        push_entry(&mut out, 0x0112, 3, 1, inline);
    }
    if latitude_degrees.is_some() {
        push_entry(&mut out, 0x8825, 4, 1, gps_offset.to_be_bytes());
    }
    out.extend_from_slice(&0u32.to_be_bytes());

    if let Some(degrees) = latitude_degrees {
        let data_offset = gps_offset + 2 + 12 + 4;
        out.extend_from_slice(&1u16.to_be_bytes());
        push_entry(&mut out, 0x0002, 5, 3, data_offset.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        for (num, denom) in [(degrees, 1u32), (0, 1), (0, 1)] {
            out.extend_from_slice(&num.to_be_bytes());
            out.extend_from_slice(&denom.to_be_bytes());
        }
    }

    out
}

/// Valid TIFF header whose IFD0 offset points far past the end of the block.
pub fn malformed_tiff_block() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"MM\0\x2A");
    out.extend_from_slice(&0xFFFF_FF00u32.to_be_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out
}

fn push_entry(out: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: [u8; 4]) {
    out.extend_from_slice(&tag.to_be_bytes());
    out.extend_from_slice(&kind.to_be_bytes());
    out.extend_from_slice(&count.to_be_bytes());
    out.extend_from_slice(&value);
}

/// JPEG with the TIFF block in an APP1 segment right after SOI.
pub fn jpeg_with_exif(image: &DynamicImage, tiff: &[u8]) -> Vec<u8> {
    let jpeg = encode(image, ImageFormat::Jpeg);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(tiff);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// PNG with an eXIf chunk right after IHDR.
pub fn png_with_exif(image: &DynamicImage, tiff: &[u8]) -> Vec<u8> {
    const AFTER_IHDR: usize = 8 + 4 + 4 + 13 + 4;
    let png = encode(image, ImageFormat::Png);

    let mut body = b"eXIf".to_vec();
    body.extend_from_slice(tiff);

    let mut out = png[..AFTER_IHDR].to_vec();
    out.extend_from_slice(&(tiff.len() as u32).to_be_bytes());
    out.extend_from_slice(&body);
    out.extend_from_slice(&crc32(&body).to_be_bytes());
    out.extend_from_slice(&png[AFTER_IHDR..]);
    out
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}
