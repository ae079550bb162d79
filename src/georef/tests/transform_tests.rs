//! Tests for the affine transform

extern crate std;

use approx::assert_relative_eq;

use crate::georef::transform::{Affine, PixelOffset};

fn rotated() -> Affine {
    Affine::new(0.25, 0.03, 451_000.0, -0.02, -0.25, 5_012_000.0)
}

#[test]
fn test_shift_moves_only_origin() {
    let reference = rotated();
    let shifted = reference.shifted_by(PixelOffset::from_grid(2, 3, 512).unwrap());

    std::assert_eq!(shifted.a, reference.a);
    std::assert_eq!(shifted.b, reference.b);
    std::assert_eq!(shifted.d, reference.d);
    std::assert_eq!(shifted.e, reference.e);

    assert_relative_eq!(shifted.c, reference.c + 3.0 * 512.0 * reference.a + 2.0 * 512.0 * reference.b, max_relative = 1e-12);
    assert_relative_eq!(shifted.f, reference.f + 3.0 * 512.0 * reference.d + 2.0 * 512.0 * reference.e, max_relative = 1e-12);
}

#[test]
fn test_axis_aligned_shift_is_plain_scaling() {
    let reference = Affine::new(0.1, 0.0, 100.0, 0.0, -0.1, 200.0);
    let shifted = reference.shifted_by(PixelOffset::from_grid(1, 4, 256).unwrap());

    assert_relative_eq!(shifted.c, 100.0 + 4.0 * 256.0 * 0.1, max_relative = 1e-12);
    assert_relative_eq!(shifted.f, 200.0 - 256.0 * 0.1, max_relative = 1e-12);
}

#[test]
fn test_shifted_origin_equals_reference_pixel() {
    let reference = rotated();
    let offset = PixelOffset::from_grid(5, 7, 448).unwrap();
    let shifted = reference.shifted_by(offset);

    let (x, y) = reference.apply(offset.col as f64 + 10.0, offset.row as f64 + 20.0);
    let (tx, ty) = shifted.apply(10.0, 20.0);
    assert_relative_eq!(x, tx, max_relative = 1e-12);
    assert_relative_eq!(y, ty, max_relative = 1e-12);
}

#[test]
fn test_pixel_offset_uses_stride() {
    let offset = PixelOffset::from_grid(3, 2, 384).unwrap();
    std::assert_eq!(offset, PixelOffset { row: 1152, col: 768 });
}

#[test]
fn test_pixel_offset_overflow_is_none() {
    std::assert_eq!(PixelOffset::from_grid(99_999_999_999_999_999, 0, 512), None);
    std::assert_eq!(PixelOffset::from_grid(0, u64::MAX, 2), None);
    std::assert!(PixelOffset::from_grid(u64::MAX, 0, 1).is_some());
}

#[test]
fn test_gdal_order() {
    let t = Affine::from_gdal([450000.0, 0.5, 0.0, 5000000.0, 0.0, -0.5]);
    std::assert_eq!(t, Affine::new(0.5, 0.0, 450000.0, 0.0, -0.5, 5000000.0));
    std::assert_eq!(t.to_gdal(), [450000.0, 0.5, 0.0, 5000000.0, 0.0, -0.5]);
}

#[test]
fn test_parse_gdal_text() {
    let t = Affine::parse_gdal_text(
        "  4.5000000000000000e+05,  5.0000000000000000e-01,  0.0000000000000000e+00,  5.0000000000000000e+06,  0.0000000000000000e+00, -5.0000000000000000e-01",
    )
    .unwrap();
    std::assert_eq!(t, Affine::new(0.5, 0.0, 450000.0, 0.0, -0.5, 5000000.0));
}

#[test]
fn test_parse_gdal_text_rejects_bad_input() {
    std::assert!(Affine::parse_gdal_text("1, 2, 3, 4, 5").is_err());
    std::assert!(Affine::parse_gdal_text("1, 2, 3, 4, 5, x").is_err());
    std::assert!(Affine::parse_gdal_text("").is_err());
}

#[test]
fn test_gdal_text_layout() {
    let t = Affine::new(0.5, 0.0, 450000.0, 0.0, -0.5, 5000000.0);
    std::assert_eq!(
        t.to_gdal_text(),
        "  4.5000000000000000e+05,  5.0000000000000000e-01,  0.0000000000000000e+00,  5.0000000000000000e+06,  0.0000000000000000e+00, -5.0000000000000000e-01"
    );
    std::assert_eq!(Affine::parse_gdal_text(&t.to_gdal_text()).unwrap(), t);
}
