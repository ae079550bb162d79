//! Drawing annotation boxes onto images

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use log::{debug, info};

use crate::annotate::yolo::{load_annotations, AnnotationBox};
use crate::errors::GeoTileResult;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const LABEL_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const BOX_THICKNESS: u32 = 2;
/// Pixels per glyph cell
const GLYPH_SCALE: u32 = 2;
const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;
/// Largest image side used when clamping box coordinates
const MAX_EXTENT: u32 = 1 << 28;

/// 3x5 bitmaps for the digits 0-9, one row per entry, MSB on the left
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Output path `<stem>_vis.jpg`, next to the image or inside `output_dir`
pub fn visualization_path(image_path: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let file_name = format!("{}_vis.jpg", stem);

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => image_path.with_file_name(file_name),
    }
}

/// Draw every box and its class id onto `image`
pub fn draw_annotations(image: &mut RgbImage, boxes: &[AnnotationBox]) {
    for annotation in boxes {
        draw_box(image, annotation);
        draw_label(image, annotation);
    }
}

/// Box corner and size in pixels, clamped to a band around the image
///
/// Keeps `Rect` arithmetic in range for boxes far outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl PixelRect {
    fn from_annotation(annotation: &AnnotationBox, image_width: u32, image_height: u32) -> Self {
        let limit_x = image_width.min(MAX_EXTENT) as f64;
        let limit_y = image_height.min(MAX_EXTENT) as f64;

        PixelRect {
            x: clamp_pixel(annotation.x_min, -limit_x, 2.0 * limit_x) as i32,
            y: clamp_pixel(annotation.y_min, -limit_y, 2.0 * limit_y) as i32,
            width: clamp_pixel(annotation.width, 1.0, 3.0 * limit_x.max(1.0)) as u32,
            height: clamp_pixel(annotation.height, 1.0, 3.0 * limit_y.max(1.0)) as u32,
        }
    }
}

fn clamp_pixel(value: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.round().clamp(min, max)
    } else {
        min
    }
}

fn draw_box(image: &mut RgbImage, annotation: &AnnotationBox) {
    let PixelRect { x, y, width, height } =
        PixelRect::from_annotation(annotation, image.width(), image.height());

    for inset in 0..BOX_THICKNESS {
        if width <= 2 * inset || height <= 2 * inset {
            break;
        }
        let rect = Rect::at(x + inset as i32, y + inset as i32)
            .of_size(width - 2 * inset, height - 2 * inset);
        draw_hollow_rect_mut(image, rect, BOX_COLOR);
    }
}

fn draw_label(image: &mut RgbImage, annotation: &AnnotationBox) {
    let text = annotation.class_id.to_string();
    let advance = (GLYPH_WIDTH + 1) * GLYPH_SCALE;
    let label_width = text.len() as u32 * advance + GLYPH_SCALE;
    let label_height = (GLYPH_HEIGHT + 2) * GLYPH_SCALE;

    let rect = PixelRect::from_annotation(annotation, image.width(), image.height());

    // Above the box when there is room, otherwise just inside it
    let left = rect.x.max(0);
    let above = rect.y - label_height as i32 - 2;
    let top = if above >= 0 { above } else { rect.y.max(0) };

    draw_filled_rect_mut(image, Rect::at(left, top).of_size(label_width, label_height), LABEL_BACKGROUND);

    let origin_y = top + GLYPH_SCALE as i32;
    for (index, ch) in text.chars().enumerate() {
        let digit = match ch.to_digit(10) {
            Some(d) => d as usize,
            None => continue,
        };
        let origin_x = left + GLYPH_SCALE as i32 + (index as u32 * advance) as i32;
        draw_glyph(image, &DIGITS[digit], origin_x, origin_y);
    }
}

fn draw_glyph(image: &mut RgbImage, glyph: &[u8; 5], origin_x: i32, origin_y: i32) {
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            let cell = Rect::at(
                origin_x + (col * GLYPH_SCALE) as i32,
                origin_y + (row as u32 * GLYPH_SCALE) as i32,
            )
            .of_size(GLYPH_SCALE, GLYPH_SCALE);
            draw_filled_rect_mut(image, cell, LABEL_COLOR);
        }
    }
}

/// Result of rendering one annotated image
#[derive(Debug, Clone)]
pub struct Visualization {
    /// Where the rendered image was saved
    pub output: PathBuf,
    /// Boxes that were drawn
    pub boxes: Vec<AnnotationBox>,
}

/// Render the boxes of `label_path` over `image_path` and save the result
///
/// # Arguments
/// * `image_path` - Source image
/// * `label_path` - YOLO label file; missing files draw nothing
/// * `output_path` - Where to write the rendered JPEG
///
/// # Returns
/// The output path and the boxes drawn, or an error if the image cannot
/// be opened or saved
pub fn visualize(image_path: &Path, label_path: &Path, output_path: &Path) -> GeoTileResult<Visualization> {
    let mut image = image::open(image_path)?.to_rgb8();
    let (width, height) = image.dimensions();
    debug!("Loaded {} ({}x{})", image_path.display(), width, height);

    let boxes = load_annotations(label_path, width, height)?;
    draw_annotations(&mut image, &boxes);

    image.save(output_path)?;
    info!("Saved {} with {} boxes", output_path.display(), boxes.len());

    Ok(Visualization {
        output: output_path.to_path_buf(),
        boxes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_uses_stem() {
        assert_eq!(
            visualization_path(Path::new("/data/img_001.jpg"), None),
            PathBuf::from("/data/img_001_vis.jpg")
        );
        assert_eq!(
            visualization_path(Path::new("/data/img_001.png"), Some(Path::new("/out"))),
            PathBuf::from("/out/img_001_vis.jpg")
        );
    }

    #[test]
    fn box_outline_is_drawn_in_red() {
        let mut image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 255]));
        let boxes = [AnnotationBox {
            class_id: 7,
            x_min: 40.0,
            y_min: 50.0,
            width: 20.0,
            height: 30.0,
        }];

        draw_annotations(&mut image, &boxes);

        assert_eq!(*image.get_pixel(40, 60), BOX_COLOR);
        assert_eq!(*image.get_pixel(41, 60), BOX_COLOR);
        assert_eq!(*image.get_pixel(59, 60), BOX_COLOR);
        // interior untouched
        assert_eq!(*image.get_pixel(50, 65), Rgb([0, 0, 255]));
        // label sits above the box
        assert_eq!(*image.get_pixel(40, 35), LABEL_BACKGROUND);
    }

    #[test]
    fn huge_and_non_finite_boxes_are_clamped() {
        let mut image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 255]));
        let boxes = [
            AnnotationBox {
                class_id: 0,
                x_min: f64::INFINITY,
                y_min: 10.0,
                width: 10.0,
                height: 10.0,
            },
            AnnotationBox {
                class_id: 1,
                x_min: -1e300,
                y_min: f64::NAN,
                width: 1e300,
                height: f64::NEG_INFINITY,
            },
        ];
        draw_annotations(&mut image, &boxes);

        let clamped = PixelRect::from_annotation(&boxes[1], 100, 100);
        assert_eq!(clamped, PixelRect { x: -100, y: -100, width: 300, height: 1 });
    }

    #[test]
    fn boxes_outside_the_image_do_not_panic() {
        let mut image = RgbImage::new(10, 10);
        let boxes = [AnnotationBox {
            class_id: 12,
            x_min: -30.0,
            y_min: 8.0,
            width: 100.0,
            height: 0.0,
        }];
        draw_annotations(&mut image, &boxes);
    }
}
