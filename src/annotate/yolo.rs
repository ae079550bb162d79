//! YOLO label files
//!
//! One box per line: `class x_center y_center width height`, with the
//! four geometry values normalized to the image size.

use std::fs;
use std::path::Path;

use log::warn;

use crate::errors::GeoTileResult;

/// A labelled box in pixel space, anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationBox {
    pub class_id: u32,
    pub x_min: f64,
    pub y_min: f64,
    pub width: f64,
    pub height: f64,
}

impl AnnotationBox {
    /// Convert a normalized center/size box to pixels
    pub fn from_normalized(
        class_id: u32,
        x_center: f64,
        y_center: f64,
        width: f64,
        height: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let box_width = width * image_width as f64;
        let box_height = height * image_height as f64;

        AnnotationBox {
            class_id,
            x_min: x_center * image_width as f64 - box_width / 2.0,
            y_min: y_center * image_height as f64 - box_height / 2.0,
            width: box_width,
            height: box_height,
        }
    }
}

/// Parse one label line; `Err` carries the reason it was rejected
fn parse_line(line: &str, image_width: u32, image_height: u32) -> Result<AnnotationBox, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(format!("expected 5 fields, found {}", fields.len()));
    }

    let class_id = fields[0]
        .parse::<u32>()
        .map_err(|_| format!("invalid class id '{}'", fields[0]))?;

    let mut values = [0.0f64; 4];
    for (slot, field) in values.iter_mut().zip(&fields[1..]) {
        *slot = field
            .parse::<f64>()
            .map_err(|_| format!("invalid number '{}'", field))?;
        if !slot.is_finite() {
            return Err(format!("non-finite number '{}'", field));
        }
    }

    Ok(AnnotationBox::from_normalized(
        class_id,
        values[0],
        values[1],
        values[2],
        values[3],
        image_width,
        image_height,
    ))
}

/// Parse label text into pixel boxes, skipping bad lines with a warning
pub fn parse_annotations(content: &str, image_width: u32, image_height: u32) -> Vec<AnnotationBox> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match parse_line(line, image_width, image_height) {
            Ok(annotation) => Some(annotation),
            Err(reason) => {
                warn!("Skipping invalid line '{}': {}", line, reason);
                None
            }
        })
        .collect()
}

/// Load a label file
///
/// # Arguments
/// * `label_path` - Path of the `.txt` label file
/// * `image_width` - Width of the annotated image in pixels
/// * `image_height` - Height of the annotated image in pixels
///
/// # Returns
/// The boxes in pixel space; a missing file gives an empty list
pub fn load_annotations(label_path: &Path, image_width: u32, image_height: u32) -> GeoTileResult<Vec<AnnotationBox>> {
    if !label_path.exists() {
        warn!("Label file not found: {}", label_path.display());
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(label_path)?;
    Ok(parse_annotations(&content, image_width, image_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn converts_normalized_box_to_pixels() {
        let boxes = parse_annotations("3 0.5 0.5 0.2 0.1\n", 1000, 800);
        assert_eq!(boxes.len(), 1);

        let b = boxes[0];
        assert_eq!(b.class_id, 3);
        assert_relative_eq!(b.x_min, 400.0, max_relative = 1e-12);
        // 0.5 * 800 - 80 / 2
        assert_relative_eq!(b.y_min, 360.0, max_relative = 1e-12);
        assert_relative_eq!(b.width, 200.0, max_relative = 1e-12);
        assert_relative_eq!(b.height, 80.0, max_relative = 1e-12);
    }

    #[test]
    fn skips_lines_with_wrong_field_count() {
        let boxes = parse_annotations("0 0.5 0.5 0.2\n1 0.25 0.25 0.5 0.5\n\n", 100, 100);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].class_id, 1);
        assert_relative_eq!(boxes[0].x_min, 0.0);
    }

    #[test]
    fn skips_unparsable_numbers() {
        let boxes = parse_annotations("x 0.5 0.5 0.2 0.1\n0 0.5 nan? 0.2 0.1\n", 100, 100);
        assert!(boxes.is_empty());
    }

    #[test]
    fn skips_non_finite_numbers() {
        let boxes = parse_annotations(
            "0 inf 0.5 0.1 0.1\n1 0.5 NaN 0.1 0.1\n2 0.5 0.5 -inf 0.1\n3 0.5 0.5 0.1 0.1\n",
            100,
            100,
        );
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].class_id, 3);
    }

    #[test]
    fn missing_file_gives_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let boxes = load_annotations(&dir.path().join("missing.txt"), 640, 480).unwrap();
        assert!(boxes.is_empty());
    }

    #[test]
    fn reads_label_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.txt");
        fs::write(&path, "0 0.5 0.5 1.0 1.0\n2 0.1 0.1 0.2 0.2 extra\n").unwrap();

        let boxes = load_annotations(&path, 640, 480).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_relative_eq!(boxes[0].width, 640.0);
        assert_relative_eq!(boxes[0].height, 480.0);
    }
}
