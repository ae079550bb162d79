//! Annotation visualization
//!
//! Overlays YOLO-style detection boxes on their source image for quick
//! manual checks.

pub mod yolo;
pub mod render;

pub use yolo::{load_annotations, parse_annotations, AnnotationBox};
pub use render::{draw_annotations, visualization_path, visualize, Visualization};
