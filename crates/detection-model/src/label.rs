//! Overlay label text and class colours.

use steadybox_common::config::OverlayConfig;

use crate::detection::RawDetection;

/// RGB colour.
pub type Rgb = (u8, u8, u8);

/// Fixed per-class palette, indexed by `class_id % len`.
pub const CLASS_PALETTE: [Rgb; 10] = [
    (255, 0, 0),
    (0, 255, 0),
    (0, 0, 255),
    (255, 255, 0),
    (255, 0, 255),
    (0, 255, 255),
    (128, 0, 128),
    (255, 165, 0),
    (255, 192, 203),
    (0, 128, 0),
];

pub fn class_color(class_id: u32) -> Rgb {
    CLASS_PALETTE[class_id as usize % CLASS_PALETTE.len()]
}

/// Label such as `"person 0.87"`. Empty when both parts are disabled.
pub fn label_text(detection: &RawDetection, config: &OverlayConfig) -> String {
    let mut parts = Vec::with_capacity(2);
    if config.show_class_name && !detection.class_name.is_empty() {
        parts.push(detection.class_name.clone());
    }
    if config.show_confidence {
        parts.push(format!("{:.2}", detection.confidence));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoxRect;

    #[test]
    fn test_label_variants() {
        let d = RawDetection::new(BoxRect::new(0, 0, 1, 1), 0.876, 0, "person");
        let mut config = OverlayConfig::default();
        assert_eq!(label_text(&d, &config), "person 0.88");

        config.show_confidence = false;
        assert_eq!(label_text(&d, &config), "person");

        config.show_class_name = false;
        assert_eq!(label_text(&d, &config), "");
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(class_color(0), class_color(10));
        assert_ne!(class_color(0), class_color(1));
    }
}
