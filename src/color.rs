use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // Golden-angle stepping keeps neighbours in the label order apart.
            let hue = (i as f32 * 137.508) % 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Linear blend from white to `to` for heat-map cells; `t` is clamped to 0..=1.
pub fn shade(to: Color32, t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let mix = |c: u8| (255.0 + (c as f32 - 255.0) * t).round() as u8;
    Color32::from_rgb(mix(to.r()), mix(to.g()), mix(to.b()))
}

// ---------------------------------------------------------------------------
// Color mapping: label → Color32
// ---------------------------------------------------------------------------

/// Maps chart labels (regions, categories, segments…) to distinct colours so
/// the same label keeps its colour across every chart.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl Default for ColorMap {
    fn default() -> Self {
        ColorMap {
            mapping: BTreeMap::new(),
            default_color: Color32::GRAY,
        }
    }
}

impl ColorMap {
    /// Build a colour map from labels; duplicates keep their first colour.
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut unique: Vec<&str> = Vec::new();
        for label in labels {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        let palette = generate_palette(unique.len());
        ColorMap {
            mapping: unique
                .into_iter()
                .zip(palette)
                .map(|(l, c)| (l.to_string(), c))
                .collect(),
            ..Self::default()
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_get_distinct_stable_colours() {
        let map = ColorMap::from_labels(["East", "West", "East", "Central"]);
        assert_ne!(map.color_for("East"), map.color_for("West"));
        assert_ne!(map.color_for("West"), map.color_for("Central"));
        assert_eq!(map.color_for("Nowhere"), Color32::GRAY);
    }

    #[test]
    fn shade_runs_from_white() {
        assert_eq!(shade(Color32::from_rgb(0, 100, 200), 0.0), Color32::WHITE);
        assert_eq!(shade(Color32::from_rgb(0, 100, 200), 1.0), Color32::from_rgb(0, 100, 200));
        assert_eq!(shade(Color32::from_rgb(0, 100, 200), 7.0), Color32::from_rgb(0, 100, 200));
    }
}
