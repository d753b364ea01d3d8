//! Caption Style Presets
//!
//! Built-in named styles, plus user-defined presets layered on top from
//! settings. Custom presets with a built-in id replace the built-in.

use std::collections::BTreeMap;

use super::models::{CaptionStyle, Color};
use super::position::CaptionPosition;
use crate::core::{CaptionError, CaptionResult};

/// Preset used when nothing else is configured
pub const DEFAULT_PRESET_ID: &str = "classic";

/// Lookup table of caption styles keyed by preset id
#[derive(Clone, Debug, PartialEq)]
pub struct PresetCatalog {
    presets: BTreeMap<String, CaptionStyle>,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetCatalog {
    /// Catalog containing only the built-in presets
    pub fn builtin() -> Self {
        let presets = builtin_presets()
            .into_iter()
            .map(|(id, style)| (id.to_string(), style))
            .collect();
        Self { presets }
    }

    /// Built-ins overlaid with `custom`; every custom style is normalized
    pub fn with_custom(custom: &BTreeMap<String, CaptionStyle>) -> Self {
        let mut catalog = Self::builtin();
        for (id, style) in custom {
            let id = id.trim().to_lowercase();
            if id.is_empty() {
                continue;
            }
            catalog.presets.insert(id, style.clone().normalized());
        }
        catalog
    }

    /// Looks up a preset by id (case-insensitive)
    pub fn get(&self, id: &str) -> CaptionResult<&CaptionStyle> {
        self.presets
            .get(&id.trim().to_lowercase())
            .ok_or_else(|| CaptionError::UnknownPreset(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.presets.contains_key(&id.trim().to_lowercase())
    }

    /// Preset ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CaptionStyle)> {
        self.presets.iter().map(|(id, style)| (id.as_str(), style))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn builtin_presets() -> Vec<(&'static str, CaptionStyle)> {
    vec![
        (DEFAULT_PRESET_ID, CaptionStyle::default()),
        (
            "bold-pop",
            CaptionStyle {
                font_family: "Montserrat".to_string(),
                font_size: 64,
                highlight_color: Color::rgb(0x00, 0xE6, 0x76),
                outline_width: 5,
                words_per_page: 2,
                ..Default::default()
            },
        ),
        (
            "boxed",
            CaptionStyle {
                font_family: "Inter".to_string(),
                font_size: 52,
                highlight_color: Color::rgb(0xFF, 0xD4, 0x00),
                background_color: Some(Color::black()),
                background_opacity: 70,
                outline_width: 0,
                ..Default::default()
            },
        ),
        (
            "minimal",
            CaptionStyle {
                font_family: "Helvetica".to_string(),
                font_size: 40,
                highlight_color: Color::rgb(0x7D, 0xD3, 0xFC),
                outline_width: 2,
                bold: false,
                words_per_page: 5,
                ..Default::default()
            }
            .with_position(CaptionPosition::Bottom),
        ),
        (
            "headline",
            CaptionStyle {
                font_family: "Impact".to_string(),
                font_size: 72,
                highlight_color: Color::rgb(0xFF, 0x3B, 0x30),
                outline_width: 4,
                words_per_page: 1,
                ..Default::default()
            }
            .with_position(CaptionPosition::Center),
        ),
        (
            "subtitle",
            CaptionStyle {
                font_family: "Arial".to_string(),
                font_size: 36,
                highlight_color: Color::rgb(0xFF, 0xEB, 0x3B),
                background_color: Some(Color::rgb(0x11, 0x11, 0x11)),
                background_opacity: 60,
                bold: false,
                words_per_page: 7,
                ..Default::default()
            }
            .with_vertical_percent(85.0),
        ),
        (
            "top-banner",
            CaptionStyle {
                font_family: "Roboto".to_string(),
                font_size: 48,
                highlight_color: Color::rgb(0xF4, 0x8F, 0xB1),
                outline_width: 3,
                words_per_page: 4,
                ..Default::default()
            }
            .with_position(CaptionPosition::Top),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_has_default() {
        let catalog = PresetCatalog::builtin();
        assert!(catalog.contains(DEFAULT_PRESET_ID));
        assert_eq!(catalog.get(DEFAULT_PRESET_ID).unwrap(), &CaptionStyle::default());
        assert_eq!(catalog.len(), 7);
    }

    #[test]
    fn test_builtins_are_already_normalized() {
        for (id, style) in PresetCatalog::builtin().iter() {
            assert_eq!(style, &style.clone().normalized(), "preset {id}");
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = PresetCatalog::builtin();
        assert!(catalog.get("  Bold-Pop ").is_ok());
    }

    #[test]
    fn test_unknown_preset() {
        let err = PresetCatalog::builtin().get("neon").unwrap_err();
        assert!(matches!(err, CaptionError::UnknownPreset(ref id) if id == "neon"));
    }

    #[test]
    fn test_ids_sorted() {
        let catalog = PresetCatalog::builtin();
        let ids: Vec<&str> = catalog.ids().collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_positions_of_builtins() {
        let catalog = PresetCatalog::builtin();
        assert_eq!(catalog.get("headline").unwrap().position(), CaptionPosition::Center);
        assert_eq!(catalog.get("top-banner").unwrap().position(), CaptionPosition::Top);
        assert_eq!(catalog.get("subtitle").unwrap().position(), CaptionPosition::Bottom);
        assert!(catalog.get("boxed").unwrap().has_background());
    }

    #[test]
    fn test_custom_presets_override_and_extend() {
        let mut custom = BTreeMap::new();
        custom.insert(
            "Classic".to_string(),
            CaptionStyle {
                font_size: 60,
                ..Default::default()
            },
        );
        custom.insert(
            "brand".to_string(),
            CaptionStyle {
                font_size: 500,
                words_per_page: 0,
                ..Default::default()
            },
        );
        custom.insert("   ".to_string(), CaptionStyle::default());

        let catalog = PresetCatalog::with_custom(&custom);
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.get("classic").unwrap().font_size, 60);

        // Custom styles are normalized on the way in
        let brand = catalog.get("brand").unwrap();
        assert_eq!(brand.font_size, crate::core::captions::models::MAX_FONT_SIZE);
        assert_eq!(brand.words_per_page, 1);
    }
}
