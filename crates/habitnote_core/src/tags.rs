//! Tag color resolution.
//!
//! # Responsibility
//! - Look up a tag's color by exact name in the current tag snapshot.
//! - Pick a legible black/white text color for a tag background.
//!
//! # Invariants
//! - Colors are resolved from the snapshot on every pass, never cached on a
//!   document, so renames and recolors show up after the next reload.
//! - Luminance is `(299R + 587G + 114B) / 1000`; `>= 128` means black text.

use crate::model::tag::Tag;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

const LUMINANCE_THRESHOLD: u32 = 128;

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex color regex")
});

/// Foreground text color for a tag chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextColor {
    Black,
    White,
    /// No override; the caller keeps the ambient theme color.
    Inherit,
}

impl TextColor {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Black => "#000000",
            Self::White => "#ffffff",
            Self::Inherit => "inherit",
        }
    }
}

/// Tag name with its resolved colors, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagChip {
    pub name: String,
    pub color: Option<String>,
    pub text_color: TextColor,
}

/// Returns whether `value` is `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

/// Looks up the color of `name` by exact match in `tags`.
pub fn color_of<'a>(name: &str, tags: &'a [Tag]) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.name == name)
        .and_then(|tag| tag.color.as_deref())
}

/// Chooses black or white text for a hex background.
///
/// Returns [`TextColor::Inherit`] for anything that is not `#rgb`/`#rrggbb`.
pub fn contrast_text_color(hex: &str) -> TextColor {
    let Some((r, g, b)) = parse_hex_rgb(hex) else {
        return TextColor::Inherit;
    };
    let luminance = (299 * r + 587 * g + 114 * b) / 1000;
    if luminance >= LUMINANCE_THRESHOLD {
        TextColor::Black
    } else {
        TextColor::White
    }
}

fn parse_hex_rgb(hex: &str) -> Option<(u32, u32, u32)> {
    if !is_hex_color(hex) {
        return None;
    }
    let digits = &hex[1..];
    let expanded = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect::<String>()
    } else {
        digits.to_string()
    };
    let channel = |index: usize| u32::from_str_radix(&expanded[index..index + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Name-to-color index built from one tag snapshot.
#[derive(Debug, Clone, Default)]
pub struct TagPalette {
    colors: HashMap<String, Option<String>>,
}

impl TagPalette {
    pub fn from_tags(tags: &[Tag]) -> Self {
        let colors = tags
            .iter()
            .map(|tag| (tag.name.clone(), tag.color.clone()))
            .collect();
        Self { colors }
    }

    /// Color of one tag name; `None` for unknown or uncolored tags.
    pub fn color_of(&self, name: &str) -> Option<&str> {
        self.colors.get(name).and_then(|color| color.as_deref())
    }

    /// Resolves chips for a document's tag names, keeping their order.
    pub fn chips(&self, names: &[String]) -> Vec<TagChip> {
        names
            .iter()
            .map(|name| {
                let color = self.color_of(name).map(str::to_string);
                let text_color = color
                    .as_deref()
                    .map_or(TextColor::Inherit, contrast_text_color);
                TagChip {
                    name: name.clone(),
                    color,
                    text_color,
                }
            })
            .collect()
    }
}
