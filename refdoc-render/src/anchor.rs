//! Heading anchors
//!
//! A heading either names its anchor explicitly with a `{#id}` marker anywhere in its text, or
//! gets one derived from the text when its level is in the configured range. The marker always
//! wins and works at every level.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::RangeInclusive;

static EXPLICIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{#([^}\s]+)\}").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_]+").unwrap());

/// Levels that get a derived anchor when no marker is present.
pub const DEFAULT_ANCHOR_LEVELS: RangeInclusive<u8> = 2..=3;

/// Derive an anchor from heading text: lowercase, non-word runs become one `-`, no hyphens at
/// either end.
pub fn derive_anchor(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_WORD
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Split an explicit `{#id}` marker out of `text`.
///
/// Returns the id and the text with the marker removed. Whitespace that surrounded the marker is
/// collapsed so `{#id} Title` reads `Title`.
pub fn take_explicit_anchor(text: &str) -> Option<(String, String)> {
    let caps = EXPLICIT.captures(text)?;
    let marker = caps.get(0)?;
    let id = caps[1].to_string();

    let before = text[..marker.start()].trim_end();
    let after = text[marker.end()..].trim_start();
    let stripped = if before.is_empty() || after.is_empty() {
        format!("{}{}", before, after)
    } else {
        format!("{} {}", before, after)
    };
    Some((id, stripped))
}

/// The anchor for a heading without a marker, if its level gets one.
pub fn implicit_anchor(text: &str, level: u8, levels: &RangeInclusive<u8>) -> Option<String> {
    if !levels.contains(&level) {
        return None;
    }
    let id = derive_anchor(text);
    (!id.is_empty()).then_some(id)
}

pub fn anchor_html(id: &str) -> String {
    format!(r##"<a name="{0}" class="anchor" href="#{0}"></a>"##, id)
}
