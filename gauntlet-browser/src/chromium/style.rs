//! Style and text probes evaluated inside the page.
//!
//! The playground verifies several challenges through computed CSS rather
//! than the DOM tree (a transparent button is still in the tree; an
//! offscreen one still has a size), so the probes here read
//! `window.getComputedStyle` in a single round trip per element.

use serde::Deserialize;

/// Computed CSS properties of one element, read in a single evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyle {
    pub background_color: String,
    pub opacity: String,
    pub width: String,
    pub height: String,
    pub position: String,
}

/// Quote `value` as a JavaScript string literal.
///
/// Probes interpolate CSS selectors into evaluated scripts; JSON string
/// encoding is valid JS and keeps quotes and backslashes intact.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

/// Replace non-breaking spaces with plain ones.
///
/// Labels like the playground's "My Button" use U+00A0 between words;
/// assertions that do not care about the distinction normalise first.
pub fn normalize_nbsp(text: &str) -> String {
    text.replace('\u{a0}', " ")
}

/// Script returning the [`ComputedStyle`] of the first match for
/// `selector`, or `null` when nothing matches.
pub(crate) fn computed_style_probe(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({selector});
            if (!el) return null;
            const style = window.getComputedStyle(el);
            return {{
                backgroundColor: style.backgroundColor,
                opacity: style.opacity,
                width: style.width,
                height: style.height,
                position: style.position
            }};
        }})()"#,
        selector = js_string(selector),
    )
}

/// Script deciding whether the first match for `selector` is visible:
/// present in the DOM, not `display: none` or `visibility: hidden`, and
/// with a non-zero bounding box.
pub(crate) fn visibility_probe(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({selector});
            if (!el) return false;
            const style = window.getComputedStyle(el);
            if (style.display === 'none' || style.visibility === 'hidden') return false;
            const rect = el.getBoundingClientRect();
            return rect.width > 0 && rect.height > 0;
        }})()"#,
        selector = js_string(selector),
    )
}
