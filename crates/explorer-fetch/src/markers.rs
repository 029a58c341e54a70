//! Client-side-framework marker detection.
//!
//! A fixed set of substrings whose presence in a lowercased HTML body
//! suggests the page's real content is assembled client-side and a static
//! GET likely missed it.

const JS_MARKERS: &[&str] = &[
    "__next_data__",
    "data-reactroot",
    "ng-app",
    "v-cloak",
    "react",
    "vue",
    "angular",
];

/// True if `html` looks like it depends on client-side rendering, or if it
/// is empty/whitespace-only (the "no usable content" case folds into the
/// same fallback trigger).
pub fn looks_like_js_rendered(html: &str) -> bool {
    let trimmed = html.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    JS_MARKERS.iter().any(|marker| lowered.contains(marker))
}
