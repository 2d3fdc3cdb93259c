// src/extractors/tokenizer.rs
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// PDF text keeps column alignment as runs of spaces; three or more mark a column boundary.
static COLUMN_GAP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s{3,}").expect("Failed to compile COLUMN_GAP_RE")
});

// Missing glyphs come out of text extraction as '?'.
static GLYPH_PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\?+").expect("Failed to compile GLYPH_PLACEHOLDER_RE")
});

/// Splits one captured table line into its fields.
///
/// The first field is cut at its first space so only the leading identifier
/// remains. When the line has more than one field, `?` runs are removed from the
/// last one. A line without any column gap passes through as a single field.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = COLUMN_GAP_RE.split(line).map(str::to_string).collect();

    if let Some(first) = fields.first_mut() {
        if let Some((identifier, _)) = first.split_once(' ') {
            *first = identifier.to_string();
        }
    }

    if fields.len() > 1 {
        if let Some(last) = fields.last_mut() {
            *last = GLYPH_PLACEHOLDER_RE.replace_all(last, "").into_owned();
        }
    }

    fields
}
