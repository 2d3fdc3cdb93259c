// src/workbook/names.rs
use crate::reconcile::MAX_SHEET_NAME_LEN;
use std::collections::HashSet;

// Characters Excel refuses in a sheet name.
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Hands out unique, valid sheet and table names for one workbook.
///
/// Sheet names are compared case-insensitively, as Excel does. A clash is
/// resolved by appending ` (2)`, ` (3)`, ... and shortening the base so the
/// result stays within the sheet name limit.
#[derive(Debug, Default)]
pub struct NameRegistry {
    sheets: HashSet<String>,
    tables: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_sheet(&mut self, requested: &str) -> String {
        let base = sanitize_sheet_name(requested);
        let mut candidate = base.clone();
        let mut n = 2;

        while self.sheets.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({})", n);
            let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
            candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            n += 1;
        }

        if candidate != requested {
            tracing::warn!("Sheet name '{}' written as '{}'", requested, candidate);
        }
        self.sheets.insert(candidate.to_lowercase());
        candidate
    }

    /// Table name derived from a sheet name.
    pub fn allocate_table(&mut self, sheet_name: &str) -> String {
        self.claim_table(&sanitize_table_name(sheet_name))
    }

    /// Takes `name` as-is if free, numbering it otherwise. `name` must already be a valid identifier.
    pub fn claim_table(&mut self, name: &str) -> String {
        let base = name.to_string();
        let mut candidate = base.clone();
        let mut n = 2;

        while self.tables.contains(&candidate.to_lowercase()) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }

        self.tables.insert(candidate.to_lowercase());
        candidate
    }
}

/// Replaces forbidden characters, trims quote marks and truncates to the sheet name limit.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    let truncated: String = cleaned.chars().take(MAX_SHEET_NAME_LEN).collect();
    // Truncation can expose a trailing quote again.
    let truncated = truncated.trim_end_matches('\'');

    if truncated.trim().is_empty() {
        "Sheet".to_string()
    } else {
        truncated.to_string()
    }
}

/// Table names must be identifiers: letters, digits, `_` and `.`, not starting
/// with a digit and not readable as a cell reference. A fixed prefix covers the
/// last two.
pub fn sanitize_table_name(name: &str) -> String {
    let body: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '.' { c } else { '_' })
        .collect();
    format!("tbl_{}", body)
}
