//! Canonical column naming.
//!
//! Rules, applied in order: trim whitespace, lower-case, spaces to
//! underscores, drop `%`, `(`, `)` and `.`, then resolve known aliases.
//! `"Estimated Unemployment Rate (%)"` becomes `estimated_unemployment_rate`.

/// Upstream headers that normalize with a trailing underscore.
const HEADER_ALIASES: [(&str, &str); 2] = [
    ("estimated_unemployment_rate_", "estimated_unemployment_rate"),
    (
        "estimated_labour_participation_rate_",
        "estimated_labour_participation_rate",
    ),
];

pub fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim_start_matches('\u{feff}').trim();

    let canonical: String = name
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| !matches!(c, '%' | '(' | ')' | '.'))
        .collect();

    HEADER_ALIASES
        .iter()
        .find(|(from, _)| *from == canonical)
        .map(|(_, to)| to.to_string())
        .unwrap_or(canonical)
}
