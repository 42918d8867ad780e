use crate::config::EditorConfig;

pub const GRID_URL: &str = "./static/img/puzzlegrid.png";

/// Active puzzle from the `puzzle` query value, falling back to the default
/// when the parameter is absent or empty.
pub fn puzzle_or_default(value: Option<&str>, config: &EditorConfig) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => config.default_puzzle.clone(),
    }
}

pub fn manifest_url(puzzle: &str) -> String {
    format!("./static/img/{puzzle}/0_pieces.json")
}

pub fn piece_url(puzzle: &str, filename: &str) -> String {
    format!("./static/img/{puzzle}/{filename}")
}

/// Page URL selecting `puzzle`, built from the current location.
pub fn puzzle_href(current_href: &str, puzzle: &str) -> String {
    let base = current_href.split('?').next().unwrap_or(current_href);
    format!("{base}?puzzle={puzzle}")
}

/// Entries of the puzzle dropdown; the active puzzle is always listed.
pub fn puzzle_options(config: &EditorConfig, current: &str) -> Vec<String> {
    let mut options = config.puzzles.clone();
    if !options.iter().any(|p| p == current) {
        options.push(current.to_string());
    }
    options
}
