/// Fixed parameters of the editor. Every value here is an art or layout
/// calibration constant; none of them are user settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Design space the manifest coordinates live in.
    pub design_width: f64,
    pub design_height: f64,
    /// Height of the control bar above the stage, subtracted from the viewport.
    pub chrome_height: f64,
    /// Divisor turning the stage scale into the per-piece image scale.
    pub piece_scale_divisor: f64,
    /// Added to the grid width to form the flip pivot.
    pub margin: f64,
    /// Row height of the staging tray, before piece scaling.
    pub max_piece_width: f64,
    /// Arrow-key nudge in design pixels.
    pub arrow_delta: f64,
    pub shift_multiplier: f64,
    /// Screen y at or below which a piece counts as placed.
    pub export_below_y: f64,
    /// Letter font size at scale 1.
    pub label_font_size: f64,
    pub default_puzzle: String,
    pub puzzles: Vec<String>,
    pub rotation_snaps: Vec<f64>,
    /// Degrees within which a rotation snaps.
    pub rotation_snap_tolerance: f64,
    /// Pointer travel in px before a press becomes a drag.
    pub click_slop: f64,
    pub grid_opacity: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            design_width: 1024.0,
            design_height: 768.0,
            chrome_height: 50.0,
            piece_scale_divisor: 3.0,
            margin: 100.0,
            max_piece_width: 325.0,
            arrow_delta: 1.0,
            shift_multiplier: 10.0,
            export_below_y: 150.0,
            label_font_size: 20.0,
            default_puzzle: "red".to_string(),
            puzzles: vec!["red".to_string()],
            rotation_snaps: vec![0.0, 90.0, 180.0, 270.0],
            rotation_snap_tolerance: 5.0,
            click_slop: 3.0,
            grid_opacity: 0.5,
        }
    }
}
