use crate::config::EditorConfig;

/// Viewport-to-design scale factors, computed once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageScale {
    /// Screen pixels per design pixel.
    pub scale: f64,
    /// Screen pixels per natural image pixel.
    pub piece_scale: f64,
}

impl StageScale {
    pub fn new(stage_width: f64, stage_height: f64, config: &EditorConfig) -> Self {
        let width_scale = stage_width / config.design_width;
        let height_scale = stage_height / config.design_height;
        let scale = width_scale.min(height_scale);
        Self {
            scale,
            piece_scale: scale / config.piece_scale_divisor,
        }
    }

    /// Stage size available for a browser viewport.
    pub fn stage_size(viewport_width: f64, viewport_height: f64, config: &EditorConfig) -> (f64, f64) {
        (viewport_width, viewport_height - config.chrome_height)
    }

    pub fn to_screen(&self, design: f64) -> f64 {
        design * self.scale
    }

    pub fn to_design(&self, screen: f64) -> f64 {
        screen / self.scale
    }

    /// Design coordinate rounded to the integer grid the manifest stores.
    pub fn to_design_int(&self, screen: f64) -> i64 {
        self.to_design(screen).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scale_is_min_of_axes() {
        let config = EditorConfig::default();
        let s = StageScale::new(2048.0, 768.0, &config);
        assert_relative_eq!(s.scale, 1.0);
        assert_relative_eq!(s.piece_scale, 1.0 / 3.0);

        let s = StageScale::new(512.0, 768.0, &config);
        assert_relative_eq!(s.scale, 0.5);
    }

    #[test]
    fn test_piece_scale_uses_divisor() {
        let config = EditorConfig {
            piece_scale_divisor: 8.0,
            ..EditorConfig::default()
        };
        let s = StageScale::new(1024.0, 768.0, &config);
        assert_relative_eq!(s.piece_scale, 0.125);
    }

    #[test]
    fn test_stage_size_subtracts_chrome() {
        let config = EditorConfig::default();
        assert_eq!(StageScale::stage_size(1280.0, 900.0, &config), (1280.0, 850.0));
    }

    #[test]
    fn test_design_round_trip() {
        let config = EditorConfig::default();
        let s = StageScale::new(1366.0, 650.0, &config);
        for x in [0i64, 1, 17, 333, 1023] {
            assert_eq!(s.to_design_int(s.to_screen(x as f64)), x);
        }
    }
}
