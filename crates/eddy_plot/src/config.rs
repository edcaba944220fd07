//! Shared appearance configuration for the series and portrait renderers.

use plotters::prelude::*;

/// Configuration for customizing plots.
///
/// Every renderer accepts an optional `&PlotConfig` and falls back to the
/// defaults below when given `None`.
#[derive(Clone)]
pub struct PlotConfig {
    /// Image width in pixels (default: 1024)
    pub width: u32,

    /// Image height in pixels (default: 768)
    pub height: u32,

    /// Plot title (default: "Trajectory")
    pub title: String,

    /// X-axis label (default: "Time")
    pub xlabel: String,

    /// Y-axis label (default: "Value")
    pub ylabel: String,

    /// Line color when a single series is drawn (default: RED)
    pub line_color: RGBColor,

    /// Optional per-series colors (one per plotted variable)
    ///
    /// If None, uses the default palette: [RED, BLUE, GREEN, MAGENTA, ...]
    pub series_colors: Option<Vec<RGBColor>>,

    /// Background color (default: WHITE)
    pub background: RGBColor,

    /// Line width in pixels (default: 2)
    pub line_width: u32,

    /// Show grid lines (default: true)
    pub show_grid: bool,

    /// Logarithmic y axis for time-series panels (default: false)
    pub log_scale: bool,

    /// Color phase tracks by step index, early blue to late red, instead of
    /// drawing a single-color line (default: false)
    pub track_gradient: bool,

    /// Direction-field arrow color for phase portraits (default: grey)
    pub field_color: RGBColor,

    /// Direction-field samples per axis for phase portraits (default: 20)
    pub field_density: usize,

    /// Points per nullcline branch in phase portraits (default: 1000)
    pub nullcline_samples: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Trajectory".to_string(),
            xlabel: "Time".to_string(),
            ylabel: "Value".to_string(),
            line_color: RED,
            series_colors: None,
            background: WHITE,
            line_width: 2,
            show_grid: true,
            log_scale: false,
            track_gradient: false,
            field_color: RGBColor(128, 128, 128),
            field_density: 20,
            nullcline_samples: 1000,
        }
    }
}

impl PlotConfig {
    /// Create config with custom per-series colors
    pub fn with_series_colors(colors: Vec<RGBColor>) -> Self {
        let mut config = Self::default();
        config.series_colors = Some(colors);
        config
    }

    /// Get color for the series at index i
    ///
    /// Uses custom colors if provided, otherwise falls back to the default
    /// palette, wrapping around when it runs out.
    pub(crate) fn series_color(&self, index: usize) -> RGBColor {
        if let Some(ref colors) = self.series_colors {
            if index < colors.len() {
                return colors[index];
            }
        }

        let default_colors = vec![
            RED,
            BLUE,
            GREEN,
            MAGENTA,
            CYAN,
            BLACK,
            RGBColor(255, 165, 0),   // Orange
            RGBColor(128, 0, 128),   // Purple
            RGBColor(255, 192, 203), // Pink
            RGBColor(165, 42, 42),   // Brown
        ];

        default_colors[index % default_colors.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::style::full_palette::{LIGHTBLUE, LIGHTGREEN, ORANGE};

    #[test]
    fn test_plot_config_default() {
        let config = PlotConfig::default();
        assert_eq!(config.width, 1024);
        assert_eq!(config.height, 768);
        assert!(config.show_grid);
        assert!(!config.log_scale);
        assert!(!config.track_gradient);
        assert_eq!(config.field_density, 20);
        assert_eq!(config.nullcline_samples, 1000);
    }

    #[test]
    fn test_series_color_default_palette() {
        let config = PlotConfig::default();
        assert_eq!(config.series_color(0), RED);
        assert_eq!(config.series_color(1), BLUE);
        assert_eq!(config.series_color(10), RED); // Wraparound
    }

    #[test]
    fn test_series_color_custom() {
        let config = PlotConfig::with_series_colors(vec![ORANGE, LIGHTGREEN, LIGHTBLUE]);
        assert_eq!(config.series_color(0), ORANGE);
        assert_eq!(config.series_color(1), LIGHTGREEN);
        assert_eq!(config.series_color(2), LIGHTBLUE);
    }
}
