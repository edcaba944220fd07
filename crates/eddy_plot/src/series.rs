//! Time-series panels: selected trajectory variables drawn against time,
//! one stacked panel per variable.

use plotters::prelude::*;
use std::error::Error;

use eddy_core::model::TIME_VARIABLE;
use eddy_core::trajectory::Trajectory;

use crate::config::PlotConfig;

/// Helper to draw one variable's panel on its own drawing area
fn draw_panel_on_area<DB: DrawingBackend>(
    panel: &DrawingArea<DB, plotters::coord::Shift>,
    name: &str,
    points: &[(f64, f64)],
    t_range: (f64, f64),
    color: RGBColor,
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    let mut max_value = f64::NEG_INFINITY;
    let mut min_value = f64::INFINITY;
    for &(_, value) in points {
        max_value = max_value.max(value);
        min_value = min_value.min(value);
    }

    if config.log_scale {
        // A log axis can only span positive values; nonpositive samples are
        // left out of the line.
        let positive_min = points
            .iter()
            .map(|&(_, value)| value)
            .filter(|value| *value > 0.0)
            .fold(f64::INFINITY, f64::min);
        if !positive_min.is_finite() {
            return Err(format!("Log scale needs positive values in \"{name}\".").into());
        }

        let mut chart = ChartBuilder::on(panel)
            .caption(name, ("sans-serif", 24.0).into_font())
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(55)
            .build_cartesian_2d(
                t_range.0..t_range.1,
                (positive_min / 2.0..max_value * 2.0).log_scale(),
            )?;

        let mut mesh = chart.configure_mesh();
        mesh.x_desc(&config.xlabel).y_desc(&config.ylabel);
        if config.show_grid {
            mesh.draw()?;
        } else {
            mesh.disable_mesh().draw()?;
        }

        chart.draw_series(LineSeries::new(
            points.iter().filter(|point| point.1 > 0.0).copied(),
            color.stroke_width(config.line_width),
        ))?;
    } else {
        // Build margins (10% space); flat data still gets room
        let y_range = max_value - min_value;
        let y_pad = if y_range > 0.0 { 0.1 * y_range } else { 1.0 };

        let mut chart = ChartBuilder::on(panel)
            .caption(name, ("sans-serif", 24.0).into_font())
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(55)
            .build_cartesian_2d(t_range.0..t_range.1, min_value - y_pad..max_value + y_pad)?;

        let mut mesh = chart.configure_mesh();
        mesh.x_desc(&config.xlabel).y_desc(&config.ylabel);
        if config.show_grid {
            mesh.draw()?;
        } else {
            mesh.disable_mesh().draw()?;
        }

        chart.draw_series(LineSeries::new(
            points.iter().copied(),
            color.stroke_width(config.line_width),
        ))?;
    }

    Ok(())
}

/// Helper to draw all requested panels on any drawing area
fn draw_series_on_area<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    trajectory: &Trajectory<f64>,
    variables: &[&str],
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    root.fill(&config.background)?;

    let times = trajectory.times()?;
    let t_min = times.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut t_max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if t_max <= t_min {
        t_max = t_min + 1.0;
    }

    let panels = root.split_evenly((variables.len(), 1));
    for (i, name) in variables.iter().enumerate() {
        let points = trajectory.series(TIME_VARIABLE, name)?;
        let color = if variables.len() == 1 {
            config.line_color
        } else {
            config.series_color(i)
        };
        draw_panel_on_area(&panels[i], name, &points, (t_min, t_max), color, config)?;
    }

    root.present()?;
    Ok(())
}

/// Plot trajectory variables against time
///
/// Draws one stacked panel per selected variable, each titled by its name,
/// sharing the time axis range. Colors cycle through the palette (or
/// `config.series_colors`); a single panel uses `config.line_color`. With
/// `config.log_scale` the y axes are logarithmic and nonpositive samples are
/// dropped from the lines.
///
/// # Arguments
///
/// * `trajectory` - Integration output to read from
/// * `variables` - Column names to draw, one panel each
/// * `output_path` - Output file path (.png or .svg)
/// * `config` - Optional PlotConfig
///
/// # Errors
///
/// Returns error if the trajectory is empty, a variable name is not one of
/// its columns, a log-scaled variable has no positive samples, or the image
/// cannot be written.
pub fn plot_series(
    trajectory: &Trajectory<f64>,
    variables: &[&str],
    output_path: &str,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    let owned_config = config.cloned().unwrap_or(PlotConfig::default());
    let config = &owned_config;

    assert!(
        !variables.is_empty(),
        "At least one variable must be selected"
    );

    if trajectory.is_empty() {
        return Err("Empty trajectory: nothing to plot".into());
    }

    // Create backend
    if output_path.ends_with(".svg") {
        let root = SVGBackend::new(output_path, (config.width, config.height)).into_drawing_area();
        draw_series_on_area(&root, trajectory, variables, config)
    } else {
        let root =
            BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
        draw_series_on_area(&root, trajectory, variables, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::model::{DynamicModel, Params};
    use tempfile::NamedTempFile;

    fn decaying_pair() -> Trajectory<f64> {
        let mut model: DynamicModel<f64> = DynamicModel::new();
        model.add_variable("x", Params::from([("k", 0.5)]), |s, p| {
            Ok(-(p.get("k")? * s.get("x")?))
        });
        model.add_variable("y", Params::from([("k", 0.25)]), |s, p| {
            Ok(-(p.get("k")? * s.get("y")?))
        });
        model
            .integrate(&[("x", 10.0), ("y", 5.0)], 5.0, 0.01)
            .unwrap()
    }

    #[test]
    fn test_plot_png_single_panel() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("png");

        plot_series(&decaying_pair(), &["x"], path.to_str().unwrap(), None).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_svg_stacked_panels() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("svg");

        plot_series(&decaying_pair(), &["x", "y"], path.to_str().unwrap(), None).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_png_log_scale() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("png");

        let mut config = PlotConfig::default();
        config.log_scale = true;
        plot_series(
            &decaying_pair(),
            &["x", "y"],
            path.to_str().unwrap(),
            Some(&config),
        )
        .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_log_scale_rejects_nonpositive_series() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("png");

        let mut model: DynamicModel<f64> = DynamicModel::new();
        model.add_variable("w", Params::new(), |_, _| Ok(0.0));
        let trajectory = model.integrate(&[("w", -1.0)], 0.5, 0.1).unwrap();

        let mut config = PlotConfig::default();
        config.log_scale = true;
        let result = plot_series(&trajectory, &["w"], path.to_str().unwrap(), Some(&config));
        assert!(result.is_err());
    }

    #[test]
    fn test_plot_unknown_variable_fails() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("png");

        let result = plot_series(&decaying_pair(), &["ghost"], path.to_str().unwrap(), None);
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "At least one variable must be selected")]
    fn test_plot_no_variables_panics() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("png");

        plot_series(&decaying_pair(), &[], path.to_str().unwrap(), None).unwrap();
    }
}
