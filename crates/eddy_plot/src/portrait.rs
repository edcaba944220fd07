//! Phase portraits: the direction field of a planar model with optional
//! nullcline overlays and a trajectory track.

use plotters::prelude::*;
use std::error::Error;

use eddy_core::phase::PlanarModel;
use eddy_core::trajectory::Trajectory;

use crate::config::PlotConfig;

/// Helper to draw the portrait on any drawing area
fn draw_portrait_on_area<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    model: &PlanarModel,
    x_range: (f64, f64),
    y_range: (f64, f64),
    t: f64,
    track: Option<&Trajectory<f64>>,
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    let grid = model.sample_field(
        config.field_density,
        config.field_density,
        x_range,
        y_range,
        t,
    )?;
    let track_points = track
        .map(|trajectory| trajectory.series(model.x_name(), model.y_name()))
        .transpose()?;

    root.fill(&config.background)?;

    // Create chart
    let mut chart = ChartBuilder::on(root)
        .caption(&config.title, ("sans-serif", 40.0).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

    // Configure mesh
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(&config.xlabel).y_desc(&config.ylabel);

    if config.show_grid {
        mesh.draw()?;
    } else {
        mesh.disable_mesh().draw()?;
    }

    // Direction field: one fixed-length segment per grid point, a dot at the
    // tip marking the flow direction. Directions are normalized in
    // axis-relative units so uneven ranges keep the field readable.
    let span_x = x_range.1 - x_range.0;
    let span_y = y_range.1 - y_range.0;
    let cell_x = span_x / grid.nx() as f64;
    let cell_y = span_y / grid.ny() as f64;
    let mut shafts = Vec::new();
    let mut heads = Vec::new();
    for i in 0..grid.nx() {
        for j in 0..grid.ny() {
            let (x, y) = (grid.x[(i, j)], grid.y[(i, j)]);
            let u = grid.dx[(i, j)] / span_x;
            let v = grid.dy[(i, j)] / span_y;
            let norm = u.hypot(v);
            if !(norm.is_finite() && norm > 0.0) {
                continue;
            }
            let tip = (x + 0.4 * cell_x * u / norm, y + 0.4 * cell_y * v / norm);
            shafts.push(PathElement::new(
                vec![(x, y), tip],
                config.field_color.stroke_width(1),
            ));
            heads.push(Circle::new(tip, 2, config.field_color.filled()));
        }
    }
    chart.draw_series(shafts)?;
    chart.draw_series(heads)?;

    // Nullcline overlays, one color per plane variable
    let mut labeled = false;
    for (name, color) in [(model.x_name(), GREEN), (model.y_name(), BLUE)] {
        if !model.has_nullclines(name) {
            continue;
        }
        let branches =
            model.sample_nullclines(name, x_range, y_range, config.nullcline_samples)?;
        for (k, branch) in branches.iter().enumerate() {
            let anno = chart.draw_series(LineSeries::new(
                branch.points.iter().copied(),
                color.stroke_width(config.line_width),
            ))?;
            if k == 0 {
                anno.label(format!("{name} nullcline")).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
                labeled = true;
            }
        }
    }

    // Trajectory track over the field
    if let Some(points) = track_points {
        let track_color = config.line_color;
        chart
            .draw_series(LineSeries::new(
                points.into_iter(),
                track_color.stroke_width(config.line_width),
            ))?
            .label("trajectory")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], track_color.stroke_width(2))
            });
        labeled = true;
    }

    if labeled {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Plot the phase portrait of a planar model
///
/// Samples the direction field over the given viewport at time `t` and draws
/// it as short arrows, overlays every registered nullcline (x-variable
/// branches in green, y-variable branches in blue), and optionally traces a
/// trajectory through the plane.
///
/// # Arguments
///
/// * `model` - Planar model to sample
/// * `x_range`, `y_range` - Viewport in plane coordinates
/// * `t` - Time at which the field is sampled
/// * `track` - Optional trajectory to trace over the field
/// * `output_path` - Output file path (.png or .svg)
/// * `config` - Optional PlotConfig; when None the axis labels default to
///   the model's variable names
///
/// # Errors
///
/// Returns error if a range is invalid, the plane variables are not
/// registered, a derivative or nullcline evaluation fails, or the image
/// cannot be written.
pub fn plot_phase_portrait(
    model: &PlanarModel,
    x_range: (f64, f64),
    y_range: (f64, f64),
    t: f64,
    track: Option<&Trajectory<f64>>,
    output_path: &str,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    let owned_config = config.cloned().unwrap_or_else(|| PlotConfig {
        title: "Phase portrait".to_string(),
        xlabel: model.x_name().to_string(),
        ylabel: model.y_name().to_string(),
        ..PlotConfig::default()
    });
    let config = &owned_config;

    // Create backend
    if output_path.ends_with(".svg") {
        let root = SVGBackend::new(output_path, (config.width, config.height)).into_drawing_area();
        draw_portrait_on_area(&root, model, x_range, y_range, t, track, config)
    } else {
        let root =
            BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
        draw_portrait_on_area(&root, model, x_range, y_range, t, track, config)
    }
}

/// Helper to draw a bare phase track on any drawing area
fn draw_track_on_area<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    points: &[(f64, f64)],
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    // Build margins (10% space); flat tracks still get room
    let x_span = x_max - x_min;
    let y_span = y_max - y_min;
    let x_pad = if x_span > 0.0 { 0.1 * x_span } else { 1.0 };
    let y_pad = if y_span > 0.0 { 0.1 * y_span } else { 1.0 };

    root.fill(&config.background)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&config.title, ("sans-serif", 40.0).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min - x_pad..x_max + x_pad, y_min - y_pad..y_max + y_pad)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(&config.xlabel).y_desc(&config.ylabel);

    if config.show_grid {
        mesh.draw()?;
    } else {
        mesh.disable_mesh().draw()?;
    }

    if config.track_gradient {
        // Step index drives the color, so the run's direction stays visible.
        let count = points.len();
        chart.draw_series(
            points
                .iter()
                .enumerate()
                .map(|(k, &point)| Circle::new(point, 2, gradient_color(k, count).filled())),
        )?;
    } else {
        chart.draw_series(LineSeries::new(
            points.iter().copied(),
            config.line_color.stroke_width(config.line_width),
        ))?;
    }

    root.present()?;
    Ok(())
}

/// Early steps blue, late steps red.
fn gradient_color(index: usize, count: usize) -> RGBColor {
    let fraction = if count > 1 {
        index as f64 / (count - 1) as f64
    } else {
        0.0
    };
    RGBColor((255.0 * fraction) as u8, 64, (255.0 * (1.0 - fraction)) as u8)
}

/// Plot one trajectory in the plane of two of its variables
///
/// A lighter companion to [`plot_phase_portrait`]: no field sampling, just
/// `y_name` against `x_name` over the whole run, with the viewport fitted to
/// the data.
pub fn plot_phase_track(
    trajectory: &Trajectory<f64>,
    x_name: &str,
    y_name: &str,
    output_path: &str,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    let owned_config = config.cloned().unwrap_or_else(|| PlotConfig {
        title: "Phase track".to_string(),
        xlabel: x_name.to_string(),
        ylabel: y_name.to_string(),
        ..PlotConfig::default()
    });
    let config = &owned_config;

    if trajectory.is_empty() {
        return Err("Empty trajectory: nothing to plot".into());
    }
    let points = trajectory.series(x_name, y_name)?;

    // Create backend
    if output_path.ends_with(".svg") {
        let root = SVGBackend::new(output_path, (config.width, config.height)).into_drawing_area();
        draw_track_on_area(&root, &points, config)
    } else {
        let root =
            BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
        draw_track_on_area(&root, &points, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::model::Params;
    use eddy_core::phase::CurveOrientation;
    use tempfile::NamedTempFile;

    fn rotation() -> PlanarModel {
        let mut model = PlanarModel::new("x", "y").unwrap();
        model.add_x_variable(Params::from([("omega", 1.0)]), |s, p| {
            Ok(-(p.get("omega")? * s.get("y")?))
        });
        model.add_y_variable(Params::from([("omega", 1.0)]), |s, p| {
            Ok(p.get("omega")? * s.get("x")?)
        });
        model
    }

    #[test]
    fn test_plot_png_portrait_with_nullclines_and_track() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("png");

        let mut model = rotation();
        model
            .add_nullcline("x", CurveOrientation::YOfX, Params::new(), |_, _| Ok(0.0))
            .unwrap();
        model
            .add_nullcline("y", CurveOrientation::XOfY, Params::new(), |_, _| Ok(0.0))
            .unwrap();
        let trajectory = model.integrate(&[("x", 1.0), ("y", 0.0)], 6.0, 0.01).unwrap();

        plot_phase_portrait(
            &model,
            (-2.0, 2.0),
            (-2.0, 2.0),
            0.0,
            Some(&trajectory),
            path.to_str().unwrap(),
            None,
        )
        .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_svg_portrait_bare_field() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("svg");

        plot_phase_portrait(
            &rotation(),
            (-1.0, 1.0),
            (-1.0, 1.0),
            0.0,
            None,
            path.to_str().unwrap(),
            None,
        )
        .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_portrait_invalid_range_fails() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("png");

        let result = plot_phase_portrait(
            &rotation(),
            (1.0, 1.0),
            (-1.0, 1.0),
            0.0,
            None,
            path.to_str().unwrap(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_plot_png_phase_track() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("png");

        let model = rotation();
        let trajectory = model.integrate(&[("x", 1.0), ("y", 0.0)], 6.0, 0.01).unwrap();
        plot_phase_track(&trajectory, "x", "y", path.to_str().unwrap(), None).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_png_phase_track_gradient() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("png");

        let model = rotation();
        let trajectory = model.integrate(&[("x", 1.0), ("y", 0.0)], 6.0, 0.05).unwrap();
        let mut config = PlotConfig::default();
        config.track_gradient = true;
        plot_phase_track(
            &trajectory,
            "x",
            "y",
            path.to_str().unwrap(),
            Some(&config),
        )
        .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_gradient_color_endpoints() {
        assert_eq!(gradient_color(0, 10), RGBColor(0, 64, 255));
        assert_eq!(gradient_color(9, 10), RGBColor(255, 64, 0));
    }

    #[test]
    fn test_plot_phase_track_unknown_column_fails() {
        let model = rotation();
        let trajectory = model.integrate(&[("x", 1.0), ("y", 0.0)], 1.0, 0.1).unwrap();
        let result = plot_phase_track(&trajectory, "x", "ghost", "unused.png", None);
        assert!(result.is_err());
    }
}
