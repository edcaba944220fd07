//! CSV export for simulation trajectories.
//!
//! Writes a trajectory as one table: a header row of variable names in
//! column order, then one row per recorded step. The output loads directly
//! into Excel, pandas, and most other analysis tools.

use std::error::Error;
use std::fs::File;
use std::io::Write;

use eddy_core::trajectory::Trajectory;

/// Configuration for CSV export
///
/// # Fields
///
/// - `delimiter`: Column separator (default: ',')
/// - `decimal_separator`: Decimal point character (default: '.')
/// - `precision`: Number of decimal places (default: 6)
#[derive(Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Number of decimal places for floating-point values (default: 6)
    pub precision: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
        }
    }
}

impl CsvConfig {
    /// Create config with European CSV format (semicolon, comma for decimal)
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// Create config with high precision (12 decimal places)
    pub fn high_precision() -> Self {
        Self {
            precision: 12,
            ..Default::default()
        }
    }

    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

/// Format number with configured precision and decimal separator
fn format_number(value: f64, config: &CsvConfig) -> String {
    let formatted = format!("{:.prec$}", value, prec = config.precision);

    if config.decimal_separator != '.' {
        formatted.replace('.', &config.decimal_separator.to_string())
    } else {
        formatted
    }
}

/// Write a trajectory as CSV to any writer
///
/// Header row first, then one line per recorded step. Non-finite values are
/// written the way Rust formats them ("NaN", "inf"), so diverging runs
/// export like any other.
pub fn write_trajectory_csv<W: Write>(
    trajectory: &Trajectory<f64>,
    writer: &mut W,
    config: &CsvConfig,
) -> Result<(), Box<dyn Error>> {
    if trajectory.is_empty() {
        return Err("Empty trajectory: nothing to export".into());
    }

    let delimiter = config.delimiter.to_string();
    writeln!(writer, "{}", trajectory.names().join(&delimiter))?;

    for row in trajectory.rows() {
        let fields: Vec<String> = row
            .iter()
            .map(|value| format_number(*value, config))
            .collect();
        writeln!(writer, "{}", fields.join(&delimiter))?;
    }

    Ok(())
}

/// Export a trajectory to a CSV file
///
/// # Arguments
///
/// * `trajectory` - Integration output to export
/// * `output_path` - Output file path
/// * `configuration` - Optional CSV configuration (uses default if None)
///
/// # Example
///
/// ```rust,ignore
/// let trajectory = model.integrate(&[("x", 1.0)], 10.0, 0.01)?;
/// export_trajectory_csv(&trajectory, "run.csv", None)?;
/// ```
pub fn export_trajectory_csv(
    trajectory: &Trajectory<f64>,
    output_path: &str,
    configuration: Option<&CsvConfig>,
) -> Result<(), Box<dyn Error>> {
    let binding = CsvConfig::default();
    let configuration = configuration.unwrap_or(&binding);

    let mut file = File::create(output_path)?;
    write_trajectory_csv(trajectory, &mut file, configuration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::model::{DynamicModel, Params};
    use std::fs;
    use tempfile::NamedTempFile;

    fn steady_growth() -> Trajectory<f64> {
        let mut model: DynamicModel<f64> = DynamicModel::new();
        model.add_variable("x", Params::from([("rate", 2.0)]), |_, p| p.get("rate"));
        model.integrate(&[("x", 1.0)], 0.2, 0.1).unwrap()
    }

    #[test]
    fn test_csv_layout_and_precision() {
        let mut buffer = Vec::new();
        write_trajectory_csv(&steady_growth(), &mut buffer, &CsvConfig::default()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "t,x");
        assert_eq!(lines[1], "0.000000,1.000000");
        assert_eq!(lines[2], "0.100000,1.200000");
        assert_eq!(lines[3], "0.200000,1.400000");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_european_format() {
        let mut buffer = Vec::new();
        let config = CsvConfig::european().precision(2);
        write_trajectory_csv(&steady_growth(), &mut buffer, &config).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().nth(1).unwrap(), "0,00;1,00");
    }

    #[test]
    fn test_csv_high_precision() {
        let mut buffer = Vec::new();
        write_trajectory_csv(&steady_growth(), &mut buffer, &CsvConfig::high_precision()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().nth(2).unwrap(), "0.100000000000,1.200000000000");
    }

    #[test]
    fn test_csv_export_to_file() {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().with_extension("csv");

        export_trajectory_csv(&steady_growth(), path.to_str().unwrap(), None).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("t,x\n"));
        assert_eq!(text.lines().count(), 4);
    }
}
