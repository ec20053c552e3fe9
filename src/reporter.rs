use crate::types::{Grid, RunReport};
use anyhow::Result;
use colored_json::prelude::*;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Format a duration in milliseconds for humans (ms below one second, s above)
fn format_millis(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.3} s", ms / 1000.0)
    } else {
        format!("{:.3} ms", ms)
    }
}

/// Write the grid as a whitespace-delimited float matrix, one grid row per line
pub fn write_grid(grid: &Grid, out: &mut impl Write) -> io::Result<()> {
    for row in grid.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{:.18e}", v)).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    Ok(())
}

/// Print the grid matrix to stdout
pub fn print_grid(grid: &Grid) -> Result<()> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    write_grid(grid, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Print human-readable summary to stderr
pub fn print_summary(report: &RunReport) -> Result<()> {
    let mut err = StandardStream::stderr(ColorChoice::Auto);
    let mut heading = ColorSpec::new();
    heading.set_fg(Some(Color::Cyan)).set_bold(true);

    err.set_color(&heading)?;
    writeln!(err, "\nMembrane {}x{}", report.grid_points, report.grid_points)?;
    err.reset()?;

    writeln!(err, "Ranks:           {}", report.record.rank_count)?;
    writeln!(err, "Series:          {}", report.record.series_id)?;
    writeln!(err, "Iterations:      {}", report.iters)?;
    writeln!(err, "Side length:     {}", report.side_length)?;
    writeln!(err, "Theta:           {}", report.theta)?;
    writeln!(err)?;
    writeln!(err, "Elapsed:         {}", format_millis(report.record.elapsed_ms))?;
    writeln!(err, "  iterations:    {}", format_millis(report.compute_ms))?;
    writeln!(err, "  gather:        {}", format_millis(report.gather_ms))?;

    let peak = report.grid.max_abs();
    if peak.is_finite() {
        writeln!(err, "Max |deflection|: {:.6e}", peak)?;
    } else {
        err.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        writeln!(err, "Max |deflection|: {} (result is not finite)", peak)?;
        err.reset()?;
    }
    writeln!(err)?;
    Ok(())
}

/// Print the run report as JSON, colored when stdout is a terminal
pub fn print_json(report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json.to_colored_json_auto()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0.0), "0.000 ms");
        assert_eq!(format_millis(12.34567), "12.346 ms");
        assert_eq!(format_millis(1500.0), "1.500 s");
    }

    #[test]
    fn test_write_grid() {
        let mut grid = Grid::zeros(2);
        grid.set(1, 0, -0.015625);
        let mut out = Vec::new();
        write_grid(&grid, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "0.000000000000000000e0 0.000000000000000000e0");
        assert_eq!(lines[1], "-1.562500000000000000e-2 0.000000000000000000e0");

        let parsed: Vec<f64> = lines[1].split_whitespace().map(|v| v.parse().unwrap()).collect();
        assert_eq!(parsed, vec![-0.015625, 0.0]);
    }
}
