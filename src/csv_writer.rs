use crate::types::TimingRecord;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Column names expected by the scaling analysis tool. Order matters.
pub const TIMING_HEADER: &str = "process_count,problem_size,series_id,time";

/// Format a record as one `rank_count,problem_size,series_id,elapsed_time_ms` line
pub fn format_record(record: &TimingRecord) -> String {
    format!(
        "{},{},{},{}",
        record.rank_count, record.problem_size, record.series_id, record.elapsed_ms
    )
}

/// Parse a line produced by [`format_record`]
pub fn parse_record(line: &str) -> Result<TimingRecord> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    if fields.len() != 4 {
        anyhow::bail!("Expected 4 columns, found {}: {:?}", fields.len(), line);
    }

    Ok(TimingRecord {
        rank_count: fields[0].parse().context("Failed to parse process_count")?,
        problem_size: fields[1].parse().context("Failed to parse problem_size")?,
        series_id: fields[2].parse().context("Failed to parse series_id")?,
        elapsed_ms: fields[3].parse().context("Failed to parse time")?,
    })
}

/// Append a timing record to a CSV file, writing the header first if the file is new or empty
pub fn append_timing_csv(record: &TimingRecord, path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context(format!("Failed to open CSV file: {}", path.display()))?;

    let is_empty = file
        .metadata()
        .context(format!("Failed to inspect CSV file: {}", path.display()))?
        .len()
        == 0;
    if is_empty {
        writeln!(file, "{}", TIMING_HEADER)?;
    }

    writeln!(file, "{}", format_record(record))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record() -> TimingRecord {
        TimingRecord {
            rank_count: 4,
            problem_size: 256,
            series_id: 2,
            elapsed_ms: 812.5,
        }
    }

    #[test]
    fn test_format_record() {
        assert_eq!(format_record(&record()), "4,256,2,812.5");
    }

    #[test]
    fn test_parse_record() {
        assert_eq!(parse_record("4,256,2,812.5\n").unwrap(), record());
        assert!(parse_record("4,256,2").is_err());
        assert!(parse_record("4,256,2,812.5,1.0").is_err());
        assert!(parse_record("four,256,2,812.5").is_err());
    }

    #[test]
    fn test_append_writes_header_once() {
        let path = std::env::temp_dir().join(format!("membrane-timing-{}.csv", std::process::id()));
        let _ = fs::remove_file(&path);

        append_timing_csv(&record(), &path).unwrap();
        append_timing_csv(&record(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec![TIMING_HEADER, "4,256,2,812.5", "4,256,2,812.5"]);

        fs::remove_file(&path).unwrap();
    }
}
