//! Loading and saving consumption history
//!
//! The expected CSV format is:
//! date,quantity
//! 2024-01-01,12.5

use std::path::Path;

use crate::records::{ConsumptionRecord, ConsumptionSeries};
use crate::{Result, SeriesError};

/// Load one item's consumption history from a CSV file.
///
/// Rows are sorted by date before the series is built, so unordered exports
/// load fine; duplicate dates are still rejected.
pub fn load_consumption_data<P: AsRef<Path>>(path: P) -> Result<ConsumptionSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path.as_ref())
        .map_err(|e| SeriesError::DataLoad(format!("failed to open file: {}", e)))?;

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<ConsumptionRecord>().enumerate() {
        let record = row.map_err(|e| {
            SeriesError::DataLoad(format!("invalid record at line {}: {}", i + 2, e))
        })?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(SeriesError::DataLoad("no data found in file".to_string()));
    }

    records.sort_by_key(|r| r.date);

    ConsumptionSeries::new(records)
}

/// Write one item's consumption history to a CSV file
pub fn write_consumption_data<P: AsRef<Path>>(path: P, series: &ConsumptionSeries) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())
        .map_err(|e| SeriesError::DataLoad(format!("failed to create file: {}", e)))?;

    for record in series.records() {
        writer
            .serialize(record)
            .map_err(|e| SeriesError::DataLoad(format!("failed to write record: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| SeriesError::DataLoad(format!("failed to flush file: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn load_sorts_unordered_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,quantity").unwrap();
        writeln!(file, "2024-01-15,6.0").unwrap();
        writeln!(file, "2024-01-01,5.0").unwrap();
        writeln!(file, "2024-01-08,7.0").unwrap();
        file.flush().unwrap();

        let series = load_consumption_data(file.path()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first().unwrap().date, date(2024, 1, 1));
        assert_eq!(series.quantities(), vec![5.0, 7.0, 6.0]);
    }

    #[test]
    fn load_rejects_bad_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,quantity").unwrap();
        writeln!(file, "2024-01-01,not-a-number").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            load_consumption_data(file.path()),
            Err(SeriesError::DataLoad(_))
        ));
    }

    #[test]
    fn load_rejects_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,quantity").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            load_consumption_data(file.path()),
            Err(SeriesError::DataLoad(_))
        ));
    }

    #[test]
    fn round_trip_through_csv() {
        let series = ConsumptionSeries::from_pairs(vec![
            (date(2024, 1, 1), 5.0),
            (date(2024, 1, 8), 7.5),
        ])
        .unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        write_consumption_data(file.path(), &series).unwrap();
        let loaded = load_consumption_data(file.path()).unwrap();

        assert_eq!(loaded, series);
    }
}
