//! CSV file bar source.
//!
//! Expected columns: `end_time,open,high,low,close,volume[,amount]`, with
//! `end_time` in RFC 3339. A missing `amount` defaults to `close * volume`.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::bar::Bar;
use crate::domain::error::BarlensError;
use crate::ports::data_port::BarSource;

pub struct CsvAdapter {
    path: PathBuf,
    time_period: Option<TimeDelta>,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            time_period: None,
        }
    }

    /// Uses `time_period` instead of inferring it from the first two rows.
    pub fn with_time_period(mut self, time_period: TimeDelta) -> Self {
        self.time_period = Some(time_period);
        self
    }
}

struct Row {
    end_time: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    amount: Option<f64>,
}

fn field<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, BarlensError> {
    record.get(index).ok_or_else(|| BarlensError::Data {
        reason: format!("missing {name} column"),
    })
}

fn number(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, BarlensError> {
    field(record, index, name)?
        .trim()
        .parse()
        .map_err(|e| BarlensError::Data {
            reason: format!("invalid {name} value: {e}"),
        })
}

fn parse_row(record: &csv::StringRecord) -> Result<Row, BarlensError> {
    let raw_time = field(record, 0, "end_time")?.trim();
    let end_time = DateTime::parse_from_rfc3339(raw_time)
        .map_err(|e| BarlensError::Data {
            reason: format!("invalid end_time `{raw_time}`: {e}"),
        })?
        .with_timezone(&Utc);

    let amount = match record.get(6) {
        Some(raw) if !raw.trim().is_empty() => Some(number(record, 6, "amount")?),
        _ => None,
    };

    Ok(Row {
        end_time,
        open: number(record, 1, "open")?,
        high: number(record, 2, "high")?,
        low: number(record, 3, "low")?,
        close: number(record, 4, "close")?,
        volume: number(record, 5, "volume")?,
        amount,
    })
}

impl BarSource<f64> for CsvAdapter {
    fn load_bars(&self) -> Result<Vec<Bar<f64>>, BarlensError> {
        let content = fs::read_to_string(&self.path).map_err(|e| BarlensError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BarlensError::Data {
                reason: format!("CSV parse error: {e}"),
            })?;
            rows.push(parse_row(&record)?);
        }
        rows.sort_by_key(|r| r.end_time);

        let time_period = match (self.time_period, rows.as_slice()) {
            (Some(period), _) => period,
            (None, [first, second, ..]) => second.end_time - first.end_time,
            (None, _) => {
                return Err(BarlensError::Data {
                    reason: format!(
                        "cannot infer the time period of {} from fewer than two bars",
                        self.path.display()
                    ),
                });
            }
        };

        log::debug!(
            "loaded {} bars from {} with period {time_period}",
            rows.len(),
            self.path.display()
        );

        Ok(rows
            .into_iter()
            .map(|r| Bar {
                end_time: r.end_time,
                time_period,
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                volume: r.volume,
                amount: r.amount.unwrap_or(r.close * r.volume),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_bars_infers_period_and_sorts() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "btc.csv",
            "end_time,open,high,low,close,volume\n\
             2010-01-01T00:10:00Z,105.0,115.0,100.0,110.0,60000\n\
             2010-01-01T00:05:00Z,100.0,110.0,90.0,105.0,50000\n\
             2010-01-01T00:15:00Z,110.0,120.0,105.0,115.0,55000\n",
        );

        let bars = CsvAdapter::new(path).load_bars().unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].time_period, TimeDelta::minutes(5));
        assert_eq!(bars[0].amount, 105.0 * 50000.0);
        assert_eq!(bars[2].high, 120.0);
    }

    #[test]
    fn load_bars_reads_amount_column() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "eth.csv",
            "end_time,open,high,low,close,volume,amount\n\
             2024-01-01T01:00:00+00:00,1,2,0.5,1.5,10,14.2\n",
        );

        let bars = CsvAdapter::new(path)
            .with_time_period(TimeDelta::hours(1))
            .load_bars()
            .unwrap();
        assert_eq!(bars[0].amount, 14.2);
        assert_eq!(bars[0].time_period, TimeDelta::hours(1));
    }

    #[test]
    fn single_row_without_period_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "one.csv",
            "end_time,open,high,low,close,volume\n2024-01-01T00:00:00Z,1,1,1,1,1\n",
        );
        assert!(matches!(
            CsvAdapter::new(path).load_bars(),
            Err(BarlensError::Data { .. })
        ));
    }

    #[test]
    fn invalid_number_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "bad.csv",
            "end_time,open,high,low,close,volume\n2024-01-01T00:00:00Z,1,x,1,1,1\n",
        );
        let err = CsvAdapter::new(path)
            .with_time_period(TimeDelta::hours(1))
            .load_bars()
            .unwrap_err();
        assert!(err.to_string().contains("invalid high value"));
    }

    #[test]
    fn missing_file_fails() {
        let result = CsvAdapter::new(PathBuf::from("/nonexistent/bars.csv")).load_bars();
        assert!(matches!(result, Err(BarlensError::Data { .. })));
    }
}
