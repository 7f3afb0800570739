#![allow(dead_code)]

use std::io::Write;
use std::rc::Rc;

use barlens::domain::bar::Bar;
use barlens::domain::bar_series::BarSeries;
use chrono::{DateTime, TimeDelta, Utc};

pub fn base_time() -> DateTime<Utc> {
    "2010-01-01T00:00:00Z".parse().unwrap()
}

pub fn five_minutes() -> TimeDelta {
    TimeDelta::minutes(5)
}

pub fn make_bar(end_time: DateTime<Utc>, period: TimeDelta, close: f64) -> Bar<f64> {
    Bar {
        end_time,
        time_period: period,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0,
        amount: close * 1000.0,
    }
}

/// Five-minute bars with the given closes, the first ending `offset` periods
/// after [`base_time`].
pub fn make_series(name: &str, closes: &[f64], offset: i32) -> Rc<BarSeries<f64>> {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            make_bar(
                base_time() + five_minutes() * (offset + i as i32),
                five_minutes(),
                close,
            )
        })
        .collect();
    Rc::new(BarSeries::from_bars(name, base_time(), bars).unwrap())
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// CSV rows in the bar file format, one five-minute bar per close.
pub fn bars_csv(closes: &[f64], offset: i32) -> String {
    let mut csv = String::from("end_time,open,high,low,close,volume\n");
    for (i, close) in closes.iter().enumerate() {
        let end_time = base_time() + five_minutes() * (offset + i as i32);
        csv.push_str(&format!(
            "{},{close},{},{},{close},1000\n",
            end_time.to_rfc3339(),
            close + 1.0,
            close - 1.0
        ));
    }
    csv
}
