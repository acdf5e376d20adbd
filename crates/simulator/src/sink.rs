//! 套利记录输出
//!
//! 模拟循环每执行一次套利就向 sink 推送一条记录，输出方式与循环解耦。

use anyhow::{Context, Result};
use models::{ArbitrageRecord, LiquidatorError, LiquidatorResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// 套利记录接收方
pub trait RecordSink {
    fn record(&mut self, record: &ArbitrageRecord) -> LiquidatorResult<()>;

    /// 模拟结束时调用
    fn finish(&mut self) -> LiquidatorResult<()> {
        Ok(())
    }
}

/// 丢弃所有记录
#[derive(Debug, Default)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn record(&mut self, _record: &ArbitrageRecord) -> LiquidatorResult<()> {
        Ok(())
    }
}

/// 收集到内存
impl RecordSink for Vec<ArbitrageRecord> {
    fn record(&mut self, record: &ArbitrageRecord) -> LiquidatorResult<()> {
        self.push(record.clone());
        Ok(())
    }
}

fn sink_error(e: impl std::fmt::Display) -> LiquidatorError {
    LiquidatorError::Sink(e.to_string())
}

/// CSV 输出，创建时即写入表头
pub struct CsvRecordSink<W: Write> {
    writer: csv::Writer<W>,
    rows: u64,
}

impl CsvRecordSink<File> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        info!("CSV 输出: {:?}", path);
        Ok(Self::from_writer(file)?)
    }
}

impl<W: Write> CsvRecordSink<W> {
    pub fn from_writer(inner: W) -> LiquidatorResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer
            .write_record(ArbitrageRecord::COLUMNS)
            .map_err(sink_error)?;
        Ok(Self { writer, rows: 0 })
    }

    /// 已写入的数据行数 (不含表头)
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn into_inner(self) -> LiquidatorResult<W> {
        self.writer.into_inner().map_err(sink_error)
    }
}

impl<W: Write> RecordSink for CsvRecordSink<W> {
    fn record(&mut self, record: &ArbitrageRecord) -> LiquidatorResult<()> {
        self.writer.serialize(record).map_err(sink_error)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> LiquidatorResult<()> {
        self.writer.flush().map_err(sink_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(time: u64) -> ArbitrageRecord {
        ArbitrageRecord {
            time,
            yield_accrual_rate: 10.0,
            available_yield: 120.0,
            swap_amount_out: 108.0,
            swap_amount_in: 9.5,
            swap_exchange_rate: 108.0 / 9.5,
            market_exchange_rate: 12.0,
            efficiency: 12.0 / (108.0 / 9.5),
            moving_average: 84.0,
            yield_virtual_liquidity: 4200.0,
            token_virtual_liquidity: 380.25,
            unsold_yield: 12.0,
        }
    }

    #[test]
    fn test_csv_header_and_rows() {
        let mut sink = CsvRecordSink::from_writer(Vec::new()).unwrap();
        sink.record(&sample_record(3)).unwrap();
        sink.record(&sample_record(4)).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.rows(), 2);

        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], ArbitrageRecord::COLUMNS.join(","));
        assert!(lines[1].starts_with("3,10.0,120.0,108.0,9.5,"));
        assert!(lines[2].starts_with("4,"));
        assert_eq!(lines[1].split(',').count(), 12);
    }

    #[test]
    fn test_empty_run_still_has_header() {
        let mut sink = CsvRecordSink::from_writer(Vec::new()).unwrap();
        sink.finish().unwrap();
        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(output.trim_end(), ArbitrageRecord::COLUMNS.join(","));
    }

    #[test]
    fn test_csv_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("arbs.csv");

        let mut sink = CsvRecordSink::create(&path).unwrap();
        sink.record(&sample_record(7)).unwrap();
        sink.finish().unwrap();
        drop(sink);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<ArbitrageRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, vec![sample_record(7)]);
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<ArbitrageRecord> = Vec::new();
        sink.record(&sample_record(1)).unwrap();
        assert_eq!(sink.len(), 1);
        assert!(sink.finish().is_ok());
    }
}
