//! 外生计划表：市场汇率与收益累积速率

use anyhow::{Context, Result};
use models::{LiquidatorResult, ScheduleMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 参考场景的市场汇率 (yield / reward)
const REFERENCE_MARKET_RATES: [(u64, f64); 17] = [
    (0, 10.0),
    (50, 12.0),
    (80, 14.0),
    (100, 16.0),
    (140, 18.0),
    (150, 20.0),
    (180, 22.0),
    (200, 24.0),
    (240, 26.0),
    (280, 28.0),
    (320, 30.0),
    (350, 32.0),
    (400, 30.0),
    (450, 22.0),
    (500, 16.0),
    (600, 10.0),
    (700, 8.0),
];

/// 参考场景的收益累积速率 (每 tick)
const REFERENCE_ACCRUAL_RATES: [(u64, f64); 4] =
    [(0, 10.0), (100, 100.0), (400, 1000.0), (800, 10000.0)];

/// 一组市场汇率与累积速率计划表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub market_rates: ScheduleMap,
    pub accrual_rates: ScheduleMap,
}

impl Scenario {
    /// 内置参考场景：汇率先涨后跌，累积速率逐级放大
    pub fn reference() -> LiquidatorResult<Self> {
        Ok(Self {
            market_rates: ScheduleMap::new(REFERENCE_MARKET_RATES)?,
            accrual_rates: ScheduleMap::new(REFERENCE_ACCRUAL_RATES)?,
        })
    }

    /// 恒定汇率与恒定累积速率
    pub fn constant(market_rate: f64, accrual_rate: f64) -> LiquidatorResult<Self> {
        Ok(Self {
            market_rates: ScheduleMap::constant(market_rate)?,
            accrual_rates: ScheduleMap::constant(accrual_rate)?,
        })
    }

    /// 从 JSON 文件读取
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schedule file {:?}", path))?;
        let scenario: Scenario = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse schedule file {:?}", path))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// 指定文件时读取文件，否则使用参考场景
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::reference()?),
        }
    }

    /// 两张表都必须有 tick 0 的起始速率
    pub fn validate(&self) -> LiquidatorResult<()> {
        self.market_rates.initial_rate()?;
        self.accrual_rates.initial_rate()?;
        Ok(())
    }
}
