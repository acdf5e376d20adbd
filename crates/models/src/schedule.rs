use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{LiquidatorError, LiquidatorResult};

/// 计划表中数值为 0 的条目如何处理
///
/// `CarryForward` 与原有调参结果逐位兼容：0 与“无条目”等价，沿用上一速率。
/// `Apply` 把 0 当作真实的速率变化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroRatePolicy {
    #[default]
    CarryForward,
    Apply,
}

impl ZeroRatePolicy {
    fn accepts(&self, rate: f64) -> bool {
        match self {
            ZeroRatePolicy::CarryForward => rate > 0.0,
            ZeroRatePolicy::Apply => rate >= 0.0,
        }
    }
}

impl FromStr for ZeroRatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "carry-forward" | "carry_forward" | "carry" => Ok(ZeroRatePolicy::CarryForward),
            "apply" => Ok(ZeroRatePolicy::Apply),
            other => Err(format!(
                "unknown zero rate policy '{}', expected 'carry-forward' or 'apply'",
                other
            )),
        }
    }
}

impl fmt::Display for ZeroRatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroRatePolicy::CarryForward => write!(f, "carry-forward"),
            ZeroRatePolicy::Apply => write!(f, "apply"),
        }
    }
}

/// 稀疏的分段常数速率表 (tick -> rate)
///
/// 没有条目的 tick 沿用之前生效的速率。构建后只读。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u64, f64>", into = "BTreeMap<u64, f64>")]
pub struct ScheduleMap {
    rates: BTreeMap<u64, f64>,
}

impl ScheduleMap {
    pub fn new<I>(entries: I) -> LiquidatorResult<Self>
    where
        I: IntoIterator<Item = (u64, f64)>,
    {
        let rates: BTreeMap<u64, f64> = entries.into_iter().collect();
        Self::try_from(rates)
    }

    /// 恒定速率
    pub fn constant(rate: f64) -> LiquidatorResult<Self> {
        Self::new([(0, rate)])
    }

    /// tick 0 的速率，作为模拟起始值
    pub fn initial_rate(&self) -> LiquidatorResult<f64> {
        self.rates.get(&0).copied().ok_or_else(|| {
            LiquidatorError::InvalidSchedule("schedule has no entry for tick 0".to_string())
        })
    }

    /// 精确 tick 上的条目
    pub fn rate_at(&self, tick: u64) -> Option<f64> {
        self.rates.get(&tick).copied()
    }

    /// 给定当前速率，返回 tick 处生效的速率
    pub fn next_rate(&self, tick: u64, current: f64, policy: ZeroRatePolicy) -> f64 {
        match self.rate_at(tick) {
            Some(rate) if policy.accepts(rate) => rate,
            _ => current,
        }
    }

    /// 按 tick 升序遍历条目
    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.rates.iter().map(|(tick, rate)| (*tick, *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl TryFrom<BTreeMap<u64, f64>> for ScheduleMap {
    type Error = LiquidatorError;

    fn try_from(rates: BTreeMap<u64, f64>) -> Result<Self, Self::Error> {
        if let Some((tick, rate)) = rates.iter().find(|(_, r)| !r.is_finite() || **r < 0.0) {
            return Err(LiquidatorError::InvalidSchedule(format!(
                "rate {} at tick {} must be finite and non-negative",
                rate, tick
            )));
        }
        Ok(Self { rates })
    }
}

impl From<ScheduleMap> for BTreeMap<u64, f64> {
    fn from(schedule: ScheduleMap) -> Self {
        schedule.rates
    }
}
