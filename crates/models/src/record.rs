use serde::{Deserialize, Serialize};

use crate::{LiquidatorParams, MarketState, ZeroRatePolicy};

/// 单次套利的指标记录，字段顺序即 CSV 列顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageRecord {
    pub time: u64,
    pub yield_accrual_rate: f64,
    /// 交易前的待清算收益
    pub available_yield: f64,
    pub swap_amount_out: f64,
    pub swap_amount_in: f64,
    pub swap_exchange_rate: f64,
    pub market_exchange_rate: f64,
    /// 市场汇率 / 成交汇率
    pub efficiency: f64,
    pub moving_average: f64,
    pub yield_virtual_liquidity: f64,
    pub token_virtual_liquidity: f64,
    /// 交易后剩余未卖出的收益
    pub unsold_yield: f64,
}

impl ArbitrageRecord {
    pub const COLUMNS: [&'static str; 12] = [
        "time",
        "yield_accrual_rate",
        "available_yield",
        "swap_amount_out",
        "swap_amount_in",
        "swap_exchange_rate",
        "market_exchange_rate",
        "efficiency",
        "moving_average",
        "yield_virtual_liquidity",
        "token_virtual_liquidity",
        "unsold_yield",
    ];
}

/// 模拟结果汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub duration: u64,
    pub params: LiquidatorParams,
    pub min_profit: f64,
    pub zero_rate_policy: ZeroRatePolicy,
    /// 成功执行的套利次数
    pub arb_count: u64,
    /// 累计换入的 reward 数量
    pub cumulative_reward_spent: f64,
    /// 因一致性错误被放弃的提交次数
    pub aborted_commits: u64,
    pub final_market: MarketState,
    /// 模拟结束时未卖出的收益
    pub unsold_yield: f64,
}
