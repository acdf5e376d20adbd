use serde::{Deserialize, Serialize};

/// 单次套利候选交易
///
/// 套利者投入 reward，换出 yield。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeCandidate {
    pub yield_amount_out: f64,
    pub reward_amount_in: f64,
    /// 以 yield 计价的利润
    pub profit: f64,
}

impl TradeCandidate {
    /// 无套利机会
    pub fn none() -> Self {
        Self::default()
    }

    /// 检查利润是否达到门槛
    pub fn is_profitable(&self, min_profit: f64) -> bool {
        self.yield_amount_out > 0.0 && self.profit >= min_profit
    }

    /// 成交汇率 (yield / reward)
    pub fn exchange_rate(&self) -> f64 {
        self.yield_amount_out / self.reward_amount_in
    }
}

/// 清算机制可调参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidatorParams {
    /// 移动平均平滑系数，越大越偏重近期
    pub ema_alpha: f64,
    /// 额外下行压力倍数
    pub swap_multiplier: f64,
    /// 平均收益占虚拟 yield 流动性的比例
    pub liquidity_fraction: f64,
}

impl Default for LiquidatorParams {
    fn default() -> Self {
        Self {
            ema_alpha: 0.7,
            swap_multiplier: 0.3,
            liquidity_fraction: 0.02,
        }
    }
}
