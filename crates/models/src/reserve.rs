use serde::{Deserialize, Serialize};

use crate::{LiquidatorError, LiquidatorResult};

/// 虚拟 CPMM 储备对
///
/// x = yield（持续累积的收益资产）, y = reward（治理/奖励代币）。
/// 储备量不对应真实流动性，仅用作定价曲线。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReservePair {
    pub yield_reserve: f64,
    pub reward_reserve: f64,
}

impl ReservePair {
    /// 创建储备对，两侧必须严格为正
    pub fn new(yield_reserve: f64, reward_reserve: f64) -> LiquidatorResult<Self> {
        let pair = Self {
            yield_reserve,
            reward_reserve,
        };
        pair.ensure_positive()?;
        Ok(pair)
    }

    pub fn is_positive(&self) -> bool {
        self.yield_reserve > 0.0
            && self.reward_reserve > 0.0
            && self.yield_reserve.is_finite()
            && self.reward_reserve.is_finite()
    }

    pub fn ensure_positive(&self) -> LiquidatorResult<()> {
        if self.is_positive() {
            Ok(())
        } else {
            Err(LiquidatorError::NonPositiveReserve {
                yield_reserve: self.yield_reserve,
                reward_reserve: self.reward_reserve,
            })
        }
    }

    /// 当前边际价格 (yield / reward)
    pub fn spot_rate(&self) -> f64 {
        self.yield_reserve / self.reward_reserve
    }

    /// 两侧按同一系数缩放
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            yield_reserve: self.yield_reserve * factor,
            reward_reserve: self.reward_reserve * factor,
        }
    }
}

/// 虚拟做市商状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    pub reserves: ReservePair,
    /// 每次清算时累积收益的指数移动平均
    pub yield_ema: f64,
}

impl MarketState {
    pub fn new(reserves: ReservePair) -> Self {
        Self {
            reserves,
            yield_ema: 0.0,
        }
    }

    /// 移动平均与虚拟 yield 流动性的比值，再平衡后应为 1
    pub fn liquidity_ratio(&self, liquidity_fraction: f64) -> f64 {
        self.yield_ema / (self.reserves.yield_reserve * liquidity_fraction)
    }
}
