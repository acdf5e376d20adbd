//! 提交交易并重新归一化虚拟流动性
//!
//! 步骤：回购 -> 真实交易 -> 额外下行压力 -> 更新移动平均 -> 按移动平均缩放储备。
//! 任一步定价失败都放弃本次提交，调用方状态保持不变。

use dex::{buyback, VirtualCpmm};
use models::{LiquidatorParams, LiquidatorResult, MarketState, ReservePair};
use tracing::debug;

/// 再平衡器
#[derive(Debug, Clone)]
pub struct Rebalancer {
    params: LiquidatorParams,
}

/// 提交结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalanceOutcome {
    pub market: MarketState,
    /// 真实交易中换入的 reward
    pub reward_amount_in: f64,
    /// 额外下行压力对应的虚拟 reward 换入量 (不计入利润)
    pub pressure_reward_in: f64,
}

impl Rebalancer {
    pub fn new(params: LiquidatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LiquidatorParams {
        &self.params
    }

    /// 执行交易并返回新状态
    pub fn swap(
        &self,
        yield_amount_out: f64,
        accrued_yield: f64,
        market: &MarketState,
    ) -> LiquidatorResult<RebalanceOutcome> {
        // 回购
        let adjusted = buyback(accrued_yield, &market.reserves);

        // 真实交易: reward 换 yield
        let reward_amount_in = VirtualCpmm::calculate_amount_in(
            yield_amount_out,
            adjusted.reward_reserve,
            adjusted.yield_reserve,
        )?;
        let traded = ReservePair {
            yield_reserve: adjusted.yield_reserve - yield_amount_out,
            reward_reserve: adjusted.reward_reserve + reward_amount_in,
        };

        // 额外下行压力：未真正卖出的虚拟 yield 流压低价格
        let pressure_yield_out = yield_amount_out * self.params.swap_multiplier;
        let pressure_reward_in = VirtualCpmm::calculate_amount_in(
            pressure_yield_out,
            traded.reward_reserve,
            traded.yield_reserve,
        )?;
        let pressured = ReservePair {
            yield_reserve: traded.yield_reserve - pressure_yield_out,
            reward_reserve: traded.reward_reserve + pressure_reward_in,
        };

        // 累积收益呈锯齿状，用低通滤波得到平均值
        let alpha = self.params.ema_alpha;
        let yield_ema = accrued_yield * alpha + market.yield_ema * (1.0 - alpha);

        // 让平均收益始终是虚拟 yield 流动性的固定比例
        let scale = yield_ema / (pressured.yield_reserve * self.params.liquidity_fraction);
        let reserves = pressured.scaled(scale);
        reserves.ensure_positive()?;

        debug!(
            "再平衡: out={:.6} in={:.6} pressure_in={:.6} ema={:.6} scale={:.6}",
            yield_amount_out, reward_amount_in, pressure_reward_in, yield_ema, scale
        );

        Ok(RebalanceOutcome {
            market: MarketState { reserves, yield_ema },
            reward_amount_in,
            pressure_reward_in,
        })
    }
}
