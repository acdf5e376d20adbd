//! 最优交易规模搜索
//!
//! 把待清算收益等分为若干档，逐档计算套利利润，取利润最大的一档。

use dex::{buyback, VirtualCpmm};
use models::{ReservePair, TradeCandidate};
use tracing::trace;

/// 网格档数 (每档 10%)
pub const GRID_STEPS: u32 = 10;

/// 交易规模优化器
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeOptimizer;

impl TradeOptimizer {
    /// 利润 (以 yield 计价)
    ///
    /// `market_rate` 为 yield / reward，reward 成本按市场价折成 yield。
    pub fn compute_trade_profit(
        reward_amount_in: f64,
        yield_amount_out: f64,
        market_rate: f64,
    ) -> f64 {
        let cost_in_yield = reward_amount_in * market_rate;
        if yield_amount_out > cost_in_yield {
            yield_amount_out - cost_in_yield
        } else {
            0.0
        }
    }

    /// 在回购后的储备上精确计算换出 `yield_amount_out` 所需的 reward
    pub fn compute_exact_amount_in(adjusted: &ReservePair, yield_amount_out: f64) -> Option<f64> {
        // 套利者投入 reward 换出 yield: reward 为输入侧
        VirtualCpmm::calculate_amount_in(
            yield_amount_out,
            adjusted.reward_reserve,
            adjusted.yield_reserve,
        )
        .ok()
    }

    /// 查找利润最大的交易规模
    pub fn find_optimal_amount_out(
        &self,
        accrued_yield: f64,
        reserves: &ReservePair,
        market_rate: f64,
    ) -> TradeCandidate {
        let mut best = TradeCandidate::none();
        if accrued_yield <= 0.0 {
            return best;
        }

        let adjusted = buyback(accrued_yield, reserves);
        let step_size = accrued_yield / GRID_STEPS as f64;

        for step in 1..=GRID_STEPS {
            // 最后一档精确等于全部待清算收益
            let yield_amount_out = if step == GRID_STEPS {
                accrued_yield
            } else {
                (step_size * step as f64).min(accrued_yield)
            };

            let Some(reward_amount_in) =
                Self::compute_exact_amount_in(&adjusted, yield_amount_out)
            else {
                trace!("档位 {} 超出虚拟储备，跳过", yield_amount_out);
                continue;
            };

            let profit =
                Self::compute_trade_profit(reward_amount_in, yield_amount_out, market_rate);
            if profit > best.profit {
                best = TradeCandidate {
                    yield_amount_out,
                    reward_amount_in,
                    profit,
                };
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_reserves() -> ReservePair {
        ReservePair::new(500.0, 50.0).unwrap()
    }

    #[test]
    fn test_zero_yield_returns_zero_candidate() {
        let optimizer = TradeOptimizer::default();
        let best = optimizer.find_optimal_amount_out(0.0, &reference_reserves(), 10.0);
        assert_eq!(best, TradeCandidate::none());
    }

    #[test]
    fn test_reference_scenario_tick_zero() {
        // 500:50 储备, 市场汇率 10, 待清算 10
        // 档位 k 的利润 = k * (19.804 - k) / (510 - k)，在 k = 10 取得最大值 10/51
        let optimizer = TradeOptimizer::default();
        let best = optimizer.find_optimal_amount_out(10.0, &reference_reserves(), 10.0);

        assert_eq!(best.yield_amount_out, 10.0);
        assert!((best.profit - 10.0 / 51.0).abs() < 1e-9);
        assert!((best.reward_amount_in - 50.0 / 51.0).abs() < 1e-9);
        // 低于 MIN_PROFIT = 1
        assert!(!best.is_profitable(1.0));
    }

    #[test]
    fn test_grid_scans_every_step() {
        // 检查每一档都与直接计算一致
        let reserves = reference_reserves();
        let adjusted = buyback(10.0, &reserves);
        let mut expected = TradeCandidate::none();
        for k in 1..=GRID_STEPS {
            let out = k as f64;
            let amount_in = TradeOptimizer::compute_exact_amount_in(&adjusted, out).unwrap();
            let profit = TradeOptimizer::compute_trade_profit(amount_in, out, 10.0);
            if profit > expected.profit {
                expected = TradeCandidate {
                    yield_amount_out: out,
                    reward_amount_in: amount_in,
                    profit,
                };
            }
        }

        let best = TradeOptimizer::default().find_optimal_amount_out(10.0, &reserves, 10.0);
        assert_eq!(best, expected);
    }

    #[test]
    fn test_never_exceeds_backlog_or_goes_negative() {
        let optimizer = TradeOptimizer::default();
        let reserves = reference_reserves();
        for accrued in [0.3, 1.0, 7.7, 100.0, 499.0, 2_000.0, 1.0e6] {
            for market_rate in [0.1, 1.0, 8.0, 10.0, 32.0] {
                let best = optimizer.find_optimal_amount_out(accrued, &reserves, market_rate);
                assert!(best.yield_amount_out <= accrued);
                assert!(best.profit >= 0.0);
                assert!(best.reward_amount_in >= 0.0);
            }
        }
    }

    #[test]
    fn test_unprofitable_market_returns_zero_candidate() {
        // 市场上 reward 极贵，任何档位都不盈利
        let best = TradeOptimizer::default().find_optimal_amount_out(
            10.0,
            &reference_reserves(),
            1_000.0,
        );
        assert_eq!(best, TradeCandidate::none());
    }

    #[test]
    fn test_cheap_reward_prefers_full_backlog() {
        // reward 便宜时利润随规模单调增加
        let best = TradeOptimizer::default().find_optimal_amount_out(
            100.0,
            &reference_reserves(),
            1.0,
        );
        assert_eq!(best.yield_amount_out, 100.0);
        assert!(best.profit > 1.0);
    }

    #[test]
    fn test_profit_formula() {
        assert_eq!(TradeOptimizer::compute_trade_profit(1.0, 12.0, 10.0), 2.0);
        assert_eq!(TradeOptimizer::compute_trade_profit(1.0, 8.0, 10.0), 0.0);
    }
}
