//! 按 tick 推进的清算模拟
//!
//! 每个 tick：更新外生速率 -> 累积收益 -> 搜索最优交易 -> 达到门槛则提交并记录。

use anyhow::Result;
use config_crate::SimulationConfig;
use indicatif::ProgressBar;
use models::{
    ArbitrageRecord, LiquidatorError, LiquidatorResult, MarketState, SimulationSummary,
    ZeroRatePolicy,
};
use strategies::{Rebalancer, TradeOptimizer};
use tracing::{debug, info, warn};
use utils::{ARBITRAGE_TARGET, SIMULATION_TARGET};

use crate::scenario::Scenario;
use crate::sink::RecordSink;

/// 模拟过程中的可变状态
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// 下一个要处理的 tick
    pub tick: u64,
    pub market: MarketState,
    pub market_rate: f64,
    pub accrual_rate: f64,
    /// 尚未卖出的累积收益
    pub accrued_yield: f64,
    pub cumulative_reward_spent: f64,
    pub arb_count: u64,
    pub aborted_commits: u64,
}

impl SimulationState {
    pub fn new(market: MarketState, market_rate: f64, accrual_rate: f64) -> Self {
        Self {
            tick: 0,
            market,
            market_rate,
            accrual_rate,
            accrued_yield: 0.0,
            cumulative_reward_spent: 0.0,
            arb_count: 0,
            aborted_commits: 0,
        }
    }
}

/// 单个 tick 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// 没有达到利润门槛
    Idle,
    Arbitrage(ArbitrageRecord),
    /// 提交失败，本 tick 不交易，待清算收益保留
    Aborted(LiquidatorError),
}

/// 清算模拟器
pub struct Simulation {
    duration: u64,
    min_profit: f64,
    zero_rate_policy: ZeroRatePolicy,
    initial_market: MarketState,
    scenario: Scenario,
    optimizer: TradeOptimizer,
    rebalancer: Rebalancer,
    progress: ProgressBar,
}

impl Simulation {
    /// 创建模拟器，配置与计划表在此校验
    pub fn new(config: &SimulationConfig, scenario: Scenario) -> Result<Self> {
        config.validate()?;
        scenario.validate()?;

        Ok(Self {
            duration: config.duration,
            min_profit: config.min_profit,
            zero_rate_policy: config.zero_rate_policy,
            initial_market: config.initial_market()?,
            scenario,
            optimizer: TradeOptimizer::default(),
            rebalancer: Rebalancer::new(config.params()),
            progress: ProgressBar::hidden(),
        })
    }

    /// 使用外部进度条 (默认隐藏)
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// tick 0 之前的初始状态
    pub fn initial_state(&self) -> LiquidatorResult<SimulationState> {
        Ok(SimulationState::new(
            self.initial_market,
            self.scenario.market_rates.initial_rate()?,
            self.scenario.accrual_rates.initial_rate()?,
        ))
    }

    /// 推进一个 tick
    pub fn step(&self, state: &mut SimulationState) -> TickOutcome {
        let tick = state.tick;
        state.tick += 1;

        state.market_rate = self
            .scenario
            .market_rates
            .next_rate(tick, state.market_rate, self.zero_rate_policy);
        state.accrual_rate = self
            .scenario
            .accrual_rates
            .next_rate(tick, state.accrual_rate, self.zero_rate_policy);
        state.accrued_yield += state.accrual_rate;

        let candidate = self.optimizer.find_optimal_amount_out(
            state.accrued_yield,
            &state.market.reserves,
            state.market_rate,
        );

        if !candidate.is_profitable(self.min_profit) {
            return TickOutcome::Idle;
        }

        let available_yield = state.accrued_yield;
        let outcome = match self
            .rebalancer
            .swap(candidate.yield_amount_out, available_yield, &state.market)
        {
            Ok(outcome) => outcome,
            Err(e) => {
                state.aborted_commits += 1;
                warn!(
                    target: SIMULATION_TARGET,
                    "tick {} 提交失败，保留 {} 待清算收益: {}", tick, available_yield, e
                );
                return TickOutcome::Aborted(e);
            }
        };

        state.market = outcome.market;
        state.arb_count += 1;
        state.cumulative_reward_spent += candidate.reward_amount_in;
        state.accrued_yield -= candidate.yield_amount_out;

        let swap_exchange_rate = candidate.exchange_rate();
        let efficiency = state.market_rate / swap_exchange_rate;

        debug!(
            target: ARBITRAGE_TARGET,
            "@ {} efficiency {} | moving average: {} | vr yield: {} | vr pool: {} | swapExchangeRate {} | remainingYield {}",
            tick,
            (efficiency * 100.0) as i64,
            state.market.yield_ema,
            state.market.reserves.yield_reserve,
            state.market.reserves.reward_reserve,
            swap_exchange_rate,
            state.accrued_yield
        );

        TickOutcome::Arbitrage(ArbitrageRecord {
            time: tick,
            yield_accrual_rate: state.accrual_rate,
            available_yield,
            swap_amount_out: candidate.yield_amount_out,
            swap_amount_in: candidate.reward_amount_in,
            swap_exchange_rate,
            market_exchange_rate: state.market_rate,
            efficiency,
            moving_average: state.market.yield_ema,
            yield_virtual_liquidity: state.market.reserves.yield_reserve,
            token_virtual_liquidity: state.market.reserves.reward_reserve,
            unsold_yield: state.accrued_yield,
        })
    }

    /// 运行完整模拟，每次套利向 sink 推送一条记录
    pub fn run(&self, sink: &mut dyn RecordSink) -> LiquidatorResult<SimulationSummary> {
        let mut state = self.initial_state()?;

        info!(
            target: SIMULATION_TARGET,
            "开始模拟: {} ticks, alpha={}, multiplier={}, fraction={}",
            self.duration,
            self.rebalancer.params().ema_alpha,
            self.rebalancer.params().swap_multiplier,
            self.rebalancer.params().liquidity_fraction
        );

        self.progress.set_length(self.duration);
        while state.tick < self.duration {
            if let TickOutcome::Arbitrage(record) = self.step(&mut state) {
                sink.record(&record)?;
            }
            self.progress.inc(1);
        }
        sink.finish()?;
        self.progress.finish_and_clear();

        info!(
            target: SIMULATION_TARGET,
            "模拟结束: {} 次套利, 累计 reward {}", state.arb_count, state.cumulative_reward_spent
        );

        Ok(self.summarize(&state))
    }

    fn summarize(&self, state: &SimulationState) -> SimulationSummary {
        SimulationSummary {
            duration: self.duration,
            params: *self.rebalancer.params(),
            min_profit: self.min_profit,
            zero_rate_policy: self.zero_rate_policy,
            arb_count: state.arb_count,
            cumulative_reward_spent: state.cumulative_reward_spent,
            aborted_commits: state.aborted_commits,
            final_market: state.market,
            unsold_yield: state.accrued_yield,
        }
    }
}
