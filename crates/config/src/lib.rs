use anyhow::{bail, Context, Result};
use models::{LiquidatorParams, MarketState, ReservePair, ZeroRatePolicy};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "LIQUIDATOR_";

/// 清算模拟配置
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// 模拟时长 (tick 数)
    pub duration: u64,
    /// 移动平均平滑系数，越大越偏重近期值
    pub ema_alpha: f64,
    /// 下行压力倍数，越大价格跟随下跌越快，未卖出的收益也越多
    pub swap_multiplier: f64,
    /// 虚拟流动性相对平均收益的比例，越小兑换越高效，但跟随下跌越差
    pub liquidity_fraction: f64,
    /// 最低利润门槛 (yield)
    pub min_profit: f64,
    pub initial_yield_reserve: f64,
    pub initial_reward_reserve: f64,
    pub zero_rate_policy: ZeroRatePolicy,
    /// CSV 输出路径
    pub output_path: Option<PathBuf>,
    /// 计划表 JSON 文件，缺省使用内置参考场景
    pub schedule_path: Option<PathBuf>,
    /// 汇总 JSON 输出路径
    pub summary_json: Option<PathBuf>,
    /// 日志目录，缺省只输出到控制台
    pub log_dir: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration: 1000,
            ema_alpha: 0.7,
            swap_multiplier: 0.3,
            liquidity_fraction: 0.02,
            min_profit: 1.0,
            initial_yield_reserve: 500.0,
            initial_reward_reserve: 50.0,
            zero_rate_policy: ZeroRatePolicy::CarryForward,
            output_path: None,
            schedule_path: None,
            summary_json: None,
            log_dir: None,
        }
    }
}

/// 读取并解析环境变量，未设置时返回 None
fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let key = format!("{}{}", ENV_PREFIX, name);
    match env::var(&key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {}: '{}'", key, raw)),
        _ => Ok(None),
    }
}

impl SimulationConfig {
    /// 从 .env 和环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            duration: parse_env("DURATION")?.unwrap_or(defaults.duration),
            ema_alpha: parse_env("EMA_ALPHA")?.unwrap_or(defaults.ema_alpha),
            swap_multiplier: parse_env("SWAP_MULTIPLIER")?.unwrap_or(defaults.swap_multiplier),
            liquidity_fraction: parse_env("LIQUIDITY_FRACTION")?
                .unwrap_or(defaults.liquidity_fraction),
            min_profit: parse_env("MIN_PROFIT")?.unwrap_or(defaults.min_profit),
            initial_yield_reserve: parse_env("INITIAL_YIELD_RESERVE")?
                .unwrap_or(defaults.initial_yield_reserve),
            initial_reward_reserve: parse_env("INITIAL_REWARD_RESERVE")?
                .unwrap_or(defaults.initial_reward_reserve),
            zero_rate_policy: parse_env("ZERO_RATE_POLICY")?.unwrap_or(defaults.zero_rate_policy),
            output_path: parse_env("OUTPUT_CSV")?,
            schedule_path: parse_env("SCHEDULE")?,
            summary_json: parse_env("SUMMARY_JSON")?,
            log_dir: parse_env("LOG_DIR")?,
        };

        Ok(config)
    }

    /// 检查参数范围
    pub fn validate(&self) -> Result<()> {
        if self.duration == 0 {
            bail!("duration must be greater than 0");
        }
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            bail!("ema_alpha must be in (0, 1], got {}", self.ema_alpha);
        }
        if !(self.swap_multiplier >= 0.0 && self.swap_multiplier.is_finite()) {
            bail!("swap_multiplier must be finite and >= 0, got {}", self.swap_multiplier);
        }
        if !(self.liquidity_fraction > 0.0 && self.liquidity_fraction.is_finite()) {
            bail!(
                "liquidity_fraction must be finite and > 0, got {}",
                self.liquidity_fraction
            );
        }
        if !(self.min_profit >= 0.0 && self.min_profit.is_finite()) {
            bail!("min_profit must be finite and >= 0, got {}", self.min_profit);
        }
        ReservePair::new(self.initial_yield_reserve, self.initial_reward_reserve)
            .context("initial reserves must be positive")?;
        Ok(())
    }

    pub fn params(&self) -> LiquidatorParams {
        LiquidatorParams {
            ema_alpha: self.ema_alpha,
            swap_multiplier: self.swap_multiplier,
            liquidity_fraction: self.liquidity_fraction,
        }
    }

    /// 初始虚拟做市商状态 (移动平均为 0)
    pub fn initial_market(&self) -> Result<MarketState> {
        let reserves = ReservePair::new(self.initial_yield_reserve, self.initial_reward_reserve)
            .context("initial reserves must be positive")?;
        Ok(MarketState::new(reserves))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.params(), LiquidatorParams::default());

        let market = config.initial_market().unwrap();
        assert_eq!(market.reserves.yield_reserve, 500.0);
        assert_eq!(market.reserves.reward_reserve, 50.0);
        assert_eq!(market.yield_ema, 0.0);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let cases: Vec<Box<dyn Fn(&mut SimulationConfig)>> = vec![
            Box::new(|c: &mut SimulationConfig| c.duration = 0),
            Box::new(|c: &mut SimulationConfig| c.ema_alpha = 0.0),
            Box::new(|c: &mut SimulationConfig| c.ema_alpha = 1.5),
            Box::new(|c: &mut SimulationConfig| c.swap_multiplier = -0.1),
            Box::new(|c: &mut SimulationConfig| c.liquidity_fraction = 0.0),
            Box::new(|c: &mut SimulationConfig| c.liquidity_fraction = f64::INFINITY),
            Box::new(|c: &mut SimulationConfig| c.min_profit = -1.0),
            Box::new(|c: &mut SimulationConfig| c.initial_reward_reserve = 0.0),
        ];

        for mutate in cases {
            let mut config = SimulationConfig::default();
            mutate(&mut config);
            assert!(config.validate().is_err(), "expected rejection for {:?}", config);
        }
    }

    #[test]
    fn test_alpha_of_one_is_allowed() {
        let config = SimulationConfig {
            ema_alpha: 1.0,
            swap_multiplier: 0.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
