use std::fs;
use std::path::Path;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::{EnvFilter, FilterFn, LevelFilter};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};
use time::macros::offset;

/// 逐笔套利明细使用的 target
pub const ARBITRAGE_TARGET: &str = "arbitrage";
/// 模拟流程使用的 target
pub const SIMULATION_TARGET: &str = "simulation";

/// 日志管理器 - 基于target分类的日志系统
pub struct LoggerManager {
    _guards: Vec<non_blocking::WorkerGuard>,
}

impl LoggerManager {
    /// 初始化日志系统
    ///
    /// 控制台级别由 RUST_LOG 控制 (默认 info)。
    /// 指定 `log_dir` 时额外写入：
    /// - simulation.log: 通用模拟日志
    /// - arbitrage.log: 逐笔套利明细 (debug 级别)
    pub fn init(log_dir: Option<&Path>) -> Self {
        let mut guards = Vec::new();

        // 配置时区为东八区 (UTC+8 上海时间)
        let timer = OffsetTime::new(
            offset!(+8),
            time::format_description::well_known::Rfc3339,
        );

        // 1. 控制台输出
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let console_layer = fmt::layer()
            .compact()
            .with_target(true)
            .with_timer(timer.clone())
            .with_filter(env_filter);

        // 2. 文件输出
        let (simulation_layer, arbitrage_layer) = match log_dir {
            Some(dir) => {
                fs::create_dir_all(dir).ok();

                let (simulation_writer, simulation_guard) =
                    non_blocking(rolling::daily(dir, "simulation.log"));
                guards.push(simulation_guard);

                let simulation_layer = fmt::layer()
                    .compact()
                    .with_writer(simulation_writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(timer.clone())
                    .with_filter(LevelFilter::INFO)
                    .with_filter(FilterFn::new(|metadata| {
                        metadata.target() != ARBITRAGE_TARGET
                    }));

                let (arbitrage_writer, arbitrage_guard) =
                    non_blocking(rolling::daily(dir, "arbitrage.log"));
                guards.push(arbitrage_guard);

                let arbitrage_layer = fmt::layer()
                    .compact()
                    .with_writer(arbitrage_writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(timer)
                    .with_filter(LevelFilter::DEBUG)
                    .with_filter(FilterFn::new(|metadata| {
                        metadata.target() == ARBITRAGE_TARGET
                    }));

                (Some(simulation_layer), Some(arbitrage_layer))
            }
            None => (None, None),
        };

        // 初始化tracing订阅器
        tracing_subscriber::registry()
            .with(console_layer)
            .with(simulation_layer)
            .with(arbitrage_layer)
            .init();

        Self { _guards: guards }
    }
}
