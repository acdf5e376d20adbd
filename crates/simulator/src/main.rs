//! 清算机制模拟工具
//!
//! 使用方法:
//!   # 参考场景，默认参数
//!   cargo run -p simulator
//!
//!   # 调参并输出 CSV
//!   cargo run -p simulator -- -a 0.5 -s 0.2 -l 0.01 -o out/arbs.csv
//!
//!   # 查看计划表
//!   cargo run -p simulator -- --show

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use models::ZeroRatePolicy;
use std::path::PathBuf;
use tracing::info;

use config_crate::SimulationConfig;
use simulator::{
    report::{format_text_report, write_json_summary},
    CsvRecordSink, NullSink, RecordSink, Scenario, Simulation,
};
use utils::LoggerManager;

#[derive(Parser)]
#[command(name = "liquidator_sim")]
#[command(about = "模拟收益清算机制 (虚拟 CPMM)")]
struct Cli {
    /// 模拟时长 (tick 数)
    #[arg(short, long)]
    duration: Option<u64>,

    /// 移动平均的反应速度，越大越偏重近期值
    #[arg(short = 'a', long)]
    ema_alpha: Option<f64>,

    /// 价格跟随市场下跌的速度，越大未卖出的收益越多
    #[arg(short, long)]
    swap_multiplier: Option<f64>,

    /// 虚拟流动性相对平均收益的大小，越小兑换越高效，但跟随下跌越差
    #[arg(short, long)]
    liquidity_fraction: Option<f64>,

    /// 输出 CSV 文件 (浮点数统一带小数位，整数值写作 `10.0` 而非 `10`)
    #[arg(short = 'o', long)]
    output_csv: Option<PathBuf>,

    /// 最低利润门槛
    #[arg(long)]
    min_profit: Option<f64>,

    /// 计划表中 0 速率的处理方式 (carry-forward | apply)
    #[arg(long)]
    zero_rate_policy: Option<ZeroRatePolicy>,

    /// 计划表 JSON 文件
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// 汇总 JSON 输出路径
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// 日志目录
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// 只显示计划表
    #[arg(long, default_value = "false")]
    show: bool,
}

impl Cli {
    /// 命令行参数覆盖环境变量配置
    fn apply(self, config: &mut SimulationConfig) {
        if let Some(v) = self.duration {
            config.duration = v;
        }
        if let Some(v) = self.ema_alpha {
            config.ema_alpha = v;
        }
        if let Some(v) = self.swap_multiplier {
            config.swap_multiplier = v;
        }
        if let Some(v) = self.liquidity_fraction {
            config.liquidity_fraction = v;
        }
        if let Some(v) = self.min_profit {
            config.min_profit = v;
        }
        if let Some(v) = self.zero_rate_policy {
            config.zero_rate_policy = v;
        }
        if self.output_csv.is_some() {
            config.output_path = self.output_csv;
        }
        if self.schedule.is_some() {
            config.schedule_path = self.schedule;
        }
        if self.summary_json.is_some() {
            config.summary_json = self.summary_json;
        }
        if self.log_dir.is_some() {
            config.log_dir = self.log_dir;
        }
    }
}

fn show_schedules(scenario: &Scenario) {
    let tables = [
        ("市场汇率", &scenario.market_rates),
        ("收益累积速率", &scenario.accrual_rates),
    ];

    for (title, schedule) in tables {
        println!("\n=== {} ({} 个) ===", title, schedule.len());
        println!("{:-<30}", "");
        println!("{:<10} {:>15}", "tick", "rate");
        for (tick, rate) in schedule.iter() {
            println!("{:<10} {:>15}", tick, rate);
        }
    }
}

fn main() -> Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();
    let show = cli.show;

    // 加载配置
    let mut config = SimulationConfig::from_env()?;
    cli.apply(&mut config);
    config.validate()?;

    // 初始化日志
    let _logger = LoggerManager::init(config.log_dir.as_deref());

    let scenario = Scenario::load(config.schedule_path.as_deref())?;
    if show {
        show_schedules(&scenario);
        return Ok(());
    }

    let progress = ProgressBar::new(config.duration);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ticks")?
            .progress_chars("#>-"),
    );

    let simulation = Simulation::new(&config, scenario)?.with_progress(progress);

    let mut sink: Box<dyn RecordSink> = match &config.output_path {
        Some(path) => Box::new(CsvRecordSink::create(path)?),
        None => Box::new(NullSink),
    };
    let summary = simulation.run(sink.as_mut())?;

    if let Some(path) = &config.summary_json {
        write_json_summary(&summary, path)?;
    }

    info!("模拟完成");
    println!("{}", format_text_report(&summary));

    Ok(())
}
