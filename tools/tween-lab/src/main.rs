//! # Tween Lab
//!
//! 动画实验室：采样 Tweener / Path 曲线，并通过调度器逐帧回放动画。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p tween-lab -- tweener ease_out --samples 10
//! cargo run -p tween-lab -- tweener "retrograde:(ease_in+cycle:2)"
//! cargo run -p tween-lab -- tweener "ease_in+ramp:0.3,0.5,0.2"
//! cargo run -p tween-lab -- path spiral_2d_int 0,0 4,0 --samples 4
//! cargo run -p tween-lab -- path manhattan_2d_int 0,0 4,2 --samples 6
//! cargo run -p tween-lab -- simulate 0.0 1.0 --duration 1 --repeat 2 --reverse --dt 0.1
//! cargo run -p tween-lab -- simulate --script demos/bounce.json
//! cargo run -p tween-lab -- init-config animation.json
//! ```
//!
//! 值的写法：`true` / `false`、整数 `3`、浮点 `1.5`、点 `3,4`、颜色 `#rrggbb` 或 `#rrggbbaa`。

use std::path::{Path as FsPath, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{Level, debug};
use tween_runtime::{
    AnimationConfig, AnimationEvent, AnimationHandle, Color, IntPoint, Path, PropertyCell,
    Scheduler, Tweener, Value,
};

#[derive(Parser)]
#[command(name = "tween-lab")]
#[command(about = "动画实验室 - 采样 Tweener / Path 曲线并回放动画帧")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 动画配置文件（JSON），提供默认时长、缓动、帧间隔等
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 采样 Tweener 曲线
    Tweener {
        /// Tweener 描述，例如 `ease_in`、`cycle:3`、`ramp:0.2,0.5,0.1`、`retrograde:(ease_in+cycle:2)`、`bounce+easy`
        spec: String,

        /// 采样区间数
        #[arg(short, long, default_value = "10")]
        samples: u32,
    },

    /// 采样 Path 插值
    Path {
        /// Path 名称：linear / boolean / linear_2d_int / manhattan_2d_int / spiral_2d_int / color
        path: String,

        /// 起点值
        from: String,

        /// 终点值
        to: String,

        /// 采样区间数
        #[arg(short, long, default_value = "10")]
        samples: u32,
    },

    /// 通过调度器逐帧回放一个动画
    Simulate {
        /// 起点值（使用 --script 时省略）
        #[arg(required_unless_present = "script")]
        from: Option<String>,

        /// 终点值（使用 --script 时省略）
        #[arg(required_unless_present = "script")]
        to: Option<String>,

        /// 动画脚本（JSON），与位置参数二选一
        #[arg(long, conflicts_with_all = ["from", "to"])]
        script: Option<PathBuf>,

        /// 动画时长（秒），默认取配置
        #[arg(short, long)]
        duration: Option<f64>,

        /// Tweener 描述，默认取配置
        #[arg(short, long)]
        tweener: Option<String>,

        /// Path 名称，默认按值类型选择
        #[arg(short, long)]
        path: Option<String>,

        /// 重复次数，0 表示无限循环，默认取配置
        #[arg(short, long)]
        repeat: Option<u32>,

        /// 往返播放
        #[arg(long)]
        reverse: bool,

        /// 每帧 dt（秒），默认取配置的帧间隔
        #[arg(long)]
        dt: Option<f64>,

        /// 最多回放的帧数
        #[arg(short, long, default_value = "120")]
        frames: usize,
    },

    /// 写出默认配置文件
    InitConfig {
        /// 输出路径
        output: PathBuf,
    },
}

/// 动画脚本
///
/// ```json
/// {
///   "from": { "kind": "point", "value": { "x": 0, "y": 0 } },
///   "to": { "kind": "point", "value": { "x": 4, "y": 2 } },
///   "duration": 1.0,
///   "path": { "kind": "manhattan_2d_int" },
///   "frames": [0.1, 0.25, 0.4, 0.25]
/// }
/// ```
#[derive(Debug, Deserialize)]
struct SimulationScript {
    from: Value,
    to: Value,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    tweener: Option<Tweener>,
    #[serde(default)]
    path: Option<Path>,
    #[serde(default)]
    repeat: Option<u32>,
    #[serde(default)]
    reverse: bool,
    /// 每帧的 dt；为空时按固定帧间隔回放
    #[serde(default)]
    frames: Vec<f64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = real_main(cli) {
        eprintln!("❌ tween-lab: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AnimationConfig::default(),
    };

    match cli.command {
        Commands::Tweener { spec, samples } => {
            let tweener: Tweener = spec.parse()?;
            sample_tweener(&tweener, samples);
        }
        Commands::Path {
            path,
            from,
            to,
            samples,
        } => {
            let path: Path = path.parse()?;
            sample_path(path, parse_value(&from)?, parse_value(&to)?, samples)?;
        }
        Commands::Simulate {
            from,
            to,
            script,
            duration,
            tweener,
            path,
            repeat,
            reverse,
            dt,
            frames,
        } => {
            let script = match script {
                Some(file) => load_script(&file)?,
                None => {
                    let (Some(from), Some(to)) = (from, to) else {
                        bail!("需要起点值和终点值，或使用 --script");
                    };
                    SimulationScript {
                        from: parse_value(&from)?,
                        to: parse_value(&to)?,
                        duration,
                        tweener: tweener.map(|s| s.parse::<Tweener>()).transpose()?,
                        path: path.map(|s| s.parse::<Path>()).transpose()?,
                        repeat,
                        reverse,
                        frames: Vec::new(),
                    }
                }
            };
            let dt = dt.unwrap_or_else(|| config.clock.frame_interval());
            simulate(&config, script, dt, frames)?;
        }
        Commands::InitConfig { output } => {
            AnimationConfig::default()
                .save(&output)
                .with_context(|| format!("写入配置失败: {}", output.display()))?;
            println!("✅ 默认配置已写入 {}", output.display());
        }
    }
    Ok(())
}

fn load_config(path: &FsPath) -> anyhow::Result<AnimationConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("读取配置失败: {}", path.display()))?;
    let config = AnimationConfig::from_json_str(&content)
        .with_context(|| format!("配置无效: {}", path.display()))?;
    debug!(path = %path.display(), "已加载配置");
    Ok(config)
}

fn load_script(path: &FsPath) -> anyhow::Result<SimulationScript> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("读取脚本失败: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("脚本解析失败: {}", path.display()))
}

/// 解析命令行中的值
fn parse_value(s: &str) -> anyhow::Result<Value> {
    let s = s.trim();
    match s {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_color(hex).map(Value::Color);
    }

    if let Some((x, y)) = s.split_once(',') {
        let x = x.trim().parse().with_context(|| format!("无效的点坐标: {s}"))?;
        let y = y.trim().parse().with_context(|| format!("无效的点坐标: {s}"))?;
        return Ok(Value::Point(IntPoint::new(x, y)));
    }

    if let Ok(v) = s.parse::<i64>() {
        return Ok(Value::Int(v));
    }
    let v = s
        .parse::<f64>()
        .with_context(|| format!("无法识别的值: {s}"))?;
    Ok(Value::Float(v))
}

fn parse_color(hex: &str) -> anyhow::Result<Color> {
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        bail!("颜色必须是 #rrggbb 或 #rrggbbaa: #{hex}");
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).with_context(|| format!("无效的颜色: #{hex}"))
    };
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
}

fn sample_tweener(tweener: &Tweener, samples: u32) {
    let samples = samples.max(1);
    println!("Tweener: {}", tweener.name());
    println!("{:>8}  {:>10}  曲线", "t", "t'");
    for i in 0..=samples {
        let t = f64::from(i) / f64::from(samples);
        let eased = tweener.at(t);
        println!("{t:>8.4}  {eased:>10.6}  {}", bar(eased));
    }
}

fn sample_path(path: Path, from: Value, to: Value, samples: u32) -> anyhow::Result<()> {
    let samples = samples.max(1);
    path.check(&from, &to)?;
    println!("Path: {path}  {from} → {to}");
    println!("{:>8}  值", "t");
    for i in 0..=samples {
        let t = f64::from(i) / f64::from(samples);
        println!("{t:>8.4}  {}", path.at(&from, &to, t)?);
    }
    Ok(())
}

fn simulate(
    config: &AnimationConfig,
    script: SimulationScript,
    dt: f64,
    max_frames: usize,
) -> anyhow::Result<()> {
    let mut scheduler = Scheduler::with_config(config.clone());
    let cell = PropertyCell::new(script.from);

    let mut options = scheduler.options().with_auto_start(true).with_reverse(
        script.reverse || config.default_reverse,
    );
    if let Some(tweener) = script.tweener {
        options = options.with_tweener(tweener);
    }
    if let Some(path) = script.path {
        options = options.with_path(path);
    }
    if let Some(repeat) = script.repeat {
        options = options.with_repeat(repeat);
    }
    let duration = script.duration.unwrap_or(config.default_duration);

    let handle = scheduler.animate(cell.target(), script.from, script.to, duration, options)?;
    let options_line = handle
        .with_animation(|a| {
            format!(
                "tweener={} path={} duration={} repeat={} reverse={}",
                a.tweener().name(),
                a.path(),
                a.duration(),
                a.repeat(),
                a.reverse()
            )
        })
        .unwrap_or_default();
    println!("{options_line}");
    println!("{:>6}  {:>8}  {:>6}  {:>8}  值", "帧", "时间", "周期", "进度");

    let frame_dts: Vec<f64> = if script.frames.is_empty() {
        vec![dt; max_frames]
    } else {
        script.frames.into_iter().take(max_frames).collect()
    };

    let mut time = 0.0;
    print_frame(0, time, &handle, &cell, &[]);
    for (i, dt) in frame_dts.into_iter().enumerate() {
        time += dt;
        let events = scheduler.tick(dt);
        print_frame(i + 1, time, &handle, &cell, &events);
        if handle.is_finished() {
            break;
        }
    }

    if handle.is_running() {
        println!("(已达到帧数上限，动画仍在运行)");
    }
    Ok(())
}

fn print_frame(
    frame: usize,
    time: f64,
    handle: &AnimationHandle,
    cell: &PropertyCell,
    events: &[AnimationEvent],
) {
    let events: Vec<String> = events
        .iter()
        .filter_map(|event| match event {
            AnimationEvent::Started(_) => None,
            AnimationEvent::Completed(_) => Some("完成".to_string()),
            AnimationEvent::Stopped(_) => Some("停止".to_string()),
            AnimationEvent::Failed { error, .. } => Some(format!("失败: {error}")),
        })
        .collect();
    println!(
        "{frame:>6}  {time:>8.3}  {:>6}  {:>8.4}  {}  {}",
        handle.cycle_count(),
        handle.progress(),
        cell.get(),
        events.join(", ")
    );
}

/// 用字符条显示 `[0, 1]` 内的值
fn bar(v: f64) -> String {
    const WIDTH: f64 = 40.0;
    let n = (v.clamp(0.0, 1.0) * WIDTH).round() as usize;
    "█".repeat(n)
}
