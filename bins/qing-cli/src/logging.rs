//! 日志初始化模块.
//!
//! 双输出:
//! - console: 输出到 stderr, 只有级别与消息, 终端下彩色; 默认 info, `-q` 时只输出 warn 以上
//! - file: 日期时间 + 级别 + 来源模块 + 消息; 默认 info, 可通过 -v/-vv 或 QING_LOG 环境变量调整
//!
//! 日志文件输出到 $cwd/logs/{prefix}.{date}.log

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 初始化日志系统
///
/// - `file_prefix`: 日志文件前缀 (如 "qing-cli")
/// - `verbosity`: 0=info, 1=debug, 2+=trace (由 -v/-vv 控制)
/// - `quiet`: 控制台只输出警告与错误
pub fn init(file_prefix: &str, verbosity: u8, quiet: bool) -> Result<()> {
    std::fs::create_dir_all("logs").context("创建日志目录失败")?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(file_prefix)
        .filename_suffix("log")
        .build("logs")
        .context("创建日志文件失败")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD.set(guard).ok();

    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Console: stderr, 不干扰 stdout 上的探测输出
    let console_filter = EnvFilter::new(if quiet { "warn" } else { level });
    let console_layer = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .event_format(LineFormatter::Console {
            color: std::io::stderr().is_terminal(),
        })
        .with_filter(console_filter);

    // File: QING_LOG 环境变量可覆盖
    let file_filter = EnvFilter::try_from_env("QING_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(LineFormatter::File)
        .with_filter(file_filter);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("注册日志订阅者失败")?;
    Ok(())
}

/// 日志行格式
enum LineFormatter {
    /// `INFO  ✓ a.mp3: ...`, 批处理进度直接可读
    Console { color: bool },
    /// `2026-10-19 08:30:01.042 DEBUG qing_mp3::xing > ...`
    File,
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        _ => "\x1b[34m",
    }
}

/// 文件日志的行首: 时间戳、级别与来源模块 (库里经 `log` 发出的记录带各自的模块路径)
fn file_line_prefix(now: &DateTime<Local>, level: &Level, target: &str) -> String {
    format!("{} {level:5} {target} > ", now.format("%Y-%m-%d %H:%M:%S%.3f"))
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        match self {
            Self::Console { color: true } => {
                write!(writer, "{}{:5}\x1b[0m ", level_color(meta.level()), meta.level())?
            }
            Self::Console { color: false } => write!(writer, "{:5} ", meta.level())?,
            Self::File => write!(
                writer,
                "{}",
                file_line_prefix(&Local::now(), meta.level(), meta.target())
            )?,
        }
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
