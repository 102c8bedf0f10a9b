//! qing-cli - MP3 清理命令行工具
//!
//! 去除 ID3 标签与旧的 VBR 索引帧, 并为码流重建 Xing 头.

mod batch;
mod logging;
mod probe;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "qing-cli", version, about = "纯 Rust MP3 清理工具")]
struct Cli {
    /// 日志详细程度 (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// 静默模式 (控制台只输出警告与错误)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 清理 MP3 文件 (默认原地覆盖)
    Clean {
        /// 输入文件
        files: Vec<PathBuf>,

        /// 输出文件 (仅限单个输入)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 递归处理目录下全部 *.mp3 文件
        #[arg(long)]
        dir: Option<PathBuf>,

        /// 只剥离, 不重建 Xing 头
        #[arg(long)]
        no_xing: bool,

        /// 并行处理多个文件
        #[arg(short = 'j', long)]
        parallel: bool,
    },

    /// 显示 MP3 首帧与 Xing 头信息
    Probe {
        /// 输入文件
        files: Vec<PathBuf>,

        /// 输出 JSON 格式
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init("qing-cli", cli.verbose, cli.quiet) {
        eprintln!("警告: 日志初始化失败: {e:#}");
    }

    let result = match &cli.command {
        Command::Clean {
            files,
            output,
            dir,
            no_xing,
            parallel,
        } => batch::command_clean(
            files,
            output.as_deref(),
            dir.as_deref(),
            !no_xing,
            *parallel,
        ),
        Command::Probe { files, json } => probe::command_probe(files, *json),
    };

    if let Err(e) = result {
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}
