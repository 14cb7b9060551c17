//! liu - 块式压缩音频解码与定位命令行工具
//!
//! 子命令:
//! - `info`: 打印音频源属性
//! - `decode`: 从指定帧开始解码为 F32LE 原始采样
//! - `verify`: 校验定位后读取与连续解码的一致性

mod config;
mod decode;
#[cfg(test)]
mod fixture;
mod info;
mod input;
mod verify;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use decode::DecodeArgs;
use info::InfoArgs;
use input::Input;
use verify::VerifyArgs;

#[derive(Parser, Debug)]
#[command(name = "liu", version, about = "纯 Rust 块式压缩音频解码与定位工具")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON 配置文件路径
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 日志级别 (-v debug, -vv trace), LIU_LOG 环境变量可覆盖
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 打印音频源属性
    Info(InfoArgs),
    /// 解码为 F32LE 原始采样
    Decode(DecodeArgs),
    /// 校验定位一致性
    Verify(VerifyArgs),
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(err) => {
            eprintln!("错误: {:#}", err);
            process::exit(1);
        }
    }
}

/// 执行子命令, 校验失败时返回 false
fn run(cli: Cli) -> Result<bool> {
    let config = config::load(cli.config.as_deref())?;
    liu::logging::init(&config.logging.clone().with_verbosity(cli.verbose))?;
    log::debug!("liu {} 启动", liu::version());

    match &cli.command {
        Command::Info(args) => {
            let input = Input::load(&args.input, config.decode)?;
            info::run(&input, args.json)?;
        }
        Command::Decode(args) => {
            let input = Input::load(&args.input, config.decode)?;
            decode::run(&input, args)?;
        }
        Command::Verify(args) => {
            let input = Input::load(&args.input, config.decode)?;
            return verify::run(&input, args);
        }
    }
    Ok(true)
}
