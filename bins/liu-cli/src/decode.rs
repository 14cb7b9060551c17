//! `decode` 子命令: 从指定帧开始解码, 输出交错 F32LE 原始采样.

use anyhow::{Context, Result};
use clap::Args;
use liu::{AudioSource, Sample};
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::input::{Input, InputArgs};

/// 每次读取的帧数
const CHUNK_FRAMES: usize = 4096;

#[derive(Debug, Clone, Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// 输出文件路径 (F32LE 交错采样)
    #[arg(short, long)]
    pub output: PathBuf,

    /// 起始帧
    #[arg(long, default_value_t = 0)]
    pub start: u64,

    /// 最多解码的帧数, 默认到流末尾
    #[arg(long)]
    pub frames: Option<u64>,

    /// 转换为双声道输出
    #[arg(long)]
    pub stereo: bool,
}

/// 解码结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    /// 实际起始帧
    pub start: u64,
    /// 写出的帧数
    pub frames: u64,
    /// 输出声道数
    pub channels: usize,
}

pub fn decode_to_file(input: &Input, args: &DecodeArgs) -> Result<DecodeSummary> {
    let mut source = input.open()?;
    let start = source.seek_frame(args.start);
    if start != args.start {
        warn!("起始帧 {} 无法到达, 从第 {} 帧开始", args.start, start);
    }

    let channels = if args.stereo {
        2
    } else {
        source.properties().channels as usize
    };
    let file = File::create(&args.output)
        .with_context(|| format!("创建输出文件失败, path={}", args.output.display()))?;
    let mut writer = BufWriter::new(file);

    let mut remaining = args.frames.unwrap_or(u64::MAX).min(source.remaining_frames());
    let source_channels = source.properties().channels as usize;
    let mut buf: Vec<Sample> = vec![0.0; CHUNK_FRAMES * source_channels.max(2)];
    let mut written = 0u64;
    while remaining > 0 {
        let wanted = CHUNK_FRAMES.min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let read = if args.stereo {
            source.read_stereo_frames(wanted, &mut buf)
        } else {
            source.read_frames(wanted, Some(&mut buf))
        };
        if read == 0 {
            break;
        }
        for sample in &buf[..read * channels] {
            writer.write_all(&sample.to_le_bytes())?;
        }
        written += read as u64;
        remaining -= read as u64;
    }
    writer.flush()?;

    if remaining > 0 {
        warn!("流提前结束: 还差 {} 帧", remaining);
    }
    info!("解码完成: 起始帧 {}, 写出 {} 帧", start, written);
    Ok(DecodeSummary {
        start,
        frames: written,
        channels,
    })
}

pub fn run(input: &Input, args: &DecodeArgs) -> Result<()> {
    let summary = decode_to_file(input, args)?;
    println!(
        "已写出 {} 帧 ({} 声道, F32LE) 到 {}, 起始帧 {}",
        summary.frames,
        summary.channels,
        args.output.display(),
        summary.start,
    );
    Ok(())
}
