//! `info` 子命令: 打印音频源属性.

use anyhow::Result;
use clap::Args;
use liu::AudioSource;
use serde::Serialize;

use crate::input::{Input, InputArgs};

#[derive(Debug, Clone, Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 音频源信息
#[derive(Debug, Serialize)]
pub struct InfoOutput {
    pub filename: String,
    pub container: String,
    pub codec: String,
    pub addressing: String,
    pub channels: u32,
    pub sample_rate: u32,
    pub frames: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_rate_kbps: Option<u32>,
    pub blocks: u64,
    pub max_block_frames: usize,
    pub prefetch_blocks: u64,
}

pub fn collect(input: &Input) -> Result<InfoOutput> {
    let source = input.open()?;
    let props = source.properties();
    Ok(InfoOutput {
        filename: input.path().display().to_string(),
        container: source.container_name().to_string(),
        codec: source.codec_name().to_string(),
        addressing: source.addressing().name().to_string(),
        channels: props.channels,
        sample_rate: props.frame_rate,
        frames: props.frame_count,
        duration: props.duration(),
        bit_rate_kbps: props.bit_rate_kbps,
        blocks: source.block_count(),
        max_block_frames: source.max_block_frames(),
        prefetch_blocks: source.prefetch_blocks(),
    })
}

pub fn run(input: &Input, json: bool) -> Result<()> {
    let info = collect(input)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("文件: {}", info.filename);
    println!("  容器: {}  编码: {}  寻址: {}", info.container, info.codec, info.addressing);
    println!("  声道: {}  采样率: {} Hz", info.channels, info.sample_rate);
    match info.duration {
        Some(duration) => println!("  帧数: {}  时长: {:.3} 秒", info.frames, duration),
        None => println!("  帧数: {}", info.frames),
    }
    if let Some(bit_rate) = info.bit_rate_kbps {
        println!("  码率: {} kbps", bit_rate);
    }
    println!(
        "  块数: {}  最大每块帧数: {}  预解码块数: {}",
        info.blocks, info.max_block_frames, info.prefetch_blocks
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecodeProfile;
    use crate::fixture;

    #[test]
    fn test_分帧流信息() {
        let input = Input::from_bytes(
            fixture::framed_stream(2, &[100, 80, 120]),
            fixture::input_args(crate::input::InputFormat::Framed),
            DecodeProfile::default(),
        );
        let info = collect(&input).unwrap();
        assert_eq!(info.container, "framed");
        assert_eq!(info.codec, "lapped");
        assert_eq!(info.addressing, "tabled");
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, fixture::RATE);
        assert_eq!(info.frames, 300);
        assert_eq!(info.blocks, 3);
        assert_eq!(info.max_block_frames, 120);
        assert_eq!(info.prefetch_blocks, 1);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["frames"], 300);
    }

    #[test]
    fn test_pcm_信息() {
        let mut args = fixture::input_args(crate::input::InputFormat::Pcm);
        args.channels = 1;
        args.block_frames = 64;
        // 1000 帧 + 1 个多余字节
        let input = Input::from_bytes(vec![0u8; 2001], args, DecodeProfile::default());
        let info = collect(&input).unwrap();
        assert_eq!(info.codec, "pcm_s16le");
        assert_eq!(info.addressing, "fixed");
        assert_eq!(info.frames, 1000);
        assert_eq!(info.blocks, 16);
    }
}
