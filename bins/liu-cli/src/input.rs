//! 输入文件与音频源打开.

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use clap::{Args, ValueEnum};
use liu::codec::CodecId;
use liu::{BlockAudioSource, PcmParams, SourceOptions};
use std::path::PathBuf;

use crate::config::DecodeProfile;

/// 输入格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// 重叠块分帧流 (定位表寻址)
    Framed,
    /// 原始交错 PCM (固定块长寻址)
    Pcm,
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// 输入文件路径
    pub input: PathBuf,

    /// 输入格式
    #[arg(long, value_enum, default_value_t = InputFormat::Framed)]
    pub format: InputFormat,

    /// PCM 编码 (仅 --format pcm), 如 pcm_s16le / pcm_f32le
    #[arg(long, default_value = "pcm_s16le")]
    pub pcm_codec: String,

    /// 声道数 (仅 --format pcm)
    #[arg(long, default_value_t = 2)]
    pub channels: u32,

    /// 采样率 (仅 --format pcm)
    #[arg(long, default_value_t = 44100)]
    pub rate: u32,

    /// 每块帧数 (仅 --format pcm)
    #[arg(long, default_value_t = 1024)]
    pub block_frames: u32,
}

/// 已读入内存的输入, 可以打开任意多个独立的音频源
pub struct Input {
    data: Bytes,
    args: InputArgs,
    profile: DecodeProfile,
}

impl Input {
    pub fn load(args: &InputArgs, profile: DecodeProfile) -> Result<Self> {
        let data = std::fs::read(&args.input)
            .with_context(|| format!("读取输入文件失败, path={}", args.input.display()))?;
        Ok(Self::from_bytes(data, args.clone(), profile))
    }

    pub fn from_bytes(data: impl Into<Bytes>, args: InputArgs, profile: DecodeProfile) -> Self {
        Self {
            data: data.into(),
            args,
            profile,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.args.input
    }

    /// 打开一个新的音频源实例
    pub fn open(&self) -> Result<BlockAudioSource> {
        let source = match self.args.format {
            InputFormat::Framed => {
                liu::open_framed(self.data.clone(), self.profile.apply(SourceOptions::tabled()))
            }
            InputFormat::Pcm => {
                let codec_id = CodecId::from_name(&self.args.pcm_codec)
                    .filter(CodecId::is_pcm)
                    .ok_or_else(|| anyhow!("不支持的 PCM 编码: {}", self.args.pcm_codec))?;
                let params = PcmParams {
                    codec_id,
                    channels: self.args.channels,
                    sample_rate: self.args.rate,
                    block_frames: self.args.block_frames,
                };
                liu::open_pcm(
                    self.data.clone(),
                    params,
                    self.profile.apply(SourceOptions::fixed()),
                )
            }
        };
        source.with_context(|| format!("打开输入失败, path={}", self.args.input.display()))
    }
}
