//! # Liu (流)
//!
//! 纯 Rust 实现的块式压缩音频解码与帧精确定位框架.
//!
//! 压缩音频以块为最小解码单位, 块与块之间常带有解码状态 (重叠窗口、预测器、
//! 编码延迟). Liu 把容器、块解码器和缓冲管理组合为一个音频源, 对外提供
//! 帧精确的随机定位与顺序读取:
//! - **固定块长**: 块位置按算术换算, 定位时回退若干块预解码
//! - **定位表**: 打开时扫描所有块头, 二分查找目标块
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use liu::{AudioSource, SourceOptions};
//!
//! let data = std::fs::read("input.lpd").unwrap();
//! let mut source = liu::open_framed(data, SourceOptions::tabled()).unwrap();
//! println!("{:?}", source.properties());
//!
//! source.seek_frame(44100);
//! let mut buf = vec![0.0f32; 1024 * source.properties().channels as usize];
//! let read = source.read_frames(1024, Some(&mut buf));
//! println!("读取 {} 帧", read);
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `liu-core` | 核心类型、错误与双游标缓冲区 |
//! | `liu-codec` | 块解码器接口与参考解码器 |
//! | `liu-format` | 块容器接口与参考容器 |
//! | `liu-source` | 音频源: 定位引擎与读取引擎 |

use bytes::Bytes;

pub mod logging;

/// 核心类型与工具
pub use liu_core as core;

/// 块解码器
pub use liu_codec as codec;

/// 块容器
pub use liu_format as format;

/// 音频源
pub use liu_source as source;

pub use liu_core::{LiuError, LiuResult, Sample};
pub use liu_source::{
    AddressingMode, AudioSource, BlockAudioSource, SourceOptions, SourceProperties,
};

use liu_codec::{CodecId, CodecRegistry, DecoderConfig};
use liu_format::{FramedContainer, MemoryContainer};

/// 获取 Liu 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册所有内置解码器的注册表
pub fn default_codec_registry() -> CodecRegistry {
    let mut registry = CodecRegistry::new();
    liu_codec::register_all(&mut registry);
    registry
}

/// 打开重叠块分帧流
///
/// 分帧流每块帧数可变, 始终使用定位表寻址.
pub fn open_framed(data: impl Into<Bytes>, options: SourceOptions) -> LiuResult<BlockAudioSource> {
    let container = FramedContainer::open(data)?;
    let decoder = default_codec_registry().create_decoder(CodecId::Lapped)?;
    let options = SourceOptions {
        addressing: AddressingMode::Tabled,
        ..options
    };
    BlockAudioSource::open(
        Box::new(container),
        decoder,
        DecoderConfig::default(),
        options,
    )
}

/// 原始 PCM 流参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmParams {
    /// PCM 变体
    pub codec_id: CodecId,
    /// 声道数
    pub channels: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 每块帧数
    pub block_frames: u32,
}

/// 打开原始交错 PCM 流
///
/// 数据按 `block_frames` 切分为块, 使用固定块长寻址. 末尾不足一帧的字节被丢弃,
/// 总帧数按实际数据计算.
pub fn open_pcm(
    data: impl Into<Bytes>,
    params: PcmParams,
    options: SourceOptions,
) -> LiuResult<BlockAudioSource> {
    let bytes_per_sample = liu_codec::decoders::pcm::PcmDecoder::bytes_per_sample(params.codec_id)
        .ok_or_else(|| LiuError::Unsupported(format!("不是 PCM 格式: {}", params.codec_id)))?;
    if params.channels == 0 || params.block_frames == 0 {
        return Err(LiuError::InvalidArgument(
            "声道数和每块帧数必须大于 0".into(),
        ));
    }
    let frame_bytes = bytes_per_sample * params.channels as usize;
    let data = data.into();
    let frame_count = data.len() / frame_bytes;
    let data = data.slice(..frame_count * frame_bytes);

    let container = MemoryContainer::from_chunks(data, frame_bytes * params.block_frames as usize)?;
    let decoder = default_codec_registry().create_decoder(params.codec_id)?;
    let config = DecoderConfig::audio(params.channels, params.sample_rate)
        .with_block_frames(params.block_frames);
    let options = SourceOptions {
        addressing: AddressingMode::Fixed,
        frame_count: Some(options.frame_count.unwrap_or(frame_count as u64)),
        ..options
    };
    BlockAudioSource::open(Box::new(container), decoder, config, options)
}
