//! 解码器配置与打开结果.
//!
//! `DecoderConfig` 是打开解码器时的输入提示, `DecoderInfo` 是解码器
//! 初始化后报告的流属性.

/// 解码器配置
///
/// 对于 PCM 等无头部信息的编解码器, 必须提供声道数、采样率和块长.
/// 可变块长的码流在扫描块头后由调用方填入声道数与采样率.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// 声道数提示
    pub channels: Option<u32>,
    /// 采样率提示 (Hz)
    pub sample_rate: Option<u32>,
    /// 每块帧数提示 (可变块长时为上限)
    pub block_frames: Option<u32>,
}

impl DecoderConfig {
    /// 创建带声道数与采样率的配置
    pub fn audio(channels: u32, sample_rate: u32) -> Self {
        Self {
            channels: Some(channels),
            sample_rate: Some(sample_rate),
            ..Self::default()
        }
    }

    /// 设置每块帧数
    pub fn with_block_frames(mut self, block_frames: u32) -> Self {
        self.block_frames = Some(block_frames);
        self
    }
}

/// 解码器打开后报告的流属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderInfo {
    /// 声道数
    pub channels: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 单块解码输出的最大帧数
    pub max_block_frames: u32,
    /// 单块压缩数据的最大字节数
    pub max_block_bytes: usize,
    /// 随机定位后需要预解码的块数 (由编码延迟决定)
    pub prefetch_blocks: u64,
}

/// 按编码延迟计算需要预解码的块数
///
/// 例如 AAC 的 2112 帧编码延迟在每块 1024 帧时需要预解码 3 块.
pub fn prefetch_blocks_for_delay(delay_frames: u64, frames_per_block: u64) -> u64 {
    if frames_per_block == 0 {
        return 0;
    }
    delay_frames.div_ceil(frames_per_block)
}
