//! 编解码器标识符.
//!
//! 为每种块编码算法分配唯一标识, 与容器格式无关.

use std::fmt;

/// 编解码器标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// 未知编解码器
    None,

    // ========================
    // 无压缩 PCM 块
    // ========================
    /// PCM 有符号 16 位小端
    PcmS16le,
    /// PCM 有符号 16 位大端
    PcmS16be,
    /// PCM 有符号 24 位小端
    PcmS24le,
    /// PCM 有符号 32 位小端
    PcmS32le,
    /// PCM 32 位浮点小端
    PcmF32le,
    /// PCM 无符号 8 位
    PcmU8,

    // ========================
    // 带块间状态的编码
    // ========================
    /// 重叠块编码 (块尾叠加到下一块开头)
    Lapped,
}

impl CodecId {
    /// 获取编解码器的人类可读名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PcmS16le => "pcm_s16le",
            Self::PcmS16be => "pcm_s16be",
            Self::PcmS24le => "pcm_s24le",
            Self::PcmS32le => "pcm_s32le",
            Self::PcmF32le => "pcm_f32le",
            Self::PcmU8 => "pcm_u8",
            Self::Lapped => "lapped",
        }
    }

    /// 按名称查找编解码器
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::PcmS16le,
            Self::PcmS16be,
            Self::PcmS24le,
            Self::PcmS32le,
            Self::PcmF32le,
            Self::PcmU8,
            Self::Lapped,
        ]
        .into_iter()
        .find(|id| id.name() == name)
    }

    /// 是否为无压缩 PCM
    pub const fn is_pcm(&self) -> bool {
        matches!(
            self,
            Self::PcmS16le
                | Self::PcmS16be
                | Self::PcmS24le
                | Self::PcmS32le
                | Self::PcmF32le
                | Self::PcmU8
        )
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
