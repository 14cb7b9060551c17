//! 音频源属性.

use liu_core::{FrameIndex, LiuError, LiuResult};

/// 音频源属性, 打开后不再变化
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceProperties {
    /// 声道数
    pub channels: u32,
    /// 帧率 (采样率, Hz)
    pub frame_rate: u32,
    /// 总帧数
    pub frame_count: FrameIndex,
    /// 平均码率 (kbps), 仅供参考
    pub bit_rate_kbps: Option<u32>,
}

impl SourceProperties {
    pub fn new(channels: u32, frame_rate: u32, frame_count: FrameIndex) -> Self {
        Self {
            channels,
            frame_rate,
            frame_count,
            bit_rate_kbps: None,
        }
    }

    /// 设置平均码率
    pub fn with_bit_rate(mut self, bit_rate_kbps: Option<u32>) -> Self {
        self.bit_rate_kbps = bit_rate_kbps;
        self
    }

    /// 声道数与帧率均有效
    pub fn is_valid(&self) -> bool {
        self.channels > 0 && self.frame_rate > 0
    }

    /// 没有任何帧
    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// 时长 (秒), 属性无效时返回 None
    pub fn duration(&self) -> Option<f64> {
        self.is_valid()
            .then(|| self.frame_count as f64 / f64::from(self.frame_rate))
    }

    /// 帧数换算为交错采样数
    pub fn frames2samples(&self, frames: usize) -> usize {
        frames * self.channels as usize
    }

    /// 交错采样数换算为帧数, 采样数必须是声道数的整数倍
    pub fn samples2frames(&self, samples: usize) -> LiuResult<usize> {
        let channels = self.channels as usize;
        if channels == 0 {
            return Err(LiuError::InvalidArgument("声道数为 0".into()));
        }
        if samples % channels != 0 {
            return Err(LiuError::InvalidArgument(format!(
                "采样数 {} 不是声道数 {} 的整数倍",
                samples, channels,
            )));
        }
        Ok(samples / channels)
    }
}
