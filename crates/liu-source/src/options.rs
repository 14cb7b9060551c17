//! 音频源打开选项.

use liu_codec::SeekTolerance;
use liu_core::FrameIndex;

/// 块寻址方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressingMode {
    /// 每块帧数固定, 块位置按算术换算
    #[default]
    Fixed,
    /// 每块帧数可变, 打开时扫描块头建立定位表
    Tabled,
}

/// 音频源打开选项
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceOptions {
    /// 块寻址方式
    pub addressing: AddressingMode,
    /// 定位预解码块数, None 时使用解码器报告的默认值
    pub prefetch_blocks: Option<u64>,
    /// 定位一致性容差, None 时使用解码器报告的默认值
    pub tolerance: Option<SeekTolerance>,
    /// 容器声明的总帧数 (固定块长时用于截去末块的填充), 不超过块数 * 每块帧数
    pub frame_count: Option<FrameIndex>,
}

impl SourceOptions {
    /// 固定块长寻址
    pub fn fixed() -> Self {
        Self::default()
    }

    /// 定位表寻址
    pub fn tabled() -> Self {
        Self {
            addressing: AddressingMode::Tabled,
            ..Self::default()
        }
    }

    pub fn with_prefetch_blocks(mut self, prefetch_blocks: u64) -> Self {
        self.prefetch_blocks = Some(prefetch_blocks);
        self
    }

    pub fn with_tolerance(mut self, tolerance: SeekTolerance) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn with_frame_count(mut self, frame_count: FrameIndex) -> Self {
        self.frame_count = Some(frame_count);
        self
    }
}
