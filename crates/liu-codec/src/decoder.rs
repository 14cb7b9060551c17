//! 块解码器 trait 定义.
//!
//! 所有块解码器实现必须实现 `BlockDecoder` trait.

use liu_core::{BlockId, LiuResult, Sample};

use crate::config::{DecoderConfig, DecoderInfo};

/// 块解码器 trait
///
/// 把一个压缩块解码为交错 PCM. 解码器可以持有块间状态 (预测器、重叠窗口、
/// 前瞻缓冲等), 随机定位时通过 `reset()` 清除.
///
/// 解码流程:
/// 1. 调用 `open()` 初始化并获取流属性
/// 2. 循环调用 `decode()`, 每次消费输入的一个前缀, 输出一块 PCM
/// 3. 定位时调用 `reset()` 重新同步到指定块
/// 4. 调用 `close()` 释放资源
pub trait BlockDecoder: Send {
    /// 获取解码器名称
    fn name(&self) -> &str;

    /// 使用配置初始化解码器, 返回流属性
    fn open(&mut self, config: &DecoderConfig) -> LiuResult<DecoderInfo>;

    /// 解码一块数据
    ///
    /// # 参数
    /// - `input`: 暂存的压缩数据, 解码器消费其前缀
    /// - `output`: 交错 PCM 输出区, 至少能容纳 `max_block_frames` 帧
    ///
    /// # 返回
    /// - `Ok(DecodeStatus::Decoded)`: 成功解码, 报告帧数、消费字节数和实际声道/采样率
    /// - `Ok(DecodeStatus::Skipped)`: 可恢复的单块错误 (失步、外来数据、校验失败)
    /// - `Err(_)`: 不可恢复的解码错误
    fn decode(&mut self, input: &[u8], output: &mut [Sample]) -> LiuResult<DecodeStatus>;

    /// 重置块间状态, 从指定块重新开始解码
    fn reset(&mut self, block_id: BlockId);

    /// 定位后输出与连续解码一致性的容差
    fn seek_tolerance(&self) -> SeekTolerance {
        SeekTolerance::Exact
    }

    /// 释放解码器资源, 可重复调用
    fn close(&mut self) {}
}

/// 一次成功解码的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// 输出的帧数
    pub frames: usize,
    /// 消费的输入字节数
    pub bytes_consumed: usize,
    /// 码流中实际的声道数
    pub channels: u32,
    /// 码流中实际的采样率
    pub sample_rate: u32,
}

/// 解码状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeStatus {
    /// 成功解码一块
    Decoded(BlockInfo),
    /// 跳过了一段无法解码的数据, 没有输出
    Skipped {
        /// 被跳过的字节数
        bytes_consumed: usize,
        /// 跳过原因
        reason: String,
    },
}

/// 定位精度容差
///
/// 有的编解码器定位后能逐位复现连续解码结果, 有的只能保证数值上接近.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTolerance {
    /// 逐位一致
    Exact,
    /// 每个采样的绝对误差不超过给定值
    Within(f32),
}

impl SeekTolerance {
    /// 判断两个采样值在容差内是否一致
    pub fn accepts(&self, expected: Sample, actual: Sample) -> bool {
        match *self {
            Self::Exact => expected.to_bits() == actual.to_bits() || expected == actual,
            Self::Within(max_error) => (expected - actual).abs() <= max_error,
        }
    }

    /// 找出第一个超出容差的采样位置
    pub fn first_mismatch(&self, expected: &[Sample], actual: &[Sample]) -> Option<usize> {
        if expected.len() != actual.len() {
            return Some(expected.len().min(actual.len()));
        }
        expected
            .iter()
            .zip(actual)
            .position(|(e, a)| !self.accepts(*e, *a))
    }
}
