//! 块与帧位置的基础类型.

/// 块标识, 从 1 开始编号
pub type BlockId = u64;

/// 第一个块的标识
pub const BLOCK_ID_MIN: BlockId = 1;

/// 帧位置 (每个声道一个采样构成一帧)
pub type FrameIndex = u64;

/// 第一帧的位置
pub const FRAME_INDEX_MIN: FrameIndex = 0;

/// 按字节数与帧数计算平均码率 (kbps)
///
/// 帧数或采样率为 0 时返回 None, 超出 `u32` 范围时饱和为 `u32::MAX`.
pub fn bit_rate_kbps(total_bytes: u64, sample_rate: u32, frame_count: FrameIndex) -> Option<u32> {
    if frame_count == 0 || sample_rate == 0 {
        return None;
    }
    let kbps = u128::from(total_bytes) * 8 * u128::from(sample_rate)
        / u128::from(frame_count)
        / 1000;
    Some(u32::try_from(kbps).unwrap_or(u32::MAX))
}
