//! 块寻址: 帧位置到块 ID 的映射与定位规划.
//!
//! - `FixedBlocks`: 每块帧数固定, `frame_start(id) = (id - BLOCK_ID_MIN) * frames_per_block`
//! - `SeekTable`: 每块帧数可变, 打开时扫描所有块头建立升序定位表
//!
//! 两者只负责决定"是否重启解码器以及从哪里重启", 之后统一由读取引擎
//! 丢弃读取到目标帧.

use log::{debug, warn};
use liu_core::{BLOCK_ID_MIN, BlockId, FRAME_INDEX_MIN, FrameIndex, LiuError, LiuResult};
use liu_format::BlockHeader;

/// 定位计划
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekPlan {
    /// 从当前解码状态继续丢弃读取
    Continue,
    /// 重置解码器到 `block_id`, 位置设为该块的起始帧
    Restart {
        block_id: BlockId,
        frame_index: FrameIndex,
    },
}

/// 固定块长寻址
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBlocks {
    /// 每块帧数
    frames_per_block: u64,
    /// 块数
    block_count: u64,
}

impl FixedBlocks {
    pub fn new(frames_per_block: u64, block_count: u64) -> Self {
        debug_assert!(frames_per_block > 0);
        Self {
            frames_per_block,
            block_count,
        }
    }

    pub fn frames_per_block(&self) -> u64 {
        self.frames_per_block
    }

    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    /// 所有块的总帧数
    pub fn frame_count(&self) -> FrameIndex {
        self.block_count * self.frames_per_block
    }

    /// 块的起始帧
    pub fn frame_start(&self, block_id: BlockId) -> FrameIndex {
        FRAME_INDEX_MIN + (block_id - BLOCK_ID_MIN) * self.frames_per_block
    }

    /// 包含指定帧的块
    pub fn block_of(&self, frame_index: FrameIndex) -> BlockId {
        BLOCK_ID_MIN + (frame_index - FRAME_INDEX_MIN) / self.frames_per_block
    }

    /// 规划定位
    ///
    /// 向后定位、当前块无效、或目标块超出预解码窗口时需要重启,
    /// 重启块为目标块之前 `prefetch` 块 (不早于第一块).
    pub fn plan_seek(
        &self,
        target: FrameIndex,
        current: FrameIndex,
        current_block: Option<BlockId>,
        prefetch: u64,
    ) -> SeekPlan {
        let target_block = self.block_of(target);
        let restart = match current_block {
            Some(block_id) if self.is_valid_block(block_id) => {
                target < current || target_block > block_id.saturating_add(prefetch)
            }
            _ => true,
        };
        if !restart {
            return SeekPlan::Continue;
        }
        let block_id = target_block.saturating_sub(prefetch).max(BLOCK_ID_MIN);
        SeekPlan::Restart {
            block_id,
            frame_index: self.frame_start(block_id),
        }
    }

    pub fn is_valid_block(&self, block_id: BlockId) -> bool {
        block_id >= BLOCK_ID_MIN && block_id - BLOCK_ID_MIN < self.block_count
    }
}

/// 定位表条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekEntry {
    /// 块的起始帧
    pub frame_index: FrameIndex,
    /// 块 ID
    pub block_id: BlockId,
}

/// 可变块长定位表
///
/// 条目按起始帧严格递增. 帧数为 0 的块不进入定位表, 但计入码率.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekTable {
    entries: Vec<SeekEntry>,
    /// 总帧数
    frame_count: FrameIndex,
    /// 容器中的块数 (含 0 帧块)
    block_count: u64,
    /// 单块最大帧数
    max_block_frames: u32,
    /// 声道数 (取第一个块头)
    channels: u32,
    /// 采样率
    sample_rate: u32,
    /// 平均码率 (kbps)
    bit_rate_kbps: Option<u32>,
}

impl SeekTable {
    /// 从块头扫描结果建立定位表
    ///
    /// 没有可解码的块或采样率不一致时打开失败; 声道数不一致只记录警告,
    /// 以第一个块头为准.
    pub fn from_headers(headers: &[BlockHeader]) -> LiuResult<Self> {
        let first = headers
            .iter()
            .find(|h| h.frames > 0)
            .ok_or_else(|| LiuError::OpenFailed("没有可解码的块".into()))?;
        let channels = first.channels;
        let sample_rate = first.sample_rate;

        let mut entries = Vec::with_capacity(headers.len());
        let mut frame_index = FRAME_INDEX_MIN;
        let mut max_block_frames = 0;
        let mut total_bytes = 0u64;
        let mut channel_warned = false;

        for header in headers {
            total_bytes = total_bytes.saturating_add(header.byte_len as u64);
            if header.frames == 0 {
                debug!("块 {} 没有帧, 不进入定位表", header.block_id);
                continue;
            }
            if header.sample_rate != sample_rate {
                return Err(LiuError::OpenFailed(format!(
                    "块 {} 的采样率 {} 与首块 {} 不一致",
                    header.block_id, header.sample_rate, sample_rate,
                )));
            }
            if header.channels != channels && !channel_warned {
                warn!(
                    "块 {} 的声道数 {} 与首块 {} 不一致, 以首块为准",
                    header.block_id, header.channels, channels,
                );
                channel_warned = true;
            }
            entries.push(SeekEntry {
                frame_index,
                block_id: header.block_id,
            });
            frame_index += u64::from(header.frames);
            max_block_frames = max_block_frames.max(header.frames);
        }

        let frame_count = frame_index - FRAME_INDEX_MIN;
        let bit_rate_kbps = liu_core::bit_rate_kbps(total_bytes, sample_rate, frame_count);
        debug!(
            "定位表: {} 个条目, {} 帧, 最大每块 {} 帧, 平均 {:?} kbps",
            entries.len(),
            frame_count,
            max_block_frames,
            bit_rate_kbps,
        );
        Ok(Self {
            entries,
            frame_count,
            block_count: headers.len() as u64,
            max_block_frames,
            channels,
            sample_rate,
            bit_rate_kbps,
        })
    }

    pub fn entries(&self) -> &[SeekEntry] {
        &self.entries
    }

    pub fn frame_count(&self) -> FrameIndex {
        self.frame_count
    }

    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    pub fn max_block_frames(&self) -> u32 {
        self.max_block_frames
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bit_rate_kbps(&self) -> Option<u32> {
        self.bit_rate_kbps
    }

    /// 平均每块帧数, 用于直接估算条目下标
    pub fn avg_block_frames(&self) -> u64 {
        (self.frame_count / self.entries.len().max(1) as u64).max(1)
    }

    /// 查找起始帧不大于 `target` 的最后一个条目的下标
    ///
    /// 先按平均块长估算下标, 再在 `[lower, upper)` 内二分,
    /// 保持 `entries[lower].frame_index <= target < entries[upper].frame_index`.
    pub fn find_entry(&self, target: FrameIndex) -> usize {
        let len = self.entries.len();
        if len == 0 {
            return 0;
        }
        let guess = ((target / self.avg_block_frames()) as usize).min(len - 1);
        let (mut lower, mut upper) = if self.entries[guess].frame_index <= target {
            (guess, len)
        } else {
            (0, guess)
        };
        while upper - lower > 1 {
            let mid = lower + (upper - lower) / 2;
            if self.entries[mid].frame_index <= target {
                lower = mid;
            } else {
                upper = mid;
            }
        }
        lower
    }

    /// 规划定位
    ///
    /// 向后定位或向前跳跃超过 `2 * prefetch * max_block_frames` 时查表,
    /// 并从找到的条目再后退 `prefetch` 个条目作为预解码起点.
    pub fn plan_seek(
        &self,
        target: FrameIndex,
        current: FrameIndex,
        current_block: Option<BlockId>,
        prefetch: u64,
    ) -> SeekPlan {
        let threshold = 2 * prefetch * u64::from(self.max_block_frames);
        let lookup = current_block.is_none() || target < current || target - current > threshold;
        if !lookup || self.entries.is_empty() {
            return SeekPlan::Continue;
        }
        let index = self.find_entry(target);
        let start = index.saturating_sub(prefetch as usize);
        let entry = self.entries[start];
        SeekPlan::Restart {
            block_id: entry.block_id,
            frame_index: entry.frame_index,
        }
    }

    pub fn is_valid_block(&self, block_id: BlockId) -> bool {
        block_id >= BLOCK_ID_MIN && block_id - BLOCK_ID_MIN < self.block_count
    }
}

/// 块寻址方式, 打开时选定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockAddressing {
    Fixed(FixedBlocks),
    Tabled(SeekTable),
}

impl BlockAddressing {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed(_) => "fixed",
            Self::Tabled(_) => "tabled",
        }
    }

    pub fn block_count(&self) -> u64 {
        match self {
            Self::Fixed(fixed) => fixed.block_count(),
            Self::Tabled(table) => table.block_count(),
        }
    }

    pub fn is_valid_block(&self, block_id: BlockId) -> bool {
        match self {
            Self::Fixed(fixed) => fixed.is_valid_block(block_id),
            Self::Tabled(table) => table.is_valid_block(block_id),
        }
    }

    pub fn plan_seek(
        &self,
        target: FrameIndex,
        current: FrameIndex,
        current_block: Option<BlockId>,
        prefetch: u64,
    ) -> SeekPlan {
        match self {
            Self::Fixed(fixed) => fixed.plan_seek(target, current, current_block, prefetch),
            Self::Tabled(table) => table.plan_seek(target, current, current_block, prefetch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(block_id: BlockId, frames: u32) -> BlockHeader {
        BlockHeader {
            block_id,
            frames,
            channels: 2,
            sample_rate: 8000,
            byte_len: 16 + frames as usize * 4,
        }
    }

    /// 块长依次为 100, 50, 200, 0, 75, 25
    fn make_table() -> SeekTable {
        let frames = [100, 50, 200, 0, 75, 25];
        let headers: Vec<BlockHeader> = frames
            .iter()
            .enumerate()
            .map(|(i, f)| header(i as BlockId + 1, *f))
            .collect();
        SeekTable::from_headers(&headers).unwrap()
    }

    // ============================================================
    // 固定块长
    // ============================================================

    #[test]
    fn test_固定块长重启计算() {
        let fixed = FixedBlocks::new(1024, 100);
        assert_eq!(fixed.block_of(5000), 5);
        let plan = fixed.plan_seek(5000, 100_000, Some(50), 3);
        assert_eq!(
            plan,
            SeekPlan::Restart {
                block_id: 2,
                frame_index: 1024,
            }
        );
        // 位置无效时同样重启
        assert_eq!(fixed.plan_seek(5000, 0, None, 3), plan);
    }

    #[test]
    fn test_固定块长向前小步不重启() {
        let fixed = FixedBlocks::new(1024, 100);
        // 下一个待读块为 4, 目标块 5 在预解码窗口内
        assert_eq!(fixed.plan_seek(5000, 3000, Some(4), 3), SeekPlan::Continue);
        // 目标块 8 超出窗口
        assert!(matches!(
            fixed.plan_seek(8000, 3000, Some(4), 3),
            SeekPlan::Restart { block_id: 5, .. }
        ));
    }

    #[test]
    fn test_固定块长重启不早于第一块() {
        let fixed = FixedBlocks::new(1024, 10);
        assert_eq!(
            fixed.plan_seek(100, 5000, Some(6), 3),
            SeekPlan::Restart {
                block_id: 1,
                frame_index: 0,
            }
        );
    }

    #[test]
    fn test_固定块长块_id_范围() {
        let fixed = FixedBlocks::new(4, 3);
        assert_eq!(fixed.frame_count(), 12);
        assert!(!fixed.is_valid_block(0));
        assert!(fixed.is_valid_block(3));
        assert!(!fixed.is_valid_block(4));
        // 读到末尾后的块 ID 无效, 任何定位都重启
        assert!(matches!(
            fixed.plan_seek(11, 12, Some(4), 1),
            SeekPlan::Restart { block_id: 2, frame_index: 4 }
        ));
    }

    // ============================================================
    // 定位表
    // ============================================================

    #[test]
    fn test_定位表跳过零帧块() {
        let table = make_table();
        assert_eq!(table.block_count(), 6);
        assert_eq!(table.entries().len(), 5);
        assert_eq!(table.frame_count(), 450);
        assert_eq!(table.max_block_frames(), 200);
        let ids: Vec<BlockId> = table.entries().iter().map(|e| e.block_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 5, 6]);
        let starts: Vec<FrameIndex> = table.entries().iter().map(|e| e.frame_index).collect();
        assert_eq!(starts, vec![0, 100, 150, 350, 425]);
    }

    #[test]
    fn test_二分查找边界() {
        let table = make_table();
        for (index, entry) in table.entries().iter().enumerate() {
            assert_eq!(table.find_entry(entry.frame_index), index);
            assert_eq!(table.find_entry(entry.frame_index + 1), index);
            if entry.frame_index > 0 {
                assert_eq!(table.find_entry(entry.frame_index - 1), index - 1);
            }
        }
        assert_eq!(table.find_entry(10_000), table.entries().len() - 1);
    }

    #[test]
    fn test_定位表回退预解码条目() {
        let table = make_table();
        // 目标 400 落在条目 3 (起始 350), 后退 1 个条目到块 3
        assert_eq!(
            table.plan_seek(400, 449, Some(6), 1),
            SeekPlan::Restart {
                block_id: 3,
                frame_index: 150,
            }
        );
        // 回退不早于第一个条目
        assert_eq!(
            table.plan_seek(10, 449, Some(6), 5),
            SeekPlan::Restart {
                block_id: 1,
                frame_index: 0,
            }
        );
    }

    #[test]
    fn test_定位表小步向前不查表() {
        let table = make_table();
        // 阈值 2 * 1 * 200 = 400
        assert_eq!(table.plan_seek(300, 10, Some(2), 1), SeekPlan::Continue);
        assert!(matches!(
            table.plan_seek(420, 10, Some(2), 1),
            SeekPlan::Restart { .. }
        ));
        // 不预解码时任何向前定位都查表
        assert!(matches!(
            table.plan_seek(20, 10, Some(2), 0),
            SeekPlan::Restart { block_id: 1, .. }
        ));
    }

    #[test]
    fn test_没有可解码的块() {
        let headers = vec![header(1, 0), header(2, 0)];
        assert!(matches!(
            SeekTable::from_headers(&headers),
            Err(LiuError::OpenFailed(_))
        ));
        assert!(SeekTable::from_headers(&[]).is_err());
    }

    #[test]
    fn test_采样率不一致() {
        let mut second = header(2, 10);
        second.sample_rate = 44100;
        let result = SeekTable::from_headers(&[header(1, 10), second]);
        assert!(matches!(result, Err(LiuError::OpenFailed(_))));
    }

    #[test]
    fn test_声道数不一致以首块为准() {
        let mut second = header(2, 10);
        second.channels = 1;
        let table = SeekTable::from_headers(&[header(1, 10), second]).unwrap();
        assert_eq!(table.channels(), 2);
        assert_eq!(table.entries().len(), 2);
    }

    #[test]
    fn test_平均码率() {
        // 每块 16 + 400 * 4 字节, 400 帧 @ 8000 Hz
        let table = SeekTable::from_headers(&[header(1, 400), header(2, 400)]).unwrap();
        // 2 * 1616 * 8 * 8000 / 800 / 1000 = 258
        assert_eq!(table.bit_rate_kbps(), Some(258));
    }

    #[test]
    fn test_平均码率超出范围时饱和() {
        let mut huge = header(1, 1);
        huge.byte_len = usize::MAX;
        let table = SeekTable::from_headers(&[huge, header(2, 1)]).unwrap();
        assert_eq!(table.bit_rate_kbps(), Some(u32::MAX));
    }
}
