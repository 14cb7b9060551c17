//! 内存块容器.
//!
//! 持有一组已经切分好的块, 块 ID 依次为 1..=n. 没有块头, 适用于
//! 原始 PCM 这类每块帧数固定的数据.

use bytes::Bytes;
use liu_core::{BlockId, LiuError, LiuResult};

use super::{block_index, copy_block};
use crate::container::Container;

/// 内存块容器
pub struct MemoryContainer {
    /// 所有块
    blocks: Vec<Bytes>,
    /// 最大块字节数
    max_block_size: usize,
}

impl MemoryContainer {
    /// 从块列表创建
    pub fn new(blocks: Vec<Bytes>) -> Self {
        let max_block_size = blocks.iter().map(Bytes::len).max().unwrap_or(0);
        Self {
            blocks,
            max_block_size,
        }
    }

    /// 把连续数据按固定字节数切分为块, 最后一块可以较短
    pub fn from_chunks(data: impl Into<Bytes>, block_size: usize) -> LiuResult<Self> {
        if block_size == 0 {
            return Err(LiuError::InvalidArgument("块大小不能为 0".into()));
        }
        let data = data.into();
        let blocks = (0..data.len())
            .step_by(block_size)
            .map(|start| data.slice(start..(start + block_size).min(data.len())))
            .collect();
        Ok(Self::new(blocks))
    }
}

impl Container for MemoryContainer {
    fn name(&self) -> &str {
        "memory"
    }

    fn block_count(&self) -> u64 {
        self.blocks.len() as u64
    }

    fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    fn read_block(&mut self, block_id: BlockId, buf: &mut [u8]) -> LiuResult<usize> {
        let index = block_index(block_id, self.blocks.len())?;
        copy_block(&self.blocks[index], buf)
    }

    fn total_bytes(&self) -> Option<u64> {
        Some(self.blocks.iter().map(|b| b.len() as u64).sum())
    }

    fn close(&mut self) {
        self.blocks.clear();
    }
}
