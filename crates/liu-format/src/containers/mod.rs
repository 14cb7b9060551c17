//! 内置容器实现.

pub mod framed;
pub mod memory;

use liu_core::{BLOCK_ID_MIN, BlockId, LiuError, LiuResult};

/// 把块 ID 换算为从 0 开始的下标, 超出范围时返回 `Eof`
fn block_index(block_id: BlockId, block_count: usize) -> LiuResult<usize> {
    if block_id < BLOCK_ID_MIN {
        return Err(LiuError::InvalidArgument(format!("无效的块 ID: {}", block_id)));
    }
    let index = (block_id - BLOCK_ID_MIN) as usize;
    if index >= block_count {
        return Err(LiuError::Eof);
    }
    Ok(index)
}

/// 把块数据复制到调用方缓冲区
fn copy_block(block: &[u8], buf: &mut [u8]) -> LiuResult<usize> {
    if block.len() > buf.len() {
        return Err(LiuError::InvalidArgument(format!(
            "缓冲区不足: 块大小 {} 字节, 缓冲区 {} 字节",
            block.len(),
            buf.len(),
        )));
    }
    buf[..block.len()].copy_from_slice(block);
    Ok(block.len())
}
