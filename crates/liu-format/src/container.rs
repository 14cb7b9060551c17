//! 块容器 (Container) trait 定义.
//!
//! 容器按块 ID 提供压缩数据, 并报告块大小的上界. 块 ID 从
//! [`BLOCK_ID_MIN`](liu_core::BLOCK_ID_MIN) 开始连续编号.

use liu_core::{BlockId, LiuError, LiuResult};

/// 块容器 trait
///
/// 使用流程:
/// 1. 构造容器 (各实现自带的 `open()`/`new()`)
/// 2. 可选: 调用 `scan_headers()` 获取所有块头, 用于建立定位表
/// 3. 按块 ID 调用 `read_block()` 读取压缩数据
/// 4. 调用 `close()` 释放资源
pub trait Container: Send {
    /// 获取容器名称
    fn name(&self) -> &str;

    /// 块总数, 有效块 ID 为 `1..=block_count()`
    fn block_count(&self) -> u64;

    /// 单个块的最大字节数, 用于确定输入暂存区容量
    fn max_block_size(&self) -> usize;

    /// 读取一个块的压缩数据到 `buf`, 返回写入的字节数
    ///
    /// # 返回
    /// - `Ok(n)`: 块数据占用 `buf[..n]`
    /// - `Err(LiuError::Eof)`: 块 ID 超出范围
    /// - `Err(_)`: 缓冲区不足或读取失败
    fn read_block(&mut self, block_id: BlockId, buf: &mut [u8]) -> LiuResult<usize>;

    /// 只解析块头 (不解码载荷), 按块顺序返回所有块头
    ///
    /// 没有块头的容器 (例如原始 PCM 分块) 返回 `Unsupported`.
    fn scan_headers(&mut self) -> LiuResult<Vec<BlockHeader>> {
        Err(LiuError::Unsupported(format!(
            "容器 {} 不支持块头扫描",
            self.name()
        )))
    }

    /// 压缩数据总字节数, None 表示未知
    fn total_bytes(&self) -> Option<u64> {
        None
    }

    /// 释放容器资源, 可重复调用
    fn close(&mut self) {}
}

/// 块头信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// 块 ID
    pub block_id: BlockId,
    /// 块内帧数
    pub frames: u32,
    /// 声道数
    pub channels: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 块的字节数 (含头部)
    pub byte_len: usize,
}

impl BlockHeader {
    /// 本块的码率 (kbps), 帧数为 0 时无意义, 返回 None
    pub fn bit_rate_kbps(&self) -> Option<u32> {
        liu_core::bit_rate_kbps(
            self.byte_len as u64,
            self.sample_rate,
            u64::from(self.frames),
        )
    }
}
