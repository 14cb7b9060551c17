//! 分帧块流容器.
//!
//! 数据是一串重叠块 (每块以 [`LappedHeader`] 开头), 中间可能夹杂外来数据块
//! (`b"TAG"` + u32 大端长度 + 载荷) 和无法识别的垃圾字节.
//!
//! 打开时一次性扫描所有块头 (只读头部, 借助载荷长度跳过载荷), 建立
//! 块 ID 到字节范围的索引. 失步时向后搜索下一个同步字; 末尾被截断的块丢弃.

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use log::debug;
use liu_codec::header::{self, HEADER_LEN, LappedHeader};
use liu_core::{BLOCK_ID_MIN, BlockId, LiuResult};

use super::{block_index, copy_block};
use crate::container::{BlockHeader, Container};

/// 外来数据块标识
pub const TAG_MAGIC: &[u8; 3] = b"TAG";

/// 外来数据块头长度 (标识 + u32 长度)
const TAG_HEADER_LEN: usize = 7;

/// 块在数据中的位置
#[derive(Debug, Clone, Copy)]
struct BlockEntry {
    /// 起始偏移
    offset: usize,
    /// 块长度 (含头部)
    len: usize,
}

/// 扫描统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// 跳过的外来数据块数
    pub tags_skipped: usize,
    /// 失步丢弃的字节数
    pub bytes_resynced: usize,
    /// 末尾被截断而丢弃的字节数
    pub bytes_truncated: usize,
}

/// 分帧块流容器
pub struct FramedContainer {
    /// 完整数据
    data: Bytes,
    /// 块位置索引
    index: Vec<BlockEntry>,
    /// 块头 (与索引一一对应)
    headers: Vec<BlockHeader>,
    /// 最大块字节数
    max_block_size: usize,
    /// 扫描统计
    stats: ScanStats,
}

impl FramedContainer {
    /// 打开数据流并扫描所有块头
    pub fn open(data: impl Into<Bytes>) -> LiuResult<Self> {
        let data = data.into();
        let mut container = Self {
            data,
            index: Vec::new(),
            headers: Vec::new(),
            max_block_size: 0,
            stats: ScanStats::default(),
        };
        container.scan();
        debug!(
            "framed: 扫描完成, {} 个块, 跳过 {} 个标签, 失步 {} 字节, 截断 {} 字节",
            container.index.len(),
            container.stats.tags_skipped,
            container.stats.bytes_resynced,
            container.stats.bytes_truncated,
        );
        Ok(container)
    }

    /// 扫描统计
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    fn scan(&mut self) {
        let data = self.data.clone();
        let mut pos = 0;

        while pos < data.len() {
            let rest = &data[pos..];

            if rest.starts_with(TAG_MAGIC) {
                if rest.len() < TAG_HEADER_LEN {
                    self.stats.bytes_truncated += rest.len();
                    break;
                }
                let tag_len = BigEndian::read_u32(&rest[3..7]) as usize;
                debug!("framed: 偏移 {} 处跳过 {} 字节的标签", pos, tag_len);
                self.stats.tags_skipped += 1;
                pos = pos.saturating_add(TAG_HEADER_LEN + tag_len);
                continue;
            }

            if let Some(hdr) = LappedHeader::parse(rest) {
                let block_len = hdr.block_len();
                if rest.len() < block_len {
                    debug!(
                        "framed: 偏移 {} 处的末尾块被截断, 需要 {} 字节, 只有 {}",
                        pos,
                        block_len,
                        rest.len(),
                    );
                    self.stats.bytes_truncated += rest.len();
                    break;
                }
                self.push_block(pos, &hdr);
                pos += block_len;
                continue;
            }

            if rest.len() < HEADER_LEN {
                self.stats.bytes_truncated += rest.len();
                break;
            }

            // 失步: 从下一个字节开始寻找同步字
            let skipped = match header::find_sync(&rest[1..]) {
                Some(offset) => offset + 1,
                None => rest.len(),
            };
            debug!("framed: 偏移 {} 处失步, 跳过 {} 字节", pos, skipped);
            self.stats.bytes_resynced += skipped;
            pos += skipped;
        }
    }

    fn push_block(&mut self, offset: usize, hdr: &LappedHeader) {
        let len = hdr.block_len();
        let block_id = BLOCK_ID_MIN + self.index.len() as BlockId;
        self.index.push(BlockEntry { offset, len });
        self.headers.push(BlockHeader {
            block_id,
            frames: u32::from(hdr.frames),
            channels: u32::from(hdr.channels),
            sample_rate: hdr.sample_rate,
            byte_len: len,
        });
        self.max_block_size = self.max_block_size.max(len);
    }
}

impl Container for FramedContainer {
    fn name(&self) -> &str {
        "framed"
    }

    fn block_count(&self) -> u64 {
        self.index.len() as u64
    }

    fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    fn read_block(&mut self, block_id: BlockId, buf: &mut [u8]) -> LiuResult<usize> {
        let entry = self.index[block_index(block_id, self.index.len())?];
        copy_block(&self.data[entry.offset..entry.offset + entry.len], buf)
    }

    fn scan_headers(&mut self) -> LiuResult<Vec<BlockHeader>> {
        Ok(self.headers.clone())
    }

    fn total_bytes(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn close(&mut self) {
        self.index.clear();
        self.headers.clear();
        self.data = Bytes::new();
    }
}
