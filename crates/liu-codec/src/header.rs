//! 重叠块编码的块头格式.
//!
//! 每个块以 16 字节头部开始, 头部之后是载荷:
//! ```text
//! 偏移 长度 字段
//! 0    2    同步字 0x4C50 ("LP"), 大端
//! 2    1    声道数 (1..=8)
//! 3    1    重叠帧数
//! 4    2    块内帧数 (u16 大端)
//! 6    4    采样率 (u32 大端)
//! 10   4    载荷字节数 (u32 大端) = (帧数 + 重叠帧数) * 声道数 * 2
//! 14   2    校验和 (u16 大端) = 载荷字节的回绕累加和
//! ```
//!
//! 容器扫描时只解析头部, 借助载荷长度跳过载荷, 不需要解码.

use byteorder::{BigEndian, ByteOrder};

/// 块头同步字
pub const SYNC_WORD: u16 = 0x4C50;

/// 块头长度 (字节)
pub const HEADER_LEN: usize = 16;

/// 最大声道数
pub const MAX_CHANNELS: u8 = 8;

/// 每个载荷值的字节数 (S16LE)
pub const BYTES_PER_VALUE: usize = 2;

/// 重叠块头部
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LappedHeader {
    /// 声道数
    pub channels: u8,
    /// 重叠帧数
    pub overlap: u8,
    /// 块内帧数
    pub frames: u16,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 载荷字节数
    pub payload_len: u32,
    /// 载荷校验和
    pub checksum: u16,
}

impl LappedHeader {
    /// 根据块参数和载荷构造头部
    pub fn for_payload(channels: u8, overlap: u8, frames: u16, sample_rate: u32, payload: &[u8]) -> Self {
        Self {
            channels,
            overlap,
            frames,
            sample_rate,
            payload_len: payload.len() as u32,
            checksum: checksum(payload),
        }
    }

    /// 解析头部
    ///
    /// 同步字不匹配、字段越界或载荷长度与帧数不一致时返回 `None`.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        if BigEndian::read_u16(&buf[0..2]) != SYNC_WORD {
            return None;
        }
        let header = Self {
            channels: buf[2],
            overlap: buf[3],
            frames: BigEndian::read_u16(&buf[4..6]),
            sample_rate: BigEndian::read_u32(&buf[6..10]),
            payload_len: BigEndian::read_u32(&buf[10..14]),
            checksum: BigEndian::read_u16(&buf[14..16]),
        };
        header.is_consistent().then_some(header)
    }

    /// 序列化头部
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        BigEndian::write_u16(&mut buf[0..2], SYNC_WORD);
        buf[2] = self.channels;
        buf[3] = self.overlap;
        BigEndian::write_u16(&mut buf[4..6], self.frames);
        BigEndian::write_u32(&mut buf[6..10], self.sample_rate);
        BigEndian::write_u32(&mut buf[10..14], self.payload_len);
        BigEndian::write_u16(&mut buf[14..16], self.checksum);
        buf
    }

    /// 块总字节数 (头部 + 载荷)
    pub fn block_len(&self) -> usize {
        HEADER_LEN + self.payload_len as usize
    }

    /// 按帧数计算应有的载荷字节数
    pub fn expected_payload_len(&self) -> usize {
        (self.frames as usize + self.overlap as usize) * self.channels as usize * BYTES_PER_VALUE
    }

    fn is_consistent(&self) -> bool {
        self.channels > 0
            && self.channels <= MAX_CHANNELS
            && self.sample_rate > 0
            && self.overlap as u16 <= self.frames
            && self.payload_len as usize == self.expected_payload_len()
    }
}

/// 载荷校验和: 字节回绕累加
pub fn checksum(payload: &[u8]) -> u16 {
    payload
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
}

/// 在缓冲区中查找下一个同步字位置
pub fn find_sync(buf: &[u8]) -> Option<usize> {
    buf.windows(2)
        .position(|w| BigEndian::read_u16(w) == SYNC_WORD)
}
