//! 集成测试共用的码流构造工具.
//!
//! 所有测试数据都在测试中合成, 信号为确定性的伪随机序列.

#![allow(dead_code)]

use liu::codec::LappedHeader;
use liu::{AudioSource, Sample};

/// 初始化测试日志输出
pub fn init_test_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 确定性伪随机信号发生器 (线性同余)
pub struct Signal {
    state: u32,
}

impl Signal {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_value(&mut self) -> i16 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        ((self.state >> 16) as i16) / 4
    }
}

/// 重叠块描述
#[derive(Debug, Clone, Copy)]
pub struct BlockSpec {
    pub channels: u8,
    pub sample_rate: u32,
    pub frames: u16,
    pub overlap: u8,
}

impl BlockSpec {
    pub fn new(channels: u8, sample_rate: u32, frames: u16, overlap: u8) -> Self {
        Self {
            channels,
            sample_rate,
            frames,
            overlap: overlap.min(frames.min(255) as u8),
        }
    }
}

/// 编码一个重叠块, `corrupt` 为 true 时破坏校验和
pub fn lapped_block(spec: BlockSpec, signal: &mut Signal, corrupt: bool) -> Vec<u8> {
    let values = (spec.frames as usize + spec.overlap as usize) * spec.channels as usize;
    let mut payload = Vec::with_capacity(values * 2);
    for _ in 0..values {
        payload.extend_from_slice(&signal.next_value().to_le_bytes());
    }
    let mut header = LappedHeader::for_payload(
        spec.channels,
        spec.overlap,
        spec.frames,
        spec.sample_rate,
        &payload,
    );
    if corrupt {
        header.checksum = header.checksum.wrapping_add(1);
    }
    let mut block = header.to_bytes().to_vec();
    block.extend_from_slice(&payload);
    block
}

/// 编码一串声道数和采样率相同的重叠块, 每块的重叠帧数为 `overlap`
pub fn lapped_stream(channels: u8, sample_rate: u32, overlap: u8, frames: &[u16]) -> Vec<u8> {
    let mut signal = Signal::new(0x5EED);
    frames
        .iter()
        .flat_map(|f| {
            lapped_block(
                BlockSpec::new(channels, sample_rate, *f, overlap),
                &mut signal,
                false,
            )
        })
        .collect()
}

/// 分别编码每个重叠块 (用于内存容器)
pub fn lapped_blocks(channels: u8, sample_rate: u32, overlap: u8, frames: &[u16]) -> Vec<Vec<u8>> {
    let mut signal = Signal::new(0x5EED);
    frames
        .iter()
        .map(|f| {
            lapped_block(
                BlockSpec::new(channels, sample_rate, *f, overlap),
                &mut signal,
                false,
            )
        })
        .collect()
}

/// 外来数据块
pub fn tag_chunk(payload: &[u8]) -> Vec<u8> {
    let mut chunk = b"TAG".to_vec();
    chunk.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    chunk.extend_from_slice(payload);
    chunk
}

/// 交错 S16LE PCM 数据
pub fn pcm_s16le(channels: u32, frames: usize) -> Vec<u8> {
    let mut signal = Signal::new(42);
    (0..frames * channels as usize)
        .flat_map(|_| signal.next_value().to_le_bytes())
        .collect()
}

/// 从当前位置连续读取到流末尾
pub fn decode_all<S: AudioSource>(source: &mut S) -> Vec<Sample> {
    let channels = source.properties().channels as usize;
    let mut out = Vec::new();
    let mut buf = vec![0.0; 1000 * channels];
    loop {
        let read = source.read_frames(1000, Some(&mut buf));
        if read == 0 {
            break;
        }
        out.extend_from_slice(&buf[..read * channels]);
    }
    out
}
