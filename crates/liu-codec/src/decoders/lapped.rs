//! 重叠块解码器.
//!
//! 每块载荷由 `frames * channels` 个主体值和 `overlap * channels` 个尾部值
//! 组成 (S16LE). 主体的前 `overlap` 帧要叠加上一块的尾部才是最终输出,
//! 这与变换编码器的窗口重叠相同: 解码器持有块间状态.
//!
//! 定位重启后第一块缺少上一块的尾部, 输出与连续解码不同; 从第二块开始
//! 输出完全一致. 因此定位时至少要预解码 1 块.

use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use liu_core::{BlockId, LiuError, LiuResult, Sample};

use crate::codec_id::CodecId;
use crate::config::{DecoderConfig, DecoderInfo, prefetch_blocks_for_delay};
use crate::decoder::{BlockDecoder, BlockInfo, DecodeStatus};
use crate::header::{self, BYTES_PER_VALUE, HEADER_LEN, LappedHeader};

/// 未指定块长时的默认最大每块帧数
const DEFAULT_MAX_BLOCK_FRAMES: u32 = 4096;

/// 载荷值归一化系数
const VALUE_SCALE: f32 = 1.0 / 32768.0;

/// 重叠块解码器
pub struct LappedDecoder {
    /// 声明的声道数
    channels: u32,
    /// 声明的采样率
    sample_rate: u32,
    /// 最大每块帧数
    max_block_frames: u32,
    /// 上一块的尾部 (已归一化), 重置后为空
    prev_tail: Vec<Sample>,
    /// 是否已打开
    opened: bool,
}

impl LappedDecoder {
    /// 创建解码器实例 (工厂函数)
    pub fn create() -> LiuResult<Box<dyn BlockDecoder>> {
        Ok(Box::new(Self::new()))
    }

    pub fn new() -> Self {
        Self {
            channels: 0,
            sample_rate: 0,
            max_block_frames: DEFAULT_MAX_BLOCK_FRAMES,
            prev_tail: Vec::new(),
            opened: false,
        }
    }

    /// 在失步数据中寻找下一个同步字, 返回可以跳过的字节数
    fn skip_to_next_sync(input: &[u8]) -> usize {
        match header::find_sync(&input[1..]) {
            Some(pos) => pos + 1,
            None => input.len(),
        }
    }
}

impl Default for LappedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDecoder for LappedDecoder {
    fn name(&self) -> &str {
        CodecId::Lapped.name()
    }

    fn open(&mut self, config: &DecoderConfig) -> LiuResult<DecoderInfo> {
        let channels = config
            .channels
            .ok_or_else(|| LiuError::InvalidArgument("重叠块解码器需要声道数".into()))?;
        let sample_rate = config
            .sample_rate
            .ok_or_else(|| LiuError::InvalidArgument("重叠块解码器需要采样率".into()))?;
        if channels == 0 || channels > u32::from(header::MAX_CHANNELS) {
            return Err(LiuError::Unsupported(format!("不支持的声道数: {}", channels)));
        }
        if sample_rate == 0 {
            return Err(LiuError::InvalidArgument("采样率不能为 0".into()));
        }

        self.channels = channels;
        self.sample_rate = sample_rate;
        self.max_block_frames = config.block_frames.unwrap_or(DEFAULT_MAX_BLOCK_FRAMES);
        self.prev_tail.clear();
        self.opened = true;

        // 载荷上限按两倍块长估算
        let max_block_bytes = HEADER_LEN
            + 2 * self.max_block_frames as usize * channels as usize * BYTES_PER_VALUE;
        debug!(
            "打开 lapped 解码器: {} Hz, {} 声道, 最大每块 {} 帧",
            sample_rate, channels, self.max_block_frames,
        );
        // 重叠帧数不超过块帧数, 最坏情况下延迟一整块
        let max_delay = u64::from(self.max_block_frames);
        Ok(DecoderInfo {
            channels,
            sample_rate,
            max_block_frames: self.max_block_frames,
            max_block_bytes,
            prefetch_blocks: prefetch_blocks_for_delay(max_delay, max_delay),
        })
    }

    fn decode(&mut self, input: &[u8], output: &mut [Sample]) -> LiuResult<DecodeStatus> {
        if !self.opened {
            return Err(LiuError::Codec("解码器未打开, 请先调用 open()".into()));
        }
        if input.len() < HEADER_LEN {
            return Ok(DecodeStatus::Skipped {
                bytes_consumed: input.len(),
                reason: format!("剩余 {} 字节不足一个块头", input.len()),
            });
        }

        let Some(hdr) = LappedHeader::parse(input) else {
            return Ok(DecodeStatus::Skipped {
                bytes_consumed: Self::skip_to_next_sync(input),
                reason: "块头失步".into(),
            });
        };

        let block_len = hdr.block_len();
        if input.len() < block_len {
            return Ok(DecodeStatus::Skipped {
                bytes_consumed: input.len(),
                reason: format!("块被截断: 需要 {} 字节, 只有 {}", block_len, input.len()),
            });
        }

        let payload = &input[HEADER_LEN..block_len];
        if header::checksum(payload) != hdr.checksum {
            // 本块数据不可用, 上一块的尾部也无法再延续
            self.prev_tail.clear();
            return Ok(DecodeStatus::Skipped {
                bytes_consumed: block_len,
                reason: "载荷校验失败".into(),
            });
        }

        let channels = hdr.channels as usize;
        let nb_samples = hdr.frames as usize * channels;
        if nb_samples > output.len() {
            return Err(LiuError::Codec(format!(
                "输出缓冲区不足: 需要 {} 个采样, 只有 {}",
                nb_samples,
                output.len(),
            )));
        }

        let (body, tail) = payload.split_at(nb_samples * BYTES_PER_VALUE);
        for (i, (dst, src)) in output
            .iter_mut()
            .zip(body.chunks_exact(BYTES_PER_VALUE))
            .enumerate()
        {
            let mut value = f32::from(LittleEndian::read_i16(src)) * VALUE_SCALE;
            if let Some(overlap) = self.prev_tail.get(i) {
                value += *overlap;
            }
            *dst = value;
        }

        self.prev_tail.clear();
        self.prev_tail.extend(
            tail.chunks_exact(BYTES_PER_VALUE)
                .map(|src| f32::from(LittleEndian::read_i16(src)) * VALUE_SCALE),
        );

        Ok(DecodeStatus::Decoded(BlockInfo {
            frames: hdr.frames as usize,
            bytes_consumed: block_len,
            channels: u32::from(hdr.channels),
            sample_rate: hdr.sample_rate,
        }))
    }

    fn reset(&mut self, block_id: BlockId) {
        debug!("lapped 解码器重置到块 {}", block_id);
        self.prev_tail.clear();
    }

    fn close(&mut self) {
        self.prev_tail = Vec::new();
        self.opened = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造一个重叠块: 主体与尾部均为 S16 原始值
    fn make_block(channels: u8, sample_rate: u32, body: &[i16], tail: &[i16]) -> Vec<u8> {
        let frames = (body.len() / channels as usize) as u16;
        let overlap = (tail.len() / channels as usize) as u8;
        let mut payload = Vec::new();
        for v in body.iter().chain(tail) {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let hdr = LappedHeader::for_payload(channels, overlap, frames, sample_rate, &payload);
        let mut block = hdr.to_bytes().to_vec();
        block.extend_from_slice(&payload);
        block
    }

    fn open_decoder(channels: u32) -> LappedDecoder {
        let mut dec = LappedDecoder::new();
        dec.open(&DecoderConfig::audio(channels, 8000).with_block_frames(8))
            .unwrap();
        dec
    }

    fn expect_decoded(status: DecodeStatus) -> BlockInfo {
        match status {
            DecodeStatus::Decoded(info) => info,
            other => panic!("期望解码成功, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_尾部叠加到下一块() {
        let mut dec = open_decoder(1);
        let mut out = vec![0.0; 8];

        let first = make_block(1, 8000, &[16384, 0, 0, 0], &[8192, 8192]);
        let info = expect_decoded(dec.decode(&first, &mut out).unwrap());
        assert_eq!(info.frames, 4);
        assert_eq!(info.bytes_consumed, first.len());
        assert_eq!(&out[..4], &[0.5, 0.0, 0.0, 0.0]);

        let second = make_block(1, 8000, &[0, 0, 0, 0], &[0, 0]);
        expect_decoded(dec.decode(&second, &mut out).unwrap());
        assert_eq!(&out[..4], &[0.25, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_重置清除块间状态() {
        let mut dec = open_decoder(1);
        let mut out = vec![0.0; 8];
        let first = make_block(1, 8000, &[0, 0], &[16384]);
        expect_decoded(dec.decode(&first, &mut out).unwrap());

        dec.reset(7);
        let second = make_block(1, 8000, &[0, 0], &[0]);
        expect_decoded(dec.decode(&second, &mut out).unwrap());
        assert_eq!(&out[..2], &[0.0, 0.0]);
    }

    #[test]
    fn test_校验失败跳过整块() {
        let mut dec = open_decoder(2);
        let mut out = vec![0.0; 16];
        let mut block = make_block(2, 8000, &[1, 2, 3, 4], &[5, 6]);
        let last = block.len() - 1;
        block[last] ^= 0xFF;
        match dec.decode(&block, &mut out).unwrap() {
            DecodeStatus::Skipped { bytes_consumed, .. } => assert_eq!(bytes_consumed, block.len()),
            other => panic!("期望跳过, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_失步时跳到下一个同步字() {
        let mut dec = open_decoder(1);
        let mut out = vec![0.0; 8];
        let mut data = vec![0xAA, 0xBB, 0xCC];
        data.extend(make_block(1, 8000, &[100, 200], &[]));
        match dec.decode(&data, &mut out).unwrap() {
            DecodeStatus::Skipped { bytes_consumed, .. } => assert_eq!(bytes_consumed, 3),
            other => panic!("期望跳过, 实际 {:?}", other),
        }
        let info = expect_decoded(dec.decode(&data[3..], &mut out).unwrap());
        assert_eq!(info.frames, 2);
    }

    #[test]
    fn test_报告码流中的实际声道数() {
        let mut dec = open_decoder(2);
        let mut out = vec![0.0; 16];
        let block = make_block(1, 22050, &[1, 2, 3], &[]);
        let info = expect_decoded(dec.decode(&block, &mut out).unwrap());
        assert_eq!(info.channels, 1);
        assert_eq!(info.sample_rate, 22050);
    }

    #[test]
    fn test_截断的块() {
        let mut dec = open_decoder(1);
        let mut out = vec![0.0; 8];
        let block = make_block(1, 8000, &[1, 2, 3, 4], &[]);
        match dec.decode(&block[..block.len() - 2], &mut out).unwrap() {
            DecodeStatus::Skipped { bytes_consumed, .. } => {
                assert_eq!(bytes_consumed, block.len() - 2)
            }
            other => panic!("期望跳过, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_打开需要声道数和采样率() {
        let mut dec = LappedDecoder::new();
        assert!(dec.open(&DecoderConfig::default()).is_err());
        let info = dec.open(&DecoderConfig::audio(2, 44100)).unwrap();
        assert_eq!(info.prefetch_blocks, 1);
        assert_eq!(info.max_block_frames, 4096);
    }
}
