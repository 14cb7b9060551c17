//! PCM 块解码器.
//!
//! 把一块未压缩的交错 PCM 字节转换为 F32 采样.
//! 支持 6 种 PCM 变体, 共用解码逻辑. 无块间状态, 定位无需预解码.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;
use liu_core::{BlockId, LiuError, LiuResult, Sample};

use crate::codec_id::CodecId;
use crate::config::{DecoderConfig, DecoderInfo};
use crate::decoder::{BlockDecoder, BlockInfo, DecodeStatus};

/// 未指定块长时的默认每块帧数
const DEFAULT_BLOCK_FRAMES: u32 = 4096;

/// PCM 格式描述, 描述各 PCM 变体的差异
struct PcmFormatDesc {
    /// 编解码器 ID
    codec_id: CodecId,
    /// 码流中每个样本的字节数
    bytes_per_sample: usize,
    /// 单个样本转换函数
    decode_fn: fn(&[u8]) -> Sample,
}

fn decode_u8(src: &[u8]) -> Sample {
    (f32::from(src[0]) - 128.0) / 128.0
}

fn decode_s16le(src: &[u8]) -> Sample {
    f32::from(LittleEndian::read_i16(src)) / 32768.0
}

fn decode_s16be(src: &[u8]) -> Sample {
    f32::from(BigEndian::read_i16(src)) / 32768.0
}

/// S24LE: 3 字节, 符号扩展后归一化
fn decode_s24le(src: &[u8]) -> Sample {
    LittleEndian::read_i24(src) as f32 / 8_388_608.0
}

fn decode_s32le(src: &[u8]) -> Sample {
    (f64::from(LittleEndian::read_i32(src)) / 2_147_483_648.0) as f32
}

fn decode_f32le(src: &[u8]) -> Sample {
    LittleEndian::read_f32(src)
}

/// 获取指定 CodecId 的 PCM 格式描述
fn get_pcm_format_desc(codec_id: CodecId) -> Option<PcmFormatDesc> {
    Some(match codec_id {
        CodecId::PcmU8 => PcmFormatDesc {
            codec_id,
            bytes_per_sample: 1,
            decode_fn: decode_u8,
        },
        CodecId::PcmS16le => PcmFormatDesc {
            codec_id,
            bytes_per_sample: 2,
            decode_fn: decode_s16le,
        },
        CodecId::PcmS16be => PcmFormatDesc {
            codec_id,
            bytes_per_sample: 2,
            decode_fn: decode_s16be,
        },
        CodecId::PcmS24le => PcmFormatDesc {
            codec_id,
            bytes_per_sample: 3,
            decode_fn: decode_s24le,
        },
        CodecId::PcmS32le => PcmFormatDesc {
            codec_id,
            bytes_per_sample: 4,
            decode_fn: decode_s32le,
        },
        CodecId::PcmF32le => PcmFormatDesc {
            codec_id,
            bytes_per_sample: 4,
            decode_fn: decode_f32le,
        },
        _ => return None,
    })
}

/// PCM 块解码器
pub struct PcmDecoder {
    /// 格式描述
    desc: PcmFormatDesc,
    /// 采样率
    sample_rate: u32,
    /// 声道数
    channels: u32,
    /// 每个样本块的字节数 (每样本字节数 * 声道数)
    block_align: usize,
    /// 是否已打开
    opened: bool,
}

impl PcmDecoder {
    /// 创建指定 PCM 变体的解码器工厂函数
    pub fn create(codec_id: CodecId) -> LiuResult<Box<dyn BlockDecoder>> {
        let desc = get_pcm_format_desc(codec_id)
            .ok_or_else(|| LiuError::CodecNotFound(format!("不支持的 PCM 格式: {}", codec_id)))?;
        Ok(Box::new(Self {
            desc,
            sample_rate: 0,
            channels: 0,
            block_align: 0,
            opened: false,
        }))
    }

    pub fn new_u8() -> LiuResult<Box<dyn BlockDecoder>> {
        Self::create(CodecId::PcmU8)
    }

    pub fn new_s16le() -> LiuResult<Box<dyn BlockDecoder>> {
        Self::create(CodecId::PcmS16le)
    }

    pub fn new_s16be() -> LiuResult<Box<dyn BlockDecoder>> {
        Self::create(CodecId::PcmS16be)
    }

    pub fn new_s24le() -> LiuResult<Box<dyn BlockDecoder>> {
        Self::create(CodecId::PcmS24le)
    }

    pub fn new_s32le() -> LiuResult<Box<dyn BlockDecoder>> {
        Self::create(CodecId::PcmS32le)
    }

    pub fn new_f32le() -> LiuResult<Box<dyn BlockDecoder>> {
        Self::create(CodecId::PcmF32le)
    }

    /// 每个样本的字节数
    pub fn bytes_per_sample(codec_id: CodecId) -> Option<usize> {
        get_pcm_format_desc(codec_id).map(|desc| desc.bytes_per_sample)
    }
}

impl BlockDecoder for PcmDecoder {
    fn name(&self) -> &str {
        self.desc.codec_id.name()
    }

    fn open(&mut self, config: &DecoderConfig) -> LiuResult<DecoderInfo> {
        let sample_rate = config.sample_rate.unwrap_or(0);
        let channels = config.channels.unwrap_or(0);
        if sample_rate == 0 {
            return Err(LiuError::InvalidArgument("采样率不能为 0".into()));
        }
        if channels == 0 {
            return Err(LiuError::InvalidArgument("声道数不能为 0".into()));
        }
        let block_frames = config.block_frames.unwrap_or(DEFAULT_BLOCK_FRAMES);
        if block_frames == 0 {
            return Err(LiuError::InvalidArgument("每块帧数不能为 0".into()));
        }

        self.sample_rate = sample_rate;
        self.channels = channels;
        self.block_align = self.desc.bytes_per_sample * channels as usize;
        self.opened = true;

        debug!(
            "打开 {} 解码器: {} Hz, {} 声道, 每块 {} 帧",
            self.name(),
            sample_rate,
            channels,
            block_frames,
        );
        Ok(DecoderInfo {
            channels,
            sample_rate,
            max_block_frames: block_frames,
            max_block_bytes: block_frames as usize * self.block_align,
            prefetch_blocks: 0,
        })
    }

    fn decode(&mut self, input: &[u8], output: &mut [Sample]) -> LiuResult<DecodeStatus> {
        if !self.opened {
            return Err(LiuError::Codec("解码器未打开, 请先调用 open()".into()));
        }
        if input.len() % self.block_align != 0 {
            return Err(LiuError::InvalidData(format!(
                "数据大小 {} 不是 block_align {} 的整数倍",
                input.len(),
                self.block_align,
            )));
        }

        let frames = input.len() / self.block_align;
        let nb_samples = frames * self.channels as usize;
        if nb_samples > output.len() {
            return Err(LiuError::Codec(format!(
                "输出缓冲区不足: 需要 {} 个采样, 只有 {}",
                nb_samples,
                output.len(),
            )));
        }

        let decode_fn = self.desc.decode_fn;
        for (dst, src) in output
            .iter_mut()
            .zip(input.chunks_exact(self.desc.bytes_per_sample))
        {
            *dst = decode_fn(src);
        }

        Ok(DecodeStatus::Decoded(BlockInfo {
            frames,
            bytes_consumed: input.len(),
            channels: self.channels,
            sample_rate: self.sample_rate,
        }))
    }

    fn reset(&mut self, _block_id: BlockId) {}

    fn close(&mut self) {
        self.opened = false;
    }
}
