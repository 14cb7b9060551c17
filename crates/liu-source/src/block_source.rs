//! 块解码音频源.
//!
//! 把一个 `Container` 和一个 `BlockDecoder` 组合为帧精确的 `AudioSource`:
//!
//! - 定位引擎: 由 `BlockAddressing` 决定是否重启解码器以及重启块,
//!   重启后丢弃读取到目标帧
//! - 读取引擎: 先取出解码暂存区中的剩余帧, 再按块从容器取数据解码;
//!   调用方缓冲区能容纳整块时直接解码到调用方缓冲区
//!
//! 每个实例独占自己的解码器、容器、输入暂存区和解码暂存区.

use log::{debug, warn};
use liu_codec::{BlockDecoder, DecodeStatus, DecoderConfig, SeekTolerance};
use liu_core::{BlockId, ByteBuffer, FrameIndex, LiuError, LiuResult, Sample, SampleBuffer};
use liu_format::Container;

use crate::addressing::{BlockAddressing, FixedBlocks, SeekPlan, SeekTable};
use crate::audio_source::AudioSource;
use crate::options::{AddressingMode, SourceOptions};
use crate::properties::SourceProperties;

/// 块解码音频源
pub struct BlockAudioSource {
    /// 音频源属性
    properties: SourceProperties,
    /// 块寻址
    addressing: BlockAddressing,
    /// 解码器
    decoder: Box<dyn BlockDecoder>,
    /// 容器
    container: Box<dyn Container>,
    /// 定位预解码块数
    prefetch_blocks: u64,
    /// 单块最大帧数
    max_block_frames: usize,
    /// 定位一致性容差
    tolerance: SeekTolerance,
    /// 当前帧位置
    current_frame: FrameIndex,
    /// 下一个要从容器读取的块, None 表示解码状态无效
    current_block: Option<BlockId>,
    /// 压缩数据输入暂存区
    input: ByteBuffer,
    /// 解码输出暂存区
    decoded: SampleBuffer,
    /// 是否已关闭
    closed: bool,
}

impl BlockAudioSource {
    /// 打开音频源
    ///
    /// 定位表寻址时先扫描块头, 并用扫描得到的声道数和采样率覆盖 `config`.
    /// 任何一步失败都会释放解码器和容器.
    pub fn open(
        container: Box<dyn Container>,
        decoder: Box<dyn BlockDecoder>,
        config: DecoderConfig,
        options: SourceOptions,
    ) -> LiuResult<Self> {
        let mut source = Self {
            properties: SourceProperties::default(),
            addressing: BlockAddressing::Fixed(FixedBlocks::new(1, 0)),
            decoder,
            container,
            prefetch_blocks: 0,
            max_block_frames: 0,
            tolerance: SeekTolerance::Exact,
            current_frame: 0,
            current_block: None,
            input: ByteBuffer::with_capacity(0),
            decoded: SampleBuffer::with_capacity(0),
            closed: false,
        };
        source.init(config, options)?;
        Ok(source)
    }

    fn init(&mut self, mut config: DecoderConfig, options: SourceOptions) -> LiuResult<()> {
        let table = match options.addressing {
            AddressingMode::Tabled => {
                let headers = self.container.scan_headers()?;
                let table = SeekTable::from_headers(&headers)?;
                config.channels = Some(table.channels());
                config.sample_rate = Some(table.sample_rate());
                let hint = config.block_frames.unwrap_or(0);
                config.block_frames = Some(hint.max(table.max_block_frames()));
                Some(table)
            }
            AddressingMode::Fixed => None,
        };

        let info = self.decoder.open(&config)?;
        if info.channels == 0 || info.sample_rate == 0 {
            return Err(LiuError::OpenFailed(format!(
                "解码器 {} 报告了无效的流属性: {} 声道, {} Hz",
                self.decoder.name(),
                info.channels,
                info.sample_rate,
            )));
        }

        let (addressing, frame_count, bit_rate_kbps) = match table {
            Some(table) => {
                let frame_count = table.frame_count();
                let bit_rate = table.bit_rate_kbps();
                (BlockAddressing::Tabled(table), frame_count, bit_rate)
            }
            None => {
                let frames_per_block = u64::from(info.max_block_frames);
                if frames_per_block == 0 {
                    return Err(LiuError::OpenFailed("每块帧数为 0".into()));
                }
                let block_count = self.container.block_count();
                if block_count == 0 {
                    return Err(LiuError::OpenFailed("没有可解码的块".into()));
                }
                let fixed = FixedBlocks::new(frames_per_block, block_count);
                let frame_count = options
                    .frame_count
                    .map_or(fixed.frame_count(), |n| n.min(fixed.frame_count()));
                let bit_rate = self.container.total_bytes().and_then(|bytes| {
                    liu_core::bit_rate_kbps(bytes, info.sample_rate, frame_count)
                });
                (BlockAddressing::Fixed(fixed), frame_count, bit_rate)
            }
        };

        let max_block_frames = match &addressing {
            BlockAddressing::Tabled(table) => info.max_block_frames.max(table.max_block_frames()),
            BlockAddressing::Fixed(_) => info.max_block_frames,
        };
        let max_block_frames = max_block_frames as usize;
        let channels = info.channels as usize;

        self.properties = SourceProperties::new(info.channels, info.sample_rate, frame_count)
            .with_bit_rate(bit_rate_kbps);
        self.addressing = addressing;
        self.prefetch_blocks = options.prefetch_blocks.unwrap_or(info.prefetch_blocks);
        self.tolerance = options
            .tolerance
            .unwrap_or_else(|| self.decoder.seek_tolerance());
        self.max_block_frames = max_block_frames;
        self.input = ByteBuffer::with_capacity(
            self.container.max_block_size().max(info.max_block_bytes),
        );
        self.decoded = SampleBuffer::with_capacity(max_block_frames * channels);

        debug!(
            "打开音频源: {} + {} ({} 寻址), {} 声道, {} Hz, {} 帧, 预解码 {} 块",
            self.container.name(),
            self.decoder.name(),
            self.addressing.name(),
            info.channels,
            info.sample_rate,
            frame_count,
            self.prefetch_blocks,
        );

        // 使位置失效, 强制从头重启解码
        self.current_frame = frame_count;
        self.current_block = None;
        let position = self.seek_frame(0);
        if position != 0 {
            return Err(LiuError::OpenFailed(format!(
                "无法定位到起始位置, 停在第 {} 帧",
                position
            )));
        }
        Ok(())
    }

    /// 解码器名称
    pub fn codec_name(&self) -> &str {
        self.decoder.name()
    }

    /// 容器名称
    pub fn container_name(&self) -> &str {
        self.container.name()
    }

    /// 块寻址方式
    pub fn addressing(&self) -> &BlockAddressing {
        &self.addressing
    }

    /// 定位预解码块数
    pub fn prefetch_blocks(&self) -> u64 {
        self.prefetch_blocks
    }

    /// 定位一致性容差
    pub fn tolerance(&self) -> SeekTolerance {
        self.tolerance
    }

    /// 单块最大帧数
    pub fn max_block_frames(&self) -> usize {
        self.max_block_frames
    }

    /// 块总数
    pub fn block_count(&self) -> u64 {
        self.addressing.block_count()
    }

    /// 重置解码器到指定块, 清空暂存区
    fn restart_at(&mut self, block_id: BlockId, frame_index: FrameIndex) {
        debug!("重启解码: 块 {}, 第 {} 帧", block_id, frame_index);
        self.decoder.reset(block_id);
        self.input.clear();
        self.decoded.clear();
        self.current_block = Some(block_id);
        self.current_frame = frame_index;
    }

    /// 使解码状态失效, 下一次定位必定重启
    fn invalidate(&mut self) {
        self.input.clear();
        self.decoded.clear();
        self.current_block = None;
    }

    /// 从容器读取下一个块到输入暂存区, 没有更多块时返回 false
    fn fetch_next_block(&mut self) -> bool {
        let Some(block_id) = self.current_block else {
            return false;
        };
        if !self.addressing.is_valid_block(block_id) {
            return false;
        }
        self.input.clear();
        match self.container.read_block(block_id, self.input.writable()) {
            Ok(len) => {
                self.input.commit(len);
                self.current_block = Some(block_id + 1);
                true
            }
            Err(LiuError::Eof) => false,
            Err(err) => {
                warn!("读取块 {} 失败: {}", block_id, err);
                self.invalidate();
                false
            }
        }
    }

    /// 读取引擎, `dest` 为 None 时丢弃解码结果
    fn read_into(&mut self, frame_count: usize, mut dest: Option<&mut [Sample]>) -> usize {
        let channels = self.properties.channels as usize;
        if self.closed || channels == 0 {
            return 0;
        }
        let remaining = usize::try_from(self.remaining_frames()).unwrap_or(usize::MAX);
        let mut frame_count = frame_count.min(remaining);
        if let Some(buf) = dest.as_deref() {
            frame_count = frame_count.min(buf.len() / channels);
        }

        let mut produced = 0;
        while produced < frame_count {
            // 先取出暂存区中已解码的帧
            if !self.decoded.is_empty() {
                let frames = (self.decoded.len() / channels).min(frame_count - produced);
                let samples = self.decoded.consume(frames * channels);
                if let Some(buf) = dest.as_deref_mut() {
                    buf[produced * channels..(produced + frames) * channels]
                        .copy_from_slice(samples);
                }
                produced += frames;
                self.current_frame += frames as FrameIndex;
                continue;
            }

            if self.input.is_empty() {
                if !self.fetch_next_block() {
                    break;
                }
                continue;
            }

            let wanted = frame_count - produced;
            let (direct, output) = match dest.as_deref_mut() {
                Some(buf) if wanted >= self.max_block_frames => {
                    (true, &mut buf[produced * channels..frame_count * channels])
                }
                _ => {
                    self.decoded.clear();
                    (false, self.decoded.writable())
                }
            };

            match self.decoder.decode(self.input.readable(), output) {
                Err(err) => {
                    warn!("解码失败, 已读取 {} 帧: {}", produced, err);
                    self.invalidate();
                    break;
                }
                Ok(DecodeStatus::Skipped {
                    bytes_consumed,
                    reason,
                }) => {
                    debug!("跳过 {} 字节无法解码的数据: {}", bytes_consumed, reason);
                    if bytes_consumed == 0 {
                        self.input.clear();
                    } else {
                        self.input.consume(bytes_consumed);
                    }
                }
                Ok(DecodeStatus::Decoded(info)) => {
                    if info.channels != self.properties.channels
                        || info.sample_rate != self.properties.frame_rate
                    {
                        let err = LiuError::CorruptStream(format!(
                            "块属性 {} 声道 {} Hz 与流属性 {} 声道 {} Hz 不一致",
                            info.channels,
                            info.sample_rate,
                            self.properties.channels,
                            self.properties.frame_rate,
                        ));
                        warn!("已读取 {} 帧后中止: {}", produced, err);
                        self.invalidate();
                        break;
                    }
                    if info.bytes_consumed == 0 && info.frames == 0 {
                        // 没有任何进展, 丢弃整块保证前进
                        self.input.clear();
                        continue;
                    }
                    self.input.consume(info.bytes_consumed);
                    if direct {
                        produced += info.frames;
                        self.current_frame += info.frames as FrameIndex;
                    } else {
                        self.decoded.commit(info.frames * channels);
                    }
                }
            }
        }

        debug_assert!(self.current_frame <= self.properties.frame_count);
        produced
    }
}

impl AudioSource for BlockAudioSource {
    fn properties(&self) -> &SourceProperties {
        &self.properties
    }

    fn current_frame_index(&self) -> FrameIndex {
        self.current_frame
    }

    fn seek_frame(&mut self, frame_index: FrameIndex) -> FrameIndex {
        if self.closed {
            return self.current_frame;
        }
        let target = frame_index.min(self.properties.frame_count);
        if target == self.current_frame && self.current_block.is_some() {
            return self.current_frame;
        }

        if let SeekPlan::Restart {
            block_id,
            frame_index,
        } = self.addressing.plan_seek(
            target,
            self.current_frame,
            self.current_block,
            self.prefetch_blocks,
        ) {
            self.restart_at(block_id, frame_index);
        }

        debug_assert!(self.current_frame <= target);
        let skip = target.saturating_sub(self.current_frame);
        self.read_into(usize::try_from(skip).unwrap_or(usize::MAX), None);
        if self.current_frame != target {
            warn!(
                "定位未到达目标: 目标第 {} 帧, 实际第 {} 帧",
                target, self.current_frame
            );
        }
        self.current_frame
    }

    fn read_frames(&mut self, frame_count: usize, buffer: Option<&mut [Sample]>) -> usize {
        self.read_into(frame_count, buffer)
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.decoder.close();
        self.container.close();
        self.input = ByteBuffer::with_capacity(0);
        self.decoded = SampleBuffer::with_capacity(0);
        self.current_block = None;
        debug!("关闭音频源");
    }
}

impl Drop for BlockAudioSource {
    fn drop(&mut self) {
        self.close();
    }
}
