//! # liu-source
//!
//! 流 (liu) 音频源库: 把块容器与块解码器组合为帧精确的音频源.
//!
//! ## 定位策略
//!
//! - **固定块长** (`FixedBlocks`): 块位置按算术换算, 适用于每块帧数恒定的编码
//! - **定位表** (`SeekTable`): 打开时扫描所有块头, 二分查找目标块
//!
//! 两种策略在重启解码器时都会回退若干块预解码, 以恢复块间的解码状态
//! (重叠窗口、预测器等), 再丢弃读取到目标帧.
//!
//! ## 使用示例
//!
//! ```rust
//! use liu_codec::decoders::pcm::PcmDecoder;
//! use liu_codec::DecoderConfig;
//! use liu_format::MemoryContainer;
//! use liu_source::{AudioSource, BlockAudioSource, SourceOptions};
//!
//! // 单声道 S16LE, 每块 4 帧
//! let data: Vec<u8> = (0..16i16).flat_map(|v| (v * 1024).to_le_bytes()).collect();
//! let container = MemoryContainer::from_chunks(data, 8).unwrap();
//! let decoder = PcmDecoder::new_s16le().unwrap();
//! let config = DecoderConfig::audio(1, 8000).with_block_frames(4);
//!
//! let mut source =
//!     BlockAudioSource::open(Box::new(container), decoder, config, SourceOptions::fixed())
//!         .unwrap();
//! assert_eq!(source.properties().frame_count, 16);
//!
//! assert_eq!(source.seek_frame(9), 9);
//! let mut buf = [0.0f32; 2];
//! assert_eq!(source.read_frames(2, Some(&mut buf)), 2);
//! assert_eq!(buf, [9.0 * 1024.0 / 32768.0, 10.0 * 1024.0 / 32768.0]);
//! ```

pub mod addressing;
pub mod audio_source;
pub mod block_source;
pub mod options;
pub mod properties;

// 重导出常用类型
pub use addressing::{BlockAddressing, FixedBlocks, SeekEntry, SeekPlan, SeekTable};
pub use audio_source::AudioSource;
pub use block_source::BlockAudioSource;
pub use options::{AddressingMode, SourceOptions};
pub use properties::SourceProperties;
