//! # liu-codec
//!
//! Liu 框架块解码器库, 定义块解码器接口与内置参考解码器.
//!
//! 解码器把容器提供的一个压缩块转换为交错 F32 PCM, 并在随机定位时
//! 通过 `reset()` 重新同步块间状态.
//!
//! ## 内置解码器
//!
//! - **PCM**: U8/S16LE/S16BE/S24LE/S32LE/F32LE, 无块间状态
//! - **Lapped**: 重叠块编码, 块尾叠加到下一块, 定位需预解码 1 块
//!
//! ## 使用示例
//!
//! ```rust
//! use liu_codec::{CodecId, CodecRegistry, DecoderConfig};
//!
//! let mut reg = CodecRegistry::new();
//! liu_codec::register_all(&mut reg);
//!
//! let mut decoder = reg.create_decoder(CodecId::PcmS16le).unwrap();
//! let info = decoder.open(&DecoderConfig::audio(2, 44100)).unwrap();
//! assert_eq!(info.channels, 2);
//! ```

pub mod codec_id;
pub mod config;
pub mod decoder;
pub mod decoders;
pub mod header;
pub mod registry;

// 重导出常用类型
pub use codec_id::CodecId;
pub use config::{DecoderConfig, DecoderInfo, prefetch_blocks_for_delay};
pub use decoder::{BlockDecoder, BlockInfo, DecodeStatus, SeekTolerance};
pub use header::LappedHeader;
pub use registry::CodecRegistry;

/// 注册所有内置解码器
pub fn register_all(registry: &mut CodecRegistry) {
    decoders::register_all_decoders(registry);
}
