//! # liu-core
//!
//! Liu 框架核心库, 提供基础类型定义、错误处理和缓冲区工具.
//!
//! 本 crate 为整个 Liu 框架提供底层基础设施, 不依赖任何编解码器或容器实现.

pub mod block;
pub mod buffer;
pub mod error;
pub mod sample;

// 重导出常用类型
pub use block::{BLOCK_ID_MIN, BlockId, FRAME_INDEX_MIN, FrameIndex, bit_rate_kbps};
pub use buffer::{ByteBuffer, CursorBuffer, SampleBuffer};
pub use error::{LiuError, LiuResult};
pub use sample::{SAMPLE_ZERO, Sample};
