//! # liu-format
//!
//! 流 (liu) 块容器库, 按块 ID 提供压缩数据.
//!
//! 提供 `Container` trait 以及两种内置容器:
//! - `MemoryContainer`: 内存中已切分好的块 (无块头, 每块帧数固定)
//! - `FramedContainer`: 带块头的分帧字节流, 支持块头扫描

pub mod container;
pub mod containers;

// 重导出常用类型
pub use container::{BlockHeader, Container};
pub use containers::framed::{FramedContainer, ScanStats};
pub use containers::memory::MemoryContainer;
