//! 统一错误类型定义.
//!
//! 所有 Liu crate 共用的错误类型, 支持跨模块传播.
//!
//! 读取与定位路径不通过错误返回稳态解码问题 (只返回实际帧数/位置),
//! 错误类型主要服务于打开阶段与协作组件 (解码器/容器) 的接口.

use thiserror::Error;

/// Liu 框架统一错误类型
#[derive(Debug, Error)]
pub enum LiuError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 编解码器错误
    #[error("编解码器错误: {0}")]
    Codec(String),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 打开失败: 不支持或损坏的码流, 没有可解码的块
    #[error("打开失败: {0}")]
    OpenFailed(String),

    /// 码流损坏: 解码结果与流声明的属性不一致
    #[error("码流损坏: {0}")]
    CorruptStream(String),

    /// 未找到指定的编解码器
    #[error("未找到编解码器: {0}")]
    CodecNotFound(String),

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,
}

/// Liu 框架统一 Result 类型
pub type LiuResult<T> = Result<T, LiuError>;
