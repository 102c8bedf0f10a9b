//! 统一错误类型定义.
//!
//! 所有 Qing crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// Qing 统一错误类型
#[derive(Debug, Error)]
pub enum QingError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 已到达数据末尾
    #[error("已到达数据末尾")]
    Eof,

    /// 整个缓冲区中找不到任何可解码的音频帧
    #[error("未找到有效的 MPEG 音频帧")]
    NoValidFrames,

    /// 没有任何比特率能让合成帧容纳 Xing 头与 ToC
    #[error("Xing 帧空间不足: 至少需要 {required} 字节")]
    XingFrameTooSmall {
        /// 所需的最小帧长 (字节)
        required: usize,
    },

    /// 内部错误 (不应发生)
    #[error("内部错误: {0}")]
    Internal(String),
}

/// Qing 统一 Result 类型
pub type QingResult<T> = Result<T, QingError>;
