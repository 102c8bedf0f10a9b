//! # qing-core
//!
//! Qing MP3 清理工具核心库, 提供统一错误类型与按位读写工具.
//!
//! 上层的帧解析、标签剥离与 Xing 头合成均构建在本 crate 之上.

pub mod bitreader;
pub mod bitwriter;
pub mod error;

// 重导出常用类型
pub use bitreader::{BitReader, unpack_bits};
pub use bitwriter::BitWriter;
pub use error::{QingError, QingResult};
