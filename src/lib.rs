//! # Qing (清)
//!
//! 纯 Rust 实现的 MP3 码流清理工具.
//!
//! Qing 只处理内存中的字节缓冲区:
//! - **剥离**: 去除 ID3v2/ID3v1/增强 ID3v1 标签、已有的 Xing/Info/VBRI 索引帧以及首尾垃圾字节
//! - **重建索引**: 在首帧之前合成新的 Xing 头 (总帧数、总字节数、100 项 ToC)
//! - **探测**: 读取首帧的采样率与声道信息
//!
//! # 快速开始
//!
//! ```rust,no_run
//! # fn run(raw: Vec<u8>) -> qing::core::QingResult<()> {
//! let output = qing::clean(raw)?;
//! let (sample_rate, channel) = qing::mp3::mp3_type(&output)?;
//! println!("{sample_rate}Hz {channel}");
//! # Ok(())
//! # }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `qing-core` | 错误类型与按位读写 |
//! | `qing-mp3` | 帧解析、扫描、标签剥离与 Xing 合成 |

/// 核心类型与工具
pub use qing_core as core;

/// MPEG 音频帧解析与重写
pub use qing_mp3 as mp3;

/// 获取 Qing 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 完整清理流程: 剥离标签与旧索引帧, 再合成新的 Xing 头
pub fn clean(data: Vec<u8>) -> qing_core::QingResult<Vec<u8>> {
    qing_mp3::clean(data, &qing_mp3::CleanOptions::default())
}
