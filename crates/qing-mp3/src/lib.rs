//! # qing-mp3
//!
//! MPEG 音频 (MP3) 裸流的帧解析与重写.
//!
//! MP3 文件结构:
//! ```text
//! [ID3v2 标签 (可选)]
//! [Xing/Info/VBRI 索引帧 (可选)]
//! [MPEG 音频帧 #0]
//!   ├── 帧同步码 (11 bits = 0x7FF)
//!   ├── 帧头 (版本, 层, 比特率, 采样率, 声道模式等)
//!   └── 帧数据 (压缩音频)
//! [MPEG 音频帧 #1]
//! ...
//! [增强 ID3v1 标签 (可选, "TAG+", 227 字节)]
//! [ID3v1 标签 (可选, 文件末尾 128 字节)]
//! ```
//!
//! 所有操作都是 "字节缓冲区进, 字节缓冲区出" 的纯函数, 不做任何 I/O.
//!
//! ```rust,no_run
//! # fn run(raw: Vec<u8>) -> qing_core::QingResult<()> {
//! let cleaned = qing_mp3::remove_tags_and_xing(raw)?;
//! let (sample_rate, channel) = qing_mp3::mp3_type(&cleaned)?;
//! let with_index = qing_mp3::add_xing_header(cleaned)?;
//! println!("{sample_rate}Hz {channel}, {} 字节", with_index.len());
//! # Ok(())
//! # }
//! ```

pub mod header;
pub mod pipeline;
pub mod probe;
pub mod scan;
pub mod tags;
pub mod xing;

// 重导出常用类型
pub use header::{ChannelMode, Frame, Layer, MpegVersion};
pub use pipeline::{CleanOptions, clean};
pub use probe::{ChannelClass, Mp3Info, mp3_type, probe_info};
pub use scan::{
    FrameScan, end_of_last_valid_frame, frame_offsets, frame_start_offset,
    frame_start_offset_backward, next_frame_offset,
};
pub use tags::remove_tags_and_xing;
pub use xing::{VbrTag, XingFlags, XingHeader, add_xing_header};
