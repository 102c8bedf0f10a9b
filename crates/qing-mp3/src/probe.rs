//! 码流类型探测.

use std::fmt;

use qing_core::{QingError, QingResult};

use crate::header::{ChannelMode, Frame, Layer, MpegVersion};
use crate::scan::frame_start_offset;
use crate::xing::{VbrTag, XingHeader};

/// 声道大类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelClass {
    /// 单声道
    Mono,
    /// 立体声 (含联合立体声与双声道)
    Stereo,
}

impl From<ChannelMode> for ChannelClass {
    fn from(mode: ChannelMode) -> Self {
        if mode == ChannelMode::Mono {
            Self::Mono
        } else {
            Self::Stereo
        }
    }
}

impl fmt::Display for ChannelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mono => f.write_str("mono"),
            Self::Stereo => f.write_str("stereo"),
        }
    }
}

/// 首帧摘要信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mp3Info {
    /// 首帧偏移
    pub offset: usize,
    /// MPEG 版本
    pub version: MpegVersion,
    /// 音频层
    pub layer: Layer,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道大类
    pub channel: ChannelClass,
    /// 首帧比特率 (bps)
    pub bitrate: Option<u32>,
    /// 首帧携带的 VBR 索引标识
    pub vbr_tag: Option<VbrTag>,
    /// 首帧为 Xing/Info 帧时的解析结果
    pub xing: Option<XingHeader>,
}

/// 定位首帧并校验采样率
fn first_frame(data: &[u8]) -> QingResult<(usize, Frame, u32)> {
    let offset = frame_start_offset(data, 0).ok_or(QingError::NoValidFrames)?;
    let frame = Frame::new(data, offset)?;
    let sample_rate = frame.sample_rate().ok_or_else(|| {
        QingError::InvalidData(format!(
            "偏移 {offset} 处帧头采样率无效 (version_index={}, freq_index={})",
            frame.version_index, frame.freq_index,
        ))
    })?;
    Ok((offset, frame, sample_rate))
}

/// 返回首帧的采样率与声道大类
pub fn mp3_type(data: &[u8]) -> QingResult<(u32, ChannelClass)> {
    let (_, frame, sample_rate) = first_frame(data)?;
    Ok((sample_rate, frame.channel_mode().into()))
}

/// 返回首帧的完整摘要, 首帧为 Xing/Info 帧时一并解析其内容
pub fn probe_info(data: &[u8]) -> QingResult<Mp3Info> {
    let (offset, frame, sample_rate) = first_frame(data)?;
    Ok(Mp3Info {
        offset,
        version: frame.version(),
        layer: frame.layer(),
        sample_rate,
        channel: frame.channel_mode().into(),
        bitrate: frame.bitrate(),
        vbr_tag: VbrTag::detect(data, offset, &frame),
        xing: XingHeader::parse(data, offset)?,
    })
}
