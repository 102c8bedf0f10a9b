//! Xing/Info VBR 索引头的识别、读取与合成.
//!
//! 合成的 Xing 帧布局:
//! ```text
//! [首个音频帧的帧头 + side info (CRC 位强制置为"无 CRC")]
//! ["Xing"]
//! [flags = FRAMES | BYTES | TOC (4 字节大端)]
//! [总帧数 (4 字节大端, 含 Xing 帧自身)]
//! [总字节数 (4 字节大端)]
//! [ToC (100 字节)]
//! [0 填充至所选比特率对应的帧长]
//! ```
//!
//! ToC 第 i 项为第 i 个百分位帧在输出文件中的字节位置, 以文件大小为 256 归一化,
//! 只保留低 8 位.

use std::fmt;

use bitflags::bitflags;
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use bytes::{BufMut, BytesMut};
use log::debug;
use qing_core::{QingError, QingResult};

use crate::header::{Frame, HEADER_LEN};
use crate::scan::{frame_offsets, frame_start_offset};

/// ToC 项数
pub const TOC_LEN: usize = 100;

/// VBRI 标识在帧内的固定偏移 (帧头 4 字节 + 32 字节)
pub const VBRI_OFFSET: usize = HEADER_LEN + 32;

/// 帧头第 2 字节中的比特率索引位
const BITRATE_MASK: u8 = 0xF0;

/// 帧头第 1 字节中的保护位, 置 1 表示无 CRC
const CRC_ABSENT_BIT: u8 = 0x01;

bitflags! {
    /// Xing 头中的可选字段标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct XingFlags: u32 {
        /// 含总帧数
        const FRAMES = 0x1;
        /// 含总字节数
        const BYTES = 0x2;
        /// 含 100 字节 ToC
        const TOC = 0x4;
        /// 含质量指示
        const QUALITY = 0x8;
    }
}

/// 帧内已有的 VBR 索引标识
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VbrTag {
    /// "Xing" (VBR)
    Xing,
    /// "Info" (CBR, 布局与 Xing 相同)
    Info,
    /// "VBRI" (Fraunhofer)
    Vbri,
}

impl VbrTag {
    /// 检查 `offset` 处的帧是否携带 VBR 索引标识
    pub fn detect(data: &[u8], offset: usize, frame: &Frame) -> Option<Self> {
        let xing_pos = offset + frame.xing_offset();
        match data.get(xing_pos..xing_pos + 4) {
            Some(b"Xing") => return Some(Self::Xing),
            Some(b"Info") => return Some(Self::Info),
            _ => {}
        }
        let vbri_pos = offset + VBRI_OFFSET;
        match data.get(vbri_pos..vbri_pos + 4) {
            Some(b"VBRI") => Some(Self::Vbri),
            _ => None,
        }
    }
}

impl fmt::Display for VbrTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Xing => "Xing",
            Self::Info => "Info",
            Self::Vbri => "VBRI",
        };
        f.write_str(name)
    }
}

/// 已解析的 Xing/Info 头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XingHeader {
    /// Xing 或 Info
    pub tag: VbrTag,
    /// 字段标志
    pub flags: XingFlags,
    /// 总帧数
    pub frames: Option<u32>,
    /// 总字节数
    pub bytes: Option<u32>,
    /// 100 项 ToC
    pub toc: Option<[u8; TOC_LEN]>,
    /// 质量指示 (0-100)
    pub quality: Option<u32>,
}

impl XingHeader {
    /// 解析 `offset` 处帧内的 Xing/Info 头
    ///
    /// 帧内没有 Xing/Info 标识时返回 `Ok(None)`; VBRI 头布局不同, 同样返回 `None`.
    pub fn parse(data: &[u8], offset: usize) -> QingResult<Option<Self>> {
        let frame = Frame::new(data, offset)?;
        let tag = match VbrTag::detect(data, offset, &frame) {
            Some(tag @ (VbrTag::Xing | VbrTag::Info)) => tag,
            _ => return Ok(None),
        };

        // 跳过 4 字节标识
        let mut cur = &data[offset + frame.xing_offset() + 4..];
        let flags = XingFlags::from_bits_retain(read_u32_be(&mut cur)?);

        let frames = flags
            .contains(XingFlags::FRAMES)
            .then(|| read_u32_be(&mut cur))
            .transpose()?;
        let bytes = flags
            .contains(XingFlags::BYTES)
            .then(|| read_u32_be(&mut cur))
            .transpose()?;
        let toc = if flags.contains(XingFlags::TOC) {
            let (table, rest) = cur.split_at_checked(TOC_LEN).ok_or(QingError::Eof)?;
            cur = rest;
            let mut toc = [0u8; TOC_LEN];
            toc.copy_from_slice(table);
            Some(toc)
        } else {
            None
        };
        let quality = flags
            .contains(XingFlags::QUALITY)
            .then(|| read_u32_be(&mut cur))
            .transpose()?;

        Ok(Some(Self {
            tag,
            flags,
            frames,
            bytes,
            toc,
            quality,
        }))
    }
}

fn read_u32_be(cur: &mut &[u8]) -> QingResult<u32> {
    cur.read_u32::<BigEndian>().map_err(|_| QingError::Eof)
}

/// 在首个音频帧之前插入新合成的 Xing 帧
///
/// 输入应为已清理的码流 (见 [`remove_tags_and_xing`](crate::tags::remove_tags_and_xing)).
/// 空输入原样返回. 没有任何比特率 (索引 1..=15) 能容纳 Xing 头与 ToC 时返回
/// [`QingError::XingFrameTooSmall`], 不产生截断的输出.
pub fn add_xing_header(data: Vec<u8>) -> QingResult<Vec<u8>> {
    if data.is_empty() {
        return Ok(data);
    }

    let first = frame_start_offset(&data, 0).ok_or(QingError::NoValidFrames)?;
    let side_info_end = first + Frame::new(&data, first)?.xing_offset();
    let side_info = data.get(first..side_info_end).ok_or(QingError::Eof)?;

    let scan = frame_offsets(&data, first)?;
    let frames = scan.offsets.len();
    let total_frames = u32::try_from(frames + 1)
        .map_err(|_| QingError::InvalidData(format!("帧数过多: {frames}")))?;

    let mut frame = BytesMut::with_capacity(side_info.len() + 16 + TOC_LEN);
    frame.put_slice(side_info);
    frame[1] |= CRC_ABSENT_BIT;
    frame.put_slice(b"Xing");
    frame.put_u32((XingFlags::FRAMES | XingFlags::BYTES | XingFlags::TOC).bits());
    frame.put_u32(total_frames);
    let total_bytes_pos = frame.len();
    frame.put_u32(0);
    let toc_pos = frame.len();
    frame.put_bytes(0, TOC_LEN);
    let required = frame.len();

    // 取能装下整个头的最低比特率
    let mut chosen = None;
    for index in 1..=15u8 {
        frame[2] = (frame[2] & !BITRATE_MASK) | (index << 4);
        if let Some(length) = Frame::new(&frame, 0)?.frame_length() {
            if length >= required {
                chosen = Some((index, length));
                break;
            }
        }
    }
    let (bitrate_index, frame_len) = chosen.ok_or(QingError::XingFrameTooSmall { required })?;
    frame.resize(frame_len, 0);

    let total_size = scan.data_end + frame_len;
    let total_size_field = u32::try_from(total_size)
        .map_err(|_| QingError::InvalidData(format!("输出过大: {total_size} 字节")))?;
    BigEndian::write_u32(&mut frame[total_bytes_pos..total_bytes_pos + 4], total_size_field);

    for (i, entry) in frame[toc_pos..toc_pos + TOC_LEN].iter_mut().enumerate() {
        let offset = scan.offsets[frames * i / TOC_LEN] + frame_len;
        *entry = ((offset as u64 * 256) / total_size as u64) as u8;
    }

    debug!(
        "MP3: 合成 Xing 帧, 比特率索引 {bitrate_index}, 帧长 {frame_len}, 总帧数 {total_frames}, 总字节数 {total_size}"
    );

    let mut out = Vec::with_capacity(data.len() + frame_len);
    out.extend_from_slice(&data[..first]);
    out.extend_from_slice(&frame);
    out.extend_from_slice(&data[first..]);
    out.truncate(total_size);
    Ok(out)
}
