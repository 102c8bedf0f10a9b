//! MPEG 音频帧头模型.
//!
//! 帧头结构 (32 位):
//! ```text
//! AAAA AAAA  AAAB BCCD  EEEE FFGH  IIJJ KLMM
//! A = 同步位 (11 bit, 全1)   B = MPEG 版本    C = 层
//! D = CRC 保护              E = 比特率索引    F = 采样率索引
//! G = 填充位                H = 私有位        I = 声道模式
//! J/K/L/M = 模式扩展/版权/原始/强调 (本模块不解析)
//! ```
//!
//! [`Frame`] 只保存原始位域, 版本、层、比特率、采样率、帧长等语义值都按需从位域推导.
//! 查表失败 (保留值、free format) 以 `None` 表示, 不会给出误导性的默认值.

use std::fmt;

use qing_core::{QingError, QingResult, unpack_bits};

/// 帧头字节数
pub const HEADER_LEN: usize = 4;

/// 11 位帧同步码
pub const FRAME_SYNC: u32 = 0x7FF;

/// 帧头各位域宽度: sync, version, layer, crc, bitrate, freq, padding, private, channel_mode
const HEADER_FIELD_WIDTHS: [u32; 9] = [11, 2, 2, 1, 4, 2, 1, 1, 2];

/// 由 14 个有效比特率 (kbps) 生成一行查表, 索引 0 (free) 与 15 (bad) 为 `None`
const fn bitrate_row(kbps: [u32; 14]) -> [Option<u32>; 16] {
    let mut row = [None; 16];
    let mut i = 0;
    while i < 14 {
        row[i + 1] = Some(kbps[i]);
        i += 1;
    }
    row
}

/// 保留层 (layer_index = 0) 对应的空行
const RESERVED_ROW: [Option<u32>; 16] = [None; 16];

/// 比特率表 (kbps), 按 `[版本类][layer_index][bitrate_index]` 索引.
///
/// 版本类 0 为 MPEG-1, 1 为 MPEG-2/2.5. `layer_index` 为帧头中的原始值
/// (1 = Layer III, 2 = Layer II, 3 = Layer I).
static BITRATE_KBPS: [[[Option<u32>; 16]; 4]; 2] = [
    [
        RESERVED_ROW,
        bitrate_row([32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320]),
        bitrate_row([32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384]),
        bitrate_row([32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448]),
    ],
    [
        RESERVED_ROW,
        bitrate_row([8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160]),
        bitrate_row([8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160]),
        bitrate_row([32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256]),
    ],
];

/// 基础采样率表 (MPEG-1), 按 `freq_index` 索引
static SAMPLE_RATES: [Option<u32>; 4] = [Some(44100), Some(48000), Some(32100), None];

/// Xing 头之前的 side info 字节数, 按 `[版本类][单声道 ? 0 : 1]` 索引
static SIDE_INFO_LEN: [[usize; 2]; 2] = [[17, 32], [9, 17]];

/// MPEG 音频版本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    /// MPEG-1
    Mpeg1,
    /// MPEG-2
    Mpeg2,
    /// MPEG-2.5
    Mpeg25,
    /// 保留值
    Reserved,
}

impl MpegVersion {
    fn from_index(index: u8) -> Self {
        match index & 0x03 {
            0 => Self::Mpeg25,
            1 => Self::Reserved,
            2 => Self::Mpeg2,
            _ => Self::Mpeg1,
        }
    }

    /// 采样率除数, 保留版本没有除数
    fn sample_rate_divisor(self) -> Option<u32> {
        match self {
            Self::Mpeg1 => Some(1),
            Self::Mpeg2 => Some(2),
            Self::Mpeg25 => Some(4),
            Self::Reserved => None,
        }
    }

    /// 查表用的版本类: MPEG-1 为 0, 其余为 1
    fn class(self) -> usize {
        if self == Self::Mpeg1 { 0 } else { 1 }
    }
}

impl fmt::Display for MpegVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mpeg1 => "MPEG-1",
            Self::Mpeg2 => "MPEG-2",
            Self::Mpeg25 => "MPEG-2.5",
            Self::Reserved => "reserved",
        };
        f.write_str(name)
    }
}

/// MPEG 音频层
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Layer I
    I,
    /// Layer II
    II,
    /// Layer III
    III,
    /// 保留值
    Reserved,
}

impl Layer {
    fn from_index(index: u8) -> Self {
        match index & 0x03 {
            0 => Self::Reserved,
            1 => Self::III,
            2 => Self::II,
            _ => Self::I,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I => "Layer I",
            Self::II => "Layer II",
            Self::III => "Layer III",
            Self::Reserved => "reserved",
        };
        f.write_str(name)
    }
}

/// 声道模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// 立体声
    Stereo,
    /// 联合立体声
    JointStereo,
    /// 双声道
    DualChannel,
    /// 单声道
    Mono,
}

impl ChannelMode {
    fn from_index(index: u8) -> Self {
        match index & 0x03 {
            0 => Self::Stereo,
            1 => Self::JointStereo,
            2 => Self::DualChannel,
            _ => Self::Mono,
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stereo => "stereo",
            Self::JointStereo => "joint stereo",
            Self::DualChannel => "dual channel",
            Self::Mono => "mono",
        };
        f.write_str(name)
    }
}

/// 一个 MPEG 音频帧的帧头位域
///
/// 只能在同步码成立的位置构造, 语义值均为派生量.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// 版本索引 (2 bit)
    pub version_index: u8,
    /// 层索引 (2 bit)
    pub layer_index: u8,
    /// 保护位 (1 bit, 原始值; 1 表示无 CRC)
    pub crc_protected: u8,
    /// 比特率索引 (4 bit)
    pub bitrate_index: u8,
    /// 采样率索引 (2 bit)
    pub freq_index: u8,
    /// 填充位 (1 bit)
    pub padding: u8,
    /// 私有位 (1 bit)
    pub private_bit: u8,
    /// 声道模式索引 (2 bit)
    pub channel_mode_index: u8,
}

impl Frame {
    /// 从 `data[offset..offset + 4]` 解析帧头
    ///
    /// 剩余字节不足 4 个时返回 [`QingError::Eof`]; 同步码不成立说明调用方传入了
    /// 未经扫描的偏移, 返回 [`QingError::Internal`].
    pub fn new(data: &[u8], offset: usize) -> QingResult<Self> {
        let header = data
            .get(offset..)
            .and_then(|rest| rest.get(..HEADER_LEN))
            .ok_or(QingError::Eof)?;
        let fields = unpack_bits(header, &HEADER_FIELD_WIDTHS)?;

        if fields[0] != FRAME_SYNC {
            return Err(QingError::Internal(format!(
                "偏移 {offset} 处不是帧边界 (sync=0x{:03X})",
                fields[0],
            )));
        }

        Ok(Self {
            version_index: fields[1] as u8,
            layer_index: fields[2] as u8,
            crc_protected: fields[3] as u8,
            bitrate_index: fields[4] as u8,
            freq_index: fields[5] as u8,
            padding: fields[6] as u8,
            private_bit: fields[7] as u8,
            channel_mode_index: fields[8] as u8,
        })
    }

    /// MPEG 版本
    pub fn version(&self) -> MpegVersion {
        MpegVersion::from_index(self.version_index)
    }

    /// 音频层
    pub fn layer(&self) -> Layer {
        Layer::from_index(self.layer_index)
    }

    /// 声道模式
    pub fn channel_mode(&self) -> ChannelMode {
        ChannelMode::from_index(self.channel_mode_index)
    }

    /// 采样率 (Hz), 采样率索引或版本为保留值时返回 `None`
    pub fn sample_rate(&self) -> Option<u32> {
        let base = SAMPLE_RATES[usize::from(self.freq_index & 0x03)]?;
        Some(base / self.version().sample_rate_divisor()?)
    }

    /// 比特率 (bps), free format / bad / 保留层返回 `None`
    pub fn bitrate(&self) -> Option<u32> {
        let class = self.version().class();
        let kbps = BITRATE_KBPS[class][usize::from(self.layer_index & 0x03)]
            [usize::from(self.bitrate_index & 0x0F)]?;
        Some(kbps * 1000)
    }

    /// 帧总字节数 (含帧头), 比特率或采样率无法确定时返回 `None`
    pub fn frame_length(&self) -> Option<usize> {
        let bitrate = self.bitrate()? as usize;
        let sample_rate = self.sample_rate()? as usize;
        let padding = usize::from(self.padding);

        let length = if self.layer() == Layer::I {
            (12 * bitrate / sample_rate + padding) * 4
        } else {
            let factor = if self.layer() == Layer::II || self.version() == MpegVersion::Mpeg1 {
                144
            } else {
                72
            };
            factor * bitrate / sample_rate + padding
        };
        Some(length)
    }

    /// 帧内 Xing/Info 标识的字节偏移 (帧头 4 字节 + side info)
    pub fn xing_offset(&self) -> usize {
        let mono = usize::from(self.channel_mode() != ChannelMode::Mono);
        HEADER_LEN + SIDE_INFO_LEN[self.version().class()][mono]
    }

    /// 帧长未知时用于重新同步的最小步长
    pub fn min_step(&self) -> usize {
        HEADER_LEN + 2 * usize::from(self.crc_protected)
    }
}
