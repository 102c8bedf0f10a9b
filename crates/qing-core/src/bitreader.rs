//! 比特流读取器.
//!
//! 提供从字节缓冲区中按位读取数据的能力, MPEG 音频帧头的各个位域都经由它解出.
//!
//! 按大端位序读取 (MSB first), 字段之间不要求字节对齐.

use crate::{QingError, QingResult};

/// 比特流读取器
///
/// 从字节缓冲区中按位读取数据, 使用大端位序 (MSB first).
///
/// # 示例
/// ```
/// use qing_core::bitreader::BitReader;
///
/// let data = [0b10110001, 0b01010101];
/// let mut br = BitReader::new(&data);
/// assert_eq!(br.read_bits(4).unwrap(), 0b1011);
/// assert_eq!(br.read_bits(4).unwrap(), 0b0001);
/// assert_eq!(br.read_bits(8).unwrap(), 0b01010101);
/// ```
pub struct BitReader<'a> {
    /// 源数据
    data: &'a [u8],
    /// 当前字节索引
    byte_pos: usize,
    /// 当前字节中的位位置 (0-7, 0 表示最高位)
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// 创建新的比特流读取器
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// 获取剩余可读位数
    pub fn bits_left(&self) -> usize {
        if self.byte_pos >= self.data.len() {
            return 0;
        }
        (self.data.len() - self.byte_pos) * 8 - self.bit_pos as usize
    }

    /// 读取 N 个位 (最多 32 位)
    ///
    /// 按大端位序读取, 返回值的低 N 位有效. 字段可以跨越字节边界.
    pub fn read_bits(&mut self, n: u32) -> QingResult<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(QingError::InvalidArgument(format!(
                "read_bits: n={} 超过 32 位",
                n,
            )));
        }
        if (n as usize) > self.bits_left() {
            return Err(QingError::Eof);
        }

        let mut result: u32 = 0;
        let mut remaining = n;

        while remaining > 0 {
            let available = 8 - self.bit_pos as u32;
            let to_read = remaining.min(available);

            // 从当前字节中提取位
            let shift = available - to_read;
            let mask = ((1u32 << to_read) - 1) as u8;
            let bits = (self.data[self.byte_pos] >> shift) & mask;

            result = (result << to_read) | u32::from(bits);

            self.bit_pos += to_read as u8;
            if self.bit_pos >= 8 {
                self.bit_pos = 0;
                self.byte_pos += 1;
            }
            remaining -= to_read;
        }

        Ok(result)
    }

}

/// 按给定位宽依次拆出整数 (MSB first)
///
/// `widths` 中每一项对应输出中的一个整数, 字段之间紧密相连, 不做字节对齐.
/// 位宽总和超过输入长度时返回 [`QingError::Eof`].
///
/// # 示例
/// ```
/// use qing_core::unpack_bits;
///
/// let fields = unpack_bits(&[0xFF, 0xFB], &[11, 2, 2, 1]).unwrap();
/// assert_eq!(fields, vec![0x7FF, 3, 1, 1]);
/// ```
pub fn unpack_bits(data: &[u8], widths: &[u32]) -> QingResult<Vec<u32>> {
    let mut br = BitReader::new(data);
    widths.iter().map(|&w| br.read_bits(w)).collect()
}
