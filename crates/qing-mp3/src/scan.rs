//! 帧同步扫描与帧链遍历.
//!
//! 同步候选位置: 一个 0xFF 字节, 且下一字节高 3 位全为 1 (合起来正是 11 位同步码).
//! 候选位置之后至少要留出 4 字节帧头, 因此搜索空间止于 `data.len() - 4`.

use log::{debug, trace};
use qing_core::{QingError, QingResult};

use crate::header::{Frame, HEADER_LEN};

/// 一次帧链遍历的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameScan {
    /// 按顺序访问到的帧起始偏移 (含帧长未知的帧)
    pub offsets: Vec<usize>,
    /// 最后一个帧长可计算的帧之后的偏移
    pub data_end: usize,
}

/// `pos` 处是否是同步候选 (调用方保证 `pos + 1 < data.len()`)
fn is_sync_candidate(data: &[u8], pos: usize) -> bool {
    data[pos] == 0xFF && data[pos + 1] >> 5 == 0b111
}

/// 从 `from` 开始向后查找下一个帧同步位置
///
/// 跳过后续字节不满足条件的 0xFF, 从下一个字节继续搜索.
pub fn frame_start_offset(data: &[u8], from: usize) -> Option<usize> {
    let last = data.len().checked_sub(HEADER_LEN)?;
    let mut pos = from;
    while pos <= last {
        let found = pos + data[pos..=last].iter().position(|&b| b == 0xFF)?;
        if is_sync_candidate(data, found) {
            return Some(found);
        }
        pos = found + 1;
    }
    None
}

/// 从 `from` 开始向前 (朝偏移 0) 查找帧同步位置
///
/// 起点会被钳制到 `data.len() - 4`, 保证找到的位置后面有完整帧头.
pub fn frame_start_offset_backward(data: &[u8], from: usize) -> Option<usize> {
    let last = data.len().checked_sub(HEADER_LEN)?;
    let mut pos = from.min(last);
    loop {
        let found = data[..=pos].iter().rposition(|&b| b == 0xFF)?;
        if is_sync_candidate(data, found) {
            return Some(found);
        }
        pos = found.checked_sub(1)?;
    }
}

/// 已解析帧 `frame` 位于 `offset` 时, 下一帧的起始偏移
///
/// 帧长未知时退回最小步长, 以便越过无法解码的帧重新同步.
pub(crate) fn next_offset_after(data: &[u8], offset: usize, frame: &Frame) -> Option<usize> {
    let step = match frame.frame_length() {
        Some(length) => length.max(frame.min_step()),
        None => {
            debug!("MP3: 偏移 {offset} 处帧长未知, 以 {} 字节步长重新同步", frame.min_step());
            frame.min_step()
        }
    };
    frame_start_offset(data, offset + step)
}

/// 解析 `offset` 处的帧并返回下一帧的起始偏移, 没有下一帧时返回 `None`
pub fn next_frame_offset(data: &[u8], offset: usize) -> QingResult<Option<usize>> {
    let frame = Frame::new(data, offset)?;
    Ok(next_offset_after(data, offset, &frame))
}

/// 从 `start` 起沿帧链遍历到码流末尾
///
/// `start` 必须是同步位置. 帧长未知的帧计入偏移列表, 但不推进 `data_end`.
pub fn frame_offsets(data: &[u8], start: usize) -> QingResult<FrameScan> {
    let mut offsets = Vec::new();
    let mut data_end = data.len();
    let mut cursor = Some(start);

    while let Some(offset) = cursor {
        offsets.push(offset);
        let frame = Frame::new(data, offset)?;
        if let Some(length) = frame.frame_length() {
            data_end = offset + length;
        }
        trace!("MP3: 帧 #{} @ {offset}, 长度 {:?}", offsets.len() - 1, frame.frame_length());
        cursor = next_offset_after(data, offset, &frame);
    }

    Ok(FrameScan { offsets, data_end })
}

/// 从缓冲区末尾向前查找最后一个帧长可计算的帧, 返回其结束偏移
///
/// 找不到任何这样的帧意味着缓冲区里没有真正的音频数据, 返回 [`QingError::NoValidFrames`].
pub fn end_of_last_valid_frame(data: &[u8]) -> QingResult<usize> {
    let mut from = data.len();
    while let Some(offset) = frame_start_offset_backward(data, from) {
        let frame = Frame::new(data, offset)?;
        if let Some(length) = frame.frame_length() {
            return Ok(offset + length);
        }
        match offset.checked_sub(1) {
            Some(prev) => from = prev,
            None => break,
        }
    }
    Err(QingError::NoValidFrames)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// MPEG-1 Layer III 128kbps 44100Hz 立体声帧头, 帧长 417
    const HEADER_128K: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
    /// 同上, free format (帧长未知)
    const HEADER_FREE: [u8; 4] = [0xFF, 0xFB, 0x00, 0x00];

    fn build_frame(header: [u8; 4], len: usize) -> Vec<u8> {
        let mut frame = vec![0u8; len];
        frame[..4].copy_from_slice(&header);
        frame
    }

    #[test]
    fn test_正向扫描_跳过伪同步() {
        // 0xFF 0x00 不是同步, 0xFF 0xFB 才是
        let data = [0x00, 0xFF, 0x00, 0xFF, 0xFB, 0x90, 0x00, 0x00];
        assert_eq!(frame_start_offset(&data, 0), Some(3));
        assert_eq!(frame_start_offset(&data, 4), None);
    }

    #[test]
    fn test_正向扫描_连续0xff() {
        let data = [0xFF, 0xFF, 0xFB, 0x90, 0x00];
        // 0xFF 0xFF 高 3 位全 1, 第一个字节就是候选
        assert_eq!(frame_start_offset(&data, 0), Some(0));
        assert_eq!(frame_start_offset(&data, 1), Some(1));
    }

    #[test]
    fn test_正向扫描_搜索空间边界() {
        // 同步位于 len - 4 仍可找到, 再往后帧头不完整
        let data = [0x00, 0xFF, 0xFB, 0x90, 0x00];
        assert_eq!(frame_start_offset(&data, 0), Some(1));
        let data = [0x00, 0x00, 0xFF, 0xFB, 0x90];
        assert_eq!(frame_start_offset(&data, 0), None);
        assert_eq!(frame_start_offset(&[0xFF, 0xFB], 0), None);
        assert_eq!(frame_start_offset(&data, 100), None);
    }

    #[test]
    fn test_反向扫描() {
        let data = [0xFF, 0xFB, 0x90, 0x00, 0xFF, 0x00, 0x00, 0x00];
        // 4 处的 0xFF 后跟 0x00, 是伪同步
        assert_eq!(frame_start_offset_backward(&data, data.len()), Some(0));
        let data = [0x00, 0xFF, 0xE0, 0x00, 0x00, 0xFF, 0xFB];
        // 起点被钳制到 len - 4 = 3, 5 处的候选不可见
        assert_eq!(frame_start_offset_backward(&data, data.len()), Some(1));
        assert_eq!(frame_start_offset_backward(&data, 0), None);
        assert_eq!(frame_start_offset_backward(&[0xFF], 0), None);
    }

    #[test]
    fn test_帧链遍历() {
        let frame = build_frame(HEADER_128K, 417);
        let mut data = Vec::new();
        for _ in 0..3 {
            data.extend_from_slice(&frame);
        }
        data.extend_from_slice(&[0u8; 10]);

        let scan = frame_offsets(&data, 0).unwrap();
        assert_eq!(scan.offsets, vec![0, 417, 834]);
        assert_eq!(scan.data_end, 3 * 417);
        assert_eq!(next_frame_offset(&data, 417).unwrap(), Some(834));
        assert_eq!(next_frame_offset(&data, 834).unwrap(), None);
    }

    #[test]
    fn test_帧链遍历_帧长未知时重新同步() {
        let mut data = build_frame(HEADER_128K, 417);
        data.extend_from_slice(&build_frame(HEADER_FREE, 20));
        data.extend_from_slice(&build_frame(HEADER_128K, 417));
        data.extend_from_slice(&build_frame(HEADER_FREE, 20));

        let scan = frame_offsets(&data, 0).unwrap();
        assert_eq!(scan.offsets, vec![0, 417, 437, 854]);
        // 末尾 free format 帧不推进 data_end
        assert_eq!(scan.data_end, 854);
    }

    #[test]
    fn test_帧链遍历_起点非同步() {
        let data = [0u8; 16];
        assert!(matches!(frame_offsets(&data, 0), Err(QingError::Internal(_))));
    }

    #[test]
    fn test_最后有效帧() {
        let mut data = build_frame(HEADER_128K, 417);
        data.extend_from_slice(&build_frame(HEADER_128K, 417));
        data.extend_from_slice(&build_frame(HEADER_FREE, 20));
        data.extend_from_slice(b"trailing junk");
        assert_eq!(end_of_last_valid_frame(&data).unwrap(), 834);
    }

    #[test]
    fn test_最后有效帧_无有效帧() {
        assert!(matches!(
            end_of_last_valid_frame(&[0u8; 64]),
            Err(QingError::NoValidFrames)
        ));
        assert!(matches!(
            end_of_last_valid_frame(&build_frame(HEADER_FREE, 20)),
            Err(QingError::NoValidFrames)
        ));
        assert!(matches!(end_of_last_valid_frame(&[]), Err(QingError::NoValidFrames)));
    }
}
