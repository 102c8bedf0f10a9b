//! 标签与 VBR 索引帧剥离.
//!
//! 处理后的码流只剩首尾相接的音频帧:
//! - 开头: ID3v2 标签、垃圾字节以及 Xing/Info/VBRI 索引帧
//! - 结尾: 最后一个可解码帧之后的垃圾字节、ID3v1 标签 ("TAG", 128 字节)
//!   与增强 ID3v1 标签 ("TAG+", 227 + 128 字节)

use log::debug;
use qing_core::{QingError, QingResult};

use crate::header::Frame;
use crate::scan::{end_of_last_valid_frame, frame_start_offset, next_offset_after};
use crate::xing::VbrTag;

/// ID3v1 标签长度
pub const ID3V1_LEN: usize = 128;

/// 增强 ID3v1 标签总长度 (扩展块 227 字节 + 标准 ID3v1)
pub const ID3V1_ENHANCED_LEN: usize = 227 + ID3V1_LEN;

/// 若缓冲区最后 `len` 字节以 `magic` 开头, 截掉这 `len` 字节
fn strip_trailing_tag(data: &mut Vec<u8>, magic: &[u8], len: usize) -> bool {
    let Some(tag_start) = data.len().checked_sub(len) else {
        return false;
    };
    if data[tag_start..].starts_with(magic) {
        data.truncate(tag_start);
        true
    } else {
        false
    }
}

/// 定位第一个真正的音频帧, 跳过其前方的一切以及 Xing/Info/VBRI 索引帧
fn first_audio_frame(data: &[u8]) -> QingResult<usize> {
    let mut start = 0;
    loop {
        let offset = frame_start_offset(data, start).ok_or(QingError::NoValidFrames)?;
        let frame = Frame::new(data, offset)?;
        let Some(tag) = VbrTag::detect(data, offset, &frame) else {
            return Ok(offset);
        };
        debug!("MP3: 跳过偏移 {offset} 处的 {tag} 帧");
        start = next_offset_after(data, offset, &frame).ok_or(QingError::NoValidFrames)?;
    }
}

/// 去除 ID3v1/ID3v2 标签、已有的 Xing/Info/VBRI 帧以及首尾垃圾字节
///
/// 整个缓冲区中没有可解码帧时返回 [`QingError::NoValidFrames`].
pub fn remove_tags_and_xing(mut data: Vec<u8>) -> QingResult<Vec<u8>> {
    let first = first_audio_frame(&data)?;
    if first > 0 {
        debug!("MP3: 去除开头 {first} 字节");
        data.drain(..first);
    }

    let end = end_of_last_valid_frame(&data)?;
    if end < data.len() {
        debug!("MP3: 去除结尾 {} 字节", data.len() - end);
        data.truncate(end);
    }

    if strip_trailing_tag(&mut data, b"TAG+", ID3V1_ENHANCED_LEN) {
        debug!("MP3: 去除增强 ID3v1 标签");
    } else if strip_trailing_tag(&mut data, b"TAG", ID3V1_LEN) {
        debug!("MP3: 去除 ID3v1 标签");
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// MPEG-1 Layer III 128kbps 44100Hz 立体声, 帧长 417
    const HEADER_128K: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
    const FRAME_LEN: usize = 417;

    fn build_frame() -> Vec<u8> {
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&HEADER_128K);
        frame
    }

    fn build_audio(count: usize) -> Vec<u8> {
        (0..count).flat_map(|_| build_frame()).collect()
    }

    fn build_id3v1() -> Vec<u8> {
        let mut tag = b"TAG".to_vec();
        tag.resize(ID3V1_LEN, b' ');
        tag
    }

    #[test]
    fn test_剥离_已干净() {
        let audio = build_audio(3);
        assert_eq!(remove_tags_and_xing(audio.clone()).unwrap(), audio);
    }

    #[test]
    fn test_剥离_id3v2_与前导垃圾() {
        let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x0a".to_vec();
        data.extend_from_slice(&[0x55; 10]);
        let audio = build_audio(2);
        data.extend_from_slice(&audio);
        assert_eq!(remove_tags_and_xing(data).unwrap(), audio);
    }

    #[test]
    fn test_剥离_id3v1() {
        let audio = build_audio(2);
        let mut data = audio.clone();
        data.extend_from_slice(&build_id3v1());
        let out = remove_tags_and_xing(data).unwrap();
        assert_eq!(out.len(), 2 * FRAME_LEN);
        assert_eq!(out, audio);
    }

    #[test]
    fn test_剥离_增强_id3v1() {
        let audio = build_audio(2);
        let mut data = audio.clone();
        let mut enhanced = b"TAG+".to_vec();
        enhanced.resize(227, 0);
        data.extend_from_slice(&enhanced);
        data.extend_from_slice(&build_id3v1());
        assert_eq!(remove_tags_and_xing(data).unwrap(), audio);
    }

    #[test]
    fn test_剥离_尾部帧内标签() {
        // 末帧帧长覆盖 ID3v1 标签时, 只能靠 "TAG" 匹配去掉
        let mut data = build_audio(2);
        let tag_start = data.len() - ID3V1_LEN;
        data[tag_start..].copy_from_slice(&build_id3v1());
        let out = remove_tags_and_xing(data).unwrap();
        assert_eq!(out.len(), tag_start);
    }

    #[test]
    fn test_剥离_xing_帧() {
        let mut xing = build_frame();
        xing[36..40].copy_from_slice(b"Xing");
        let audio = build_audio(3);
        let mut data = xing;
        data.extend_from_slice(&audio);
        assert_eq!(remove_tags_and_xing(data).unwrap(), audio);
    }

    #[test]
    fn test_剥离_连续多个索引帧() {
        let mut info = build_frame();
        info[36..40].copy_from_slice(b"Info");
        let mut vbri = build_frame();
        vbri[36..40].copy_from_slice(b"VBRI");

        let mut data = b"junk".to_vec();
        data.extend_from_slice(&info);
        data.extend_from_slice(&vbri);
        data.extend_from_slice(&info);
        let audio = build_audio(2);
        data.extend_from_slice(&audio);
        assert_eq!(remove_tags_and_xing(data).unwrap(), audio);
    }

    #[test]
    fn test_剥离_幂等() {
        let mut data = b"ID3\x03\x00\x00\x00\x00\x00\x00".to_vec();
        data.extend_from_slice(&build_audio(4));
        data.extend_from_slice(&build_id3v1());
        let once = remove_tags_and_xing(data).unwrap();
        let twice = remove_tags_and_xing(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_剥离_无有效帧() {
        assert!(matches!(
            remove_tags_and_xing(vec![0u8; 256]),
            Err(QingError::NoValidFrames)
        ));
        assert!(matches!(
            remove_tags_and_xing(Vec::new()),
            Err(QingError::NoValidFrames)
        ));
    }

    #[test]
    fn test_剥离_只有索引帧() {
        let mut xing = build_frame();
        xing[36..40].copy_from_slice(b"Xing");
        assert!(matches!(remove_tags_and_xing(xing), Err(QingError::NoValidFrames)));
    }

    #[test]
    fn test_尾部标签_长度不足() {
        let mut data = b"TAG".to_vec();
        assert!(!strip_trailing_tag(&mut data, b"TAG", ID3V1_LEN));
        assert_eq!(data.len(), 3);
    }
}
