//! 完整清理流程: 剥离标签与旧索引帧, 按需合成新的 Xing 头.

use log::debug;
use qing_core::QingResult;

use crate::tags::remove_tags_and_xing;
use crate::xing::add_xing_header;

/// 清理选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    /// 剥离后是否合成新的 Xing 头
    pub add_xing: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self { add_xing: true }
    }
}

/// 按 `options` 清理一段 MP3 码流
pub fn clean(data: Vec<u8>, options: &CleanOptions) -> QingResult<Vec<u8>> {
    let input_len = data.len();
    let mut output = remove_tags_and_xing(data)?;
    if options.add_xing {
        output = add_xing_header(output)?;
    }
    debug!("MP3: 清理完成, {input_len} -> {} 字节", output.len());
    Ok(output)
}
