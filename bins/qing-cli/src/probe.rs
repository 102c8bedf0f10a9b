//! `probe` 子命令: 文本或 JSON 形式输出首帧信息.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::error;

use qing_mp3::{Mp3Info, XingHeader, probe_info};

/// 单个文件的探测结果
#[derive(Serialize)]
struct ProbeOutput {
    filename: String,
    file_size: usize,
    frame_offset: usize,
    version: String,
    layer: String,
    sample_rate: u32,
    channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bit_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vbr_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xing: Option<XingOutput>,
}

/// Xing/Info 头内容
#[derive(Serialize)]
struct XingOutput {
    flags: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<u32>,
    has_toc: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<u32>,
}

impl From<&XingHeader> for XingOutput {
    fn from(xing: &XingHeader) -> Self {
        Self {
            flags: xing.flags.bits(),
            frames: xing.frames,
            bytes: xing.bytes,
            has_toc: xing.toc.is_some(),
            quality: xing.quality,
        }
    }
}

fn build_output(path: &Path, file_size: usize, info: &Mp3Info) -> ProbeOutput {
    ProbeOutput {
        filename: path.display().to_string(),
        file_size,
        frame_offset: info.offset,
        version: info.version.to_string(),
        layer: info.layer.to_string(),
        sample_rate: info.sample_rate,
        channel: info.channel.to_string(),
        bit_rate: info.bitrate,
        vbr_tag: info.vbr_tag.map(|tag| tag.to_string()),
        xing: info.xing.as_ref().map(XingOutput::from),
    }
}

fn probe_file(path: &Path) -> Result<ProbeOutput> {
    let data = fs::read(path).with_context(|| format!("读取文件失败: {}", path.display()))?;
    let info = probe_info(&data).with_context(|| format!("探测失败: {}", path.display()))?;
    Ok(build_output(path, data.len(), &info))
}

fn print_text(output: &ProbeOutput) {
    println!("[MP3]");
    println!("  文件名       : {}", output.filename);
    println!("  文件大小     : {} 字节", output.file_size);
    println!("  首帧偏移     : {}", output.frame_offset);
    println!("  版本         : {} {}", output.version, output.layer);
    println!("  采样率       : {} Hz", output.sample_rate);
    println!("  声道         : {}", output.channel);
    match output.bit_rate {
        Some(br) => println!("  首帧码率     : {} kbps", br / 1000),
        None => println!("  首帧码率     : free format"),
    }
    if let Some(tag) = &output.vbr_tag {
        println!("  VBR 标识     : {tag}");
    }
    if let Some(xing) = &output.xing {
        if let Some(frames) = xing.frames {
            println!("  总帧数       : {frames}");
        }
        if let Some(bytes) = xing.bytes {
            println!("  总字节数     : {bytes}");
        }
        println!("  ToC          : {}", if xing.has_toc { "有" } else { "无" });
    }
    println!("[/MP3]");
    println!();
}

/// `probe` 子命令入口
pub fn command_probe(files: &[PathBuf], json: bool) -> Result<()> {
    if files.is_empty() {
        bail!("未指定输入文件");
    }

    let mut outputs = Vec::with_capacity(files.len());
    let mut failed = 0;
    for path in files {
        match probe_file(path) {
            Ok(output) => outputs.push(output),
            Err(e) => {
                error!("✗ {e:#}");
                failed += 1;
            }
        }
    }

    if json {
        let text = serde_json::to_string_pretty(&outputs).context("序列化 JSON 失败")?;
        println!("{text}");
    } else {
        outputs.iter().for_each(print_text);
    }

    if failed > 0 {
        bail!("{failed}/{} 个文件探测失败", files.len());
    }
    Ok(())
}
