//! 文件级处理: 收集输入、读写文件、批量清理.

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use qing_mp3::CleanOptions;

/// 单个文件的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanStats {
    /// 输入字节数
    pub input_len: usize,
    /// 输出字节数
    pub output_len: usize,
}

/// 读取 `input`, 清理后写入 `output` (可与 `input` 相同)
pub fn clean_file(input: &Path, output: &Path, add_xing: bool) -> Result<CleanStats> {
    let data = fs::read(input).with_context(|| format!("读取文件失败: {}", input.display()))?;
    let input_len = data.len();
    let cleaned = qing_mp3::clean(data, &CleanOptions { add_xing })
        .with_context(|| format!("处理失败: {}", input.display()))?;
    let output_len = cleaned.len();
    fs::write(output, &cleaned).with_context(|| format!("写入文件失败: {}", output.display()))?;
    debug!("{} -> {}: {input_len} -> {output_len} 字节", input.display(), output.display());
    Ok(CleanStats {
        input_len,
        output_len,
    })
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}

/// 递归收集目录下的 *.mp3 文件
fn collect_dir(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("读取目录失败: {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_dir(&path, out)?;
        } else if is_mp3(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// 合并命令行给出的文件与目录扫描结果 (目录结果按路径排序)
pub fn collect_inputs(files: &[PathBuf], dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut inputs = files.to_vec();
    if let Some(dir) = dir {
        let mut found = Vec::new();
        collect_dir(dir, &mut found)?;
        found.sort();
        inputs.extend(found);
    }
    Ok(inputs)
}

/// 原地批量清理, 返回失败文件数
pub fn clean_in_place(inputs: &[PathBuf], add_xing: bool, parallel: bool) -> usize {
    let run = |path: &PathBuf| match clean_file(path, path, add_xing) {
        Ok(stats) => {
            info!("✓ {}: {} -> {} 字节", path.display(), stats.input_len, stats.output_len);
            true
        }
        Err(e) => {
            error!("✗ {e:#}");
            false
        }
    };

    let ok = if parallel {
        inputs.par_iter().filter(|p| run(p)).count()
    } else {
        inputs.iter().filter(|p| run(p)).count()
    };
    inputs.len() - ok
}

/// `clean` 子命令入口
pub fn command_clean(
    files: &[PathBuf],
    output: Option<&Path>,
    dir: Option<&Path>,
    add_xing: bool,
    parallel: bool,
) -> Result<()> {
    let inputs = collect_inputs(files, dir)?;
    if inputs.is_empty() {
        bail!("未指定输入文件");
    }

    if let Some(output) = output {
        if inputs.len() != 1 {
            bail!("-o 只能与单个输入文件一起使用, 当前 {} 个", inputs.len());
        }
        let stats = clean_file(&inputs[0], output, add_xing)?;
        info!(
            "✓ {} -> {}: {} -> {} 字节",
            inputs[0].display(),
            output.display(),
            stats.input_len,
            stats.output_len,
        );
        return Ok(());
    }

    let failed = clean_in_place(&inputs, add_xing, parallel);
    if failed > 0 {
        bail!("{failed}/{} 个文件处理失败", inputs.len());
    }
    Ok(())
}
