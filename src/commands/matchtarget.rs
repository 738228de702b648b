//! # match 命令实现
//!
//! 把目录内的候选结构与目标结构在三档预设下逐一匹配，结果写入
//! `match.<target>.table`。表已存在且覆盖全部候选时直接复用（缓存）。
//!
//! ## 依赖关系
//! - 使用 `cli/matchtarget.rs` 定义的参数
//! - 使用 `matching/`, `parsers/poscar.rs`
//! - 使用 `utils/table.rs`, `utils/output.rs`

use crate::batch::FileCollector;
use crate::cli::matchtarget::MatchArgs;
use crate::error::{CdakitError, Result};
use crate::matching::{fit_structures, PRESETS};
use crate::parsers::poscar::{parse_poscar_file, to_poscar_string};
use crate::utils::{output, table};

use std::fs;
use std::path::PathBuf;

/// 执行 match 命令
pub fn execute(args: MatchArgs, verbose: u8) -> Result<()> {
    output::print_header("Matching Structures");

    if !args.indir.is_dir() {
        return Err(CdakitError::DirectoryNotFound {
            path: args.indir.display().to_string(),
        });
    }
    if !args.target.is_file() {
        return Err(CdakitError::FileNotFound {
            path: args.target.display().to_string(),
        });
    }

    let target = parse_poscar_file(&args.target)?;
    let label = args
        .target
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "target".to_string());
    let f_table = args.indir.with_file_name(format!("match.{}.table", label));

    let files = sort_numeric(
        FileCollector::new(&args.indir).with_pattern("*.vasp").collect(),
    );

    // 缓存：已有表覆盖全部候选时直接复用
    if f_table.is_file() {
        let (_, rows) = table::read_table(&f_table)?;
        if rows.len() >= files.len() {
            output::print_skip(&format!(
                "'{}' already covers {} candidates",
                f_table.display(),
                files.len()
            ));
            return Ok(());
        }
    }

    output::print_info(&format!(
        "Matching {} candidates against '{}'",
        files.len(),
        args.target.display()
    ));

    let mut header = vec!["index".to_string()];
    for preset in &PRESETS {
        header.push(preset.name.to_string());
        header.push(format!("{}_normrms", preset.name));
        header.push(format!("{}_maxrms", preset.name));
    }

    let mut rows = Vec::with_capacity(files.len());
    for file in &files {
        let candidate = parse_poscar_file(file)?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut row = vec![name.clone()];
        for preset in &PRESETS {
            let outcome = fit_structures(&target, &candidate, preset);
            output::print_debug(
                verbose,
                &format!("{} {} fit={}", name, preset.name, outcome.fit),
            );
            row.push(outcome.fit.to_string());
            row.push(fmt_opt(outcome.norm_rms));
            row.push(fmt_opt(outcome.max_rms));
        }
        rows.push(row);
    }

    // 目标结构留一份在候选目录旁，便于核对
    let f_target = args.indir.with_file_name(format!("{}.vasp", label));
    fs::write(&f_target, to_poscar_string(&target)).map_err(|e| CdakitError::FileWriteError {
        path: f_target.display().to_string(),
        source: e,
    })?;

    let text = table::format_table(&header, &rows);
    fs::write(&f_table, text).map_err(|e| CdakitError::FileWriteError {
        path: f_table.display().to_string(),
        source: e,
    })?;

    output::print_done(&format!("Match table written to '{}'", f_table.display()));
    Ok(())
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{:.6}", x),
        None => table::NA.to_string(),
    }
}

/// 按整数 stem 排序；无法解析时告警并保持名字序
fn sort_numeric(mut files: Vec<PathBuf>) -> Vec<PathBuf> {
    let stems: Option<Vec<i64>> = files
        .iter()
        .map(|f| {
            f.file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
        })
        .collect();

    match stems {
        Some(_) => {
            files.sort_by_key(|f| {
                f.file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.parse::<i64>().ok())
                    .unwrap_or(i64::MAX)
            });
        }
        None => output::print_warning("cannot sort by digit, skip sorting"),
    }
    files
}
