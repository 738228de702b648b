//! # outcar 命令实现
//!
//! 递归收集目录下的 OUTCAR，并行解析弛豫序列，写二进制归档与
//! 收敛汇总表。一个 OUTCAR 都没有是致命错误。
//!
//! ## 输出
//! - `<indir>/parsed_outcar.bin`：bincode 序列化的相对路径 -> 弛豫序列映射
//! - `<indir>/parsed_outcar.table`：收敛汇总表（同时打印到终端）
//!
//! ## 依赖关系
//! - 使用 `cli/outcar.rs` 定义的参数
//! - 使用 `parsers/outcar.rs`, `models/relaxation.rs`
//! - 使用 `batch/`, `utils/table.rs`

use crate::batch::{BatchRunner, FileCollector};
use crate::cli::outcar::OutcarArgs;
use crate::error::{CdakitError, Result};
use crate::models::RelaxationLog;
use crate::parsers::outcar::parse_outcar;
use crate::utils::{output, table};

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// 执行 outcar 命令
pub fn execute(args: OutcarArgs, jobs: usize, verbose: u8) -> Result<()> {
    output::print_header("Parsing OUTCARs");

    if !args.indir.is_dir() {
        return Err(CdakitError::DirectoryNotFound {
            path: args.indir.display().to_string(),
        });
    }

    let files = FileCollector::new(&args.indir)
        .with_pattern("OUTCAR,*.OUTCAR")
        .recursive(true)
        .collect();
    if files.is_empty() {
        return Err(CdakitError::NoFilesFound {
            pattern: format!("{}/**/OUTCAR", args.indir.display()),
        });
    }
    output::print_debug(verbose, &format!("{} OUTCARs found", files.len()));

    let runner = BatchRunner::new(jobs);
    let parsed = runner.run(&files, "OUTCAR", |file| {
        let key = file
            .strip_prefix(&args.indir)
            .unwrap_or(file)
            .display()
            .to_string();
        let log = parse_outcar(file)?;
        Ok((key, log))
    })?;
    let logs: BTreeMap<String, RelaxationLog> = parsed.into_iter().collect();

    write_archive(&args.indir.join("parsed_outcar.bin"), &logs)?;

    let text = summary_table(&logs);
    let f_table = args.indir.join("parsed_outcar.table");
    fs::write(&f_table, &text).map_err(|e| CdakitError::FileWriteError {
        path: f_table.display().to_string(),
        source: e,
    })?;
    print!("{}", text);

    output::print_done(&format!(
        "{} OUTCARs archived to '{}'",
        logs.len(),
        args.indir.join("parsed_outcar.bin").display()
    ));
    Ok(())
}

/// bincode 归档，供后续分析直接反序列化
fn write_archive(path: &Path, logs: &BTreeMap<String, RelaxationLog>) -> Result<()> {
    let file = File::create(path).map_err(|e| CdakitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    bincode::serialize_into(BufWriter::new(file), logs)
        .map_err(|e| CdakitError::Other(format!("cannot serialize to '{}': {}", path.display(), e)))
}

/// 按相对路径排序的收敛汇总表
fn summary_table(logs: &BTreeMap<String, RelaxationLog>) -> String {
    let header: Vec<String> = [
        "index",
        "formula",
        "converge",
        "decreased_enth",
        "ion_steps",
        "natoms",
        "decreased_enth_per_atom",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let rows: Vec<Vec<String>> = logs
        .iter()
        .map(|(key, log)| {
            let summary = log.summary();
            vec![
                key.clone(),
                summary.formula.clone().unwrap_or_else(|| table::NA.to_string()),
                summary.converged.to_string(),
                fmt_opt(summary.decreased_enthalpy),
                summary.ion_steps.to_string(),
                summary
                    .natoms
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| table::NA.to_string()),
                fmt_opt(summary.decreased_enthalpy_per_atom()),
            ]
        })
        .collect();

    table::format_table(&header, &rows)
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{:.6}", x),
        None => table::NA.to_string(),
    }
}
