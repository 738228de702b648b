//! # 对齐表格读写工具
//!
//! 空格分列、按列对齐的纯文本表格。对齐优先调用外部 `column -t`，
//! 不可用时退回进程内对齐器（两者都是列间至少两空格、左对齐）。
//!
//! ## 依赖关系
//! - 被 `commands/findspg.rs`, `commands/matchtarget.rs`, `commands/outcar.rs` 使用
//! - 被 `commands/prepvasp.rs` 用于读回 match 表

use crate::error::{CdakitError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// 空单元格的占位符
pub const NA: &str = "NaN";

/// 将表头 + 数据行格式化为列对齐文本
pub fn format_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(join_cells(header));
    for row in rows {
        lines.push(join_cells(row));
    }
    let raw = lines.join("\n") + "\n";

    match column_align(&raw) {
        Some(aligned) => aligned,
        None => align_columns(&raw),
    }
}

fn join_cells(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| {
            if c.is_empty() {
                NA.to_string()
            } else {
                c.split_whitespace().collect::<Vec<_>>().join("_")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 通过外部 `column -t` 对齐；不可用或失败时返回 None
fn column_align(raw: &str) -> Option<String> {
    let mut child = Command::new("column")
        .arg("-t")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    child.stdin.take()?.write_all(raw.as_bytes()).ok()?;
    let out = child.wait_with_output().ok()?;
    if out.status.success() {
        String::from_utf8(out.stdout).ok()
    } else {
        None
    }
}

/// 进程内对齐器：列宽取最大单元格宽度，列间两空格
pub fn align_columns(raw: &str) -> String {
    let rows: Vec<Vec<&str>> = raw
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.split_whitespace().collect())
        .collect();

    let ncols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut widths = vec![0usize; ncols];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let last = row.len().saturating_sub(1);
        for (i, cell) in row.iter().enumerate() {
            if i < last {
                out.push_str(&format!("{:<width$}  ", cell, width = widths[i]));
            } else {
                out.push_str(cell);
            }
        }
        out.push('\n');
    }
    out
}

/// 读回空白分列的表格：首行为表头，其余为数据行
pub fn read_table(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let content = fs::read_to_string(path).map_err(|e| CdakitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let header: Vec<String> = lines
        .next()
        .map(|l| l.split_whitespace().map(|s| s.to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = lines
        .map(|l| l.split_whitespace().map(|s| s.to_string()).collect())
        .collect();

    Ok((header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_align_columns() {
        let raw = "index name spg\n0 1.vasp 225\n1 long-name.vasp 1\n";
        let aligned = align_columns(raw);
        let lines: Vec<&str> = aligned.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "index  name            spg");
        assert_eq!(lines[1], "0      1.vasp          225");
        assert_eq!(lines[2], "1      long-name.vasp  1");
    }

    #[test]
    fn test_format_table_deterministic() {
        let header = vec!["a".to_string(), "b".to_string()];
        let rows = vec![vec!["1".to_string(), "x".to_string()]];
        let t1 = format_table(&header, &rows);
        let t2 = format_table(&header, &rows);
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_format_table_replaces_empty_cells() {
        let header = vec!["a".to_string()];
        let rows = vec![vec![String::new()]];
        let table = format_table(&header, &rows);
        assert!(table.contains(NA));
    }

    #[test]
    fn test_read_table_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.table");
        let header = vec!["index".to_string(), "fit".to_string()];
        let rows = vec![
            vec!["1.vasp".to_string(), "true".to_string()],
            vec!["2.vasp".to_string(), "false".to_string()],
        ];
        let table = format_table(&header, &rows);
        let mut f = File::create(&path).unwrap();
        f.write_all(table.as_bytes()).unwrap();

        let (h, r) = read_table(&path).unwrap();
        assert_eq!(h, header);
        assert_eq!(r, rows);
    }
}
