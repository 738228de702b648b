//! # VASP POTCAR 解析器
//!
//! 从 POTCAR 中提取每个赝势块的元素符号与 RCORE 截断半径，
//! 用于生成 CALYPSO 的 DistanceOfIon 矩阵。
//!
//! ## 依赖关系
//! - 被 `commands/calypso.rs` 使用
//! - 使用 `regex` 匹配 TITEL/RCORE 行

use crate::error::{CdakitError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// POTCAR 中一个赝势块
#[derive(Debug, Clone, PartialEq)]
pub struct PotcarEntry {
    /// 元素符号（去掉 _sv/_pv 等后缀）
    pub symbol: String,

    /// 最外层截断半径 RCORE (a.u.)
    pub rcore: f64,
}

/// 解析 POTCAR 文件，按块顺序返回
pub fn parse_potcar(path: &Path) -> Result<Vec<PotcarEntry>> {
    let content = fs::read_to_string(path).map_err(|e| CdakitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_potcar_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 POTCAR
pub fn parse_potcar_content(content: &str, path: &str) -> Result<Vec<PotcarEntry>> {
    // "   TITEL  = PAW_PBE Mg_pv 13Apr2007"
    let re_titel = Regex::new(r"TITEL\s*=\s*\S+\s+(\S+)").expect("static regex");
    // "   RCORE  =    2.000    outmost cutoff radius"
    let re_rcore = Regex::new(r"RCORE\s*=\s*([0-9.]+)").expect("static regex");

    let mut entries = Vec::new();
    let mut pending_symbol: Option<String> = None;

    for line in content.lines() {
        if let Some(cap) = re_titel.captures(line) {
            let full = cap[1].to_string();
            let symbol = full.split('_').next().unwrap_or(&full).to_string();
            pending_symbol = Some(symbol);
        } else if let Some(cap) = re_rcore.captures(line) {
            let rcore: f64 = cap[1].parse().map_err(|_| CdakitError::ParseError {
                format: "potcar".to_string(),
                path: path.to_string(),
                reason: format!("Invalid RCORE line: {}", line.trim()),
            })?;
            let symbol = pending_symbol.take().ok_or_else(|| CdakitError::ParseError {
                format: "potcar".to_string(),
                path: path.to_string(),
                reason: "RCORE line before any TITEL line".to_string(),
            })?;
            entries.push(PotcarEntry { symbol, rcore });
        }
    }

    if entries.is_empty() {
        return Err(CdakitError::ParseError {
            format: "potcar".to_string(),
            path: path.to_string(),
            reason: "No TITEL/RCORE pairs found".to_string(),
        });
    }

    Ok(entries)
}
