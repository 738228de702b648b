//! # outcar 子命令 CLI 定义
//!
//! OUTCAR 批量解析参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/outcar.rs`

use clap::Args;
use std::path::PathBuf;

/// outcar 子命令参数
#[derive(Args, Debug)]
pub struct OutcarArgs {
    /// Directory searched recursively for OUTCAR or *.OUTCAR
    pub indir: PathBuf,
}
