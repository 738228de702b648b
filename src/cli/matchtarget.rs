//! # match 子命令 CLI 定义
//!
//! 结构匹配参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/matchtarget.rs`

use clap::Args;
use std::path::PathBuf;

/// match 子命令参数
#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Directory containing <n>.vasp candidate structures
    pub indir: PathBuf,

    /// Target structure in POSCAR format
    #[arg(short, long)]
    pub target: PathBuf,
}
