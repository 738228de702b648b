//! # standardize 子命令 CLI 定义
//!
//! 单结构标准化参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/standardize.rs`

use clap::Args;
use std::path::PathBuf;

/// standardize 子命令参数
#[derive(Args, Debug)]
pub struct StandardizeArgs {
    /// Structure file to standardize (recommended to name as *.vasp)
    pub vaspfile: PathBuf,

    /// Symmetry tolerances (symprec)
    #[arg(short, long, num_args = 1.., default_values_t = [0.5, 0.1, 0.01])]
    pub symprec: Vec<f64>,
}
