//! # findspg 子命令 CLI 定义
//!
//! 批量空间群识别参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/findspg.rs`

use clap::Args;
use std::path::PathBuf;

/// findspg 子命令参数
#[derive(Args, Debug)]
pub struct FindSpgArgs {
    /// Directories containing *.vasp candidate structures
    #[arg(required = true)]
    pub indirs: Vec<PathBuf>,

    /// Symmetry tolerances (symprec), tried from loosest to strictest
    #[arg(short, long, num_args = 1.., default_values_t = [0.5, 0.1, 0.01])]
    pub symprec: Vec<f64>,

    /// Angular tolerance in degrees
    #[arg(short, long, default_value_t = 10.0)]
    pub angle_tolerance: f64,
}
