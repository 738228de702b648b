//! # calypso 子命令 CLI 定义
//!
//! CALYPSO 输入生成与调用参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/calypso.rs`

use clap::Args;
use std::path::PathBuf;

/// calypso 子命令参数
#[derive(Args, Debug)]
pub struct CalypsoArgs {
    /// Directory with each POSCAR/POTCAR/KPOINTS in a subdir
    pub indir: PathBuf,

    /// Distance ratio multiplied on RCORE to generate DistanceOfIon
    #[arg(short = 'r', long, default_value_t = 0.7)]
    pub dist_ratio: f64,

    /// PopSize written into input.dat
    #[arg(short, long, default_value_t = 10)]
    pub popsize: usize,

    /// CALYPSO executable file
    #[arg(short, long, default_value = "calypso.x")]
    pub calypsocmd: String,

    /// Max time in seconds for each CALYPSO subprocess
    #[arg(short = 't', long, default_value_t = 180.0)]
    pub calypsotimeout: f64,
}
