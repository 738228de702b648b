//! # prepvasp 子命令 CLI 定义
//!
//! VASP 弛豫输入生成参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/prepvasp.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// match 表中使用的唯一性等级
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum UniqLevel {
    /// loose preset (ltol 0.3, stol 0.5, angle 10)
    Lo,
    /// medium preset (ltol 0.2, stol 0.3, angle 5)
    Md,
    /// strict preset (ltol 0.1, stol 0.2, angle 5)
    St,
}

impl std::fmt::Display for UniqLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqLevel::Lo => write!(f, "lo"),
            UniqLevel::Md => write!(f, "md"),
            UniqLevel::St => write!(f, "st"),
        }
    }
}

/// prepvasp 子命令参数
#[derive(Args, Debug)]
pub struct PrepVaspArgs {
    /// Directory containing *.vasp
    pub indir: PathBuf,

    /// Match table used to filter structures to the unique set
    #[arg(short, long)]
    pub uniqfile: Option<PathBuf>,

    /// Unique level of matcher used in uniqfile
    #[arg(short = 'l', long, value_enum, default_value_t = UniqLevel::Lo)]
    pub uniqlevel: UniqLevel,

    /// EDIFF, omitted from INCAR if unset
    #[arg(short, long)]
    pub ediff: Option<f64>,

    /// EDIFFG, omitted from INCAR if unset
    #[arg(long)]
    pub ediffg: Option<f64>,

    /// NSW (<= 1 means single-point run)
    #[arg(short, long, default_value_t = 0)]
    pub nsw: i64,

    /// PSTRESS (kbar)
    #[arg(short, long, default_value_t = 0.0)]
    pub pstress: f64,

    /// KSPACING; when set, no KPOINTS file is written
    #[arg(long)]
    pub kspacing: Option<f64>,

    /// ISYM, suggest 0/2
    #[arg(short, long, default_value_t = 0)]
    pub sym: i64,

    /// Pseudopotential library directory (one subdir per element with a POTCAR)
    #[arg(long, env = "CDAKIT_PSP_DIR")]
    pub pspdir: Option<PathBuf>,
}
