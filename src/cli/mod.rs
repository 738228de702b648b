//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `findspg`: 批量空间群识别
//! - `standardize`: 单结构标准化
//! - `match`: 结构匹配
//! - `calypso`: CALYPSO 输入生成与调用
//! - `prepvasp`: VASP 弛豫输入生成
//! - `outcar`: OUTCAR 批量解析
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: findspg, standardize, matchtarget, calypso, prepvasp, outcar

pub mod calypso;
pub mod findspg;
pub mod matchtarget;
pub mod outcar;
pub mod prepvasp;
pub mod standardize;

use clap::{ArgAction, Parser, Subcommand};

/// cdakit - 晶体结构搜索批处理工具箱
#[derive(Parser)]
#[command(name = "cdakit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Batch-processing toolkit for crystal structure search workflows", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Number of parallel jobs (0 = all cores)
    #[arg(short, long, global = true, default_value_t = 0)]
    pub jobs: usize,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Find space groups of all *.vasp in directories at several tolerances
    Findspg(findspg::FindSpgArgs),

    /// Standardize one structure (conventional + primitive cell) at several tolerances
    Standardize(standardize::StandardizeArgs),

    /// Match candidate structures against a target under three tolerance presets
    #[command(name = "match")]
    Match(matchtarget::MatchArgs),

    /// Generate CALYPSO input.dat for each POSCAR and run the search binary
    Calypso(calypso::CalypsoArgs),

    /// Generate VASP relaxation inputs for all *.vasp in a directory
    Prepvasp(prepvasp::PrepVaspArgs),

    /// Parse all OUTCAR logs into per-step series and a convergence summary
    Outcar(outcar::OutcarArgs),
}
