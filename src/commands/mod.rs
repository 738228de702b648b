//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `batch/`, `utils/`
//! - 子模块: findspg, standardize, matchtarget, calypso, prepvasp, outcar

pub mod calypso;
pub mod findspg;
pub mod matchtarget;
pub mod outcar;
pub mod prepvasp;
pub mod standardize;

use crate::cli::{Cli, Commands};
use crate::error::Result;

/// 执行命令，全局 -j/-v 传递给各子命令
pub fn run(cli: Cli) -> Result<()> {
    let jobs = cli.jobs;
    let verbose = cli.verbose;

    match cli.command {
        Commands::Findspg(args) => findspg::execute(args, jobs, verbose),
        Commands::Standardize(args) => standardize::execute(args, verbose),
        Commands::Match(args) => matchtarget::execute(args, verbose),
        Commands::Calypso(args) => calypso::execute(args, jobs, verbose),
        Commands::Prepvasp(args) => prepvasp::execute(args, jobs, verbose),
        Commands::Outcar(args) => outcar::execute(args, jobs, verbose),
    }
}
