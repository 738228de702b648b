//! # cdakit - 晶体结构搜索批处理工具箱
//!
//! 将结构搜索流程中分散的批处理脚本用 Rust 重构，统一成单一可执行文件。
//!
//! ## 子命令
//! - `findspg`     - 批量空间群识别（多容差），输出汇总表与标准化胞
//! - `standardize` - 单结构标准化（惯用胞 + 原胞，多容差）
//! - `match`       - 候选结构与目标结构匹配（三档容差预设，结果缓存）
//! - `calypso`     - 生成 CALYPSO input.dat 并调用外部搜索程序
//! - `prepvasp`    - 批量生成 VASP 弛豫输入
//! - `outcar`      - 批量解析 OUTCAR，输出逐离子步序列与收敛汇总
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (格式解析器)
//!   │     ├── symmetry/  (空间群识别封装)
//!   │     ├── matching/  (结构匹配)
//!   │     └── models/    (数据模型)
//!   ├── batch/      (并行批处理)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod matching;
mod models;
mod parsers;
mod symmetry;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
