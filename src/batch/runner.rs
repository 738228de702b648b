//! # 批量执行器
//!
//! 把可失败的单文件处理函数并行映射到文件列表上。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代，输出顺序与输入一致
//! - 进度条显示
//! - 首个 worker 错误即中止整批（无部分失败隔离）
//!
//! ## 依赖关系
//! - 被 `commands/findspg.rs`, `commands/calypso.rs`, `commands/outcar.rs` 等调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::Result;
use crate::utils::progress;

use rayon::prelude::*;
use std::path::PathBuf;

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器（0 = 全部核心）
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行处理文件列表，任一 worker 返回 Err 即中止整批
    pub fn run<T, F>(&self, files: &[PathBuf], message: &str, processor: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&PathBuf) -> Result<T> + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, message);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| crate::error::CdakitError::Other(e.to_string()))?;

        let results: Result<Vec<T>> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let result = processor(file);
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();
        results
    }
}
