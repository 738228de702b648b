//! # 文件收集器
//!
//! 根据输入目录和文件名模式收集待处理文件列表。
//!
//! ## 功能
//! - glob 模式匹配（支持逗号分隔多模式）
//! - 可选递归目录搜索
//! - 输出按路径排序，保证批次顺序稳定
//!
//! ## 依赖关系
//! - 被 `commands/` 各批处理命令调用
//! - 使用 `walkdir` 遍历目录

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入目录
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<String>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            patterns: vec!["*".to_string()],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.patterns.is_empty() {
            self.patterns = vec!["*".to_string()];
        }
        self
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件，按路径排序
    pub fn collect(&self) -> Vec<PathBuf> {
        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matches_patterns(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    /// 检查文件是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns
            .iter()
            .any(|pattern| Self::glob_match(pattern, filename))
    }

    /// 简单 glob 匹配（支持 * 和 ? 通配符）
    fn glob_match(pattern: &str, text: &str) -> bool {
        let pattern = pattern.as_bytes();
        let text = text.as_bytes();

        let mut p = 0;
        let mut t = 0;
        let mut star_p = None;
        let mut star_t = 0;

        while t < text.len() {
            if p < pattern.len() && (pattern[p] == b'?' || pattern[p] == text[t]) {
                p += 1;
                t += 1;
            } else if p < pattern.len() && pattern[p] == b'*' {
                star_p = Some(p);
                star_t = t;
                p += 1;
            } else if let Some(sp) = star_p {
                p = sp + 1;
                star_t += 1;
                t = star_t;
            } else {
                return false;
            }
        }

        while p < pattern.len() && pattern[p] == b'*' {
            p += 1;
        }

        p == pattern.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn test_glob_match() {
        assert!(FileCollector::glob_match("*.vasp", "1.vasp"));
        assert!(FileCollector::glob_match("*.vasp", "TiC-123.vasp"));
        assert!(!FileCollector::glob_match("*.vasp", "POSCAR"));
        assert!(FileCollector::glob_match("OUTCAR", "OUTCAR"));
        assert!(FileCollector::glob_match("*.OUTCAR", "relax.OUTCAR"));
        assert!(!FileCollector::glob_match("*.OUTCAR", "OUTCAR"));
        assert!(FileCollector::glob_match("POSCAR?", "POSCAR1"));
        assert!(!FileCollector::glob_match("POSCAR?", "POSCAR12"));
    }

    #[test]
    fn test_collect_non_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("2.vasp")).unwrap();
        File::create(dir.path().join("1.vasp")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub/3.vasp")).unwrap();

        let files = FileCollector::new(dir.path()).with_pattern("*.vasp").collect();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["1.vasp", "2.vasp"]);
    }

    #[test]
    fn test_collect_recursive_multi_pattern() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        File::create(dir.path().join("OUTCAR")).unwrap();
        File::create(dir.path().join("a/relax.OUTCAR")).unwrap();
        File::create(dir.path().join("a/b/OUTCAR")).unwrap();
        File::create(dir.path().join("a/b/INCAR")).unwrap();

        let files = FileCollector::new(dir.path())
            .with_pattern("OUTCAR,*.OUTCAR")
            .recursive(true)
            .collect();
        assert_eq!(files.len(), 3);
    }
}
