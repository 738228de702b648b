//! # findspg 命令实现
//!
//! 批量空间群识别流水线：枚举目录下的 *.vasp，按多个容差并行识别
//! 空间群并生成标准化胞，汇总排序成表，非平凡对称性的结构复制到
//! sympart/gen 分区目录。
//!
//! ## 输出
//! - `spg.txt`（输入目录的兄弟文件）：列对齐汇总表
//! - `std_<tol>/`（兄弟目录）：每个输入文件的标准化胞 (.vasp + .cif)
//! - `sympart/gen/`：空间群号 > 1 的输入文件原样拷贝
//!
//! ## 依赖关系
//! - 使用 `cli/findspg.rs` 定义的参数
//! - 使用 `symmetry/`, `parsers/`, `models/symmetry.rs`
//! - 使用 `batch/`, `utils/`

use crate::batch::{BatchRunner, FileCollector};
use crate::cli::findspg::FindSpgArgs;
use crate::error::{CdakitError, Result};
use crate::models::{format_tolerance, SpgTable, StructureRecord, SymmetryResult};
use crate::parsers::cif::to_cif_string;
use crate::parsers::poscar::{parse_poscar_file, to_poscar_string};
use crate::symmetry;
use crate::utils::{output, table};

use std::fs;
use std::path::{Path, PathBuf};

/// 执行 findspg 命令
pub fn execute(args: FindSpgArgs, jobs: usize, verbose: u8) -> Result<()> {
    output::print_header("Finding Space Groups");

    // 容差从松到严排列，决定列顺序与排序主键
    let mut symprec_list = args.symprec.clone();
    symprec_list.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    symprec_list.dedup();

    for indir in &args.indirs {
        if !indir.is_dir() {
            return Err(CdakitError::DirectoryNotFound {
                path: indir.display().to_string(),
            });
        }

        let table = classify_dir(indir, &symprec_list, args.angle_tolerance, jobs, verbose)?;
        write_summary(indir, &symprec_list, &table)?;
        write_std_cells(indir, &symprec_list, &table)?;

        output::print_done(&format!(
            "{}: {} structures classified",
            indir.display(),
            table.records.len()
        ));
    }

    Ok(())
}

/// 对单个目录并行识别并排序汇总
fn classify_dir(
    indir: &Path,
    symprec_list: &[f64],
    angle_tolerance: f64,
    jobs: usize,
    verbose: u8,
) -> Result<SpgTable> {
    let files = FileCollector::new(indir).with_pattern("*.vasp").collect();
    output::print_debug(
        verbose,
        &format!("{}: {} candidate files", indir.display(), files.len()),
    );
    if files.is_empty() {
        output::print_warning(&format!("No *.vasp found in '{}'", indir.display()));
    }

    let runner = BatchRunner::new(jobs);
    let message = indir.display().to_string();
    let mut records = runner.run(&files, &message, |file| {
        classify_one(file, symprec_list, angle_tolerance)
    })?;

    // 发现顺序作为行号，排序后仍可追溯
    for (i, record) in records.iter_mut().enumerate() {
        record.index = i;
    }

    let mut table = SpgTable::new(records);
    table.sort();
    Ok(table)
}

/// 单文件识别：每个容差独立处理，识别失败记哨兵值并继续
fn classify_one(path: &Path, symprec_list: &[f64], angle_tolerance: f64) -> Result<StructureRecord> {
    let crystal = parse_poscar_file(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let orig_cif = to_cif_string(&crystal);
    let orig_poscar = to_poscar_string(&crystal);

    let mut results = Vec::with_capacity(symprec_list.len());
    for &symprec in symprec_list {
        let result = match symmetry::detect(&crystal, symprec, angle_tolerance)? {
            Some(ds) => SymmetryResult {
                number: ds.number,
                symbol: ds.symbol.clone(),
                std_natoms: ds.std_cell.atoms.len(),
                std_cif: to_cif_string(&ds.std_cell),
                std_poscar: to_poscar_string(&ds.std_cell),
            },
            None => {
                output::print_warning(&format!(
                    "{} symprec={} cannot find symmetry",
                    path.display(),
                    symprec
                ));
                SymmetryResult::sentinel(orig_cif.clone(), orig_poscar.clone())
            }
        };
        results.push((symprec, result));
    }

    let record = StructureRecord {
        name,
        formula: crystal.formula(),
        index: 0,
        results,
    };

    if record.has_nontrivial_symmetry() {
        copy_to_partition(path, &record.name)?;
    }

    Ok(record)
}

/// 复制到分区目录 <indir>/../sympart/gen/，重复运行时覆盖
fn copy_to_partition(path: &Path, name: &str) -> Result<()> {
    let indir = path.parent().unwrap_or_else(|| Path::new("."));
    let sympart = indir
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("sympart")
        .join("gen");
    fs::create_dir_all(&sympart).map_err(|e| CdakitError::FileWriteError {
        path: sympart.display().to_string(),
        source: e,
    })?;
    let dest = sympart.join(name);
    fs::copy(path, &dest).map_err(|e| CdakitError::FileWriteError {
        path: dest.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// 写出汇总表（不含大体积序列化列）到 <indir> 的兄弟文件 spg.txt
fn write_summary(indir: &Path, symprec_list: &[f64], table: &SpgTable) -> Result<()> {
    let header = SpgTable::header(symprec_list);
    let text = table::format_table(&header, &table.rows());
    let out = indir.with_file_name("spg.txt");
    fs::write(&out, text).map_err(|e| CdakitError::FileWriteError {
        path: out.display().to_string(),
        source: e,
    })
}

/// 每个容差写一个 std_<tol> 兄弟目录，按原文件名放标准化胞
fn write_std_cells(indir: &Path, symprec_list: &[f64], table: &SpgTable) -> Result<()> {
    for &symprec in symprec_list {
        let label = format_tolerance(symprec);
        let std_dir = indir.with_file_name(format!("std_{}", label));
        fs::create_dir_all(&std_dir).map_err(|e| CdakitError::FileWriteError {
            path: std_dir.display().to_string(),
            source: e,
        })?;

        for record in &table.records {
            let result = match record.results.iter().find(|(p, _)| *p == symprec) {
                Some((_, r)) => r,
                None => continue,
            };
            write_file(&std_dir.join(&record.name), &result.std_poscar)?;

            let cif_name = cif_file_name(&record.name);
            write_file(&std_dir.join(cif_name), &result.std_cif)?;
        }
    }
    Ok(())
}

fn cif_file_name(name: &str) -> PathBuf {
    Path::new(name).with_extension("cif")
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| CdakitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    const CUBIC: &str = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;

    const TRICLINIC: &str = r#"generic
1.0
5.0 0.0 0.0
0.3 6.0 0.0
0.2 0.4 7.0
Na Cl
2 1
Direct
0.0 0.0 0.0
0.123 0.234 0.345
0.456 0.567 0.678
"#;

    fn setup() -> (tempfile::TempDir, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let gen = root.path().join("gen");
        fs::create_dir(&gen).unwrap();
        File::create(gen.join("1.vasp"))
            .unwrap()
            .write_all(CUBIC.as_bytes())
            .unwrap();
        File::create(gen.join("2.vasp"))
            .unwrap()
            .write_all(TRICLINIC.as_bytes())
            .unwrap();
        (root, gen)
    }

    fn run(gen: &Path) {
        let args = FindSpgArgs {
            indirs: vec![gen.to_path_buf()],
            symprec: vec![0.5, 0.1, 0.01],
            angle_tolerance: 10.0,
        };
        execute(args, 1, 0).unwrap();
    }

    #[test]
    fn test_pipeline_table_sorted_and_partitioned() {
        let (root, gen) = setup();
        run(&gen);

        // 汇总表：1.vasp (225) 排在 2.vasp (1) 之前
        let (header, rows) = table::read_table(&root.path().join("spg.txt")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "1.vasp");
        assert_eq!(rows[1][1], "2.vasp");
        let spg_col = header.iter().position(|h| h == "1e-2").unwrap();
        assert_eq!(rows[0][spg_col], "225");
        assert_eq!(rows[1][spg_col], "1");

        // 分区目录：仅非平凡对称性的文件，且字节一致
        let copied = root.path().join("sympart/gen/1.vasp");
        assert_eq!(
            fs::read(&copied).unwrap(),
            fs::read(gen.join("1.vasp")).unwrap()
        );
        assert!(!root.path().join("sympart/gen/2.vasp").exists());

        // 每个容差一个 std 目录，含 .vasp 与 .cif
        for label in ["5e-1", "1e-1", "1e-2"] {
            let std_dir = root.path().join(format!("std_{}", label));
            assert!(std_dir.join("1.vasp").is_file(), "{} missing", label);
            assert!(std_dir.join("1.cif").is_file());
            assert!(std_dir.join("2.vasp").is_file());
        }

        // 标准化胞可以解析回来
        let std_cell =
            parse_poscar_file(&root.path().join("std_1e-2").join("1.vasp")).unwrap();
        assert_eq!(std_cell.atoms.len(), 8);
    }

    #[test]
    fn test_rerun_is_deterministic_and_idempotent() {
        let (root, gen) = setup();
        run(&gen);
        let first = fs::read_to_string(root.path().join("spg.txt")).unwrap();
        run(&gen);
        let second = fs::read_to_string(root.path().join("spg.txt")).unwrap();
        assert_eq!(first, second);
        assert!(root.path().join("sympart/gen/1.vasp").is_file());
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let args = FindSpgArgs {
            indirs: vec![root.path().join("nope")],
            symprec: vec![0.5],
            angle_tolerance: 10.0,
        };
        assert!(execute(args, 1, 0).is_err());
    }
}
