//! # prepvasp 命令实现
//!
//! 为目录下的 *.vasp 批量生成 VASP 计算目录：POSCAR、INCAR、
//! KPOINTS（未设 KSPACING 时）、以及按物种顺序拼接的 POTCAR。
//! 可用 match 表过滤出唯一结构集。
//!
//! ## 输出
//! - `<indir>[.uniq.<level>].scf/`（NSW <= 1）或 `....opt/`（NSW > 1），
//!   每个结构一个以 stem 命名的子目录
//!
//! ## 依赖关系
//! - 使用 `cli/prepvasp.rs` 定义的参数
//! - 使用 `parsers/poscar.rs`, `utils/table.rs`
//! - 使用 `batch/`, `utils/output.rs`

use crate::batch::{BatchRunner, FileCollector};
use crate::cli::prepvasp::PrepVaspArgs;
use crate::error::{CdakitError, Result};
use crate::parsers::poscar::{parse_poscar_file, to_poscar_string};
use crate::utils::{output, table};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 执行 prepvasp 命令
pub fn execute(args: PrepVaspArgs, jobs: usize, verbose: u8) -> Result<()> {
    output::print_header("Preparing VASP Inputs");

    if !args.indir.is_dir() {
        return Err(CdakitError::DirectoryNotFound {
            path: args.indir.display().to_string(),
        });
    }

    let mut files = FileCollector::new(&args.indir).with_pattern("*.vasp").collect();
    if let Some(uniqfile) = &args.uniqfile {
        let keep = read_uniq_set(uniqfile, &args.uniqlevel.to_string())?;
        let before = files.len();
        files.retain(|f| {
            f.file_name()
                .map(|n| keep.contains(&n.to_string_lossy().to_string()))
                .unwrap_or(false)
        });
        output::print_info(&format!(
            "{} of {} structures are unique at level '{}'",
            files.len(),
            before,
            args.uniqlevel
        ));
    }
    if files.is_empty() {
        return Err(CdakitError::NoFilesFound {
            pattern: format!("{}/*.vasp", args.indir.display()),
        });
    }

    let outdir = outdir_path(&args);
    output::print_debug(verbose, &format!("outdir: {}", outdir.display()));

    let incar = incar_text(&args);
    let runner = BatchRunner::new(jobs);
    runner.run(&files, "VASP inputs", |file| {
        prepare_one(&args, &outdir, &incar, file)
    })?;

    output::print_done(&format!(
        "{} calculation directories under '{}'",
        files.len(),
        outdir.display()
    ));
    Ok(())
}

/// 输出目录与输入目录同级，后缀表明过滤等级与计算类型
fn outdir_path(args: &PrepVaspArgs) -> PathBuf {
    let name = args
        .indir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "calc".to_string());
    let uniq_suffix = if args.uniqfile.is_some() {
        format!(".uniq.{}", args.uniqlevel)
    } else {
        String::new()
    };
    let run_suffix = if args.nsw <= 1 { ".scf" } else { ".opt" };
    args.indir
        .with_file_name(format!("{}{}{}", name, uniq_suffix, run_suffix))
}

/// 从 match 表读取 matcher_<level> 列为 true 的结构名
fn read_uniq_set(uniqfile: &Path, level: &str) -> Result<HashSet<String>> {
    let (header, rows) = table::read_table(uniqfile)?;
    let column = format!("matcher_{}", level);
    let col = header
        .iter()
        .position(|h| *h == column)
        .ok_or_else(|| CdakitError::MissingColumn {
            column: column.clone(),
            path: uniqfile.display().to_string(),
        })?;

    Ok(rows
        .iter()
        .filter(|row| row.get(col).map(|v| v == "true").unwrap_or(false))
        .filter_map(|row| row.first().cloned())
        .collect())
}

/// 单个结构：stem 子目录下写四件套
fn prepare_one(args: &PrepVaspArgs, outdir: &Path, incar: &str, file: &Path) -> Result<()> {
    let crystal = parse_poscar_file(file)?;
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "structure".to_string());

    let calcdir = outdir.join(&stem);
    fs::create_dir_all(&calcdir).map_err(|e| CdakitError::FileWriteError {
        path: calcdir.display().to_string(),
        source: e,
    })?;

    write_file(&calcdir.join("POSCAR"), &to_poscar_string(&crystal))?;
    write_file(&calcdir.join("INCAR"), incar)?;
    if args.kspacing.is_none() {
        write_file(&calcdir.join("KPOINTS"), KPOINTS_AUTO)?;
    }

    match &args.pspdir {
        Some(pspdir) => {
            let species: Vec<String> = crystal
                .species_counts()
                .into_iter()
                .map(|(el, _)| el)
                .collect();
            let potcar = concat_potcar(pspdir, &species)?;
            write_file(&calcdir.join("POTCAR"), &potcar)?;
        }
        None => output::print_warning(&format!(
            "no pseudopotential directory given, POTCAR skipped for '{}'",
            file.display()
        )),
    }

    Ok(())
}

/// 全自动 k 网格，KSPACING 未设置时使用
const KPOINTS_AUTO: &str = "Automatic mesh\n0\nAuto\n30\n";

fn incar_text(args: &PrepVaspArgs) -> String {
    let mut lines = vec![
        "LREAL = .FALSE.".to_string(),
        "ISMEAR = 0".to_string(),
        "NCORE = 4".to_string(),
        format!("NSW = {}", args.nsw),
        format!("PSTRESS = {}", args.pstress),
        format!("ISYM = {}", args.sym),
    ];
    if args.nsw > 1 {
        lines.push("IBRION = 2".to_string());
        lines.push("ISIF = 3".to_string());
    }
    if let Some(ediff) = args.ediff {
        lines.push(format!("EDIFF = {}", ediff));
    }
    if let Some(ediffg) = args.ediffg {
        lines.push(format!("EDIFFG = {}", ediffg));
    }
    if let Some(kspacing) = args.kspacing {
        lines.push(format!("KSPACING = {}", kspacing));
    }
    lines.join("\n") + "\n"
}

/// 按 POSCAR 物种顺序拼接 <pspdir>/<El>/POTCAR；
/// 缺失时回退 <El>_sv 变体并告警
fn concat_potcar(pspdir: &Path, species: &[String]) -> Result<String> {
    let mut potcar = String::new();
    for el in species {
        let f_psp = pspdir.join(el).join("POTCAR");
        let f_psp = if f_psp.is_file() {
            f_psp
        } else {
            let alt = pspdir.join(format!("{}_sv", el)).join("POTCAR");
            if alt.is_file() {
                output::print_warning(&format!("using {}_sv pseudopotential for {}", el, el));
                alt
            } else {
                return Err(CdakitError::FileNotFound {
                    path: f_psp.display().to_string(),
                });
            }
        };
        let block = fs::read_to_string(&f_psp).map_err(|e| CdakitError::FileReadError {
            path: f_psp.display().to_string(),
            source: e,
        })?;
        potcar.push_str(&block);
    }
    Ok(potcar)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| CdakitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
