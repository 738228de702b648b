//! # calypso 命令实现
//!
//! 为每个 POSCAR 生成 CALYPSO 输入 input.dat，调用外部搜索程序
//! （限时），成功后把产生的 POSCAR_<i> 种群拆分到 calc/<i>/ 子目录。
//!
//! 超时或非零退出只影响当前目录（记错误日志后继续），其余目录照常。
//!
//! ## 依赖关系
//! - 使用 `cli/calypso.rs` 定义的参数
//! - 使用 `parsers/poscar.rs`, `parsers/potcar.rs`
//! - 使用 `batch/`, `utils/output.rs`
//! - 使用 `wait_timeout` 限制子进程运行时间

use crate::batch::{BatchRunner, FileCollector};
use crate::cli::calypso::CalypsoArgs;
use crate::error::{CdakitError, Result};
use crate::models::Crystal;
use crate::parsers::poscar::parse_poscar_file;
use crate::parsers::potcar::{parse_potcar, PotcarEntry};
use crate::utils::output;

use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Bohr -> Å
const BOHR_TO_ANGSTROM: f64 = 0.529177;

/// 随 POSCAR 一起带入搜索目录的输入文件
const COMPANION_FILES: [&str; 3] = ["INCAR", "POTCAR", "KPOINTS"];

/// 执行 calypso 命令
pub fn execute(args: CalypsoArgs, jobs: usize, verbose: u8) -> Result<()> {
    output::print_header("Preparing CALYPSO Searches");

    if !args.indir.is_dir() {
        return Err(CdakitError::DirectoryNotFound {
            path: args.indir.display().to_string(),
        });
    }
    if args.calypsotimeout <= 0.0 {
        return Err(CdakitError::InvalidArgument(format!(
            "calypsotimeout must be positive, got {}",
            args.calypsotimeout
        )));
    }

    let files = FileCollector::new(&args.indir)
        .with_pattern("POSCAR")
        .recursive(true)
        .collect();
    if files.is_empty() {
        output::print_warning(&format!("No POSCAR found under '{}'", args.indir.display()));
        return Ok(());
    }

    let runner = BatchRunner::new(jobs);
    runner.run(&files, "CALYPSO", |fposcar| {
        prepare_one(&args, fposcar, verbose)
    })?;

    output::print_done(&format!("{} search directories processed", files.len()));
    Ok(())
}

/// 处理单个 POSCAR 目录
fn prepare_one(args: &CalypsoArgs, fposcar: &Path, verbose: u8) -> Result<()> {
    let indir_name = args
        .indir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "search".to_string());
    let outdir = args.indir.with_file_name(format!("{}.calypso", indir_name));

    let src_dir = fposcar.parent().unwrap_or_else(|| Path::new("."));
    let rel = src_dir.strip_prefix(&args.indir).unwrap_or_else(|_| Path::new(""));
    let calypsodir = outdir.join(rel);
    output::print_debug(verbose, &format!("calypsodir: {}", calypsodir.display()));

    fs::create_dir_all(&calypsodir).map_err(|e| CdakitError::FileWriteError {
        path: calypsodir.display().to_string(),
        source: e,
    })?;

    let poscar = parse_poscar_file(fposcar)?;
    let potcar = parse_potcar(&fposcar.with_file_name("POTCAR"))?;
    let deck = input_dat(&poscar, &potcar, args.dist_ratio, args.popsize)?;

    let f_input = calypsodir.join("input.dat");
    fs::write(&f_input, deck).map_err(|e| CdakitError::FileWriteError {
        path: f_input.display().to_string(),
        source: e,
    })?;

    for name in COMPANION_FILES {
        let src = fposcar.with_file_name(name);
        if fs::copy(&src, calypsodir.join(name)).is_err() {
            output::print_warning(&format!("{} not found", src.display()));
        }
    }

    // 旧的断点文件会让 CALYPSO 认为是续算
    let _ = fs::remove_file(calypsodir.join("step"));

    run_calypso(args, &calypsodir)
}

/// 运行外部搜索程序并在成功时拆分种群
fn run_calypso(args: &CalypsoArgs, calypsodir: &Path) -> Result<()> {
    let log_path = calypsodir.join("caly.log");
    let log = File::create(&log_path).map_err(|e| CdakitError::FileWriteError {
        path: log_path.display().to_string(),
        source: e,
    })?;
    let log_err = log.try_clone().map_err(|e| CdakitError::FileWriteError {
        path: log_path.display().to_string(),
        source: e,
    })?;

    let mut child = Command::new(&args.calypsocmd)
        .current_dir(calypsodir)
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err))
        .spawn()
        .map_err(|_| CdakitError::CommandNotFound {
            command: args.calypsocmd.clone(),
        })?;

    let timeout = Duration::from_secs_f64(args.calypsotimeout);
    let status = child
        .wait_timeout(timeout)
        .map_err(|e| CdakitError::CommandFailed {
            command: args.calypsocmd.clone(),
            stderr: e.to_string(),
        })?;

    match status {
        None => {
            child.kill().ok();
            child.wait().ok();
            output::print_error(&format!("CALYPSO failed in '{}'", calypsodir.display()));
        }
        Some(status) if !status.success() => {
            output::print_error(&format!(
                "Calling {} failed in '{}'",
                args.calypsocmd,
                calypsodir.display()
            ));
        }
        Some(_) => split_population(calypsodir, args.popsize)?,
    }

    // CALYPSO 会在工作目录丢下辅助脚本
    for pyfile in FileCollector::new(calypsodir).with_pattern("*.py").collect() {
        let _ = fs::remove_file(pyfile);
    }

    Ok(())
}

/// 把 POSCAR_1..popsize 移入 calc/<i>/POSCAR，并复制输入文件
fn split_population(calypsodir: &Path, popsize: usize) -> Result<()> {
    for popi in 1..=popsize {
        let calcdir = calypsodir.join("calc").join(popi.to_string());
        fs::create_dir_all(&calcdir).map_err(|e| CdakitError::FileWriteError {
            path: calcdir.display().to_string(),
            source: e,
        })?;

        let src = calypsodir.join(format!("POSCAR_{}", popi));
        if !src.is_file() {
            return Err(CdakitError::FileNotFound {
                path: src.display().to_string(),
            });
        }
        let dest = calcdir.join("POSCAR");
        fs::rename(&src, &dest).map_err(|e| CdakitError::FileWriteError {
            path: dest.display().to_string(),
            source: e,
        })?;

        for name in COMPANION_FILES {
            let _ = fs::copy(calypsodir.join(name), calcdir.join(name));
        }
    }
    Ok(())
}

/// 生成 input.dat 文本，DistanceOfIon 由 RCORE 两两求和换算
fn input_dat(
    poscar: &Crystal,
    potcar: &[PotcarEntry],
    dist_ratio: f64,
    popsize: usize,
) -> Result<String> {
    let species = poscar.species_counts();
    if species.len() != potcar.len() {
        return Err(CdakitError::InvalidArgument(format!(
            "POSCAR has {} species but POTCAR has {} blocks",
            species.len(),
            potcar.len()
        )));
    }

    let mut distmat = String::new();
    for a in potcar {
        let row: Vec<String> = potcar
            .iter()
            .map(|b| {
                format!(
                    "{:.6}",
                    (a.rcore + b.rcore) * BOHR_TO_ANGSTROM * dist_ratio
                )
            })
            .collect();
        distmat.push_str(&row.join(" "));
        distmat.push('\n');
    }

    let names: Vec<&str> = species.iter().map(|(s, _)| s.as_str()).collect();
    let counts: Vec<String> = species.iter().map(|(_, n)| n.to_string()).collect();

    Ok(format!(
        "SystemName = {}\n\
         NumberOfSpecies = {}\n\
         NameOfAtoms = {}\n\
         NumberOfAtoms = {}\n\
         NumberOfFormula = 1 1\n\
         Volume = {:.6}\n\
         @DistanceOfIon\n\
         {}\
         @End\n\
         Ialgo = 2\n\
         PsoRatio = 0.6\n\
         PopSize = {}\n\
         ICode = 15\n\
         NumberOfLbest = 4\n\
         NumberOfLocalOptim = 3\n\
         Command = sh submit.sh\n\
         MaxStep = 5\n\
         PickUp = F\n\
         PickStep = 5\n\
         Parallel = F\n\
         Split = T\n",
        names.join(""),
        species.len(),
        names.join(" "),
        counts.join(" "),
        poscar.lattice.volume(),
        distmat,
        popsize,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};

    fn mgo() -> Crystal {
        let lattice = Lattice::from_vectors([[4.2, 0.0, 0.0], [0.0, 4.2, 0.0], [0.0, 0.0, 4.2]]);
        let atoms = vec![
            Atom::new("Mg", [0.0, 0.0, 0.0]),
            Atom::new("Mg", [0.5, 0.5, 0.0]),
            Atom::new("O", [0.5, 0.0, 0.0]),
            Atom::new("O", [0.0, 0.5, 0.0]),
        ];
        Crystal::new("MgO", lattice, atoms)
    }

    fn potcar() -> Vec<PotcarEntry> {
        vec![
            PotcarEntry {
                symbol: "Mg".to_string(),
                rcore: 2.0,
            },
            PotcarEntry {
                symbol: "O".to_string(),
                rcore: 1.52,
            },
        ]
    }

    #[test]
    fn test_input_dat_content() {
        let deck = input_dat(&mgo(), &potcar(), 0.7, 10).unwrap();

        assert!(deck.contains("SystemName = MgO\n"));
        assert!(deck.contains("NumberOfSpecies = 2\n"));
        assert!(deck.contains("NameOfAtoms = Mg O\n"));
        assert!(deck.contains("NumberOfAtoms = 2 2\n"));
        assert!(deck.contains("PopSize = 10\n"));
        assert!(deck.contains("@DistanceOfIon\n"));
        // (2.0 + 2.0) * 0.529177 * 0.7 = 1.481696
        assert!(deck.contains("1.481696"));
        // (2.0 + 1.52) * 0.529177 * 0.7 = 1.303892
        assert!(deck.contains("1.303892"));
    }

    #[test]
    fn test_input_dat_species_mismatch() {
        let one = vec![PotcarEntry {
            symbol: "Mg".to_string(),
            rcore: 2.0,
        }];
        assert!(input_dat(&mgo(), &one, 0.7, 10).is_err());
    }

    #[test]
    fn test_split_population() {
        let dir = tempfile::tempdir().unwrap();
        for i in 1..=3 {
            std::fs::write(dir.path().join(format!("POSCAR_{}", i)), "cell\n").unwrap();
        }
        std::fs::write(dir.path().join("INCAR"), "NSW = 0\n").unwrap();

        split_population(dir.path(), 3).unwrap();

        for i in 1..=3 {
            let calcdir = dir.path().join("calc").join(i.to_string());
            assert!(calcdir.join("POSCAR").is_file());
            assert!(calcdir.join("INCAR").is_file());
            assert!(!dir.path().join(format!("POSCAR_{}", i)).exists());
        }
    }

    #[test]
    fn test_split_population_missing_member_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("POSCAR_1"), "cell\n").unwrap();
        assert!(split_population(dir.path(), 2).is_err());
    }
}
