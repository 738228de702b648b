//! # standardize 命令实现
//!
//! 对单个结构文件在多个容差下做标准化，惯用胞与原胞各写一份。
//!
//! ## 输出
//! - `<file>.std/<tol>/<stem>.ucell.vasp` 惯用标准化胞
//! - `<file>.std/<tol>/<stem>.pcell.vasp` 原胞标准化胞
//!
//! ## 依赖关系
//! - 使用 `cli/standardize.rs` 定义的参数
//! - 使用 `symmetry/`, `parsers/poscar.rs`
//! - 使用 `utils/output.rs`

use crate::cli::standardize::StandardizeArgs;
use crate::error::{CdakitError, Result};
use crate::models::Crystal;
use crate::parsers::poscar::{parse_poscar_file, to_poscar_string};
use crate::symmetry;
use crate::utils::output;

use std::fs;
use std::path::Path;

/// spglib 习惯的默认角度容差
const ANGLE_TOLERANCE_DEG: f64 = 10.0;

/// 执行 standardize 命令
pub fn execute(args: StandardizeArgs, verbose: u8) -> Result<()> {
    output::print_header("Standardizing Cell");

    if !args.vaspfile.is_file() {
        return Err(CdakitError::FileNotFound {
            path: args.vaspfile.display().to_string(),
        });
    }

    let crystal = parse_poscar_file(&args.vaspfile)?;
    output::print_debug(verbose, &format!("formula: {}", crystal.formula()));

    let stem = args
        .vaspfile
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "structure".to_string());
    let std_root = args
        .vaspfile
        .with_file_name(format!("{}.std", args.vaspfile.file_name().unwrap_or_default().to_string_lossy()));

    for &symprec in &args.symprec {
        let std_dir = std_root.join(format!("{}", symprec));
        fs::create_dir_all(&std_dir).map_err(|e| CdakitError::FileWriteError {
            path: std_dir.display().to_string(),
            source: e,
        })?;

        let (ucell, pcell) = match symmetry::detect(&crystal, symprec, ANGLE_TOLERANCE_DEG)? {
            Some(ds) => (ds.std_cell, ds.prim_std_cell),
            None => {
                output::print_warning(&format!(
                    "{} cannot find standard cell under symprec={}, using itself to replace",
                    args.vaspfile.display(),
                    symprec
                ));
                (crystal.clone(), crystal.clone())
            }
        };

        write_cell(&std_dir, &stem, "ucell", &ucell)?;
        write_cell(&std_dir, &stem, "pcell", &pcell)?;
    }

    output::print_done(&format!(
        "Standardized cells written under '{}'",
        std_root.display()
    ));
    Ok(())
}

fn write_cell(std_dir: &Path, stem: &str, tag: &str, cell: &Crystal) -> Result<()> {
    let path = std_dir.join(format!("{}.{}.vasp", stem, tag));
    fs::write(&path, to_poscar_string(cell)).map_err(|e| CdakitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BCC: &str = r#"Fe
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
2
Direct
0.0 0.0 0.0
0.5 0.5 0.5
"#;

    #[test]
    fn test_standardize_writes_ucell_and_pcell() {
        let dir = tempfile::tempdir().unwrap();
        let vaspfile = dir.path().join("fe.vasp");
        std::fs::File::create(&vaspfile)
            .unwrap()
            .write_all(BCC.as_bytes())
            .unwrap();

        let args = StandardizeArgs {
            vaspfile: vaspfile.clone(),
            symprec: vec![0.1, 0.01],
        };
        execute(args, 0).unwrap();

        for tol in ["0.1", "0.01"] {
            let std_dir = dir.path().join("fe.vasp.std").join(tol);
            let ucell = parse_poscar_file(&std_dir.join("fe.ucell.vasp")).unwrap();
            let pcell = parse_poscar_file(&std_dir.join("fe.pcell.vasp")).unwrap();
            // bcc Fe: 惯用胞 2 原子，原胞 1 原子
            assert_eq!(ucell.atoms.len(), 2);
            assert_eq!(pcell.atoms.len(), 1);
        }
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let args = StandardizeArgs {
            vaspfile: dir.path().join("nope.vasp"),
            symprec: vec![0.1],
        };
        assert!(execute(args, 0).is_err());
    }
}
