//! # VASP OUTCAR 解析器
//!
//! 按关键行扫描 OUTCAR，提取逐离子步能量/体积/压力序列与收敛标志。
//!
//! ## 依赖关系
//! - 被 `commands/outcar.rs` 使用
//! - 使用 `models/relaxation.rs`

use crate::error::{CdakitError, Result};
use crate::models::{IonStep, RelaxationLog};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// 解析单个 OUTCAR 文件为弛豫序列
pub fn parse_outcar(path: &Path) -> Result<RelaxationLog> {
    let file = File::open(path).map_err(|e| CdakitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let mut energies: Vec<f64> = Vec::new();
    let mut volumes: Vec<f64> = Vec::new();
    let mut pv_terms: Vec<f64> = Vec::new();
    let mut ext_pressures: Vec<f64> = Vec::new();
    let mut converge = false;
    let mut cputime: Option<f64> = None;
    let mut natoms: Option<usize> = None;
    let mut formula: Option<String> = None;

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.contains("NIONS") {
            // "... number of ions     NIONS =      8"
            if let Some(n) = last_token::<usize>(&line) {
                natoms = Some(n);
            }
        } else if line.contains("POSCAR =") {
            // "POSCAR = Mg O" -> 化学式去空格
            if let Some(pos) = line.find("POSCAR =") {
                let f: String = line[pos + 8..].split_whitespace().collect();
                if !f.is_empty() {
                    formula = Some(f);
                }
            }
        } else if line.contains("energy  without") {
            // " energy  without entropy= ... energy(sigma->0) = ..."
            if let Some(e) = last_token::<f64>(&line) {
                energies.push(e);
            }
        } else if line.contains("P V=") {
            if let Some(pv) = last_token::<f64>(&line) {
                pv_terms.push(pv);
            }
        } else if line.contains("volume of cell") {
            if let Some(v) = last_token::<f64>(&line) {
                volumes.push(v);
            }
        } else if line.contains("external pressure") {
            // "  external pressure =   -0.04 kB  Pullay stress = ..."
            if let Some(p) = line
                .split_whitespace()
                .nth(3)
                .and_then(|s| s.parse().ok())
            {
                ext_pressures.push(p);
            }
        } else if line.contains("reached required") {
            converge = true;
        } else if line.contains("CPU") {
            if let Some(t) = last_token::<f64>(&line) {
                cputime = Some(t);
            }
        }
    }

    let steps = if energies.is_empty() {
        vec![IonStep {
            energy: None,
            volume: None,
            pv: 0.0,
            ext_pressure: None,
            converge: false,
        }]
    } else {
        // 首个 "volume of cell" 是初始胞的重复值
        let volumes: &[f64] = volumes.get(1..).unwrap_or(&[]);
        let n = energies.len();
        (0..n)
            .map(|i| IonStep {
                energy: Some(energies[i]),
                volume: volumes.get(i).copied(),
                pv: pv_terms.get(i).copied().unwrap_or(0.0),
                ext_pressure: ext_pressures.get(i).copied(),
                converge: converge && i == n - 1,
            })
            .collect()
    };

    Ok(RelaxationLog {
        formula,
        natoms,
        cputime,
        steps,
    })
}

/// 行末 token 解析
fn last_token<T: std::str::FromStr>(line: &str) -> Option<T> {
    line.split_whitespace().last()?.parse().ok()
}
