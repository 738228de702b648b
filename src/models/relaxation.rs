//! # 弛豫日志数据模型
//!
//! OUTCAR 逐离子步序列与单文件收敛汇总。
//!
//! ## 依赖关系
//! - 被 `parsers/outcar.rs`, `commands/outcar.rs` 使用
//! - 通过 `serde`/`bincode` 序列化到 parsed_outcar.bin

use serde::{Deserialize, Serialize};

/// 单个离子步
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IonStep {
    /// 无熵能量 (eV)，日志残缺时为 None
    pub energy: Option<f64>,

    /// 胞体积 (Å³)
    pub volume: Option<f64>,

    /// PV 项 (eV)，恒压弛豫之外为 0
    pub pv: f64,

    /// 外压 (kbar)
    pub ext_pressure: Option<f64>,

    /// 该步之后是否达到收敛判据（只有末步可能为 true）
    pub converge: bool,
}

impl IonStep {
    /// 焓 = 能量 + PV
    pub fn enthalpy(&self) -> Option<f64> {
        self.energy.map(|e| e + self.pv)
    }
}

/// 单个 OUTCAR 解析出的弛豫序列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxationLog {
    /// POSCAR 注释行给出的化学式
    pub formula: Option<String>,

    /// 原子数 (NIONS)
    pub natoms: Option<usize>,

    /// 总 CPU 时间 (s)
    pub cputime: Option<f64>,

    /// 逐离子步序列，至少一个元素
    pub steps: Vec<IonStep>,
}

/// 单文件收敛汇总行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxationSummary {
    pub formula: Option<String>,
    pub converged: bool,
    /// 首步焓 - 末步焓
    pub decreased_enthalpy: Option<f64>,
    pub ion_steps: usize,
    pub natoms: Option<usize>,
}

impl RelaxationLog {
    pub fn summary(&self) -> RelaxationSummary {
        let first = self.steps.first().and_then(|s| s.enthalpy());
        let last = self.steps.last().and_then(|s| s.enthalpy());
        RelaxationSummary {
            formula: self.formula.clone(),
            converged: self.steps.last().map(|s| s.converge).unwrap_or(false),
            decreased_enthalpy: match (first, last) {
                (Some(f), Some(l)) => Some(f - l),
                _ => None,
            },
            ion_steps: self.steps.len(),
            natoms: self.natoms,
        }
    }
}

impl RelaxationSummary {
    pub fn decreased_enthalpy_per_atom(&self) -> Option<f64> {
        match (self.decreased_enthalpy, self.natoms) {
            (Some(d), Some(n)) if n > 0 => Some(d / n as f64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(energy: f64, pv: f64, converge: bool) -> IonStep {
        IonStep {
            energy: Some(energy),
            volume: Some(100.0),
            pv,
            ext_pressure: Some(0.0),
            converge,
        }
    }

    #[test]
    fn test_enthalpy() {
        assert!((step(-10.0, 2.0, false).enthalpy().unwrap() - (-8.0)).abs() < 1e-12);
    }

    #[test]
    fn test_summary_decreased_enthalpy() {
        let log = RelaxationLog {
            formula: Some("Mg2".to_string()),
            natoms: Some(2),
            cputime: Some(12.0),
            steps: vec![step(-9.0, 0.0, false), step(-10.0, 0.0, true)],
        };
        let summary = log.summary();
        assert!(summary.converged);
        assert!((summary.decreased_enthalpy.unwrap() - 1.0).abs() < 1e-12);
        assert!((summary.decreased_enthalpy_per_atom().unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(summary.ion_steps, 2);
    }

    #[test]
    fn test_summary_missing_energy() {
        let log = RelaxationLog {
            formula: None,
            natoms: None,
            cputime: None,
            steps: vec![IonStep {
                energy: None,
                volume: None,
                pv: 0.0,
                ext_pressure: None,
                converge: false,
            }],
        };
        let summary = log.summary();
        assert!(!summary.converged);
        assert!(summary.decreased_enthalpy.is_none());
        assert!(summary.decreased_enthalpy_per_atom().is_none());
    }
}
