//! # 空间群识别结果数据模型
//!
//! 每个结构文件对应一条 `StructureRecord`，每个容差对应一个固定形状的
//! `SymmetryResult`，汇总为 `SpgTable` 排序输出。
//!
//! ## 依赖关系
//! - 被 `commands/findspg.rs` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 容差标签，用于表头与 std_<tol> 目录命名
pub fn format_tolerance(symprec: f64) -> String {
    format!("{:.0e}", symprec)
}

/// 单个容差下的空间群识别结果（识别失败时为哨兵值）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymmetryResult {
    /// 空间群号（无法识别时为 0）
    pub number: i32,

    /// 国际符号（无法识别时为 "-"）
    pub symbol: String,

    /// 标准化胞原子数（无法识别时为 0）
    pub std_natoms: usize,

    /// 标准化胞的 CIF 序列化
    pub std_cif: String,

    /// 标准化胞的 POSCAR 序列化
    pub std_poscar: String,
}

impl SymmetryResult {
    /// 识别失败的哨兵结果，两种序列化形式退回原始结构
    pub fn sentinel(orig_cif: String, orig_poscar: String) -> Self {
        SymmetryResult {
            number: 0,
            symbol: "-".to_string(),
            std_natoms: 0,
            std_cif: orig_cif,
            std_poscar: orig_poscar,
        }
    }
}

/// 一个输入结构文件的识别记录，创建后不再修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureRecord {
    /// 文件名
    pub name: String,

    /// 化学式
    pub formula: String,

    /// 发现顺序（排序前的行号）
    pub index: usize,

    /// 容差 -> 结果，按容差从松到严排列
    pub results: Vec<(f64, SymmetryResult)>,
}

impl StructureRecord {
    /// 是否在任一容差下识别出非平凡对称性（空间群号 > 1）
    pub fn has_nontrivial_symmetry(&self) -> bool {
        self.results.iter().any(|(_, r)| r.number > 1)
    }

    /// 排序键：各容差下的空间群号，松容差在前
    fn sort_key(&self) -> Vec<i32> {
        self.results.iter().map(|(_, r)| r.number).collect()
    }
}

/// 识别结果汇总表
#[derive(Debug, Default)]
pub struct SpgTable {
    pub records: Vec<StructureRecord>,
}

impl SpgTable {
    pub fn new(records: Vec<StructureRecord>) -> Self {
        SpgTable { records }
    }

    /// 按空间群号降序排序，最松容差为主键，依次向严容差破平
    pub fn sort(&mut self) {
        self.records
            .sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    }

    /// 汇总表表头（不含大体积序列化列）
    pub fn header(symprec_list: &[f64]) -> Vec<String> {
        let mut header = vec![
            "index".to_string(),
            "name".to_string(),
            "formula".to_string(),
        ];
        for &symprec in symprec_list {
            let label = format_tolerance(symprec);
            header.push(label.clone());
            header.push(format!("{}_symbol", label));
            header.push(format!("{}_std_natoms", label));
        }
        header
    }

    /// 汇总表数据行
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|rec| {
                let mut row = vec![rec.index.to_string(), rec.name.clone(), rec.formula.clone()];
                for (_, result) in &rec.results {
                    row.push(result.number.to_string());
                    row.push(result.symbol.clone());
                    row.push(result.std_natoms.to_string());
                }
                row
            })
            .collect()
    }
}
