//! # 空间群识别封装
//!
//! 将 `moyo` 的数据集接口封装为晶体模型上的识别/标准化操作。
//! 识别算法本身完全委托给 `moyo`，本模块只做类型转换。
//!
//! ## 依赖关系
//! - 被 `commands/findspg.rs`, `commands/standardize.rs` 使用
//! - 使用 `models/structure.rs`
//! - 使用 `moyo`, `nalgebra`

use crate::error::Result;
use crate::models::structure::{element_symbol, Atom, Crystal, Lattice};

use moyo::base::{AngleTolerance, Cell as MoyoCell, Lattice as MoyoLattice};
use moyo::data::{hall_symbol_entry, Setting};
use moyo::MoyoDataset;
use nalgebra::{Matrix3, Vector3};

/// 识别结果：空间群号、国际符号与两种标准化胞
#[derive(Debug, Clone)]
pub struct SpgDataset {
    /// 空间群号 (1-230)
    pub number: i32,

    /// 国际符号（Hermann-Mauguin 短符号，去空格）
    pub symbol: String,

    /// 惯用标准化胞
    pub std_cell: Crystal,

    /// 原胞标准化胞
    pub prim_std_cell: Crystal,
}

/// 在给定容差下识别空间群
///
/// 识别失败（该容差下无对称性）返回 `Ok(None)`，调用方按哨兵值处理；
/// 未知元素符号等结构本身的问题返回 `Err`。
pub fn detect(
    crystal: &Crystal,
    symprec: f64,
    angle_tolerance_deg: f64,
) -> Result<Option<SpgDataset>> {
    let cell = to_moyo_cell(crystal)?;
    let angle_tolerance = AngleTolerance::Radian(angle_tolerance_deg.to_radians());

    let dataset = match MoyoDataset::new(&cell, symprec, angle_tolerance, Setting::Spglib) {
        Ok(ds) => ds,
        Err(_) => return Ok(None),
    };

    let symbol = hall_symbol_entry(dataset.hall_number)
        .map(|entry| entry.hm_short.replace(' ', ""))
        .unwrap_or_else(|| format!("#{}", dataset.number));

    Ok(Some(SpgDataset {
        number: dataset.number,
        symbol,
        std_cell: from_moyo_cell(&dataset.std_cell, &crystal.name),
        prim_std_cell: from_moyo_cell(&dataset.prim_std_cell, &crystal.name),
    }))
}

fn to_moyo_cell(crystal: &Crystal) -> Result<MoyoCell> {
    let m = crystal.lattice.matrix;
    let basis = Matrix3::new(
        m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
    );
    let positions: Vec<Vector3<f64>> = crystal
        .atoms
        .iter()
        .map(|a| Vector3::new(a.position[0], a.position[1], a.position[2]))
        .collect();
    let numbers = crystal.atomic_numbers()?;

    Ok(MoyoCell::new(MoyoLattice::new(basis), positions, numbers))
}

fn from_moyo_cell(cell: &MoyoCell, name: &str) -> Crystal {
    let basis = cell.lattice.basis;
    let matrix = [
        [basis[(0, 0)], basis[(0, 1)], basis[(0, 2)]],
        [basis[(1, 0)], basis[(1, 1)], basis[(1, 2)]],
        [basis[(2, 0)], basis[(2, 1)], basis[(2, 2)]],
    ];
    let atoms: Vec<Atom> = cell
        .positions
        .iter()
        .zip(cell.numbers.iter())
        .map(|(p, &z)| Atom::new(element_symbol(z).unwrap_or("X"), [p[0], p[1], p[2]]))
        .collect();

    Crystal::new(name, Lattice::from_vectors(matrix), atoms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rock_salt() -> Crystal {
        let lattice =
            Lattice::from_vectors([[5.64, 0.0, 0.0], [0.0, 5.64, 0.0], [0.0, 0.0, 5.64]]);
        let atoms = vec![
            Atom::new("Na", [0.0, 0.0, 0.0]),
            Atom::new("Na", [0.5, 0.5, 0.0]),
            Atom::new("Na", [0.5, 0.0, 0.5]),
            Atom::new("Na", [0.0, 0.5, 0.5]),
            Atom::new("Cl", [0.5, 0.0, 0.0]),
            Atom::new("Cl", [0.0, 0.5, 0.0]),
            Atom::new("Cl", [0.0, 0.0, 0.5]),
            Atom::new("Cl", [0.5, 0.5, 0.5]),
        ];
        Crystal::new("NaCl", lattice, atoms)
    }

    fn triclinic() -> Crystal {
        let lattice = Lattice::from_vectors([[5.0, 0.0, 0.0], [0.3, 6.0, 0.0], [0.2, 0.4, 7.0]]);
        let atoms = vec![
            Atom::new("Na", [0.0, 0.0, 0.0]),
            Atom::new("Na", [0.123, 0.234, 0.345]),
            Atom::new("Cl", [0.456, 0.567, 0.678]),
        ];
        Crystal::new("generic", lattice, atoms)
    }

    #[test]
    fn test_detect_rock_salt() {
        let ds = detect(&rock_salt(), 0.1, 10.0).unwrap().unwrap();
        assert_eq!(ds.number, 225);
        assert_eq!(ds.std_cell.atoms.len(), 8);
        assert!(!ds.prim_std_cell.atoms.is_empty());
        assert!(ds.prim_std_cell.atoms.len() <= ds.std_cell.atoms.len());
    }

    #[test]
    fn test_detect_triclinic_is_p1() {
        let ds = detect(&triclinic(), 0.01, 10.0).unwrap().unwrap();
        assert_eq!(ds.number, 1);
    }

    #[test]
    fn test_detect_unknown_element_is_error() {
        let lattice = Lattice::from_vectors([[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]]);
        let crystal = Crystal::new("bad", lattice, vec![Atom::new("Qq", [0.0, 0.0, 0.0])]);
        assert!(detect(&crystal, 0.1, 10.0).is_err());
    }
}
