//! # CIF 写出器
//!
//! 将 Crystal 序列化为晶体学交换格式 (CIF) 文本。只写出，不解析。
//!
//! ## 依赖关系
//! - 被 `commands/findspg.rs` 使用
//! - 使用 `models/structure.rs`

use crate::models::Crystal;

/// 将 Crystal 序列化为 CIF 格式字符串（P1 设置，分数坐标）
pub fn to_cif_string(crystal: &Crystal) -> String {
    let (a, b, c, alpha, beta, gamma) = crystal.lattice.parameters();

    let mut cif = String::new();
    cif.push_str(&format!("data_{}\n", sanitize(&crystal.name)));
    cif.push_str(&format!("_chemical_formula_sum   '{}'\n", crystal.formula()));
    cif.push_str(&format!("_cell_length_a       {:.6}\n", a));
    cif.push_str(&format!("_cell_length_b       {:.6}\n", b));
    cif.push_str(&format!("_cell_length_c       {:.6}\n", c));
    cif.push_str(&format!("_cell_angle_alpha    {:.6}\n", alpha));
    cif.push_str(&format!("_cell_angle_beta     {:.6}\n", beta));
    cif.push_str(&format!("_cell_angle_gamma    {:.6}\n", gamma));
    cif.push_str(&format!("_cell_volume         {:.6}\n", crystal.lattice.volume()));
    cif.push_str("_space_group_name_H-M_alt    'P 1'\n");
    cif.push_str("_space_group_IT_number       1\n");
    cif.push_str("loop_\n");
    cif.push_str(" _atom_site_type_symbol\n");
    cif.push_str(" _atom_site_label\n");
    cif.push_str(" _atom_site_fract_x\n");
    cif.push_str(" _atom_site_fract_y\n");
    cif.push_str(" _atom_site_fract_z\n");

    let mut label_counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for atom in &crystal.atoms {
        let n = label_counts.entry(atom.element.as_str()).or_insert(0);
        *n += 1;
        cif.push_str(&format!(
            " {}  {}{}  {:.6}  {:.6}  {:.6}\n",
            atom.element, atom.element, n, atom.position[0], atom.position[1], atom.position[2]
        ));
    }

    cif
}

/// CIF data 块名中不允许空白
fn sanitize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};

    #[test]
    fn test_to_cif() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        let atoms = vec![
            Atom::new("Na", [0.0, 0.0, 0.0]),
            Atom::new("Cl", [0.5, 0.5, 0.5]),
        ];
        let crystal = Crystal::new("rock salt", lattice, atoms);
        let cif = to_cif_string(&crystal);

        assert!(cif.starts_with("data_rock_salt\n"));
        assert!(cif.contains("_cell_length_a       4.000000"));
        assert!(cif.contains("_cell_volume         64.000000"));
        assert!(cif.contains(" Na  Na1  0.000000  0.000000  0.000000"));
        assert!(cif.contains(" Cl  Cl1  0.500000  0.500000  0.500000"));
    }
}
