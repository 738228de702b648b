//! # 结构匹配模块
//!
//! 在三档容差预设（loose/medium/strict）下判断候选结构与目标结构的
//! 几何等价性，并给出归一化 RMS 位移。匹配只在约化化学式和原子数一致
//! 时进行：先比较体积归一化后的晶格参数，再对分数坐标做平移扫描 +
//! 最小镜像贪心配对。
//!
//! ## 依赖关系
//! - 被 `commands/matchtarget.rs` 使用
//! - 使用 `models/structure.rs`

use crate::models::Crystal;

/// 匹配容差预设
#[derive(Debug, Clone, Copy)]
pub struct MatcherPreset {
    /// 列名前缀: matcher_lo / matcher_md / matcher_st
    pub name: &'static str,

    /// 晶格长度相对容差
    pub ltol: f64,

    /// 归一化位点距离容差
    pub stol: f64,

    /// 晶格角度容差（度）
    pub angle_tol: f64,
}

/// 固定的三档预设，从松到严
pub const PRESETS: [MatcherPreset; 3] = [
    MatcherPreset {
        name: "matcher_lo",
        ltol: 0.3,
        stol: 0.5,
        angle_tol: 10.0,
    },
    MatcherPreset {
        name: "matcher_md",
        ltol: 0.2,
        stol: 0.3,
        angle_tol: 5.0,
    },
    MatcherPreset {
        name: "matcher_st",
        ltol: 0.1,
        stol: 0.2,
        angle_tol: 5.0,
    },
];

/// 单次匹配结果
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// 是否匹配
    pub fit: bool,

    /// 归一化 RMS 位移（不匹配时为 None）
    pub norm_rms: Option<f64>,

    /// 归一化最大位移（不匹配时为 None）
    pub max_rms: Option<f64>,
}

impl MatchOutcome {
    fn unfit() -> Self {
        MatchOutcome {
            fit: false,
            norm_rms: None,
            max_rms: None,
        }
    }
}

/// 在给定预设下匹配候选结构与目标结构
pub fn fit_structures(target: &Crystal, candidate: &Crystal, preset: &MatcherPreset) -> MatchOutcome {
    if target.atoms.is_empty() || candidate.atoms.is_empty() {
        return MatchOutcome::unfit();
    }
    if target.reduced_composition() != candidate.reduced_composition() {
        return MatchOutcome::unfit();
    }
    // 不做超胞展开，只比较同原子数的胞
    if target.atoms.len() != candidate.atoms.len() {
        return MatchOutcome::unfit();
    }

    if !lattices_compatible(target, candidate, preset) {
        return MatchOutcome::unfit();
    }

    match best_site_match(target, candidate) {
        Some((rms, max_dist)) => {
            // pymatgen 惯例：位移按 (V/n)^(1/3) 归一化后与 stol 比较
            let norm = target.volume_per_atom().cbrt();
            let norm_rms = rms / norm;
            let max_rms = max_dist / norm;
            if max_rms <= preset.stol {
                MatchOutcome {
                    fit: true,
                    norm_rms: Some(norm_rms),
                    max_rms: Some(max_rms),
                }
            } else {
                MatchOutcome::unfit()
            }
        }
        None => MatchOutcome::unfit(),
    }
}

/// 体积归一化后比较排序晶格参数
fn lattices_compatible(target: &Crystal, candidate: &Crystal, preset: &MatcherPreset) -> bool {
    let scale = (target.lattice.volume() / candidate.lattice.volume()).cbrt();

    let (ta, tb, tc, tal, tbe, tga) = target.lattice.parameters();
    let (ca, cb, cc, cal, cbe, cga) = candidate.lattice.parameters();

    let mut t_len = [ta, tb, tc];
    let mut c_len = [ca * scale, cb * scale, cc * scale];
    t_len.sort_by(|a, b| a.partial_cmp(b).unwrap());
    c_len.sort_by(|a, b| a.partial_cmp(b).unwrap());

    for (t, c) in t_len.iter().zip(c_len.iter()) {
        if (t - c).abs() / t > preset.ltol {
            return false;
        }
    }

    let mut t_ang = [tal, tbe, tga];
    let mut c_ang = [cal, cbe, cga];
    t_ang.sort_by(|a, b| a.partial_cmp(b).unwrap());
    c_ang.sort_by(|a, b| a.partial_cmp(b).unwrap());

    t_ang
        .iter()
        .zip(c_ang.iter())
        .all(|(t, c)| (t - c).abs() <= preset.angle_tol)
}

/// 平移扫描 + 贪心配对，返回 (rms, 最大位移)，单位 Å
fn best_site_match(target: &Crystal, candidate: &Crystal) -> Option<(f64, f64)> {
    let anchor = &target.atoms[0];
    let mut best: Option<(f64, f64)> = None;

    // 候选平移：把每个同种候选原子叠到目标首原子上
    for cand_atom in candidate.atoms.iter().filter(|a| a.element == anchor.element) {
        let shift = [
            anchor.position[0] - cand_atom.position[0],
            anchor.position[1] - cand_atom.position[1],
            anchor.position[2] - cand_atom.position[2],
        ];
        if let Some((rms, max_dist)) = match_with_shift(target, candidate, shift) {
            best = match best {
                Some((best_rms, _)) if best_rms <= rms => best,
                _ => Some((rms, max_dist)),
            };
        }
    }

    best
}

fn match_with_shift(target: &Crystal, candidate: &Crystal, shift: [f64; 3]) -> Option<(f64, f64)> {
    let n = target.atoms.len();
    let mut used = vec![false; n];
    let mut sq_sum = 0.0;
    let mut max_dist: f64 = 0.0;

    for t_atom in &target.atoms {
        let mut best_j = None;
        let mut best_d = f64::INFINITY;
        for (j, c_atom) in candidate.atoms.iter().enumerate() {
            if used[j] || c_atom.element != t_atom.element {
                continue;
            }
            let d = min_image_distance(target, t_atom.position, c_atom.position, shift);
            if d < best_d {
                best_d = d;
                best_j = Some(j);
            }
        }
        let j = best_j?;
        used[j] = true;
        sq_sum += best_d * best_d;
        max_dist = max_dist.max(best_d);
    }

    Some(((sq_sum / n as f64).sqrt(), max_dist))
}

/// 最小镜像距离（候选位点先加平移，用目标晶格换算笛卡尔）
fn min_image_distance(target: &Crystal, t_pos: [f64; 3], c_pos: [f64; 3], shift: [f64; 3]) -> f64 {
    let mut frac_diff = [0.0; 3];
    for k in 0..3 {
        let d = c_pos[k] + shift[k] - t_pos[k];
        frac_diff[k] = d - d.round();
    }
    let cart = target.lattice.frac_to_cart(frac_diff);
    (cart[0] * cart[0] + cart[1] * cart[1] + cart[2] * cart[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};

    fn rock_salt(jitter: f64) -> Crystal {
        let lattice =
            Lattice::from_vectors([[5.64, 0.0, 0.0], [0.0, 5.64, 0.0], [0.0, 0.0, 5.64]]);
        let atoms = vec![
            Atom::new("Na", [0.0 + jitter, 0.0, 0.0]),
            Atom::new("Na", [0.5, 0.5 + jitter, 0.0]),
            Atom::new("Na", [0.5, 0.0, 0.5 + jitter]),
            Atom::new("Na", [0.0, 0.5, 0.5]),
            Atom::new("Cl", [0.5 + jitter, 0.0, 0.0]),
            Atom::new("Cl", [0.0, 0.5, 0.0]),
            Atom::new("Cl", [0.0, 0.0, 0.5]),
            Atom::new("Cl", [0.5, 0.5, 0.5]),
        ];
        Crystal::new("NaCl", lattice, atoms)
    }

    #[test]
    fn test_identical_structures_fit_with_zero_rms() {
        let target = rock_salt(0.0);
        for preset in &PRESETS {
            let outcome = fit_structures(&target, &target, preset);
            assert!(outcome.fit, "preset {} should fit", preset.name);
            assert!(outcome.norm_rms.unwrap() < 1e-9);
            assert!(outcome.max_rms.unwrap() < 1e-9);
        }
    }

    #[test]
    fn test_translated_copy_fits() {
        let target = rock_salt(0.0);
        let mut shifted = target.clone();
        for atom in &mut shifted.atoms {
            for k in 0..3 {
                atom.position[k] = (atom.position[k] + 0.25).rem_euclid(1.0);
            }
        }
        let outcome = fit_structures(&target, &shifted, &PRESETS[2]);
        assert!(outcome.fit);
        assert!(outcome.norm_rms.unwrap() < 1e-9);
    }

    #[test]
    fn test_jittered_copy_fits_loose_only() {
        let target = rock_salt(0.0);
        let jittered = rock_salt(0.12);
        let lo = fit_structures(&target, &jittered, &PRESETS[0]);
        let st = fit_structures(&target, &jittered, &PRESETS[2]);
        assert!(lo.fit);
        assert!(!st.fit);
        assert!(st.norm_rms.is_none());
    }

    #[test]
    fn test_different_composition_never_fits() {
        let target = rock_salt(0.0);
        let mut other = rock_salt(0.0);
        for atom in &mut other.atoms {
            atom.element = "K".to_string();
        }
        for preset in &PRESETS {
            assert!(!fit_structures(&target, &other, preset).fit);
        }
    }

    #[test]
    fn test_incompatible_lattice_rejected() {
        let target = rock_salt(0.0);
        let mut stretched = rock_salt(0.0);
        // 单轴拉伸 60%，体积归一化后长度比仍超出 ltol
        stretched.lattice = Lattice::from_vectors([
            [5.64 * 1.6, 0.0, 0.0],
            [0.0, 5.64, 0.0],
            [0.0, 0.0, 5.64],
        ]);
        assert!(!fit_structures(&target, &stretched, &PRESETS[0]).fit);
    }
}
