//! # 数据模型模块
//!
//! 定义统一的晶体结构、对称性记录和弛豫日志数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `symmetry/`, `matching/` 和 `commands/` 使用
//! - 子模块: structure, symmetry, relaxation

pub mod relaxation;
pub mod structure;
pub mod symmetry;

pub use relaxation::{IonStep, RelaxationLog, RelaxationSummary};
pub use structure::{Atom, Crystal, Lattice};
pub use symmetry::{format_tolerance, SpgTable, StructureRecord, SymmetryResult};
