//! # 解析器模块
//!
//! 提供结构文件与 DFT 输出格式的解析器和序列化器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar, cif, outcar, potcar

pub mod cif;
pub mod outcar;
pub mod poscar;
pub mod potcar;
