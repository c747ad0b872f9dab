//! # 演示程序模块
//!
//! 包含布娃娃配置生成器

pub mod humanoid;

pub use humanoid::{create_humanoid, RagdollParams};
