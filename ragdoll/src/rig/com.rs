//! # 布娃娃质心计算
//!
//! 计算每个部件及其所有子部件的总质心位置

use super::assembler::Rig;
use super::engine::PhysicsEngine;
use bevy::math::Vec3;

/// 计算子树质心
///
/// ## 算法
///
/// 1. 初始化: subtree_com[i] = mass[i] * position[i]
/// 2. 后向累积(从叶到根): subtree_com[parent] += subtree_com[child]
/// 3. 归一化: subtree_com[i] /= subtree_mass[i]
///
/// `Rig::parts` 按先父后子的顺序存放，所以逆序遍历即为从叶到根。
///
/// ## 返回
/// 与 `rig.parts()` 一一对应的子树质心（世界坐标系）；
/// 任一部件在引擎中不存在时返回 `None`
pub fn compute_subtree_com(engine: &impl PhysicsEngine, rig: &Rig) -> Option<Vec<Vec3>> {
    let parts = rig.parts();

    // 步骤1: 初始化 - 加权位置
    let mut weighted = Vec::with_capacity(parts.len());
    let mut subtree_mass = Vec::with_capacity(parts.len());
    let mut positions = Vec::with_capacity(parts.len());

    for part in parts {
        let position = engine.body_pose(part.body)?.position;
        positions.push(position);
        weighted.push(position * part.mass);
        subtree_mass.push(part.mass);
    }

    // 步骤2: 后向累积
    for i in (0..parts.len()).rev() {
        if let Some(parent) = parts[i].parent {
            let child_weighted = weighted[i];
            let child_mass = subtree_mass[i];
            weighted[parent] += child_weighted;
            subtree_mass[parent] += child_mass;
        }
    }

    // 步骤3: 归一化
    let com = (0..parts.len())
        .map(|i| {
            if subtree_mass[i] > 1e-10 {
                weighted[i] / subtree_mass[i]
            } else {
                positions[i]
            }
        })
        .collect();

    Some(com)
}

/// 整个布娃娃的质心（根部件的子树质心）
pub fn rig_center_of_mass(engine: &impl PhysicsEngine, rig: &Rig) -> Option<Vec3> {
    compute_subtree_com(engine, rig)?.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::{create_humanoid, RagdollParams};
    use crate::rig::assembler::assemble;
    use crate::rig::engine::testing::RecordingEngine;

    #[test]
    fn test_leaf_subtree_is_own_position() {
        let (config, topology) = create_humanoid(&RagdollParams::default());
        let mut engine = RecordingEngine::new();
        let rig = assemble(&mut engine, &config, &topology).unwrap();

        let com = compute_subtree_com(&engine, &rig).unwrap();
        let head = rig.parts().iter().position(|p| p.name == "head").unwrap();
        assert_eq!(com[head], config.shapes["head"].rest_position);
    }

    #[test]
    fn test_rig_com_is_mass_weighted_mean() {
        let (config, topology) = create_humanoid(&RagdollParams::default());
        let mut engine = RecordingEngine::new();
        let rig = assemble(&mut engine, &config, &topology).unwrap();

        let total_mass: f32 = config.shapes.values().map(|s| s.mass).sum();
        let expected = config
            .shapes
            .values()
            .map(|s| s.rest_position * s.mass)
            .sum::<Vec3>()
            / total_mass;

        let com = rig_center_of_mass(&engine, &rig).unwrap();
        assert!((com - expected).length() < 1e-4, "质心 {com} 与期望 {expected} 不一致");
    }
}
