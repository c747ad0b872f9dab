//! # 部件工厂
//!
//! 把一条 [`BodyPartSpec`] 变成引擎中的一个盒状刚体

use super::config::BodyPartSpec;
use super::engine::{BodyDesc, BodyKind, BodyShape, PhysicsEngine, RigidBodyHandle};
use super::error::RigResult;
use bevy::math::Vec3;

/// 部件线性阻尼，抑制关节链的失控振荡
pub const LINEAR_DAMPING: f32 = 0.9;

/// 光标刚体在第一次更新前停放的位置（远离场景）
pub const CURSOR_PARK_POSITION: Vec3 = Vec3::new(0.0, 0.0, 10000.0);

/// 为部件创建动力学盒状刚体
///
/// 规格的合法性已在 [`RigConfig::validate`](super::config::RigConfig::validate) 中检查过
pub fn create_body(engine: &mut impl PhysicsEngine, spec: &BodyPartSpec) -> RigResult<RigidBodyHandle> {
    let desc = BodyDesc {
        shape: BodyShape::Cuboid {
            half_extents: spec.half_extents,
        },
        kind: BodyKind::Dynamic,
        mass: spec.mass,
        position: spec.rest_position,
        linear_damping: LINEAR_DAMPING,
    };
    engine.create_rigid_body(&desc)
}

/// 创建光标刚体
///
/// 运动学刚体：无质量、不受重力、不参与碰撞，位置由代码每帧直接写入
pub fn create_cursor(engine: &mut impl PhysicsEngine) -> RigResult<RigidBodyHandle> {
    let desc = BodyDesc {
        shape: BodyShape::None,
        kind: BodyKind::Kinematic,
        mass: 0.0,
        position: CURSOR_PARK_POSITION,
        linear_damping: 0.0,
    };
    engine.create_rigid_body(&desc)
}
