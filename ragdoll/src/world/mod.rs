//! # 物理世界
//!
//! [`PhysicsEngine`] 的具体实现（基于rapier3d）和场景中的静态物体

pub mod rapier;
pub mod settings;

pub use rapier::RapierEngine;
pub use settings::PhysicsSettings;

use crate::rig::{BodyDesc, BodyKind, BodyShape, PhysicsEngine, RigResult, RigidBodyHandle};
use bevy::math::Vec3;

/// 地面半尺寸
pub const GROUND_HALF_EXTENTS: Vec3 = Vec3::new(500.0, 0.5, 500.0);

/// 创建静态地面，上表面位于 `height`
pub fn create_ground(engine: &mut impl PhysicsEngine, height: f32) -> RigResult<RigidBodyHandle> {
    let desc = BodyDesc {
        shape: BodyShape::Cuboid {
            half_extents: GROUND_HALF_EXTENTS,
        },
        kind: BodyKind::Static,
        mass: 0.0,
        position: Vec3::new(0.0, height - GROUND_HALF_EXTENTS.y, 0.0),
        linear_damping: 0.0,
    };
    engine.create_rigid_body(&desc)
}
