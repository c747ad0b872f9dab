//! # 仿真参数

use bevy::math::Vec3;

/// 时间步长（120Hz物理更新）
pub const TIMESTEP: f32 = 1.0 / 120.0;
/// 每帧物理子步数，两个子步合计一帧（1/60秒）
pub const SUBSTEPS: usize = 2;
/// 约束求解迭代次数；迭代太少时关节会明显越过锥角
pub const SOLVER_ITERATIONS: usize = 16;
/// 重力加速度，沿-Y方向；取值偏大让布娃娃落得干脆
pub const GRAVITY: Vec3 = Vec3::new(0.0, -100.0, 0.0);
/// 地面高度
pub const GROUND_HEIGHT: f32 = -5.0;

/// 物理世界参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    pub gravity: Vec3,
    pub timestep: f32,
    pub substeps: usize,
    pub solver_iterations: usize,
    pub ground_height: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            timestep: TIMESTEP,
            substeps: SUBSTEPS,
            solver_iterations: SOLVER_ITERATIONS,
            ground_height: GROUND_HEIGHT,
        }
    }
}
