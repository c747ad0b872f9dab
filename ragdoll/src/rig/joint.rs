//! # 关节绑定
//!
//! - 布娃娃关节：锥形-扭转约束，创建后始终启用
//! - 抓取约束：光标与部件之间的点对点约束，创建时禁用

use super::config::JointSpec;
use super::engine::{ConeTwistDesc, ConstraintHandle, PhysicsEngine, RigidBodyHandle};
use super::error::RigResult;
use bevy::math::Vec3;

/// 在父子刚体之间绑定锥形-扭转关节
///
/// `pivot_a` 位于父部件坐标系，`pivot_b` 位于子部件坐标系。
/// 关节在运行期间不会被禁用。
pub fn bind_joint(
    engine: &mut impl PhysicsEngine,
    parent: RigidBodyHandle,
    child: RigidBodyHandle,
    spec: &JointSpec,
) -> RigResult<ConstraintHandle> {
    let desc = ConeTwistDesc {
        pivot_a: spec.pivot_a,
        pivot_b: spec.pivot_b,
        axis_a: spec.axis_a,
        axis_b: spec.axis_b,
        cone_limit: spec.limits.cone,
        twist_limit: spec.limits.twist,
    };
    engine.create_cone_twist_constraint(parent, child, &desc)
}

/// 在光标和部件之间绑定抓取约束
///
/// 两端锚点都在各自刚体的原点；约束以禁用状态创建，
/// 之后由 [`GrabController`](super::grab::GrabController) 反复启用/禁用
pub fn bind_grab(
    engine: &mut impl PhysicsEngine,
    cursor: RigidBodyHandle,
    limb: RigidBodyHandle,
) -> RigResult<ConstraintHandle> {
    engine.create_point_to_point_constraint(cursor, limb, Vec3::ZERO, Vec3::ZERO)
}

/// 测量关节当前的摆动角（弧度）
///
/// 即父子两端扭转轴在世界坐标系中的夹角。任一刚体不存在时返回 `None`
pub fn joint_swing(
    engine: &impl PhysicsEngine,
    parent: RigidBodyHandle,
    child: RigidBodyHandle,
    spec: &JointSpec,
) -> Option<f32> {
    let parent_pose = engine.body_pose(parent)?;
    let child_pose = engine.body_pose(child)?;

    let axis_a = (parent_pose.rotation * spec.axis_a).normalize();
    let axis_b = (child_pose.rotation * spec.axis_b).normalize();
    Some(axis_a.dot(axis_b).clamp(-1.0, 1.0).acos())
}
