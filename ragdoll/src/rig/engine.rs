//! # 物理引擎协作接口
//!
//! 布娃娃核心只通过 [`PhysicsEngine`] 请求创建刚体/约束、启用/禁用约束
//! 和读取姿态；所有句柄的底层对象归引擎所有。

use super::error::RigResult;
use bevy::math::{Quat, Vec3};
use std::fmt;

/// 刚体句柄（由引擎签发）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RigidBodyHandle(pub u32);

/// 约束句柄（由引擎签发）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintHandle(pub u32);

impl fmt::Display for RigidBodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

impl fmt::Display for ConstraintHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constraint#{}", self.0)
    }
}

/// 碰撞形状
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    /// 盒子，参数为半尺寸
    Cuboid { half_extents: Vec3 },
    /// 不参与碰撞的刚体（例如光标）
    None,
}

/// 刚体运动类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// 由求解器积分
    Dynamic,
    /// 由代码直接设置位置，不受重力影响
    Kinematic,
    /// 固定不动
    Static,
}

/// 刚体创建参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub shape: BodyShape,
    pub kind: BodyKind,
    pub mass: f32,
    pub position: Vec3,
    pub linear_damping: f32,
}

/// 锥形-扭转约束参数
///
/// 锚点和扭转轴分别位于两个刚体各自的局部坐标系中
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeTwistDesc {
    pub pivot_a: Vec3,
    pub pivot_b: Vec3,
    pub axis_a: Vec3,
    pub axis_b: Vec3,
    pub cone_limit: f32,
    pub twist_limit: f32,
}

/// 刚体姿态（世界坐标系）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// 物理引擎协作者
///
/// ## 约定
/// - 点对点约束创建时处于禁用状态
/// - `enable` / `disable` 都是幂等的
/// - `set_position` 只对运动学刚体直接写位置
pub trait PhysicsEngine {
    /// 引擎是否可以接收注册请求
    fn is_ready(&self) -> bool {
        true
    }

    fn create_rigid_body(&mut self, desc: &BodyDesc) -> RigResult<RigidBodyHandle>;

    fn create_cone_twist_constraint(
        &mut self,
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        desc: &ConeTwistDesc,
    ) -> RigResult<ConstraintHandle>;

    /// 创建点对点约束（初始禁用）
    fn create_point_to_point_constraint(
        &mut self,
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        pivot_a: Vec3,
        pivot_b: Vec3,
    ) -> RigResult<ConstraintHandle>;

    fn enable(&mut self, constraint: ConstraintHandle);

    fn disable(&mut self, constraint: ConstraintHandle);

    fn is_enabled(&self, constraint: ConstraintHandle) -> bool;

    fn set_position(&mut self, body: RigidBodyHandle, position: Vec3);

    fn body_pose(&self, body: RigidBodyHandle) -> Option<BodyPose>;

    fn remove_constraint(&mut self, constraint: ConstraintHandle);

    fn remove_rigid_body(&mut self, body: RigidBodyHandle);
}

/// 测试用的记录型引擎
///
/// 不做任何物理计算，只记录注册的对象和启用状态
#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::rig::error::RigError;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq)]
    pub enum ConstraintKind {
        ConeTwist(ConeTwistDesc),
        PointToPoint,
    }

    #[derive(Debug, Clone)]
    pub struct RecordedConstraint {
        pub kind: ConstraintKind,
        pub bodies: (RigidBodyHandle, RigidBodyHandle),
        pub enabled: bool,
    }

    #[derive(Debug, Default)]
    pub struct RecordingEngine {
        pub bodies: BTreeMap<RigidBodyHandle, BodyDesc>,
        pub constraints: BTreeMap<ConstraintHandle, RecordedConstraint>,
        /// 每次真正改变启用状态的调用都会记一次
        pub toggles: usize,
        /// 创建这么多刚体之后开始报告引擎不可用
        pub fail_after_bodies: Option<usize>,
        pub offline: bool,
        next_id: u32,
    }

    impl RecordingEngine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn enabled_count(&self) -> usize {
            self.constraints.values().filter(|c| c.enabled).count()
        }

        pub fn cone_twist_count(&self) -> usize {
            self.constraints
                .values()
                .filter(|c| matches!(c.kind, ConstraintKind::ConeTwist(_)))
                .count()
        }

        fn next_id(&mut self) -> u32 {
            self.next_id += 1;
            self.next_id
        }

        fn check_body(&self, body: RigidBodyHandle) -> RigResult<()> {
            if self.bodies.contains_key(&body) {
                Ok(())
            } else {
                Err(RigError::UnknownHandle(body.to_string()))
            }
        }
    }

    impl PhysicsEngine for RecordingEngine {
        fn is_ready(&self) -> bool {
            !self.offline
        }

        fn create_rigid_body(&mut self, desc: &BodyDesc) -> RigResult<RigidBodyHandle> {
            if let Some(limit) = self.fail_after_bodies {
                if self.bodies.len() >= limit {
                    return Err(RigError::EngineUnavailable {
                        reason: "body budget exhausted".to_string(),
                    });
                }
            }
            let handle = RigidBodyHandle(self.next_id());
            self.bodies.insert(handle, *desc);
            Ok(handle)
        }

        fn create_cone_twist_constraint(
            &mut self,
            body_a: RigidBodyHandle,
            body_b: RigidBodyHandle,
            desc: &ConeTwistDesc,
        ) -> RigResult<ConstraintHandle> {
            self.check_body(body_a)?;
            self.check_body(body_b)?;
            let handle = ConstraintHandle(self.next_id());
            self.constraints.insert(
                handle,
                RecordedConstraint {
                    kind: ConstraintKind::ConeTwist(*desc),
                    bodies: (body_a, body_b),
                    enabled: true,
                },
            );
            Ok(handle)
        }

        fn create_point_to_point_constraint(
            &mut self,
            body_a: RigidBodyHandle,
            body_b: RigidBodyHandle,
            _pivot_a: Vec3,
            _pivot_b: Vec3,
        ) -> RigResult<ConstraintHandle> {
            self.check_body(body_a)?;
            self.check_body(body_b)?;
            let handle = ConstraintHandle(self.next_id());
            self.constraints.insert(
                handle,
                RecordedConstraint {
                    kind: ConstraintKind::PointToPoint,
                    bodies: (body_a, body_b),
                    enabled: false,
                },
            );
            Ok(handle)
        }

        fn enable(&mut self, constraint: ConstraintHandle) {
            if let Some(c) = self.constraints.get_mut(&constraint) {
                if !c.enabled {
                    c.enabled = true;
                    self.toggles += 1;
                }
            }
        }

        fn disable(&mut self, constraint: ConstraintHandle) {
            if let Some(c) = self.constraints.get_mut(&constraint) {
                if c.enabled {
                    c.enabled = false;
                    self.toggles += 1;
                }
            }
        }

        fn is_enabled(&self, constraint: ConstraintHandle) -> bool {
            self.constraints
                .get(&constraint)
                .map(|c| c.enabled)
                .unwrap_or(false)
        }

        fn set_position(&mut self, body: RigidBodyHandle, position: Vec3) {
            if let Some(desc) = self.bodies.get_mut(&body) {
                desc.position = position;
            }
        }

        fn body_pose(&self, body: RigidBodyHandle) -> Option<BodyPose> {
            self.bodies.get(&body).map(|desc| BodyPose {
                position: desc.position,
                rotation: Quat::IDENTITY,
            })
        }

        fn remove_constraint(&mut self, constraint: ConstraintHandle) {
            self.constraints.remove(&constraint);
        }

        fn remove_rigid_body(&mut self, body: RigidBodyHandle) {
            self.bodies.remove(&body);
            self.constraints
                .retain(|_, c| c.bodies.0 != body && c.bodies.1 != body);
        }
    }
}
