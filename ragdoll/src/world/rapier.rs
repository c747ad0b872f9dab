//! # Rapier物理后端
//!
//! 基于rapier3d实现 [`PhysicsEngine`]：
//!
//! - 部件：带质量的盒状碰撞体
//! - 光标：基于位置的运动学刚体，没有碰撞体
//! - 锥形-扭转关节：锁定三个平移自由度的 `GenericJoint`，
//!   扭转限制在 AngX 上，摆动限制在 AngY/AngZ 上
//! - 抓取约束：球铰关节，创建时禁用
//!
//! rapier使用nalgebra，这里在边界上与bevy的glam类型互相转换。

use super::settings::PhysicsSettings;
use crate::rig::{
    BodyDesc, BodyKind, BodyPose, BodyShape, ConeTwistDesc, ConstraintHandle, PhysicsEngine,
    RigError, RigResult, RigidBodyHandle,
};
use bevy::log::debug;
use bevy::math::{Quat, Vec3};
use rapier3d::na::Unit;
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, GenericJoint,
    GenericJointBuilder, ImpulseJointHandle, ImpulseJointSet, IntegrationParameters,
    IslandManager, JointAxesMask, JointAxis, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    Point, QueryPipeline, Real, RigidBodyBuilder, RigidBodySet, SphericalJointBuilder, Vector,
};
use std::collections::HashMap;
use std::f32::consts::FRAC_1_SQRT_2;
use std::num::NonZeroUsize;

type RapierBodyHandle = rapier3d::prelude::RigidBodyHandle;

/// 部件摩擦系数
const FRICTION: Real = 0.5;

fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

/// rapier物理世界
pub struct RapierEngine {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    /// 对外句柄 → rapier句柄
    body_handles: HashMap<RigidBodyHandle, RapierBodyHandle>,
    joint_handles: HashMap<ConstraintHandle, ImpulseJointHandle>,
    next_id: u32,
    time: f32,
}

impl RapierEngine {
    pub fn new(settings: &PhysicsSettings) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = settings.timestep;
        if let Some(iterations) = NonZeroUsize::new(settings.solver_iterations) {
            integration_parameters.num_solver_iterations = iterations;
        }

        Self {
            gravity: to_vector(settings.gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            body_handles: HashMap::new(),
            joint_handles: HashMap::new(),
            next_id: 0,
            time: 0.0,
        }
    }

    /// 推进一个时间步
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.time += self.integration_parameters.dt;
    }

    /// 已仿真的时间（秒）
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn body_count(&self) -> usize {
        self.body_handles.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.joint_handles.len()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn rapier_body(&self, body: RigidBodyHandle) -> RigResult<RapierBodyHandle> {
        self.body_handles
            .get(&body)
            .copied()
            .ok_or_else(|| RigError::UnknownHandle(body.to_string()))
    }

    fn insert_joint(
        &mut self,
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        joint: GenericJoint,
    ) -> RigResult<ConstraintHandle> {
        let a = self.rapier_body(body_a)?;
        let b = self.rapier_body(body_b)?;
        let rapier_handle = self.impulse_joints.insert(a, b, joint, true);

        let handle = ConstraintHandle(self.next_id());
        self.joint_handles.insert(handle, rapier_handle);
        Ok(handle)
    }

    fn set_enabled(&mut self, constraint: ConstraintHandle, enabled: bool) {
        let Some(&rapier_handle) = self.joint_handles.get(&constraint) else {
            return;
        };
        let Some(joint) = self.impulse_joints.get_mut(rapier_handle) else {
            return;
        };
        if joint.data.is_enabled() == enabled {
            return;
        }
        joint.data.set_enabled(enabled);

        // 约束状态变化后唤醒两端刚体
        let ends = [joint.body1, joint.body2];
        for end in ends {
            if let Some(body) = self.bodies.get_mut(end) {
                body.wake_up(true);
            }
        }
        debug!("{constraint} enabled = {enabled}");
    }
}

impl PhysicsEngine for RapierEngine {
    fn is_ready(&self) -> bool {
        self.integration_parameters.dt > 0.0
    }

    fn create_rigid_body(&mut self, desc: &BodyDesc) -> RigResult<RigidBodyHandle> {
        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        };
        let body = builder
            .translation(to_vector(desc.position))
            .linear_damping(desc.linear_damping)
            .can_sleep(false)
            .build();
        let rapier_handle = self.bodies.insert(body);

        if let BodyShape::Cuboid { half_extents } = desc.shape {
            let mut collider =
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
                    .friction(FRICTION);
            if desc.kind == BodyKind::Dynamic {
                collider = collider.mass(desc.mass);
            }
            self.colliders
                .insert_with_parent(collider.build(), rapier_handle, &mut self.bodies);
        }

        let handle = RigidBodyHandle(self.next_id());
        self.body_handles.insert(handle, rapier_handle);
        Ok(handle)
    }

    fn create_cone_twist_constraint(
        &mut self,
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        desc: &ConeTwistDesc,
    ) -> RigResult<ConstraintHandle> {
        // 两个摆动轴各取锥角的 1/√2，使组合摆动不超出锥面
        let swing = desc.cone_limit * FRAC_1_SQRT_2;
        let joint = GenericJointBuilder::new(JointAxesMask::LIN_AXES)
            .local_anchor1(to_point(desc.pivot_a))
            .local_anchor2(to_point(desc.pivot_b))
            .local_axis1(Unit::new_normalize(to_vector(desc.axis_a)))
            .local_axis2(Unit::new_normalize(to_vector(desc.axis_b)))
            .limits(JointAxis::AngX, [-desc.twist_limit, desc.twist_limit])
            .limits(JointAxis::AngY, [-swing, swing])
            .limits(JointAxis::AngZ, [-swing, swing])
            .contacts_enabled(false)
            .build();
        self.insert_joint(body_a, body_b, joint)
    }

    fn create_point_to_point_constraint(
        &mut self,
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        pivot_a: Vec3,
        pivot_b: Vec3,
    ) -> RigResult<ConstraintHandle> {
        let mut joint: GenericJoint = SphericalJointBuilder::new()
            .local_anchor1(to_point(pivot_a))
            .local_anchor2(to_point(pivot_b))
            .contacts_enabled(false)
            .build()
            .into();
        joint.set_enabled(false);
        self.insert_joint(body_a, body_b, joint)
    }

    fn enable(&mut self, constraint: ConstraintHandle) {
        self.set_enabled(constraint, true);
    }

    fn disable(&mut self, constraint: ConstraintHandle) {
        self.set_enabled(constraint, false);
    }

    fn is_enabled(&self, constraint: ConstraintHandle) -> bool {
        self.joint_handles
            .get(&constraint)
            .and_then(|&h| self.impulse_joints.get(h))
            .map(|joint| joint.data.is_enabled())
            .unwrap_or(false)
    }

    fn set_position(&mut self, body: RigidBodyHandle, position: Vec3) {
        let Some(&rapier_handle) = self.body_handles.get(&body) else {
            return;
        };
        let Some(rb) = self.bodies.get_mut(rapier_handle) else {
            return;
        };
        if rb.is_kinematic() {
            rb.set_next_kinematic_translation(to_vector(position));
        } else {
            rb.set_translation(to_vector(position), true);
        }
    }

    fn body_pose(&self, body: RigidBodyHandle) -> Option<BodyPose> {
        let rapier_handle = self.body_handles.get(&body)?;
        let rb = self.bodies.get(*rapier_handle)?;
        let t = rb.translation();
        let r = rb.rotation();
        Some(BodyPose {
            position: Vec3::new(t.x, t.y, t.z),
            rotation: Quat::from_xyzw(r.i, r.j, r.k, r.w),
        })
    }

    fn remove_constraint(&mut self, constraint: ConstraintHandle) {
        if let Some(rapier_handle) = self.joint_handles.remove(&constraint) {
            self.impulse_joints.remove(rapier_handle, true);
        }
    }

    fn remove_rigid_body(&mut self, body: RigidBodyHandle) {
        let Some(rapier_handle) = self.body_handles.remove(&body) else {
            return;
        };
        self.bodies.remove(
            rapier_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        // rapier会一并删除挂在该刚体上的关节
        let joints = &self.impulse_joints;
        self.joint_handles.retain(|_, h| joints.get(*h).is_some());
    }
}
