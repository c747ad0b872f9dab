//! # 布娃娃装配器
//!
//! 从根节点深度优先遍历拓扑，为每个节点：
//! 1. 创建刚体（部件工厂）
//! 2. 若有父节点，用边上的关节规格绑定锥形-扭转关节
//! 3. 在共享光标与该刚体之间绑定一个禁用的抓取约束
//!
//! 装配是全有或全无的：任何一步失败都会释放本次已创建的所有句柄。

use super::config::{JointSpec, RigConfig};
use super::engine::{ConstraintHandle, PhysicsEngine, RigidBodyHandle};
use super::error::{ConfigError, RigError, RigResult};
use super::factory::{create_body, create_cursor, CURSOR_PARK_POSITION};
use super::grab::GrabController;
use super::joint::{bind_grab, bind_joint, joint_swing};
use super::topology::{RigNode, RigTopology};
use bevy::log::{info, warn};
use std::collections::HashMap;

/// 已绑定的关节
#[derive(Debug, Clone)]
pub struct BoundJoint {
    pub spec: JointSpec,
    pub constraint: ConstraintHandle,
}

/// 装配后的部件
#[derive(Debug, Clone)]
pub struct RigPart {
    pub name: String,
    pub body: RigidBodyHandle,
    pub mass: f32,
    /// 父部件在 [`Rig::parts`] 中的索引
    pub parent: Option<usize>,
    /// 连接父部件的关节（根部件为 `None`）
    pub joint: Option<BoundJoint>,
}

/// 一个完整的布娃娃实例
///
/// ## 不变量
/// - `parts` 按先父后子的顺序存放
/// - 除根以外每个部件恰好有一个关节
/// - 每个部件恰好有一个抓取约束，整个生命周期内复用
#[derive(Debug)]
pub struct Rig {
    parts: Vec<RigPart>,
    index: HashMap<String, usize>,
    grab: GrabController,
}

impl Rig {
    pub fn parts(&self) -> &[RigPart] {
        &self.parts
    }

    pub fn part(&self, name: &str) -> Option<&RigPart> {
        self.index.get(name).map(|&i| &self.parts[i])
    }

    pub fn root(&self) -> &RigPart {
        &self.parts[0]
    }

    pub fn joint_count(&self) -> usize {
        self.parts.iter().filter(|part| part.joint.is_some()).count()
    }

    pub fn grab(&self) -> &GrabController {
        &self.grab
    }

    pub fn grab_mut(&mut self) -> &mut GrabController {
        &mut self.grab
    }

    /// 部件与父部件之间关节的当前摆动角
    pub fn joint_swing(&self, engine: &impl PhysicsEngine, name: &str) -> Option<f32> {
        let part = self.part(name)?;
        let joint = part.joint.as_ref()?;
        let parent = &self.parts[part.parent?];
        joint_swing(engine, parent.body, part.body, &joint.spec)
    }

    /// 拆除整个布娃娃（场景卸载时调用）
    pub fn teardown(self, engine: &mut impl PhysicsEngine) {
        let mut registered = Registration::default();
        registered.bodies.push(self.grab.cursor());
        for part in &self.parts {
            registered.bodies.push(part.body);
            if let Some(joint) = &part.joint {
                registered.constraints.push(joint.constraint);
            }
        }
        registered.constraints.extend(self.grab.constraints());

        info!("tearing down ragdoll: {} parts", self.parts.len());
        registered.release(engine);
    }
}

/// 本次装配注册到引擎的句柄
#[derive(Debug, Default)]
struct Registration {
    bodies: Vec<RigidBodyHandle>,
    constraints: Vec<ConstraintHandle>,
}

impl Registration {
    /// 逆序释放：先约束后刚体
    fn release(self, engine: &mut impl PhysicsEngine) {
        for constraint in self.constraints.into_iter().rev() {
            engine.remove_constraint(constraint);
        }
        for body in self.bodies.into_iter().rev() {
            engine.remove_rigid_body(body);
        }
    }
}

/// 装配过程中的中间状态
struct Assembly {
    parts: Vec<RigPart>,
    registered: Registration,
    grab: GrabController,
}

impl Assembly {
    fn new(cursor: RigidBodyHandle) -> Self {
        Self {
            parts: Vec::new(),
            registered: Registration {
                bodies: vec![cursor],
                constraints: Vec::new(),
            },
            grab: GrabController::new(cursor, CURSOR_PARK_POSITION),
        }
    }

    /// 递归装配一个节点及其子树
    ///
    /// `parent` 为父部件的 (索引, 刚体句柄)，根节点为 `None`
    fn visit(
        &mut self,
        engine: &mut impl PhysicsEngine,
        config: &RigConfig,
        node: &RigNode,
        parent: Option<(usize, RigidBodyHandle)>,
    ) -> RigResult<()> {
        let spec = config.part(&node.part)?;
        let body = create_body(engine, spec)?;
        self.registered.bodies.push(body);

        let joint = match (parent, node.joint.as_deref()) {
            (Some((_, parent_body)), Some(joint_name)) => {
                let joint_spec = config.joint(joint_name)?;
                let constraint = bind_joint(engine, parent_body, body, joint_spec)?;
                self.registered.constraints.push(constraint);
                Some(BoundJoint {
                    spec: joint_spec.clone(),
                    constraint,
                })
            }
            (Some(_), None) => {
                return Err(ConfigError::MissingJoint(format!("<edge to {}>", node.part)).into());
            }
            (None, _) => None,
        };

        let grab = bind_grab(engine, self.grab.cursor(), body)?;
        self.registered.constraints.push(grab);
        self.grab.register(&node.part, grab);

        let idx = self.parts.len();
        self.parts.push(RigPart {
            name: node.part.clone(),
            body,
            mass: spec.mass,
            parent: parent.map(|(i, _)| i),
            joint,
        });

        for child in &node.children {
            self.visit(engine, config, child, Some((idx, body)))?;
        }
        Ok(())
    }

    fn finish(self) -> Rig {
        let index = self
            .parts
            .iter()
            .enumerate()
            .map(|(i, part)| (part.name.clone(), i))
            .collect();
        Rig {
            parts: self.parts,
            index,
            grab: self.grab,
        }
    }
}

/// 装配布娃娃
///
/// ## 错误
/// - [`RigError::EngineUnavailable`]: 引擎未就绪，或创建过程中引擎失败
/// - [`RigError::Configuration`]: 配置缺失或非法，此时引擎中没有任何注册
///
/// 失败时本次创建的所有句柄都已释放
pub fn assemble(
    engine: &mut impl PhysicsEngine,
    config: &RigConfig,
    topology: &RigTopology,
) -> RigResult<Rig> {
    if !engine.is_ready() {
        return Err(RigError::EngineUnavailable {
            reason: "engine is not accepting registrations".to_string(),
        });
    }
    config.validate(topology)?;

    let cursor = create_cursor(engine)?;
    let mut assembly = Assembly::new(cursor);

    match assembly.visit(engine, config, topology.root(), None) {
        Ok(()) => {
            let rig = assembly.finish();
            info!(
                "ragdoll assembled: {} parts, {} joints, root {}",
                rig.parts.len(),
                rig.joint_count(),
                rig.root().name
            );
            Ok(rig)
        }
        Err(err) => {
            warn!("ragdoll assembly failed, rolling back: {err}");
            assembly.registered.release(engine);
            Err(err)
        }
    }
}
