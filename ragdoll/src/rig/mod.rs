//! # Ragdoll Rig
//!
//! 把声明式的部件树装配成一组刚体和关节约束，并管理指针抓取。
//!
//! ## 核心概念
//!
//! - **配置 (Config)**: 部件形状、质量、颜色、初始位置，以及关节锚点和角度限制
//! - **拓扑 (Topology)**: 显式的部件树，父子关系只由树的形状决定
//! - **装配 (Assembly)**: 深度优先、先父后子地创建刚体和关节，全有或全无
//! - **抓取 (Grab)**: 每个部件一个预先创建、默认禁用的点对点约束，
//!   由指针事件启用/禁用
//!
//! 物理求解本身由 [`PhysicsEngine`] 协作者负责。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let (config, topology) = create_humanoid(&RagdollParams::default());
//! let mut rig = assemble(&mut engine, &config, &topology)?;
//!
//! // 指针事件
//! rig.grab_mut().handle_pointer(&mut engine, "head", PointerId::Mouse, PointerEvent::Down)?;
//!
//! // 每帧
//! rig.grab_mut().track_cursor(&mut engine, cursor_world_position);
//! ```

pub mod assembler;
pub mod com;
pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod grab;
pub mod joint;
pub mod topology;

// Re-export commonly used types
pub use assembler::{assemble, Rig, RigPart};
pub use com::rig_center_of_mass;
pub use config::{AngularLimits, BodyPartSpec, JointSpec, RigConfig};
pub use engine::{
    BodyDesc, BodyKind, BodyPose, BodyShape, ConeTwistDesc, ConstraintHandle, PhysicsEngine,
    RigidBodyHandle,
};
pub use error::{ConfigError, RigError, RigResult};
pub use grab::{GrabState, PointerEvent};
pub use topology::{RigNode, RigTopology};
