//! # 错误类型
//!
//! 装配与交互过程中可能出现的错误

use bevy::math::Vec3;
use thiserror::Error;

/// 配置错误
///
/// 在任何刚体注册到物理引擎之前由校验阶段发现
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// 拓扑节点引用了不存在的部件
    #[error("missing body part spec: {0}")]
    MissingBodyPart(String),

    /// 拓扑边引用了不存在的关节，或非根节点没有关节
    #[error("missing joint spec: {0}")]
    MissingJoint(String),

    /// 根节点不应携带关节
    #[error("root part {part} must not carry a joint (found {joint})")]
    UnexpectedRootJoint { part: String, joint: String },

    /// 同一部件在拓扑中出现多次
    #[error("body part {0} appears more than once in the topology")]
    DuplicatePart(String),

    /// 同一关节被多条边引用
    #[error("joint {0} is used by more than one edge")]
    DuplicateJoint(String),

    /// 形状尺寸非法（非正或非有限值）
    #[error("invalid shape for {name}: half extents {half_extents}")]
    InvalidShape { name: String, half_extents: Vec3 },

    /// 质量非法（负数、非有限值，或布娃娃部件为静态）
    #[error("invalid mass for {name}: {mass} (ragdoll parts need mass > 0)")]
    InvalidMass { name: String, mass: f32 },

    /// 关节角度限制非法
    #[error("invalid angular limits for joint {name}: cone {cone}, twist {twist}")]
    InvalidJointLimits { name: String, cone: f32, twist: f32 },
}

/// 布娃娃装配/交互错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RigError {
    /// 配置错误，装配直接失败
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// 物理引擎未就绪
    #[error("physics engine unavailable: {reason}")]
    EngineUnavailable { reason: String },

    /// 交互时引用了不属于该rig的部件
    #[error("unknown rig part: {0}")]
    UnknownPart(String),

    /// 引擎不认识的句柄
    #[error("unknown engine handle: {0}")]
    UnknownHandle(String),
}

/// Result type for rig operations.
pub type RigResult<T> = std::result::Result<T, RigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RigError::from(ConfigError::MissingBodyPart("tail".to_string()));
        assert_eq!(
            format!("{err}"),
            "configuration error: missing body part spec: tail"
        );

        let err = RigError::EngineUnavailable {
            reason: "world not created".to_string(),
        };
        assert!(format!("{err}").contains("world not created"));

        let err = ConfigError::InvalidMass {
            name: "head".to_string(),
            mass: -1.0,
        };
        assert!(format!("{err}").contains("-1"));
    }
}
