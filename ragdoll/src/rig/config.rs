//! # 布娃娃配置数据结构
//!
//! 纯数据：部件形状、关节参数，以及针对拓扑的一次性校验

use super::error::ConfigError;
use super::topology::RigTopology;
use bevy::color::Srgba;
use bevy::math::Vec3;
use std::collections::{HashMap, HashSet};

/// 部件规格 (Body Part Spec)
///
/// 一个盒状刚体的完整描述，装配后不可变
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPartSpec {
    /// 部件名（在rig内唯一）
    pub name: String,
    /// 盒子半尺寸
    pub half_extents: Vec3,
    /// 质量，0表示静态物体
    pub mass: f32,
    /// 显示颜色
    pub color: Srgba,
    /// 初始位置（世界坐标系）
    pub rest_position: Vec3,
}

impl BodyPartSpec {
    pub fn new(name: &str, half_extents: Vec3, mass: f32, color: Srgba, rest_position: Vec3) -> Self {
        Self {
            name: name.to_string(),
            half_extents,
            mass,
            color,
            rest_position,
        }
    }

    /// 完整尺寸（用于渲染网格）
    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let extents_ok = self.half_extents.is_finite() && self.half_extents.min_element() > 0.0;
        if !extents_ok {
            return Err(ConfigError::InvalidShape {
                name: self.name.clone(),
                half_extents: self.half_extents,
            });
        }
        // 布娃娃完全由动力学驱动，没有静态部件
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(ConfigError::InvalidMass {
                name: self.name.clone(),
                mass: self.mass,
            });
        }
        Ok(())
    }
}

/// 关节角度限制
///
/// - `cone`: 摆动（swing）锥角，弧度
/// - `twist`: 绕扭转轴的扭转角，弧度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularLimits {
    pub cone: f32,
    pub twist: f32,
}

/// 关节规格 (Joint Spec)
///
/// 父子关系由拓扑中的位置决定，这里只记录锚点和限制
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    /// 关节名（唯一）
    pub name: String,
    /// 锚点，在父部件坐标系中
    pub pivot_a: Vec3,
    /// 锚点，在子部件坐标系中
    pub pivot_b: Vec3,
    /// 扭转轴，在父部件坐标系中
    pub axis_a: Vec3,
    /// 扭转轴，在子部件坐标系中
    pub axis_b: Vec3,
    pub limits: AngularLimits,
}

impl JointSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        let AngularLimits { cone, twist } = self.limits;
        let limits_ok = cone.is_finite() && twist.is_finite() && cone >= 0.0 && twist >= 0.0;
        if !limits_ok {
            return Err(ConfigError::InvalidJointLimits {
                name: self.name.clone(),
                cone,
                twist,
            });
        }
        Ok(())
    }
}

/// 布娃娃配置
///
/// 按名字索引的部件和关节集合，配合 [`RigTopology`] 使用
#[derive(Debug, Clone, Default)]
pub struct RigConfig {
    pub shapes: HashMap<String, BodyPartSpec>,
    pub joints: HashMap<String, JointSpec>,
}

impl RigConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加部件，同名部件会被覆盖
    pub fn add_part(&mut self, spec: BodyPartSpec) {
        self.shapes.insert(spec.name.clone(), spec);
    }

    /// 添加关节，同名关节会被覆盖
    pub fn add_joint(&mut self, spec: JointSpec) {
        self.joints.insert(spec.name.clone(), spec);
    }

    pub fn part(&self, name: &str) -> Result<&BodyPartSpec, ConfigError> {
        self.shapes
            .get(name)
            .ok_or_else(|| ConfigError::MissingBodyPart(name.to_string()))
    }

    pub fn joint(&self, name: &str) -> Result<&JointSpec, ConfigError> {
        self.joints
            .get(name)
            .ok_or_else(|| ConfigError::MissingJoint(name.to_string()))
    }

    /// 针对拓扑校验配置
    ///
    /// 检查项：
    /// - 每个节点的部件存在且形状、质量合法
    /// - 根节点没有关节，其余节点恰好有一个存在且合法的关节
    /// - 部件在拓扑中不重复出现，关节不被多条边共用
    pub fn validate(&self, topology: &RigTopology) -> Result<(), ConfigError> {
        let root = topology.root();
        if let Some(joint) = &root.joint {
            return Err(ConfigError::UnexpectedRootJoint {
                part: root.part.clone(),
                joint: joint.clone(),
            });
        }

        let mut seen_parts = HashSet::new();
        for part in topology.parts() {
            if !seen_parts.insert(part) {
                return Err(ConfigError::DuplicatePart(part.to_string()));
            }
            self.part(part)?.validate()?;
        }

        let mut seen_joints = HashSet::new();
        for edge in topology.edges() {
            let joint_name = edge.joint.ok_or_else(|| {
                ConfigError::MissingJoint(format!("<edge {} -> {}>", edge.parent, edge.child))
            })?;
            if !seen_joints.insert(joint_name) {
                return Err(ConfigError::DuplicateJoint(joint_name.to_string()));
            }
            self.joint(joint_name)?.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::topology::RigNode;
    use bevy::color::palettes::css::INDIAN_RED;

    fn part(name: &str) -> BodyPartSpec {
        BodyPartSpec::new(name, Vec3::splat(0.5), 1.0, INDIAN_RED, Vec3::ZERO)
    }

    fn joint(name: &str) -> JointSpec {
        JointSpec {
            name: name.to_string(),
            pivot_a: Vec3::new(0.0, -0.5, 0.0),
            pivot_b: Vec3::new(0.0, 0.5, 0.0),
            axis_a: Vec3::Y,
            axis_b: Vec3::Y,
            limits: AngularLimits { cone: 0.2, twist: 0.0 },
        }
    }

    fn two_part_config() -> (RigConfig, RigTopology) {
        let mut config = RigConfig::new();
        config.add_part(part("torso"));
        config.add_part(part("leg"));
        config.add_joint(joint("hip"));
        let topology = RigTopology::new(RigNode::root("torso").with_child(RigNode::new("leg", "hip")));
        (config, topology)
    }

    #[test]
    fn test_validate_ok() {
        let (config, topology) = two_part_config();
        assert_eq!(config.validate(&topology), Ok(()));
    }

    #[test]
    fn test_validate_missing_part() {
        let (mut config, topology) = two_part_config();
        config.shapes.remove("leg");
        assert_eq!(
            config.validate(&topology),
            Err(ConfigError::MissingBodyPart("leg".to_string()))
        );
    }

    #[test]
    fn test_validate_missing_joint() {
        let (mut config, topology) = two_part_config();
        config.joints.remove("hip");
        assert_eq!(
            config.validate(&topology),
            Err(ConfigError::MissingJoint("hip".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_bad_shape_and_mass() {
        let (mut config, topology) = two_part_config();
        config.shapes.get_mut("leg").unwrap().half_extents.y = 0.0;
        assert!(matches!(
            config.validate(&topology),
            Err(ConfigError::InvalidShape { .. })
        ));

        let (mut config, topology) = two_part_config();
        config.shapes.get_mut("torso").unwrap().mass = -2.0;
        assert!(matches!(
            config.validate(&topology),
            Err(ConfigError::InvalidMass { .. })
        ));

        // 静态部件不允许出现在布娃娃中
        let (mut config, topology) = two_part_config();
        config.shapes.get_mut("torso").unwrap().mass = 0.0;
        assert!(matches!(
            config.validate(&topology),
            Err(ConfigError::InvalidMass { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_limits() {
        let (mut config, topology) = two_part_config();
        config.joints.get_mut("hip").unwrap().limits.cone = -0.1;
        assert!(matches!(
            config.validate(&topology),
            Err(ConfigError::InvalidJointLimits { .. })
        ));
    }

    #[test]
    fn test_validate_duplicate_and_root_joint() {
        let (config, _) = two_part_config();
        let topology = RigTopology::new(
            RigNode::root("torso")
                .with_child(RigNode::new("leg", "hip"))
                .with_child(RigNode::new("leg", "hip")),
        );
        assert_eq!(
            config.validate(&topology),
            Err(ConfigError::DuplicatePart("leg".to_string()))
        );

        let topology = RigTopology::new(RigNode::new("torso", "hip"));
        assert!(matches!(
            config.validate(&topology),
            Err(ConfigError::UnexpectedRootJoint { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_shared_joint() {
        let (mut config, _) = two_part_config();
        config.add_part(part("otherLeg"));
        let topology = RigTopology::new(
            RigNode::root("torso")
                .with_child(RigNode::new("leg", "hip"))
                .with_child(RigNode::new("otherLeg", "hip")),
        );
        assert_eq!(
            config.validate(&topology),
            Err(ConfigError::DuplicateJoint("hip".to_string()))
        );
    }
}
