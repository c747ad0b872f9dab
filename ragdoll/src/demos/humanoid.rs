//! # Humanoid Ragdoll Demo
//!
//! 参数化的人形布娃娃配置生成器。
//!
//! ## 系统描述
//!
//! - **11个盒状部件**：躯干、头、上下臂×2、骨盆、大小腿×2，每个质量 = scale
//! - **10个锥形-扭转关节**：每个非根部件一个
//! - **无固定点**：完全动力学，只由关节（和抓取约束）连接
//!
//! 相同参数总是生成相同的rig。

use crate::rig::{AngularLimits, BodyPartSpec, JointSpec, RigConfig, RigNode, RigTopology};
use bevy::color::palettes::css::{INDIAN_RED, LIGHT_BLUE, LIGHT_PINK};
use bevy::math::Vec3;
use std::f32::consts::PI;

/// 生成器参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RagdollParams {
    /// 整体缩放，同时作为每个部件的质量
    pub scale: f32,
    /// 脊柱、颈、髋、膝、肘的锥角
    pub cone_limit: f32,
    /// 肩关节的锥角
    pub shoulder_cone_limit: f32,
    /// 所有关节的扭转角
    pub twist_limit: f32,
}

impl Default for RagdollParams {
    fn default() -> Self {
        Self {
            scale: 4.8,
            cone_limit: PI / 16.0,
            shoulder_cone_limit: PI / 16.0,
            twist_limit: 0.0,
        }
    }
}

/// 人形拓扑
///
/// ```text
/// upperBody
/// ├── head                (neckJoint)
/// ├── upperLeftArm        (leftShoulder)
/// │   └── lowerLeftArm    (leftElbowJoint)
/// ├── upperRightArm       (rightShoulder)
/// │   └── lowerRightArm   (rightElbowJoint)
/// └── pelvis              (spineJoint)
///     ├── upperLeftLeg    (leftHipJoint)
///     │   └── lowerLeftLeg    (leftKneeJoint)
///     └── upperRightLeg   (rightHipJoint)
///         └── lowerRightLeg   (rightKneeJoint)
/// ```
pub fn humanoid_topology() -> RigTopology {
    RigTopology::new(
        RigNode::root("upperBody")
            .with_child(RigNode::new("head", "neckJoint"))
            .with_child(
                RigNode::new("upperLeftArm", "leftShoulder")
                    .with_child(RigNode::new("lowerLeftArm", "leftElbowJoint")),
            )
            .with_child(
                RigNode::new("upperRightArm", "rightShoulder")
                    .with_child(RigNode::new("lowerRightArm", "rightElbowJoint")),
            )
            .with_child(
                RigNode::new("pelvis", "spineJoint")
                    .with_child(
                        RigNode::new("upperLeftLeg", "leftHipJoint")
                            .with_child(RigNode::new("lowerLeftLeg", "leftKneeJoint")),
                    )
                    .with_child(
                        RigNode::new("upperRightLeg", "rightHipJoint")
                            .with_child(RigNode::new("lowerRightLeg", "rightKneeJoint")),
                    ),
            ),
    )
}

/// 创建人形布娃娃配置
///
/// ## 坐标系说明
///
/// - **世界坐标系**: Y轴向上，脚底位于 y=0
/// - **部件坐标系**: 盒子中心在原点
/// - **锚点**: 初始姿态下父端锚点和子端锚点重合
///
/// ## 返回值
///
/// - `(config, topology)`: 部件/关节规格和对应的拓扑
pub fn create_humanoid(params: &RagdollParams) -> (RigConfig, RigTopology) {
    let s = params.scale;

    // 各段长度与粗细
    let shoulders_distance = 0.5 * s;
    let upper_arm_length = 0.4 * s;
    let lower_arm_length = 0.4 * s;
    let upper_arm_size = 0.2 * s;
    let lower_arm_size = 0.2 * s;
    let neck_length = 0.1 * s;
    let head_radius = 0.25 * s;
    let upper_body_length = 0.6 * s;
    let pelvis_length = 0.4 * s;
    let upper_leg_length = 0.5 * s;
    let upper_leg_size = 0.2 * s;
    let lower_leg_size = 0.2 * s;
    let lower_leg_length = 0.5 * s;

    // 关键高度
    let hip_height = lower_leg_length + upper_leg_length;
    let waist_height = hip_height + pelvis_length;
    let shoulder_height = waist_height + upper_body_length;
    let leg_x = shoulders_distance / 3.0;
    let arm_x = shoulders_distance / 2.0;

    let mut config = RigConfig::new();
    let mut part = |name: &str, half_extents: Vec3, color, position: Vec3| {
        config.add_part(BodyPartSpec::new(name, half_extents, s, color, position));
    };

    // 腿
    for (side, x) in [("Left", -leg_x), ("Right", leg_x)] {
        part(
            &format!("lower{side}Leg"),
            Vec3::new(lower_leg_size, lower_leg_length, lower_arm_size) * 0.5,
            LIGHT_BLUE,
            Vec3::new(x, lower_leg_length / 2.0, 0.0),
        );
        part(
            &format!("upper{side}Leg"),
            Vec3::new(upper_leg_size, upper_leg_length, lower_arm_size) * 0.5,
            LIGHT_BLUE,
            Vec3::new(x, lower_leg_length + upper_leg_length / 2.0, 0.0),
        );
    }

    // 躯干
    part(
        "pelvis",
        Vec3::new(shoulders_distance, pelvis_length, lower_arm_size) * 0.5,
        LIGHT_BLUE,
        Vec3::new(0.0, hip_height + pelvis_length / 2.0, 0.0),
    );
    part(
        "upperBody",
        Vec3::new(shoulders_distance * 0.5, upper_body_length * 0.5, lower_arm_size * 0.75),
        INDIAN_RED,
        Vec3::new(0.0, waist_height + upper_body_length / 2.0, 0.0),
    );
    part(
        "head",
        Vec3::new(head_radius * 0.6, head_radius * 0.7, head_radius * 0.6),
        LIGHT_PINK,
        Vec3::new(0.0, shoulder_height + head_radius + neck_length, 0.0),
    );

    // 手臂
    for (side, dir) in [("Left", -1.0), ("Right", 1.0)] {
        part(
            &format!("upper{side}Arm"),
            Vec3::new(upper_arm_length, upper_arm_size, upper_arm_size) * 0.5,
            INDIAN_RED,
            Vec3::new(dir * (arm_x + upper_arm_length / 2.0), shoulder_height, 0.0),
        );
        part(
            &format!("lower{side}Arm"),
            Vec3::new(lower_arm_length, lower_arm_size, lower_arm_size) * 0.5,
            LIGHT_PINK,
            Vec3::new(
                dir * (arm_x + upper_arm_length + lower_arm_length / 2.0),
                shoulder_height,
                0.0,
            ),
        );
    }

    let limits = AngularLimits {
        cone: params.cone_limit,
        twist: params.twist_limit,
    };
    let shoulder_limits = AngularLimits {
        cone: params.shoulder_cone_limit,
        twist: params.twist_limit,
    };
    let mut joint = |name: &str, pivot_a: Vec3, pivot_b: Vec3, axis: Vec3, limits: AngularLimits| {
        config.add_joint(JointSpec {
            name: name.to_string(),
            pivot_a,
            pivot_b,
            axis_a: axis,
            axis_b: axis,
            limits,
        });
    };

    // 沿Y轴扭转的关节
    joint(
        "neckJoint",
        Vec3::new(0.0, upper_body_length / 2.0, 0.0),
        Vec3::new(0.0, -(head_radius + neck_length), 0.0),
        Vec3::Y,
        limits,
    );
    joint(
        "spineJoint",
        Vec3::new(0.0, -upper_body_length / 2.0, 0.0),
        Vec3::new(0.0, pelvis_length / 2.0, 0.0),
        Vec3::Y,
        limits,
    );
    for (side, x) in [("left", -leg_x), ("right", leg_x)] {
        joint(
            &format!("{side}HipJoint"),
            Vec3::new(x, -pelvis_length / 2.0, 0.0),
            Vec3::new(0.0, upper_leg_length / 2.0, 0.0),
            Vec3::Y,
            limits,
        );
        joint(
            &format!("{side}KneeJoint"),
            Vec3::new(0.0, -upper_leg_length / 2.0, 0.0),
            Vec3::new(0.0, lower_leg_length / 2.0, 0.0),
            Vec3::Y,
            limits,
        );
    }

    // 沿X轴扭转的关节（dir指向手臂外侧）
    for (side, dir) in [("left", -1.0), ("right", 1.0)] {
        joint(
            &format!("{side}Shoulder"),
            Vec3::new(dir * arm_x, upper_body_length / 2.0, 0.0),
            Vec3::new(-dir * upper_arm_length / 2.0, 0.0, 0.0),
            Vec3::X,
            shoulder_limits,
        );
        joint(
            &format!("{side}ElbowJoint"),
            Vec3::new(dir * upper_arm_length / 2.0, 0.0, 0.0),
            Vec3::new(-dir * lower_arm_length / 2.0, 0.0, 0.0),
            Vec3::X,
            limits,
        );
    }

    (config, humanoid_topology())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_humanoid() {
        let (config, topology) = create_humanoid(&RagdollParams::default());

        assert_eq!(config.shapes.len(), 11);
        assert_eq!(config.joints.len(), 10);
        assert_eq!(topology.parts().len(), 11);
        assert_eq!(topology.edges().len(), 10);
        assert_eq!(config.validate(&topology), Ok(()));

        for spec in config.shapes.values() {
            assert_eq!(spec.mass, 4.8);
        }
    }

    #[test]
    fn test_deterministic() {
        let params = RagdollParams {
            scale: 2.0,
            cone_limit: 0.3,
            shoulder_cone_limit: 0.5,
            twist_limit: 0.1,
        };
        let (a, ta) = create_humanoid(&params);
        let (b, tb) = create_humanoid(&params);

        assert_eq!(a.shapes, b.shapes);
        assert_eq!(a.joints, b.joints);
        assert_eq!(ta, tb);
        assert_eq!(a.joints["leftShoulder"].limits.cone, 0.5);
        assert_eq!(a.joints["leftElbowJoint"].limits.cone, 0.3);
        assert_eq!(a.joints["spineJoint"].limits.twist, 0.1);
    }

    #[test]
    fn test_rest_pose_pivots_coincide() {
        // 初始姿态下每条边两端的锚点在世界坐标系中重合
        let (config, topology) = create_humanoid(&RagdollParams::default());

        for edge in topology.edges() {
            let parent = &config.shapes[edge.parent];
            let child = &config.shapes[edge.child];
            let joint = &config.joints[edge.joint.unwrap()];

            let anchor_a = parent.rest_position + joint.pivot_a;
            let anchor_b = child.rest_position + joint.pivot_b;
            assert!(
                (anchor_a - anchor_b).length() < 1e-4,
                "{}: {anchor_a} != {anchor_b}",
                joint.name
            );
        }
    }
}
