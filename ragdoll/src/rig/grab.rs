//! # 抓取控制器
//!
//! 每个部件一个两状态状态机（`Disabled` / `Enabled`），
//! 由指针事件驱动，切换光标与部件之间预先创建的点对点约束。
//!
//! ## 状态转移表
//!
//! ```text
//!              Down        Up          Leave
//! Disabled  →  Enabled     Disabled    Disabled
//! Enabled   →  Enabled     Disabled    Disabled
//! ```
//!
//! 重复启用/禁用都是空操作：同一次抓取可能同时收到 Up 和 Leave。
//! 不强制互斥，多个部件可以同时处于 `Enabled`。

use super::engine::{ConstraintHandle, PhysicsEngine, RigidBodyHandle};
use super::error::{RigError, RigResult};
use bevy::log::debug;
use bevy::math::Vec3;
use bevy::picking::pointer::PointerId;
use std::collections::HashMap;

/// 单个部件的抓取状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrabState {
    /// 初始状态，抓取约束禁用
    #[default]
    Disabled,
    /// 抓取约束启用，部件跟随光标
    Enabled,
}

/// 驱动状态机的指针事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down,
    Up,
    Leave,
}

impl GrabState {
    /// 状态转移
    pub fn next(self, event: PointerEvent) -> GrabState {
        use GrabState::*;
        use PointerEvent::*;

        match (self, event) {
            (Disabled, Down) => Enabled,
            (Disabled, Up) => Disabled,
            (Disabled, Leave) => Disabled,
            (Enabled, Down) => Enabled,
            (Enabled, Up) => Disabled,
            (Enabled, Leave) => Disabled,
        }
    }
}

/// 一个可抓取的部件
#[derive(Debug, Clone)]
struct LimbGrab {
    part: String,
    constraint: ConstraintHandle,
    state: GrabState,
}

/// 抓取控制器
///
/// 独占光标刚体和所有抓取约束的修改权
#[derive(Debug)]
pub struct GrabController {
    cursor: RigidBodyHandle,
    limbs: Vec<LimbGrab>,
    index: HashMap<String, usize>,
    /// 指针捕获：按下后该指针的后续事件都归属这个部件
    captures: HashMap<PointerId, usize>,
    cursor_target: Vec3,
}

impl GrabController {
    pub fn new(cursor: RigidBodyHandle, cursor_position: Vec3) -> Self {
        Self {
            cursor,
            limbs: Vec::new(),
            index: HashMap::new(),
            captures: HashMap::new(),
            cursor_target: cursor_position,
        }
    }

    /// 登记部件及其（禁用的）抓取约束
    pub fn register(&mut self, part: &str, constraint: ConstraintHandle) {
        self.index.insert(part.to_string(), self.limbs.len());
        self.limbs.push(LimbGrab {
            part: part.to_string(),
            constraint,
            state: GrabState::Disabled,
        });
    }

    pub fn cursor(&self) -> RigidBodyHandle {
        self.cursor
    }

    /// 最近一次写入光标刚体的位置
    pub fn cursor_target(&self) -> Vec3 {
        self.cursor_target
    }

    pub fn state(&self, part: &str) -> Option<GrabState> {
        self.index.get(part).map(|&i| self.limbs[i].state)
    }

    pub fn constraint(&self, part: &str) -> Option<ConstraintHandle> {
        self.index.get(part).map(|&i| self.limbs[i].constraint)
    }

    /// 所有抓取约束
    pub fn constraints(&self) -> impl Iterator<Item = ConstraintHandle> + '_ {
        self.limbs.iter().map(|limb| limb.constraint)
    }

    /// 当前处于抓取状态的部件
    pub fn grabbed(&self) -> Vec<&str> {
        self.limbs
            .iter()
            .filter(|limb| limb.state == GrabState::Enabled)
            .map(|limb| limb.part.as_str())
            .collect()
    }

    /// 启用部件的抓取约束（幂等）
    pub fn enable(&mut self, engine: &mut impl PhysicsEngine, part: &str) -> RigResult<()> {
        let idx = self.limb_index(part)?;
        self.apply(engine, idx, GrabState::Enabled);
        Ok(())
    }

    /// 禁用部件的抓取约束（幂等）
    pub fn disable(&mut self, engine: &mut impl PhysicsEngine, part: &str) -> RigResult<()> {
        let idx = self.limb_index(part)?;
        self.apply(engine, idx, GrabState::Disabled);
        Ok(())
    }

    /// 处理落在某个部件网格上的指针事件
    ///
    /// `Down` 捕获指针，`Up` / `Leave` 释放捕获；返回转移后的状态
    pub fn handle_pointer(
        &mut self,
        engine: &mut impl PhysicsEngine,
        part: &str,
        pointer: PointerId,
        event: PointerEvent,
    ) -> RigResult<GrabState> {
        let idx = self.limb_index(part)?;

        match event {
            PointerEvent::Down => {
                self.captures.insert(pointer, idx);
            }
            PointerEvent::Up | PointerEvent::Leave => {
                if self.captures.get(&pointer) == Some(&idx) {
                    self.captures.remove(&pointer);
                }
            }
        }

        let next = self.limbs[idx].state.next(event);
        self.apply(engine, idx, next);
        Ok(next)
    }

    /// 指针在任意位置抬起：释放它捕获的部件
    ///
    /// 返回被释放的部件名；该指针没有捕获任何部件时返回 `None`
    pub fn release_pointer(
        &mut self,
        engine: &mut impl PhysicsEngine,
        pointer: PointerId,
    ) -> Option<&str> {
        let idx = self.captures.remove(&pointer)?;
        self.apply(engine, idx, GrabState::Disabled);
        Some(self.limbs[idx].part.as_str())
    }

    /// 每帧把光标刚体直接移动到指针投影位置
    ///
    /// 与抓取状态无关；约束只有在启用时才产生作用
    pub fn track_cursor(&mut self, engine: &mut impl PhysicsEngine, target: Vec3) {
        self.cursor_target = target;
        engine.set_position(self.cursor, target);
    }

    fn limb_index(&self, part: &str) -> RigResult<usize> {
        self.index
            .get(part)
            .copied()
            .ok_or_else(|| RigError::UnknownPart(part.to_string()))
    }

    fn apply(&mut self, engine: &mut impl PhysicsEngine, idx: usize, state: GrabState) {
        let limb = &mut self.limbs[idx];
        if limb.state == state {
            return;
        }

        match state {
            GrabState::Enabled => engine.enable(limb.constraint),
            GrabState::Disabled => engine.disable(limb.constraint),
        }
        debug!("grab {}: {:?} -> {:?}", limb.part, limb.state, state);
        limb.state = state;
    }
}
