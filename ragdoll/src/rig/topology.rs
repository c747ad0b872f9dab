//! # 布娃娃拓扑
//!
//! 显式的部件树：每个非根节点通过唯一的一条边连接到父节点，
//! 边上携带该节点的关节名

/// 拓扑树节点
#[derive(Debug, Clone, PartialEq)]
pub struct RigNode {
    /// 部件名，对应 [`BodyPartSpec::name`](super::config::BodyPartSpec)
    pub part: String,
    /// 连接父节点的关节名（根节点为 `None`）
    pub joint: Option<String>,
    pub children: Vec<RigNode>,
}

impl RigNode {
    /// 创建根节点
    pub fn root(part: &str) -> Self {
        Self {
            part: part.to_string(),
            joint: None,
            children: Vec::new(),
        }
    }

    /// 创建通过 `joint` 挂到父节点上的节点
    pub fn new(part: &str, joint: &str) -> Self {
        Self {
            part: part.to_string(),
            joint: Some(joint.to_string()),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: RigNode) -> Self {
        self.children.push(child);
        self
    }
}

/// 一条父子边
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RigEdge<'a> {
    pub parent: &'a str,
    pub child: &'a str,
    pub joint: Option<&'a str>,
}

/// 部件拓扑
#[derive(Debug, Clone, PartialEq)]
pub struct RigTopology {
    root: RigNode,
}

impl RigTopology {
    pub fn new(root: RigNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &RigNode {
        &self.root
    }

    /// 深度优先（先父后子）访问所有节点
    ///
    /// 回调参数为 `(节点, 父节点部件名)`
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a RigNode, Option<&'a str>)) {
        fn recurse<'a>(
            node: &'a RigNode,
            parent: Option<&'a str>,
            visit: &mut impl FnMut(&'a RigNode, Option<&'a str>),
        ) {
            visit(node, parent);
            for child in &node.children {
                recurse(child, Some(node.part.as_str()), visit);
            }
        }
        recurse(&self.root, None, &mut visit);
    }

    /// 深度优先顺序的部件名
    pub fn parts(&self) -> Vec<&str> {
        let mut parts = Vec::new();
        self.walk(|node, _| parts.push(node.part.as_str()));
        parts
    }

    /// 所有父子边，每个非根节点一条
    pub fn edges(&self) -> Vec<RigEdge<'_>> {
        let mut edges = Vec::new();
        self.walk(|node, parent| {
            if let Some(parent) = parent {
                edges.push(RigEdge {
                    parent,
                    child: &node.part,
                    joint: node.joint.as_deref(),
                });
            }
        });
        edges
    }
}
