//! 边定义
//!
//! 与顶点一样，`Edge` 是指向图内记录的句柄。端点在创建后不可变，
//! 权重（默认 1.0）和属性可变。

use super::graph::Graph;
use super::properties::{parse_property_list, typed_value};
use super::vertex::{Vertex, VertexId};
use crate::error::{Error, Result};
use crate::types::{Properties, PropertyValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// 边 ID（进程内全局唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// 默认权重
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// 图内保存的边数据
#[derive(Debug, Clone)]
pub(crate) struct EdgeRecord {
    pub(crate) source: VertexId,
    pub(crate) target: VertexId,
    pub(crate) weight: f64,
    pub(crate) properties: Properties,
}

impl EdgeRecord {
    pub(crate) fn new(source: VertexId, target: VertexId) -> Self {
        Self {
            source,
            target,
            weight: DEFAULT_WEIGHT,
            properties: Properties::new(),
        }
    }

    /// 方向相反、权重和属性相同的副本
    pub(crate) fn reversed(&self) -> Self {
        self.rebound(self.target, self.source)
    }

    /// 换一对端点的副本
    pub(crate) fn rebound(&self, source: VertexId, target: VertexId) -> Self {
        Self {
            source,
            target,
            weight: self.weight,
            properties: self.properties.clone(),
        }
    }

    /// 另一端点
    pub(crate) fn other(&self, vertex: VertexId) -> VertexId {
        if self.source == vertex {
            self.target
        } else {
            self.source
        }
    }
}

/// 边句柄
#[derive(Clone)]
pub struct Edge {
    id: EdgeId,
    graph: Weak<Graph>,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, graph: Weak<Graph>) -> Self {
        Self { id, graph }
    }

    /// 获取边 ID
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// 所属的图；边已被删除时返回 None
    pub fn graph(&self) -> Option<Arc<Graph>> {
        let graph = self.graph.upgrade()?;
        graph.contains_edge(self).then_some(graph)
    }

    pub fn is_detached(&self) -> bool {
        self.graph().is_none()
    }

    fn owner(&self) -> Result<Arc<Graph>> {
        self.graph.upgrade().ok_or(Error::GraphDropped)
    }

    // ==================== 端点 ====================

    /// 起点
    pub fn source(&self) -> Result<Vertex> {
        Ok(self.endpoints()?.0)
    }

    /// 终点
    pub fn target(&self) -> Result<Vertex> {
        Ok(self.endpoints()?.1)
    }

    /// (起点, 终点)
    pub fn endpoints(&self) -> Result<(Vertex, Vertex)> {
        let graph = self.owner()?;
        let (s, t) = graph.with_edge(self.id, |e| (e.source, e.target))?;
        Ok((graph.vertex_handle(s), graph.vertex_handle(t)))
    }

    /// 给定一个端点，返回另一个端点
    pub fn opposite(&self, vertex: &Vertex) -> Result<Vertex> {
        let (s, t) = self.endpoints()?;
        if s == *vertex {
            Ok(t)
        } else if t == *vertex {
            Ok(s)
        } else {
            Err(Error::ForeignVertex(vertex.id().as_u64()))
        }
    }

    // ==================== 权重与属性 ====================

    pub fn weight(&self) -> Result<f64> {
        self.owner()?.with_edge(self.id, |e| e.weight)
    }

    pub fn set_weight(&self, weight: f64) -> Result<()> {
        self.owner()?.update_edge(self.id, |e| e.weight = weight)
    }

    /// 获取属性
    pub fn property(&self, key: &str) -> Result<Option<PropertyValue>> {
        self.owner()?
            .with_edge(self.id, |e| e.properties.get(key).cloned())
    }

    /// 设置属性；值为 `Null` 时删除该属性
    pub fn set_property(&self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        self.owner()?.update_edge(self.id, |e| {
            if value.is_null() {
                e.properties.shift_remove(&key);
            } else {
                e.properties.insert(key, value);
            }
        })
    }

    /// 移除属性
    pub fn remove_property(&self, key: &str) -> Result<Option<PropertyValue>> {
        self.owner()?.update_edge_if(
            self.id,
            |e| e.properties.shift_remove(key),
            Option::is_some,
        )
    }

    pub fn property_names(&self) -> Result<Vec<String>> {
        self.owner()?
            .with_edge(self.id, |e| e.properties.keys().cloned().collect())
    }

    pub fn properties(&self) -> Result<Properties> {
        self.owner()?.with_edge(self.id, |e| e.properties.clone())
    }

    pub fn int_value(&self, key: &str) -> Result<i64> {
        typed_value(self.property(key)?, key, "int", PropertyValue::as_int)
    }

    pub fn float_value(&self, key: &str) -> Result<f64> {
        typed_value(self.property(key)?, key, "float", PropertyValue::as_float)
    }

    pub fn bool_value(&self, key: &str) -> Result<bool> {
        typed_value(self.property(key)?, key, "bool", PropertyValue::as_bool)
    }

    pub fn string_value(&self, key: &str) -> Result<String> {
        typed_value(self.property(key)?, key, "string", |v| Some(v.to_string()))
    }

    /// 读取属性文本；不含 `=` 的数值片段作为权重
    pub fn read_properties(&self, text: &str) -> Result<()> {
        let parsed = parse_property_list(text);
        self.owner()?.update_edge(self.id, |e| {
            e.properties.extend(parsed.properties);
            if let Some(weight) = parsed.weight {
                e.weight = weight;
            }
        })
    }

    /// 从图中删除本边
    pub fn remove(&self) -> Result<()> {
        let graph = self.owner()?;
        if graph.remove_edge(self) {
            Ok(())
        } else {
            Err(Error::EdgeDetached(self.id.as_u64()))
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge(#{})", self.id.as_u64())
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .graph
            .upgrade()
            .and_then(|g| g.read(|state| state.edge_name(self.id)));
        match name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "<detached #{}>", self.id.as_u64()),
        }
    }
}
