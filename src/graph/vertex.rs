//! 顶点定义
//!
//! `Vertex` 只是一个句柄：全局唯一的 ID 加上指向所属图的弱引用。
//! 标签、属性和邻接关系都存放在图中，读写时经由图的锁完成。
//! 顶点被删除后句柄脱离图，之后的任何访问都会返回错误。

use super::edge::Edge;
use super::graph::Graph;
use super::properties::{parse_property_list, typed_value};
use crate::error::{Error, Result};
use crate::types::{Direction, Properties, PropertyValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// 顶点 ID（进程内全局唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// 分配新的 ID，跨所有图不重复
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// 图内保存的顶点数据
#[derive(Debug, Clone, Default)]
pub(crate) struct VertexRecord {
    pub(crate) label: Option<String>,
    pub(crate) properties: Properties,
}

impl VertexRecord {
    pub(crate) fn new(label: Option<String>) -> Self {
        Self {
            label,
            properties: Properties::new(),
        }
    }
}

/// 顶点句柄
#[derive(Clone)]
pub struct Vertex {
    id: VertexId,
    graph: Weak<Graph>,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, graph: Weak<Graph>) -> Self {
        Self { id, graph }
    }

    /// 获取顶点 ID
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// 所属的图；顶点已被删除时返回 None
    pub fn graph(&self) -> Option<Arc<Graph>> {
        let graph = self.graph.upgrade()?;
        graph.contains_vertex(self).then_some(graph)
    }

    pub fn is_detached(&self) -> bool {
        self.graph().is_none()
    }

    fn owner(&self) -> Result<Arc<Graph>> {
        self.graph.upgrade().ok_or(Error::GraphDropped)
    }

    // ==================== 标签与属性 ====================

    pub fn label(&self) -> Result<Option<String>> {
        self.owner()?.with_vertex(self.id, |v| v.label.clone())
    }

    pub fn set_label(&self, label: Option<&str>) -> Result<()> {
        self.owner()?
            .update_vertex(self.id, |v| v.label = label.map(str::to_string))
    }

    /// 获取属性
    pub fn property(&self, key: &str) -> Result<Option<PropertyValue>> {
        self.owner()?
            .with_vertex(self.id, |v| v.properties.get(key).cloned())
    }

    /// 设置属性；值为 `Null` 时删除该属性
    pub fn set_property(&self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        self.owner()?.update_vertex(self.id, |v| {
            if value.is_null() {
                v.properties.shift_remove(&key);
            } else {
                v.properties.insert(key, value);
            }
        })
    }

    /// 移除属性
    pub fn remove_property(&self, key: &str) -> Result<Option<PropertyValue>> {
        self.owner()?.update_vertex_if(
            self.id,
            |v| v.properties.shift_remove(key),
            Option::is_some,
        )
    }

    /// 获取全部属性名
    pub fn property_names(&self) -> Result<Vec<String>> {
        self.owner()?
            .with_vertex(self.id, |v| v.properties.keys().cloned().collect())
    }

    /// 获取全部属性的副本
    pub fn properties(&self) -> Result<Properties> {
        self.owner()?.with_vertex(self.id, |v| v.properties.clone())
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

    /// 读取 `key=value;...` 形式的属性文本，只产生一次变更事件
    pub fn read_properties(&self, text: &str) -> Result<()> {
        let parsed = parse_property_list(text);
        self.owner()?
            .update_vertex(self.id, |v| v.properties.extend(parsed.properties))
    }

    // ==================== 邻接查询 ====================

    pub fn out_edges(&self) -> Result<Vec<Edge>> {
        self.owner()?.out_edges(self)
    }

    pub fn in_edges(&self) -> Result<Vec<Edge>> {
        self.owner()?.in_edges(self)
    }

    pub fn edges(&self) -> Result<Vec<Edge>> {
        self.owner()?.edges_of(self)
    }

    pub fn neighbours(&self) -> Result<Vec<Vertex>> {
        self.owner()?.neighbours(self, Direction::Both)
    }

    pub fn out_neighbours(&self) -> Result<Vec<Vertex>> {
        self.owner()?.neighbours(self, Direction::Outgoing)
    }

    pub fn in_neighbours(&self) -> Result<Vec<Vertex>> {
        self.owner()?.neighbours(self, Direction::Incoming)
    }

    /// 从图中删除本顶点及其关联边
    pub fn remove(&self) -> Result<()> {
        let graph = self.owner()?;
        if graph.remove_vertex(self) {
            Ok(())
        } else {
            Err(Error::VertexDetached(self.id.as_u64()))
        }
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vertex(#{})", self.id.as_u64())
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Ok(Some(label)) => write!(f, "{}", label),
            _ => write!(f, "#{}", self.id.as_u64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FnListener;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_vertex_ids_are_unique() {
        let a = VertexId::next();
        let b = VertexId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_label_and_properties() {
        let graph = Graph::undirected();
        let v = graph.add_vertex(Some("a"));

        assert_eq!(v.label().unwrap().as_deref(), Some("a"));
        v.set_label(None).unwrap();
        assert_eq!(v.label().unwrap(), None);
        assert_eq!(v.to_string(), format!("#{}", v.id().as_u64()));

        v.set_property("x", 3i64).unwrap();
        v.set_property("name", "hub").unwrap();
        assert_eq!(v.property("x").unwrap(), Some(PropertyValue::Int(3)));
        assert_eq!(v.property_names().unwrap(), vec!["x", "name"]);

        v.set_property("x", PropertyValue::Null).unwrap();
        assert_eq!(v.property("x").unwrap(), None);
        assert_eq!(v.remove_property("name").unwrap(), Some(PropertyValue::from("hub")));
        assert!(v.properties().unwrap().is_empty());
    }

    #[test]
    fn test_read_properties_and_typed_values() {
        let graph = Graph::undirected();
        let v = graph.add_vertex(Some("a"));

        let events = Arc::new(AtomicUsize::new(0));
        let e = events.clone();
        graph.add_listener(Arc::new(FnListener::new().on_vertex(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        })));

        v.read_properties("x=10; ratio=0.5;flag=true;broken;x=12").unwrap();
        assert_eq!(events.load(Ordering::SeqCst), 1);

        assert_eq!(v.int_value("x").unwrap(), 12);
        assert_eq!(v.float_value("ratio").unwrap(), 0.5);
        assert!(v.bool_value("flag").unwrap());
        assert_eq!(v.string_value("x").unwrap(), "12");
        assert!(matches!(v.int_value("missing"), Err(Error::PropertyNotFound(_))));
        assert!(matches!(v.int_value("ratio"), Err(Error::PropertyType { .. })));
        assert_eq!(v.property_names().unwrap(), vec!["x", "ratio", "flag"]);
    }

    #[test]
    fn test_remove_absent_property_is_silent() {
        let graph = Graph::undirected();
        let v = graph.add_vertex(Some("a"));
        v.set_property("k", 1i64).unwrap();

        let events = Arc::new(AtomicUsize::new(0));
        let e = events.clone();
        graph.add_listener(Arc::new(FnListener::new().on_vertex(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        })));

        assert_eq!(v.remove_property("missing").unwrap(), None);
        assert_eq!(events.load(Ordering::SeqCst), 0);
        assert_eq!(v.remove_property("k").unwrap(), Some(PropertyValue::Int(1)));
        assert_eq!(events.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_neighbours() {
        let graph = Graph::directed();
        let a = graph.add_vertex(Some("a"));
        let b = graph.add_vertex(Some("b"));
        let c = graph.add_vertex(Some("c"));
        graph.add_edge(&a, &b).unwrap();
        graph.add_edge(&c, &a).unwrap();
        graph.add_edge(&b, &a).unwrap();

        assert_eq!(a.out_neighbours().unwrap(), vec![b.clone()]);
        assert_eq!(a.in_neighbours().unwrap(), vec![c.clone(), b.clone()]);
        assert_eq!(a.neighbours().unwrap(), vec![c, b]);
        assert_eq!(a.edges().unwrap().len(), 3);
    }

    #[test]
    fn test_detached_vertex_fails() {
        let graph = Graph::undirected();
        let a = graph.add_vertex(Some("a"));
        let b = graph.add_vertex(Some("b"));
        graph.add_edge(&a, &b).unwrap();

        a.remove().unwrap();
        assert!(a.is_detached());
        assert!(a.graph().is_none());
        assert!(matches!(a.edges(), Err(Error::VertexDetached(_))));
        assert!(matches!(a.neighbours(), Err(Error::VertexDetached(_))));
        assert!(matches!(a.label(), Err(Error::VertexDetached(_))));
        assert!(matches!(a.set_property("k", 1i64), Err(Error::VertexDetached(_))));
        assert!(matches!(a.remove(), Err(Error::VertexDetached(_))));
        assert!(b.edges().unwrap().is_empty());
    }

    #[test]
    fn test_dropped_graph() {
        let graph = Graph::undirected();
        let v = graph.add_vertex(Some("a"));
        drop(graph);

        assert!(v.is_detached());
        assert!(matches!(v.label(), Err(Error::GraphDropped)));
    }
}
