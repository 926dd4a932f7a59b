//! 图变更监听
//!
//! 监听器在发生变更的线程上、在图锁内同步调用，调用顺序即注册顺序。
//! 图锁是可重入的，监听器可以在回调中再次访问同一个图；
//! 但回调不应长时间阻塞，否则会拖住所有等待该图的线程。

use super::edge::Edge;
use super::graph::Graph;
use super::vertex::Vertex;
use std::fmt;
use std::sync::Arc;

/// 图变更监听器
pub trait GraphListener: Send + Sync {
    /// 结构变更：顶点或边的增删，或有向/无向模式切换
    fn graph_changed(&self, _graph: &Graph) {}

    /// 顶点的标签或属性发生变化
    fn vertex_changed(&self, _vertex: &Vertex) {}

    /// 边的权重或属性发生变化
    fn edge_changed(&self, _edge: &Edge) {}
}

type GraphCallback = Box<dyn Fn(&Graph) + Send + Sync>;
type VertexCallback = Box<dyn Fn(&Vertex) + Send + Sync>;
type EdgeCallback = Box<dyn Fn(&Edge) + Send + Sync>;

/// 基于闭包的监听器
///
/// ```
/// use cograph::{FnListener, Graph};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let graph = Graph::undirected();
/// let changes = Arc::new(AtomicUsize::new(0));
/// let counter = changes.clone();
/// graph.add_listener(Arc::new(FnListener::new().on_graph(move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// })));
///
/// graph.add_vertex(Some("a"));
/// assert_eq!(changes.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct FnListener {
    on_graph: Option<GraphCallback>,
    on_vertex: Option<VertexCallback>,
    on_edge: Option<EdgeCallback>,
}

impl FnListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_graph<F>(mut self, f: F) -> Self
    where
        F: Fn(&Graph) + Send + Sync + 'static,
    {
        self.on_graph = Some(Box::new(f));
        self
    }

    pub fn on_vertex<F>(mut self, f: F) -> Self
    where
        F: Fn(&Vertex) + Send + Sync + 'static,
    {
        self.on_vertex = Some(Box::new(f));
        self
    }

    pub fn on_edge<F>(mut self, f: F) -> Self
    where
        F: Fn(&Edge) + Send + Sync + 'static,
    {
        self.on_edge = Some(Box::new(f));
        self
    }
}

impl GraphListener for FnListener {
    fn graph_changed(&self, graph: &Graph) {
        if let Some(f) = &self.on_graph {
            f(graph);
        }
    }

    fn vertex_changed(&self, vertex: &Vertex) {
        if let Some(f) = &self.on_vertex {
            f(vertex);
        }
    }

    fn edge_changed(&self, edge: &Edge) {
        if let Some(f) = &self.on_edge {
            f(edge);
        }
    }
}

impl fmt::Debug for FnListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener")
            .field("on_graph", &self.on_graph.is_some())
            .field("on_vertex", &self.on_vertex.is_some())
            .field("on_edge", &self.on_edge.is_some())
            .finish()
    }
}

/// 已注册监听器列表（按注册顺序，不重复）
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: Vec<Arc<dyn GraphListener>>,
}

impl ListenerRegistry {
    /// 注册监听器，同一个 Arc 重复注册时返回 false
    pub fn add(&mut self, listener: Arc<dyn GraphListener>) -> bool {
        if self.listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    pub fn remove(&mut self, listener: &Arc<dyn GraphListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    /// 分发前复制一份，回调期间的注册/注销不影响本次分发
    pub fn snapshot(&self) -> Vec<Arc<dyn GraphListener>> {
        self.listeners.clone()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl GraphListener for Noop {}

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = ListenerRegistry::default();
        let a: Arc<dyn GraphListener> = Arc::new(Noop);
        let b: Arc<dyn GraphListener> = Arc::new(Noop);

        assert!(registry.add(a.clone()));
        assert!(!registry.add(a.clone()));
        assert!(registry.add(b.clone()));
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(&a));
        assert!(!registry.remove(&a));
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.snapshot()[0], &b));
    }
}
