//! 图容器
//!
//! 图独占顶点集、边集和关联索引。顶点和边以全局唯一 ID 存放在图内部的
//! 记录表中，对外只暴露轻量句柄（ID + 指向图的弱引用）。
//!
//! 每个图持有一把可重入锁，图本身以及它拥有的全部顶点/边句柄共用这把锁；
//! 所有读写操作都在锁内完成，外部观察到的状态总是某次变更完整生效后的结果。
//! 监听器在锁内、变更线程上同步回调。

use super::edge::{Edge, EdgeId, EdgeRecord};
use super::index::IncidenceIndex;
use super::listener::{GraphListener, ListenerRegistry};
use super::vertex::{Vertex, VertexId, VertexRecord};
use crate::error::{Error, Result};
use crate::types::Direction;
use indexmap::{IndexMap, IndexSet};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// 待分发的变更
#[derive(Debug, Clone, Copy)]
enum Change {
    Structure,
    Vertex(VertexId),
    Edge(EdgeId),
}

/// 锁内的图状态
pub(crate) struct GraphState {
    pub(crate) directed: bool,
    pub(crate) vertices: IndexMap<VertexId, VertexRecord>,
    pub(crate) edges: IndexMap<EdgeId, EdgeRecord>,
    pub(crate) incidence: IncidenceIndex,
    listeners: ListenerRegistry,
}

impl GraphState {
    fn new(directed: bool) -> Self {
        Self {
            directed,
            vertices: IndexMap::new(),
            edges: IndexMap::new(),
            incidence: IncidenceIndex::new(),
            listeners: ListenerRegistry::default(),
        }
    }

    /// 检查顶点是否属于本图
    pub(crate) fn require_vertex(&self, vertex: &Vertex) -> Result<VertexId> {
        let id = vertex.id();
        if self.vertices.contains_key(&id) {
            Ok(id)
        } else {
            Err(Error::ForeignVertex(id.as_u64()))
        }
    }

    fn insert_vertex(&mut self, record: VertexRecord) -> VertexId {
        let id = VertexId::next();
        self.vertices.insert(id, record);
        self.incidence.add_vertex(id);
        id
    }

    /// 插入边记录并登记关联索引，调用方负责校验端点
    fn insert_edge(&mut self, record: EdgeRecord) -> EdgeId {
        let id = EdgeId::next();
        self.incidence.link(record.source, record.target, id);
        if !self.directed {
            self.incidence.link(record.target, record.source, id);
        }
        self.edges.insert(id, record);
        id
    }

    /// 取得或创建 source→target 的边，返回边 ID 以及是否新建
    fn connect(&mut self, source: &Vertex, target: &Vertex) -> Result<(EdgeId, bool)> {
        let s = self.require_vertex(source)?;
        let t = self.require_vertex(target)?;
        if s == t {
            return Err(Error::SelfLoop(s.as_u64()));
        }
        if let Some(existing) = self.edge_between(s, t) {
            return Ok((existing, false));
        }

        let id = self.insert_edge(EdgeRecord::new(s, t));
        debug!(edge = id.as_u64(), source = s.as_u64(), target = t.as_u64(), "添加边");
        Ok((id, true))
    }

    fn detach_edge(&mut self, id: EdgeId) -> bool {
        let Some(record) = self.edges.shift_remove(&id) else {
            return false;
        };
        self.incidence.unlink(record.source, record.target);
        if !self.directed {
            self.incidence.unlink(record.target, record.source);
        }
        true
    }

    /// 级联删除顶点，返回被一并删除的边数
    ///
    /// 无向图只需遍历该顶点的索引行；有向图的入边仍需扫描。
    fn detach_vertex(&mut self, id: VertexId) -> Option<usize> {
        if !self.vertices.contains_key(&id) {
            return None;
        }

        let incident = self.incident_edge_ids(id, Direction::Both);
        for eid in &incident {
            self.detach_edge(*eid);
        }

        self.vertices.shift_remove(&id);
        self.incidence.remove_vertex(id);
        Some(incident.len())
    }

    pub(crate) fn edge_between(&self, source: VertexId, target: VertexId) -> Option<EdgeId> {
        self.incidence.get(source, target)
    }

    fn out_edge_ids(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.incidence
            .row(vertex)
            .map(|row| row.values().copied().collect())
            .unwrap_or_default()
    }

    /// 入边没有反向索引，需要扫描全部边
    fn in_edge_ids(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, e)| e.target == vertex)
            .map(|(id, _)| *id)
            .collect()
    }

    fn incident_edge_ids(&self, vertex: VertexId, direction: Direction) -> Vec<EdgeId> {
        if !self.directed {
            return self.out_edge_ids(vertex);
        }
        match direction {
            Direction::Outgoing => self.out_edge_ids(vertex),
            Direction::Incoming => self.in_edge_ids(vertex),
            Direction::Both => {
                let mut all = self.in_edge_ids(vertex);
                all.extend(self.out_edge_ids(vertex));
                all
            }
        }
    }

    /// 无向 → 有向：每条无向边 (u,v) 保留为 u→v，并新建一条属性相同的 v→u
    fn make_directed(&mut self) -> usize {
        let originals: Vec<EdgeId> = self.edges.keys().copied().collect();
        self.directed = true;

        let mut created = 0;
        for id in &originals {
            let Some(reverse) = self.edges.get(id).map(EdgeRecord::reversed) else {
                continue;
            };
            self.incidence.unlink(reverse.source, reverse.target);
            self.insert_edge(reverse);
            created += 1;
        }
        created
    }

    /// 有向 → 无向：按插入顺序遍历，若 (u,v) 仍在且 (v,u) 存在，删除较新的 (v,u)
    fn make_undirected(&mut self) -> usize {
        let ids: Vec<EdgeId> = self.edges.keys().copied().collect();

        let mut removed = 0;
        for id in ids {
            let Some(record) = self.edges.get(&id) else {
                continue;
            };
            if let Some(reverse) = self.incidence.get(record.target, record.source) {
                self.detach_edge(reverse);
                removed += 1;
            }
        }

        let surviving: Vec<(EdgeId, VertexId, VertexId)> = self
            .edges
            .iter()
            .map(|(id, e)| (*id, e.source, e.target))
            .collect();
        for (id, source, target) in surviving {
            self.incidence.link(target, source, id);
        }

        self.directed = false;
        removed
    }

    pub(crate) fn vertex_name(&self, id: VertexId) -> String {
        match self.vertices.get(&id).and_then(|v| v.label.as_deref()) {
            Some(label) => label.to_string(),
            None => format!("#{}", id.as_u64()),
        }
    }

    pub(crate) fn edge_name(&self, id: EdgeId) -> Option<String> {
        let edge = self.edges.get(&id)?;
        let (source, target) = (self.vertex_name(edge.source), self.vertex_name(edge.target));
        Some(if self.directed {
            format!("({}, {})", source, target)
        } else {
            format!("{{{}, {}}}", source, target)
        })
    }
}

/// 无自环、无重边的有向或无向图
pub struct Graph {
    this: Weak<Graph>,
    state: ReentrantMutex<RefCell<GraphState>>,
}

impl Graph {
    /// 创建空图
    pub fn new(directed: bool) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            state: ReentrantMutex::new(RefCell::new(GraphState::new(directed))),
        })
    }

    /// 创建空的无向图
    pub fn undirected() -> Arc<Self> {
        Self::new(false)
    }

    /// 创建空的有向图
    pub fn directed() -> Arc<Self> {
        Self::new(true)
    }

    // ==================== 锁与事件 ====================

    pub(crate) fn read<R>(&self, f: impl FnOnce(&GraphState) -> R) -> R {
        let guard = self.state.lock();
        let state = guard.borrow();
        f(&state)
    }

    /// 在锁内执行变更，变更完整生效后（仍持锁）分发事件
    fn mutate<R>(&self, f: impl FnOnce(&mut GraphState) -> (R, Option<Change>)) -> R {
        let guard = self.state.lock();
        let (result, change) = {
            let mut state = guard.borrow_mut();
            f(&mut state)
        };
        if let Some(change) = change {
            self.dispatch(&guard, change);
        }
        result
    }

    fn dispatch(&self, guard: &ReentrantMutexGuard<'_, RefCell<GraphState>>, change: Change) {
        // 回调期间不持有 RefCell 借用，监听器可以重入本图
        let listeners = guard.borrow().listeners.snapshot();
        if listeners.is_empty() {
            return;
        }
        trace!(?change, listeners = listeners.len(), "分发图变更事件");

        match change {
            Change::Structure => {
                for listener in &listeners {
                    listener.graph_changed(self);
                }
            }
            Change::Vertex(id) => {
                let vertex = self.vertex_handle(id);
                for listener in &listeners {
                    listener.vertex_changed(&vertex);
                }
            }
            Change::Edge(id) => {
                let edge = self.edge_handle(id);
                for listener in &listeners {
                    listener.edge_changed(&edge);
                }
            }
        }
    }

    /// 在一次加锁内执行多步操作
    ///
    /// 锁是可重入的，闭包内可以继续调用本图及其顶点/边的方法；
    /// 闭包执行期间其他线程看不到任何中间状态。
    pub fn atomically<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.state.lock();
        f()
    }

    pub(crate) fn vertex_handle(&self, id: VertexId) -> Vertex {
        Vertex::new(id, self.this.clone())
    }

    pub(crate) fn edge_handle(&self, id: EdgeId) -> Edge {
        Edge::new(id, self.this.clone())
    }

    fn vertex_handles(&self, ids: impl IntoIterator<Item = VertexId>) -> Vec<Vertex> {
        ids.into_iter().map(|id| self.vertex_handle(id)).collect()
    }

    fn edge_handles(&self, ids: impl IntoIterator<Item = EdgeId>) -> Vec<Edge> {
        ids.into_iter().map(|id| self.edge_handle(id)).collect()
    }

    // ==================== 监听器 ====================

    /// 注册监听器；同一个监听器重复注册时返回 false
    pub fn add_listener(&self, listener: Arc<dyn GraphListener>) -> bool {
        let guard = self.state.lock();
        let added = guard.borrow_mut().listeners.add(listener);
        added
    }

    /// 注销监听器
    pub fn remove_listener(&self, listener: &Arc<dyn GraphListener>) -> bool {
        let guard = self.state.lock();
        let removed = guard.borrow_mut().listeners.remove(listener);
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.read(|state| state.listeners.len())
    }

    // ==================== 查询 ====================

    /// 顶点数
    pub fn order(&self) -> usize {
        self.read(|state| state.vertices.len())
    }

    /// 边数
    pub fn size(&self) -> usize {
        self.read(|state| state.edges.len())
    }

    pub fn is_directed(&self) -> bool {
        self.read(|state| state.directed)
    }

    /// 全部顶点（按插入顺序）
    pub fn vertices(&self) -> Vec<Vertex> {
        self.read(|state| self.vertex_handles(state.vertices.keys().copied()))
    }

    /// 全部边（按插入顺序）
    pub fn edges(&self) -> Vec<Edge> {
        self.read(|state| self.edge_handles(state.edges.keys().copied()))
    }

    pub fn contains_vertex(&self, vertex: &Vertex) -> bool {
        self.read(|state| state.vertices.contains_key(&vertex.id()))
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.read(|state| state.edges.contains_key(&edge.id()))
    }

    /// 按标签查找第一个顶点
    pub fn find_vertex(&self, label: &str) -> Option<Vertex> {
        self.read(|state| {
            state
                .vertices
                .iter()
                .find(|(_, v)| v.label.as_deref() == Some(label))
                .map(|(id, _)| self.vertex_handle(*id))
        })
    }

    /// 是否存在 source 到 target 的边
    pub fn has_edge(&self, source: &Vertex, target: &Vertex) -> bool {
        self.edge_between(source, target).is_some()
    }

    /// 获取 source 到 target 的边；任一顶点不属于本图时返回 None
    pub fn edge_between(&self, source: &Vertex, target: &Vertex) -> Option<Edge> {
        self.read(|state| {
            state
                .edge_between(source.id(), target.id())
                .map(|id| self.edge_handle(id))
        })
    }

    /// 顶点的关联边；无向图中三个方向的结果相同
    pub fn incident_edges(&self, vertex: &Vertex, direction: Direction) -> Result<Vec<Edge>> {
        self.read(|state| {
            let id = resident(state, vertex)?;
            Ok(self.edge_handles(state.incident_edge_ids(id, direction)))
        })
    }

    pub fn out_edges(&self, vertex: &Vertex) -> Result<Vec<Edge>> {
        self.incident_edges(vertex, Direction::Outgoing)
    }

    pub fn in_edges(&self, vertex: &Vertex) -> Result<Vec<Edge>> {
        self.incident_edges(vertex, Direction::Incoming)
    }

    pub fn edges_of(&self, vertex: &Vertex) -> Result<Vec<Edge>> {
        self.incident_edges(vertex, Direction::Both)
    }

    /// 顶点的邻居：把每条关联边映射到另一端点，去重后按出现顺序返回
    pub fn neighbours(&self, vertex: &Vertex, direction: Direction) -> Result<Vec<Vertex>> {
        self.read(|state| {
            let id = resident(state, vertex)?;
            let mut found = IndexSet::new();
            for eid in state.incident_edge_ids(id, direction) {
                if let Some(edge) = state.edges.get(&eid) {
                    found.insert(edge.other(id));
                }
            }
            Ok(self.vertex_handles(found))
        })
    }

    // ==================== 结构变更 ====================

    /// 添加顶点
    pub fn add_vertex(&self, label: Option<&str>) -> Vertex {
        self.mutate(|state| {
            let id = state.insert_vertex(VertexRecord::new(label.map(str::to_string)));
            debug!(vertex = id.as_u64(), label, "添加顶点");
            (self.vertex_handle(id), Some(Change::Structure))
        })
    }

    /// 添加边；两点之间已有边时直接返回该边，不产生事件
    pub fn add_edge(&self, source: &Vertex, target: &Vertex) -> Result<Edge> {
        self.mutate(|state| match state.connect(source, target) {
            Ok((id, true)) => (Ok(self.edge_handle(id)), Some(Change::Structure)),
            Ok((id, false)) => (Ok(self.edge_handle(id)), None),
            Err(e) => (Err(e), None),
        })
    }

    /// 删除顶点及其全部关联边，只产生一次结构变更事件；顶点不在图中时不做任何事
    pub fn remove_vertex(&self, vertex: &Vertex) -> bool {
        self.mutate(|state| match state.detach_vertex(vertex.id()) {
            Some(edges) => {
                debug!(vertex = vertex.id().as_u64(), edges, "删除顶点");
                (true, Some(Change::Structure))
            }
            None => (false, None),
        })
    }

    /// 删除边；边不在图中时不做任何事
    pub fn remove_edge(&self, edge: &Edge) -> bool {
        self.mutate(|state| {
            if state.detach_edge(edge.id()) {
                debug!(edge = edge.id().as_u64(), "删除边");
                (true, Some(Change::Structure))
            } else {
                (false, None)
            }
        })
    }

    /// 切换有向/无向模式
    ///
    /// 无向转有向时边数翻倍；有向转无向时成对的边只保留较早插入的一条，
    /// 另一条的权重和属性会丢失。
    pub fn set_directed(&self, directed: bool) {
        self.mutate(|state| {
            if state.directed == directed {
                return ((), None);
            }
            if directed {
                let created = state.make_directed();
                debug!(created, "无向图转换为有向图");
            } else {
                let removed = state.make_undirected();
                debug!(removed, "有向图转换为无向图");
            }
            ((), Some(Change::Structure))
        })
    }

    // ==================== 复制与辅助 ====================

    /// 深拷贝：新图与原图不共享任何可变状态，也不继承监听器
    pub fn deep_clone(&self) -> Arc<Graph> {
        self.read(|state| {
            let copy = Graph::new(state.directed);
            {
                let guard = copy.state.lock();
                let mut target = guard.borrow_mut();

                let mut binding: HashMap<VertexId, VertexId> = HashMap::new();
                for (id, vertex) in &state.vertices {
                    binding.insert(*id, target.insert_vertex(vertex.clone()));
                }
                for edge in state.edges.values() {
                    if let (Some(&s), Some(&t)) = (binding.get(&edge.source), binding.get(&edge.target)) {
                        target.insert_edge(edge.rebound(s, t));
                    }
                }
            }
            copy
        })
    }

    /// 以全部顶点为键、统一初始值的映射
    pub fn vertex_map<T: Clone>(&self, value: T) -> HashMap<Vertex, T> {
        filled(self.vertices(), value)
    }

    /// 以全部边为键、统一初始值的映射
    pub fn edge_map<T: Clone>(&self, value: T) -> HashMap<Edge, T> {
        filled(self.edges(), value)
    }

    // ==================== 顶点/边记录访问 ====================

    pub(crate) fn with_vertex<R>(&self, id: VertexId, f: impl FnOnce(&VertexRecord) -> R) -> Result<R> {
        self.read(|state| {
            state
                .vertices
                .get(&id)
                .map(f)
                .ok_or(Error::VertexDetached(id.as_u64()))
        })
    }

    /// 修改顶点记录并产生顶点变更事件
    pub(crate) fn update_vertex<R>(
        &self,
        id: VertexId,
        f: impl FnOnce(&mut VertexRecord) -> R,
    ) -> Result<R> {
        self.update_vertex_if(id, f, |_| true)
    }

    /// 修改顶点记录，只有 `changed` 认定结果确有变化时才产生事件
    pub(crate) fn update_vertex_if<R>(
        &self,
        id: VertexId,
        f: impl FnOnce(&mut VertexRecord) -> R,
        changed: impl FnOnce(&R) -> bool,
    ) -> Result<R> {
        self.mutate(|state| match state.vertices.get_mut(&id) {
            Some(record) => {
                let result = f(record);
                let change = changed(&result).then_some(Change::Vertex(id));
                (Ok(result), change)
            }
            None => (Err(Error::VertexDetached(id.as_u64())), None),
        })
    }

    pub(crate) fn with_edge<R>(&self, id: EdgeId, f: impl FnOnce(&EdgeRecord) -> R) -> Result<R> {
        self.read(|state| {
            state
                .edges
                .get(&id)
                .map(f)
                .ok_or(Error::EdgeDetached(id.as_u64()))
        })
    }

    /// 修改边记录并产生边变更事件
    pub(crate) fn update_edge<R>(&self, id: EdgeId, f: impl FnOnce(&mut EdgeRecord) -> R) -> Result<R> {
        self.update_edge_if(id, f, |_| true)
    }

    /// 修改边记录，只有 `changed` 认定结果确有变化时才产生事件
    pub(crate) fn update_edge_if<R>(
        &self,
        id: EdgeId,
        f: impl FnOnce(&mut EdgeRecord) -> R,
        changed: impl FnOnce(&R) -> bool,
    ) -> Result<R> {
        self.mutate(|state| match state.edges.get_mut(&id) {
            Some(record) => {
                let result = f(record);
                let change = changed(&result).then_some(Change::Edge(id));
                (Ok(result), change)
            }
            None => (Err(Error::EdgeDetached(id.as_u64())), None),
        })
    }
}

/// 顶点必须仍在图中，否则视为已脱离
fn resident(state: &GraphState, vertex: &Vertex) -> Result<VertexId> {
    let id = vertex.id();
    if state.vertices.contains_key(&id) {
        Ok(id)
    } else {
        Err(Error::VertexDetached(id.as_u64()))
    }
}

fn filled<K: Eq + Hash, T: Clone>(keys: Vec<K>, value: T) -> HashMap<K, T> {
    keys.into_iter().map(|k| (k, value.clone())).collect()
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (vertices, edges) = self.read(|state| {
            let vertices: Vec<String> = state.vertices.keys().map(|id| state.vertex_name(*id)).collect();
            let edges: Vec<String> = state.edges.keys().filter_map(|id| state.edge_name(*id)).collect();
            (vertices, edges)
        });
        write!(
            f,
            "[Vertices: [{}] Edges: [{}]]",
            vertices.join(", "),
            edges.join(", ")
        )
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (directed, order, size) = self.read(|s| (s.directed, s.vertices.len(), s.edges.len()));
        f.debug_struct("Graph")
            .field("directed", &directed)
            .field("order", &order)
            .field("size", &size)
            .finish()
    }
}
