//! 关联索引
//!
//! 顶点 → (邻居 → 边) 的映射，支持 O(1) 的邻接查询。
//! 无向图中每条边登记两次（u→v 与 v→u 指向同一条边），有向图只登记 u→v。

use crate::graph::edge::EdgeId;
use crate::graph::vertex::VertexId;
use indexmap::IndexMap;

/// 单个顶点的邻接行
pub(crate) type IncidenceRow = IndexMap<VertexId, EdgeId>;

/// 关联索引
#[derive(Debug, Default, Clone)]
pub(crate) struct IncidenceIndex {
    rows: IndexMap<VertexId, IncidenceRow>,
}

impl IncidenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为新顶点登记一个空行
    pub fn add_vertex(&mut self, vertex: VertexId) {
        self.rows.entry(vertex).or_default();
    }

    /// 移除顶点所在行，返回被移除的行
    pub fn remove_vertex(&mut self, vertex: VertexId) -> Option<IncidenceRow> {
        self.rows.shift_remove(&vertex)
    }

    /// 登记 from→to 的边；from 不存在或 from == to 时返回 false
    pub fn link(&mut self, from: VertexId, to: VertexId, edge: EdgeId) -> bool {
        if from == to {
            return false;
        }
        match self.rows.get_mut(&from) {
            Some(row) => {
                row.insert(to, edge);
                true
            }
            None => false,
        }
    }

    /// 撤销 from→to 的登记
    pub fn unlink(&mut self, from: VertexId, to: VertexId) -> Option<EdgeId> {
        self.rows.get_mut(&from)?.shift_remove(&to)
    }

    pub fn get(&self, from: VertexId, to: VertexId) -> Option<EdgeId> {
        self.rows.get(&from)?.get(&to).copied()
    }

    pub fn row(&self, vertex: VertexId) -> Option<&IncidenceRow> {
        self.rows.get(&vertex)
    }

    /// 所有登记项数目（无向边计两次）
    #[cfg(test)]
    pub fn entry_count(&self) -> usize {
        self.rows.values().map(|row| row.len()).sum()
    }
}
