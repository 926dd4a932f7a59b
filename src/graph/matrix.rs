//! 邻接矩阵
//!
//! 按调用方给定的顶点顺序构建导出子图的邻接矩阵。

use super::graph::{Graph, GraphState};
use super::vertex::{Vertex, VertexId};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// 校验顶点数组：必须都属于本图且不重复
fn validate(state: &GraphState, vertices: &[Vertex]) -> Result<Vec<VertexId>> {
    let mut seen = HashSet::with_capacity(vertices.len());
    let mut ids = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        let id = state.require_vertex(vertex)?;
        if !seen.insert(id) {
            return Err(Error::DuplicateVertex(id.as_u64()));
        }
        ids.push(id);
    }
    Ok(ids)
}

impl Graph {
    /// 布尔邻接矩阵，`m[i][j]` 表示是否存在 vertices[i] 到 vertices[j] 的边
    pub fn adjacency_matrix(&self, vertices: &[Vertex]) -> Result<Vec<Vec<bool>>> {
        self.read(|state| {
            let ids = validate(state, vertices)?;
            Ok(ids
                .iter()
                .map(|&s| {
                    ids.iter()
                        .map(|&t| state.edge_between(s, t).is_some())
                        .collect()
                })
                .collect())
        })
    }

    /// 带权邻接矩阵，无边处为正无穷
    pub fn weighted_adjacency_matrix(&self, vertices: &[Vertex]) -> Result<Vec<Vec<f64>>> {
        self.weighted_adjacency_matrix_with(vertices, f64::INFINITY)
    }

    /// 带权邻接矩阵，无边处填 `no_edge_value`
    pub fn weighted_adjacency_matrix_with(
        &self,
        vertices: &[Vertex],
        no_edge_value: f64,
    ) -> Result<Vec<Vec<f64>>> {
        self.read(|state| {
            let ids = validate(state, vertices)?;
            Ok(ids
                .iter()
                .map(|&s| {
                    ids.iter()
                        .map(|&t| {
                            state
                                .edge_between(s, t)
                                .and_then(|e| state.edges.get(&e))
                                .map_or(no_edge_value, |e| e.weight)
                        })
                        .collect()
                })
                .collect())
        })
    }
}
