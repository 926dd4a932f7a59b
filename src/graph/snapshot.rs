//! 图快照
//!
//! 在一次加锁内复制出的纯数据视图，供渲染、导出等外部协作者使用。

use super::graph::Graph;
use crate::types::Properties;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexSnapshot {
    pub id: u64,
    pub label: Option<String>,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: u64,
    pub source: u64,
    pub target: u64,
    pub weight: f64,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub directed: bool,
    pub vertices: Vec<VertexSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    pub fn order(&self) -> usize {
        self.vertices.len()
    }

    pub fn size(&self) -> usize {
        self.edges.len()
    }
}

impl Graph {
    /// 获取当前状态的快照
    pub fn snapshot(&self) -> GraphSnapshot {
        self.read(|state| GraphSnapshot {
            directed: state.directed,
            vertices: state
                .vertices
                .iter()
                .map(|(id, v)| VertexSnapshot {
                    id: id.as_u64(),
                    label: v.label.clone(),
                    properties: v.properties.clone(),
                })
                .collect(),
            edges: state
                .edges
                .iter()
                .map(|(id, e)| EdgeSnapshot {
                    id: id.as_u64(),
                    source: e.source.as_u64(),
                    target: e.target.as_u64(),
                    weight: e.weight,
                    properties: e.properties.clone(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PropertyValue;

    #[test]
    fn test_snapshot_matches_graph() {
        let graph = Graph::undirected();
        let a = graph.add_vertex(Some("a"));
        let b = graph.add_vertex(None);
        a.set_property("color", "red").unwrap();
        let e = graph.add_edge(&a, &b).unwrap();
        e.set_weight(5.0).unwrap();

        let snapshot = graph.snapshot();
        assert!(!snapshot.directed);
        assert_eq!(snapshot.order(), 2);
        assert_eq!(snapshot.size(), 1);
        assert_eq!(snapshot.vertices[0].label.as_deref(), Some("a"));
        assert_eq!(
            snapshot.vertices[0].properties.get("color"),
            Some(&PropertyValue::from("red"))
        );
        assert_eq!(snapshot.edges[0].source, a.id().as_u64());
        assert_eq!(snapshot.edges[0].target, b.id().as_u64());
        assert_eq!(snapshot.edges[0].weight, 5.0);

        // 快照与之后的修改无关
        graph.remove_vertex(&a);
        assert_eq!(snapshot.size(), 1);
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let graph = Graph::directed();
        let a = graph.add_vertex(Some("a"));
        let b = graph.add_vertex(Some("b"));
        graph.add_edge(&a, &b).unwrap().set_property("k", 1i64).unwrap();

        let snapshot = graph.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: GraphSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }
}
