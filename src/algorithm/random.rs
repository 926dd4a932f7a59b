//! 随机图生成

use crate::graph::Graph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// 随机图配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomGraphConfig {
    /// 顶点数
    pub order: usize,
    /// 尝试添加的边数上限
    pub size: usize,
    /// 随机种子；为空时使用线程随机源
    pub seed: Option<u64>,
}

impl RandomGraphConfig {
    pub fn new(order: usize, size: usize) -> Self {
        Self {
            order,
            size,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// 简单无向图的最大边数 n(n-1)/2
pub fn max_simple_edges(order: usize) -> usize {
    order.saturating_mul(order.saturating_sub(1)) / 2
}

/// 生成随机无向图
pub fn random_graph(order: usize, size: usize) -> Arc<Graph> {
    random_graph_with(&RandomGraphConfig::new(order, size))
}

/// 按配置生成随机无向图
pub fn random_graph_with(config: &RandomGraphConfig) -> Arc<Graph> {
    match config.seed {
        Some(seed) => random_graph_with_rng(&mut StdRng::seed_from_u64(seed), config.order, config.size),
        None => random_graph_with_rng(&mut rand::thread_rng(), config.order, config.size),
    }
}

/// 用给定随机源生成随机无向图
///
/// 顶点标签为 "0".."order-1"。共抽取 `size`（不超过 n(n-1)/2）次端点对，
/// 抽到自环时跳过，重复的端点对由 `add_edge` 吸收，所以实际边数可能少于 `size`。
pub fn random_graph_with_rng<R: Rng + ?Sized>(rng: &mut R, order: usize, size: usize) -> Arc<Graph> {
    let graph = Graph::undirected();
    let vertices: Vec<_> = (0..order)
        .map(|i| graph.add_vertex(Some(&i.to_string())))
        .collect();

    let attempts = size.min(max_simple_edges(order));
    for _ in 0..attempts {
        let source = rng.gen_range(0..order);
        let target = rng.gen_range(0..order);
        if source != target {
            // 端点都在本图且不同，不会失败
            let _ = graph.add_edge(&vertices[source], &vertices[target]);
        }
    }

    info!(order, requested = size, edges = graph.size(), "生成随机图");
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_exceeds_simple_bound() {
        for (order, size) in [(0, 10), (1, 10), (2, 100), (5, 1000), (20, 30)] {
            let graph = random_graph_with(&RandomGraphConfig::new(order, size).with_seed(7));
            assert_eq!(graph.order(), order);
            assert!(graph.size() <= max_simple_edges(order));
            assert!(graph.size() <= size);
            for edge in graph.edges() {
                let (s, t) = edge.endpoints().unwrap();
                assert_ne!(s, t);
            }
        }
    }

    #[test]
    fn test_labels_are_indices() {
        let graph = random_graph(4, 0);
        let labels: Vec<_> = graph
            .vertices()
            .iter()
            .map(|v| v.label().unwrap().unwrap())
            .collect();
        assert_eq!(labels, vec!["0", "1", "2", "3"]);
        assert_eq!(graph.size(), 0);
        assert!(!graph.is_directed());
    }

    #[test]
    fn test_seed_is_reproducible() {
        let config = RandomGraphConfig::new(12, 30).with_seed(42);
        let a = random_graph_with(&config);
        let b = random_graph_with(&config);

        let pairs = |g: &Graph| -> Vec<(String, String)> {
            g.edges()
                .iter()
                .map(|e| (e.source().unwrap().to_string(), e.target().unwrap().to_string()))
                .collect()
        };
        assert_eq!(pairs(a.as_ref()), pairs(b.as_ref()));
    }

    #[test]
    fn test_max_simple_edges() {
        assert_eq!(max_simple_edges(0), 0);
        assert_eq!(max_simple_edges(1), 0);
        assert_eq!(max_simple_edges(4), 6);
    }
}
