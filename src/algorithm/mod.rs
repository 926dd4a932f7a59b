//! 图算法辅助模块
//!
//! 包含随机图生成和边排序

mod ordering;
mod random;

pub use ordering::sort_edges_by_weight;
pub use random::{
    max_simple_edges, random_graph, random_graph_with, random_graph_with_rng, RandomGraphConfig,
};
