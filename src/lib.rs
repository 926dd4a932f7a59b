//! cograph - 并发安全的简单带标签图
//!
//! 提供：
//! - 有向/无向可互相转换的简单图（无自环、无平行边）
//! - 顶点与边的标签、属性和权重，以及 `key=value;...` 属性解析
//! - 深拷贝、顶点/边映射表、邻接矩阵和带权邻接矩阵
//! - 文本图描述导入和随机图生成
//! - 同步变更监听，每个图一把可重入锁

pub mod algorithm;
pub mod cli;
pub mod error;
pub mod graph;
pub mod import;
pub mod types;

// 重导出常用类型
pub use error::{Error, Result};
pub use graph::{
    Edge, EdgeId, FnListener, Graph, GraphListener, GraphSnapshot, Vertex, VertexId,
};
pub use import::{ImportStats, TextImporter};
pub use types::{Direction, Properties, PropertyValue};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
