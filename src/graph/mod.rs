//! 图核心模块
//!
//! 定义顶点、边和图容器，以及关联索引、变更监听和矩阵视图

mod edge;
mod graph;
mod index;
mod listener;
mod matrix;
mod properties;
mod snapshot;
mod vertex;

pub use edge::{Edge, EdgeId, DEFAULT_WEIGHT};
pub use graph::Graph;
pub use listener::{FnListener, GraphListener};
pub use properties::{parse_property_list, ParsedProperties};
pub use snapshot::{EdgeSnapshot, GraphSnapshot, VertexSnapshot};
pub use vertex::{Vertex, VertexId};
