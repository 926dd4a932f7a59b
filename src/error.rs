//! 错误类型定义

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("不允许自环: 顶点 {0}")]
    SelfLoop(u64),

    #[error("顶点 {0} 不属于当前图")]
    ForeignVertex(u64),

    #[error("顶点数组中存在重复顶点: {0}")]
    DuplicateVertex(u64),

    #[error("顶点 {0} 已从图中移除")]
    VertexDetached(u64),

    #[error("边 {0} 已从图中移除")]
    EdgeDetached(u64),

    #[error("所属的图已被释放")]
    GraphDropped,

    #[error("属性不存在: {0}")]
    PropertyNotFound(String),

    #[error("属性 {key} 无法解析为 {expected}")]
    PropertyType { key: String, expected: &'static str },

    #[error("第 {line} 行加载失败: {source}")]
    Load {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// 包装为加载错误
    pub(crate) fn at_line(self, line: usize) -> Self {
        Error::Load {
            line,
            source: Box::new(self),
        }
    }
}
