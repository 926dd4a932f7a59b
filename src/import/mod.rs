//! 文本图描述导入
//!
//! 每行一条记录，格式为 `定义 [: 属性]`：
//!
//! - `A B : 5;type=road` 确保顶点 A、B 存在（不存在则创建），取得或创建边 A→B，
//!   再按边的规则读取属性（不含 `=` 的数值片段作为权重）
//! - `A : color=red` 确保顶点 A 存在并读取其属性
//! - 空行忽略
//!
//! 任一行出错即中止导入，错误包装为带行号的 [`Error::Load`]；
//! 已经导入的部分保留在图中。

use crate::error::{Error, Result};
use crate::graph::{Graph, Vertex};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// 导入统计
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportStats {
    pub lines_read: usize,
    pub records: usize,
    pub vertices_created: usize,
    pub edges_created: usize,
    pub duration_ms: u64,
}

/// 一行的解析结果
#[derive(Debug, PartialEq)]
enum Record<'a> {
    Empty,
    Vertex {
        label: &'a str,
        info: Option<&'a str>,
    },
    Edge {
        source: &'a str,
        target: &'a str,
        info: Option<&'a str>,
    },
}

fn parse_line(line: &str) -> Record<'_> {
    let (definition, info) = match line.split_once(':') {
        Some((definition, info)) => (definition, Some(info.trim())),
        None => (line, None),
    };

    // 两个以上的标记只取前两个
    let mut tokens = definition.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(source), Some(target)) => Record::Edge {
            source,
            target,
            info,
        },
        (Some(label), None) => Record::Vertex { label, info },
        _ => Record::Empty,
    }
}

/// 文本导入器
pub struct TextImporter {
    graph: Arc<Graph>,
}

impl TextImporter {
    /// 创建导入器
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    /// 从文件导入
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<ImportStats> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::from(e).at_line(0))?;
        debug!(path = %path.display(), "开始导入图描述文件");
        self.import_reader(BufReader::new(file))
    }

    /// 从字符串导入
    pub fn import_str(&self, text: &str) -> Result<ImportStats> {
        self.import_reader(text.as_bytes())
    }

    /// 从任意按行读取的来源导入
    pub fn import_reader<R: BufRead>(&self, reader: R) -> Result<ImportStats> {
        let start = Instant::now();
        let mut stats = ImportStats::default();

        for (index, line) in reader.lines().enumerate() {
            let number = index + 1;
            let result = line
                .map_err(Error::from)
                .and_then(|line| self.graph.atomically(|| self.import_line(&line, &mut stats)));
            if let Err(e) = result {
                warn!(line = number, error = %e, "图描述导入中止");
                return Err(e.at_line(number));
            }
            stats.lines_read = number;
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            lines = stats.lines_read,
            vertices = stats.vertices_created,
            edges = stats.edges_created,
            duration_ms = stats.duration_ms,
            "图描述导入完成"
        );
        Ok(stats)
    }

    /// 导入一行；调用方持有图锁，查找与创建之间不会被其他线程插入
    fn import_line(&self, line: &str, stats: &mut ImportStats) -> Result<()> {
        match parse_line(line) {
            Record::Empty => {}
            Record::Vertex { label, info } => {
                let vertex = self.ensure_vertex(label, stats);
                if let Some(info) = info {
                    vertex.read_properties(info)?;
                }
                stats.records += 1;
            }
            Record::Edge {
                source,
                target,
                info,
            } => {
                let source = self.ensure_vertex(source, stats);
                let target = self.ensure_vertex(target, stats);
                let existed = self.graph.has_edge(&source, &target);
                let edge = self.graph.add_edge(&source, &target)?;
                if !existed {
                    stats.edges_created += 1;
                }
                if let Some(info) = info {
                    edge.read_properties(info)?;
                }
                stats.records += 1;
            }
        }
        Ok(())
    }

    fn ensure_vertex(&self, label: &str, stats: &mut ImportStats) -> Vertex {
        match self.graph.find_vertex(label) {
            Some(vertex) => vertex,
            None => {
                stats.vertices_created += 1;
                self.graph.add_vertex(Some(label))
            }
        }
    }
}

impl Graph {
    /// 按文本描述文件创建新图
    pub fn from_file<P: AsRef<Path>>(path: P, directed: bool) -> Result<Arc<Graph>> {
        let graph = Graph::new(directed);
        TextImporter::new(graph.clone()).import_file(path)?;
        Ok(graph)
    }

    /// 按文本描述创建新图
    pub fn from_text(text: &str, directed: bool) -> Result<Arc<Graph>> {
        let graph = Graph::new(directed);
        TextImporter::new(graph.clone()).import_str(text)?;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PropertyValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("   "), Record::Empty);
        assert_eq!(parse_line(" : x=1"), Record::Empty);
        assert_eq!(
            parse_line("A"),
            Record::Vertex {
                label: "A",
                info: None
            }
        );
        assert_eq!(
            parse_line(" A  B C : 5 "),
            Record::Edge {
                source: "A",
                target: "B",
                info: Some("5")
            }
        );
        assert_eq!(
            parse_line("A: k=v:w"),
            Record::Vertex {
                label: "A",
                info: Some("k=v:w")
            }
        );
    }

    #[test]
    fn test_import_roads() {
        let graph = Graph::from_text("A B : 5;type=road\nB C : 2\n", false).unwrap();
        assert!(!graph.is_directed());
        assert_eq!(graph.order(), 3);
        assert_eq!(graph.size(), 2);
        let a = graph.find_vertex("A").unwrap();
        let b = graph.find_vertex("B").unwrap();
        let c = graph.find_vertex("C").unwrap();

        let ab = graph.edge_between(&a, &b).unwrap();
        assert_eq!(ab.weight().unwrap(), 5.0);
        assert_eq!(ab.property("type").unwrap(), Some(PropertyValue::from("road")));
        assert_eq!(graph.edge_between(&b, &c).unwrap().weight().unwrap(), 2.0);
    }

    #[test]
    fn test_import_stats() {
        let graph = Graph::undirected();
        let importer = TextImporter::new(graph.clone());

        let stats = importer
            .import_str("A B : 5;type=road\nB C : 2\n")
            .unwrap();
        assert_eq!(stats.vertices_created, 3);
        assert_eq!(stats.edges_created, 2);
        assert_eq!(stats.lines_read, 2);
        assert_eq!(stats.records, 2);
    }

    #[test]
    fn test_vertex_records_and_repeats() {
        let graph = Graph::directed();
        let importer = TextImporter::new(graph.clone());

        let text = "KE : region=east\n\nKE PO : 35;typ=dialnica;kapacita=100\nKE PO : 40\nPO KE\nSB\n";
        let stats = importer.import_str(text).unwrap();
        assert_eq!(stats.records, 5);
        assert_eq!(stats.vertices_created, 3);
        assert_eq!(stats.edges_created, 2);

        let ke = graph.find_vertex("KE").unwrap();
        let po = graph.find_vertex("PO").unwrap();
        assert_eq!(ke.string_value("region").unwrap(), "east");

        let e = graph.edge_between(&ke, &po).unwrap();
        assert_eq!(e.weight().unwrap(), 40.0);
        assert_eq!(e.int_value("kapacita").unwrap(), 100);
        assert_eq!(graph.edge_between(&po, &ke).unwrap().weight().unwrap(), 1.0);
        assert!(graph.find_vertex("SB").unwrap().edges().unwrap().is_empty());
    }

    #[test]
    fn test_self_loop_aborts_load() {
        let graph = Graph::undirected();
        let importer = TextImporter::new(graph.clone());

        let err = importer.import_str("A B\nC C : 3\nD E\n").unwrap_err();
        match err {
            Error::Load { line, source } => {
                assert_eq!(line, 2);
                assert!(matches!(*source, Error::SelfLoop(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        // 出错前的部分保留
        assert!(graph.find_vertex("A").is_some());
        assert!(graph.find_vertex("D").is_none());
    }

    #[test]
    fn test_concurrent_imports_share_vertices() {
        let graph = Graph::undirected();
        let text: String = (0..100).map(|i| format!("v{} v{}\n", i, i + 1)).collect();

        let loaders: Vec<_> = (0..4)
            .map(|_| {
                let importer = TextImporter::new(graph.clone());
                let text = text.clone();
                std::thread::spawn(move || importer.import_str(&text).unwrap())
            })
            .collect();
        let stats: Vec<ImportStats> = loaders.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(graph.order(), 101);
        assert_eq!(graph.size(), 100);
        assert_eq!(stats.iter().map(|s| s.vertices_created).sum::<usize>(), 101);
        assert_eq!(stats.iter().map(|s| s.edges_created).sum::<usize>(), 100);
    }

    #[test]
    fn test_import_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "A B : 5;type=road").unwrap();
        writeln!(file, "B C : 2").unwrap();

        let graph = Graph::from_file(file.path(), false).unwrap();
        assert_eq!(graph.order(), 3);
        assert_eq!(graph.size(), 2);
        assert!(!graph.is_directed());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = Graph::from_file("/nonexistent/graph.txt", false).unwrap_err();
        assert!(matches!(err, Error::Load { line: 0, .. }));
    }
}
