//! 交互命令处理
//!
//! 命令作用于会话当前持有的图；`random` 会整体替换该图。

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};

use super::printer::{check_vertical_display, PrintMode, Printer};
use crate::algorithm::{random_graph_with, sort_edges_by_weight, RandomGraphConfig};
use crate::graph::{Graph, GraphListener, Vertex};
use crate::import::TextImporter;
use crate::types::Direction;

/// 命令执行结果
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// 继续运行
    Continue,
    /// 退出程序
    Exit,
    /// 显示消息
    Message(String),
    /// 错误
    Error(String),
}

/// 会话状态
pub struct Session {
    graph: Arc<Graph>,
    printer: Printer,
    /// 替换图时会重新注册到新图上
    listener: Option<Arc<dyn GraphListener>>,
}

impl Session {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            printer: Printer::default(),
            listener: None,
        }
    }

    /// 为当前图以及之后替换进来的图注册监听器
    pub fn with_listener(mut self, listener: Arc<dyn GraphListener>) -> Self {
        self.graph.add_listener(listener.clone());
        self.listener = Some(listener);
        self
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// 替换当前图
    pub fn set_graph(&mut self, graph: Arc<Graph>) {
        if let Some(listener) = &self.listener {
            self.graph.remove_listener(listener);
            graph.add_listener(listener.clone());
        }
        self.graph = graph;
    }

    /// 解析并执行一条命令
    pub fn execute(&mut self, input: &str) -> CommandResult {
        let (line, vertical) = check_vertical_display(input);
        if line.is_empty() {
            return CommandResult::Continue;
        }

        let (cmd, args) = match line.split_once(char::is_whitespace) {
            Some((cmd, args)) => (cmd.to_lowercase(), args.trim()),
            None => (line.to_lowercase(), ""),
        };

        self.printer.set_mode(if vertical {
            PrintMode::Vertical
        } else {
            PrintMode::Table
        });

        match self.dispatch(&cmd, args) {
            Ok(result) => result,
            Err(e) => CommandResult::Error(format!("{:#}", e)),
        }
    }

    fn dispatch(&mut self, cmd: &str, args: &str) -> anyhow::Result<CommandResult> {
        let graph = self.graph.clone();

        let message = match cmd {
            "quit" | "exit" | "q" => return Ok(CommandResult::Exit),

            "help" | "h" | "?" => Printer::print_help(),

            "stats" | "info" => self.printer.print_stats(&graph),

            "vertices" | "vs" => self.printer.print_vertices(&graph.vertices())?,

            "edges" | "es" => self.printer.print_edges(&graph.edges())?,

            "sorted" => {
                let mut edges = graph.edges();
                sort_edges_by_weight(&mut edges)?;
                self.printer.print_edges(&edges)?
            }

            "vertex" | "v" => {
                let vertex = self.require_vertex(args)?;
                let mut output = self.printer.print_vertices(std::slice::from_ref(&vertex))?;
                output.push_str(&self.printer.print_edges(&vertex.edges()?)?);
                output
            }

            "neighbors" | "neighbours" | "n" => {
                let mut parts = args.split_whitespace();
                let label = parts.next().unwrap_or("");
                let direction = match parts.next() {
                    Some("out") => Direction::Outgoing,
                    Some("in") => Direction::Incoming,
                    None | Some("both") => Direction::Both,
                    Some(other) => bail!("未知方向: {}（可选 out、in、both）", other),
                };
                let vertex = self.require_vertex(label)?;
                let neighbours = graph.neighbours(&vertex, direction)?;
                self.printer.print_vertices(&neighbours)?
            }

            "matrix" => {
                let vertices = graph.vertices();
                let matrix = match args {
                    "" => graph
                        .adjacency_matrix(&vertices)?
                        .into_iter()
                        .map(|row| row.into_iter().map(|b| if b { 1.0 } else { 0.0 }).collect())
                        .collect::<Vec<Vec<f64>>>(),
                    "weighted" | "w" => graph.weighted_adjacency_matrix(&vertices)?,
                    other => bail!("用法: matrix [weighted]，无法识别 {}", other),
                };
                self.printer.print_matrix(&vertices, &matrix)
            }

            "json" => serde_json::to_string_pretty(&graph.snapshot())?,

            "add" => {
                if args.is_empty() {
                    bail!("用法: add <定义> [: 属性]");
                }
                let stats = TextImporter::new(graph.clone()).import_str(args)?;
                format!(
                    "新增 {} 个顶点，{} 条边",
                    stats.vertices_created, stats.edges_created
                )
            }

            "remove" | "rm" => {
                let labels: Vec<&str> = args.split_whitespace().collect();
                match labels.as_slice() {
                    [label] => {
                        let vertex = self.require_vertex(label)?;
                        graph.remove_vertex(&vertex);
                        format!("已删除顶点 {}", label)
                    }
                    [source, target] => {
                        let source = self.require_vertex(source)?;
                        let target = self.require_vertex(target)?;
                        let edge = graph
                            .edge_between(&source, &target)
                            .ok_or_else(|| anyhow!("{} 与 {} 之间没有边", source, target))?;
                        graph.remove_edge(&edge);
                        format!("已删除边 {}", edge_label(&source, &target, graph.is_directed()))
                    }
                    _ => bail!("用法: remove <标签> [标签]"),
                }
            }

            "directed" => {
                let directed = match args {
                    "on" | "true" | "yes" => true,
                    "off" | "false" | "no" => false,
                    "" => return Ok(CommandResult::Message(format!("有向: {}", graph.is_directed()))),
                    other => bail!("用法: directed on|off，无法识别 {}", other),
                };
                graph.set_directed(directed);
                format!("有向: {}，边数: {}", graph.is_directed(), graph.size())
            }

            "load" => {
                if args.is_empty() {
                    bail!("用法: load <文件>");
                }
                let stats = TextImporter::new(graph.clone())
                    .import_file(args)
                    .with_context(|| format!("导入 {} 失败", args))?;
                format!(
                    "读取 {} 行，新增 {} 个顶点，{} 条边 (耗时 {} ms)",
                    stats.lines_read, stats.vertices_created, stats.edges_created, stats.duration_ms
                )
            }

            "random" => {
                let numbers = args
                    .split_whitespace()
                    .map(|s| s.parse::<u64>().with_context(|| format!("无效的数字: {}", s)))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                let config = match numbers.as_slice() {
                    [order, size] => RandomGraphConfig::new(*order as usize, *size as usize),
                    [order, size, seed] => {
                        RandomGraphConfig::new(*order as usize, *size as usize).with_seed(*seed)
                    }
                    _ => bail!("用法: random <顶点数> <边数> [种子]"),
                };
                let random = random_graph_with(&config);
                let message = format!("已生成随机图: {} 个顶点，{} 条边", random.order(), random.size());
                self.set_graph(random);
                message
            }

            _ => bail!("未知命令: {}。输入 'help' 查看帮助。", cmd),
        };

        Ok(CommandResult::Message(message))
    }

    fn require_vertex(&self, label: &str) -> anyhow::Result<Vertex> {
        if label.is_empty() {
            bail!("缺少顶点标签");
        }
        self.graph
            .find_vertex(label)
            .ok_or_else(|| anyhow!("顶点不存在: {}", label))
    }
}

fn edge_label(source: &Vertex, target: &Vertex, directed: bool) -> String {
    if directed {
        format!("({}, {})", source, target)
    } else {
        format!("{{{}, {}}}", source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FnListener;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::NamedTempFile;

    fn message(result: CommandResult) -> String {
        match result {
            CommandResult::Message(text) => text,
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_add_and_remove() {
        let mut session = Session::new(Graph::undirected());
        message(session.execute("add A B : 5;type=road"));
        message(session.execute("add B C"));
        assert_eq!(session.graph().order(), 3);
        assert_eq!(session.graph().size(), 2);

        message(session.execute("rm A B"));
        assert_eq!(session.graph().size(), 1);

        message(session.execute("remove B"));
        assert_eq!(session.graph().order(), 2);
        assert_eq!(session.graph().size(), 0);
    }

    #[test]
    fn test_errors_are_reported() {
        let mut session = Session::new(Graph::undirected());
        assert!(matches!(session.execute("vertex X"), CommandResult::Error(_)));
        assert!(matches!(session.execute("frobnicate"), CommandResult::Error(_)));
        assert!(matches!(session.execute("add C C"), CommandResult::Error(_)));
        assert!(matches!(session.execute("random 3"), CommandResult::Error(_)));
        assert_eq!(session.execute("   "), CommandResult::Continue);
        assert_eq!(session.execute("QUIT"), CommandResult::Exit);
    }

    #[test]
    fn test_directed_toggle() {
        let mut session = Session::new(Graph::undirected());
        message(session.execute("add A B"));
        message(session.execute("directed on"));
        assert!(session.graph().is_directed());
        assert_eq!(session.graph().size(), 2);

        message(session.execute("directed off"));
        assert!(!session.graph().is_directed());
        assert_eq!(session.graph().size(), 1);
    }

    #[test]
    fn test_views() {
        let mut session = Session::new(Graph::directed());
        message(session.execute("add A B : 2"));
        message(session.execute("add B C : 1"));

        let neighbours = message(session.execute("neighbors B in \\G"));
        assert!(neighbours.contains("Label: A"));
        assert!(!neighbours.contains("Label: C"));

        let sorted = message(session.execute("sorted \\G"));
        let first = sorted.find("Weight: 1").unwrap();
        let second = sorted.find("Weight: 2").unwrap();
        assert!(first < second);

        message(session.execute("matrix"));
        message(session.execute("matrix weighted"));
        let json = message(session.execute("json"));
        assert!(json.contains("\"directed\": true"));
    }

    #[test]
    fn test_random_replaces_graph_and_moves_listener() {
        let original = Graph::undirected();
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = changes.clone();
        let listener: Arc<dyn GraphListener> = Arc::new(FnListener::new().on_graph(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let mut session = Session::new(original.clone()).with_listener(listener);

        message(session.execute("random 5 4 9"));
        assert!(!Arc::ptr_eq(session.graph(), &original));
        assert_eq!(session.graph().order(), 5);
        assert_eq!(original.listener_count(), 0);
        assert_eq!(session.graph().listener_count(), 1);

        changes.store(0, Ordering::SeqCst);
        message(session.execute("add X"));
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "A B : 5").unwrap();
        writeln!(file, "B C").unwrap();

        let mut session = Session::new(Graph::undirected());
        let command = format!("load {}", file.path().display());
        message(session.execute(&command));
        assert_eq!(session.graph().size(), 2);

        let missing = session.execute("load /nonexistent/graph.txt");
        assert!(matches!(missing, CommandResult::Error(_)));
    }
}
