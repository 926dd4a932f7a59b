//! 结果打印器
//!
//! 提供顶点、边、邻接矩阵的表格和垂直格式输出

use crate::error::Result;
use crate::graph::{Edge, Graph, Vertex};
use crate::types::Properties;
use prettytable::{format, row, Cell, Row, Table};

/// 打印模式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrintMode {
    /// 表格模式
    Table,
    /// 垂直模式 (\G)
    Vertical,
}

/// 结果打印器
pub struct Printer {
    mode: PrintMode,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(PrintMode::Table)
    }
}

impl Printer {
    pub fn new(mode: PrintMode) -> Self {
        Self { mode }
    }

    /// 设置打印模式
    pub fn set_mode(&mut self, mode: PrintMode) {
        self.mode = mode;
    }

    /// 打印任意行列结果
    pub fn print_result(&self, columns: &[String], rows: &[Vec<String>]) -> String {
        if columns.is_empty() || rows.is_empty() {
            return "Empty set\n".to_string();
        }

        let output = match self.mode {
            PrintMode::Table => self.format_table(columns, rows),
            PrintMode::Vertical => self.format_vertical(columns, rows),
        };

        format!("{}\n{} row(s) in set\n", output, rows.len())
    }

    /// 打印顶点列表
    pub fn print_vertices(&self, vertices: &[Vertex]) -> Result<String> {
        let columns = columns(&["Id", "Label", "Degree", "Properties"]);
        let mut rows = Vec::with_capacity(vertices.len());
        for vertex in vertices {
            rows.push(vec![
                vertex.id().as_u64().to_string(),
                vertex.label()?.unwrap_or_default(),
                vertex.edges()?.len().to_string(),
                format_properties(&vertex.properties()?),
            ]);
        }
        Ok(self.print_result(&columns, &rows))
    }

    /// 打印边列表
    pub fn print_edges(&self, edges: &[Edge]) -> Result<String> {
        let columns = columns(&["Id", "Source", "Target", "Weight", "Properties"]);
        let mut rows = Vec::with_capacity(edges.len());
        for edge in edges {
            let (source, target) = edge.endpoints()?;
            rows.push(vec![
                edge.id().as_u64().to_string(),
                source.to_string(),
                target.to_string(),
                edge.weight()?.to_string(),
                format_properties(&edge.properties()?),
            ]);
        }
        Ok(self.print_result(&columns, &rows))
    }

    /// 打印邻接矩阵，行列按 `vertices` 的顺序；无穷大显示为 `-`
    pub fn print_matrix(&self, vertices: &[Vertex], matrix: &[Vec<f64>]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        let mut header = vec![Cell::new("")];
        header.extend(vertices.iter().map(|v| Cell::new(&v.to_string())));
        table.set_titles(Row::new(header));

        for (vertex, values) in vertices.iter().zip(matrix) {
            let mut cells = vec![Cell::new(&vertex.to_string())];
            cells.extend(values.iter().map(|value| {
                if value.is_infinite() {
                    Cell::new("-")
                } else {
                    Cell::new(&value.to_string())
                }
            }));
            table.add_row(Row::new(cells));
        }

        table.to_string()
    }

    /// 表格格式
    fn format_table(&self, columns: &[String], rows: &[Vec<String>]) -> String {
        let mut table = Table::new();

        // 设置表格格式
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        // 添加表头
        let header: Vec<Cell> = columns.iter().map(|c| Cell::new(c)).collect();
        table.set_titles(Row::new(header));

        // 添加数据行
        for row_data in rows {
            let cells: Vec<Cell> = row_data.iter().map(|v| Cell::new(v)).collect();
            table.add_row(Row::new(cells));
        }

        table.to_string()
    }

    /// 垂直格式
    fn format_vertical(&self, columns: &[String], rows: &[Vec<String>]) -> String {
        let max_col_width = columns.iter().map(|c| c.len()).max().unwrap_or(0);
        let mut output = String::new();

        for (i, row_data) in rows.iter().enumerate() {
            output.push_str(&format!(
                "*************************** {}. row ***************************\n",
                i + 1
            ));

            for (j, col) in columns.iter().enumerate() {
                let value = row_data.get(j).map(|s| s.as_str()).unwrap_or("");
                output.push_str(&format!("{:>width$}: {}\n", col, value, width = max_col_width));
            }
        }

        output
    }

    /// 打印统计信息
    pub fn print_stats(&self, graph: &Graph) -> String {
        let (order, size, directed) = graph.atomically(|| (graph.order(), graph.size(), graph.is_directed()));
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row!["Property", "Value"]);
        table.add_row(row!["Vertex Count", order.to_string()]);
        table.add_row(row!["Edge Count", size.to_string()]);
        table.add_row(row!["Directed", directed.to_string()]);
        table.add_row(row!["Listeners", graph.listener_count().to_string()]);
        table.to_string()
    }

    /// 打印帮助信息
    pub fn print_help() -> String {
        r#"
═══════════════════════════════════════════════════════════════
                   cograph CLI 命令帮助
═══════════════════════════════════════════════════════════════

基础命令:
  help, h, ?             显示帮助
  quit, exit, q          退出程序
  stats, info            显示图统计信息

查看:
  vertices, vs           列出所有顶点
  edges, es              列出所有边
  sorted                 按权重升序列出所有边
  vertex, v <标签>       查看顶点详情
  neighbors, n <标签> [out|in|both]
                         查看顶点邻居
  matrix [weighted]      显示邻接矩阵（weighted 为带权矩阵）
  json                   以 JSON 输出整个图

修改:
  add <定义> [: 属性]    按导入文件的行格式添加顶点或边
                         示例: add A B : 5;type=road
                         示例: add A : color=red
  remove, rm <标签> [标签]
                         删除顶点（及其所有边）或两点间的边
  directed on|off        切换有向/无向模式
  load <文件>            将文本图描述导入当前图
  random <顶点数> <边数> [种子]
                         用随机图替换当前图

提示: 在 vertices/edges 等命令末尾加 \G 可垂直显示结果

═══════════════════════════════════════════════════════════════
"#
        .to_string()
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// 按 `k=v;k=v` 的形式格式化属性
pub fn format_properties(properties: &Properties) -> String {
    properties
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(";")
}

/// 检查命令是否以 \G 结尾（垂直显示）
pub fn check_vertical_display(input: &str) -> (String, bool) {
    let trimmed = input.trim();
    if trimmed.ends_with("\\G") || trimmed.ends_with("\\g") {
        let clean = trimmed[..trimmed.len() - 2].trim().to_string();
        (clean, true)
    } else {
        (trimmed.to_string(), false)
    }
}
