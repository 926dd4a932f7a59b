//! cograph CLI 工具
//!
//! 加载文本图描述或生成随机图，然后进入交互模式

use anyhow::Context;
use clap::Parser;
use cograph::algorithm::{random_graph_with, RandomGraphConfig};
use cograph::cli::{CommandResult, Session};
use cograph::{FnListener, Graph, GraphListener};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cograph-cli")]
#[command(about = "cograph 命令行工具", version)]
struct Args {
    /// 文本图描述文件
    #[arg(short, long, conflicts_with = "random")]
    input: Option<PathBuf>,

    /// 按有向图加载
    #[arg(short, long)]
    directed: bool,

    /// 生成随机图：顶点数 边数
    #[arg(short, long, num_args = 2, value_names = ["ORDER", "SIZE"])]
    random: Option<Vec<usize>>,

    /// 随机图种子
    #[arg(short, long, requires = "random")]
    seed: Option<u64>,

    /// 执行单个命令后退出
    #[arg(short = 'e', long)]
    execute: Option<String>,

    /// 以 JSON 输出图后退出
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let graph = open_graph(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&graph.snapshot())?);
        return Ok(());
    }

    let mut session = Session::new(graph).with_listener(change_logger());

    // 单个命令模式
    if let Some(command) = args.execute {
        return match session.execute(&command) {
            CommandResult::Message(text) => {
                println!("{}", text);
                Ok(())
            }
            CommandResult::Error(e) => anyhow::bail!(e),
            CommandResult::Continue | CommandResult::Exit => Ok(()),
        };
    }

    println!("cograph CLI v{}", cograph::VERSION);
    println!("=====================");
    println!("  顶点数: {}", session.graph().order());
    println!("  边数: {}", session.graph().size());
    println!("  有向: {}", session.graph().is_directed());

    // 交互模式
    println!("\n输入 'help' 查看命令列表，'quit' 退出\n");

    let stdin = io::stdin();
    loop {
        print!("cograph> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match session.execute(&line) {
            CommandResult::Exit => break,
            CommandResult::Continue => {}
            CommandResult::Message(text) => println!("{}", text),
            CommandResult::Error(e) => println!("错误: {}", e),
        }
    }

    println!("再见！");
    Ok(())
}

fn open_graph(args: &Args) -> anyhow::Result<Arc<Graph>> {
    if let Some(path) = &args.input {
        return Graph::from_file(path, args.directed)
            .with_context(|| format!("无法加载 {}", path.display()));
    }

    let graph = match args.random.as_deref() {
        Some([order, size]) => {
            let mut config = RandomGraphConfig::new(*order, *size);
            if let Some(seed) = args.seed {
                config = config.with_seed(seed);
            }
            random_graph_with(&config)
        }
        _ => Graph::new(args.directed),
    };
    if args.directed && !graph.is_directed() {
        graph.set_directed(true);
    }
    Ok(graph)
}

/// 把图变更写入调试日志
fn change_logger() -> Arc<dyn GraphListener> {
    Arc::new(
        FnListener::new()
            .on_graph(|g| debug!(order = g.order(), size = g.size(), "图结构变更"))
            .on_vertex(|v| debug!(vertex = %v, "顶点变更"))
            .on_edge(|e| debug!(edge = %e, "边变更")),
    )
}
