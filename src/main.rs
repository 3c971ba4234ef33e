use chrono::Local;
use clap::Parser;
use gst_reco::{io, AppConfig, Reconciler, Statistics};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::fmt::time::ChronoLocal;

/// GST Portal / Books 对账
#[derive(Debug, Parser)]
#[command(name = "gst-reco", version)]
struct Cli {
    /// Portal data CSV
    #[arg(long, env = "RECO_PORTAL")]
    portal: PathBuf,

    /// Books data CSV
    #[arg(long, env = "RECO_BOOKS")]
    books: PathBuf,

    /// 配置文件 (默认读取可选的 reco.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 输出目录，覆盖配置中的 output.dir
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

/// 成功时的输出
#[derive(Debug, Serialize)]
struct ReconcileReport {
    status: &'static str,
    stats: Statistics,
    files: Vec<PathBuf>,
}

/// 失败时的输出
#[derive(Debug, Serialize)]
struct ErrorReport {
    status: &'static str,
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            error!("Reconciliation failed: {}", e);
            let report = ErrorReport {
                status: "error",
                message: e.to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Err(e)
        }
    }
}

async fn run(cli: Cli) -> Result<ReconcileReport, Box<dyn std::error::Error>> {
    // 加载配置
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.out_dir {
        config.output.dir = dir;
    }
    info!("Starting reconciliation with config: {:?}", config);

    let portal = io::read_table_path(&cli.portal)?;
    let books = io::read_table_path(&cli.books)?;

    // CPU 密集计算放到阻塞线程，避免占用运行时工作线程
    let reconciler = Reconciler::new(config.matching.clone());
    let result = tokio::task::spawn_blocking(move || reconciler.reconcile(portal, books)).await??;

    std::fs::create_dir_all(&config.output.dir)?;
    let stem = format!(
        "{}_{}",
        config.output.file_prefix,
        Local::now().format("%Y%m%d%H%M%S")
    );
    let portal_path = config.output.dir.join(format!("{}_portal.csv", stem));
    let books_path = config.output.dir.join(format!("{}_books.csv", stem));

    io::write_ledger_path(&result.portal, &portal_path)?;
    io::write_ledger_path(&result.books, &books_path)?;

    Ok(ReconcileReport {
        status: "success",
        stats: result.stats,
        files: vec![portal_path, books_path],
    })
}
