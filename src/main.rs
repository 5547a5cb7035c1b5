// ==========================================
// 灌装线排产系统 - 命令行入口
// ==========================================
// 用法:
//   fill-line-aps export [db_path]
//   fill-line-aps import <snapshot.json> [db_path]
//   fill-line-aps load-master-data <products.csv> <lines.csv> <stirrers.csv> [db_path]
//   fill-line-aps history [limit] [db_path]
// 未给出 db_path 时使用 APP_DB_PATH 或用户数据目录
// 日志输出到 stderr；LOG_FORMAT=json 时输出 JSON 日志
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use fill_line_aps::api::ActionResponse;
use fill_line_aps::app::{get_default_db_path, AppState};
use fill_line_aps::logging;
use std::path::Path;

const USAGE: &str = "用法:
  fill-line-aps export [db_path]
  fill-line-aps import <snapshot.json> [db_path]
  fill-line-aps load-master-data <products.csv> <lines.csv> <stirrers.csv> [db_path]
  fill-line-aps history [limit] [db_path]";

const DEFAULT_HISTORY_LIMIT: usize = 20;

fn open_app(db_path: Option<String>) -> Result<AppState> {
    let db_path = db_path
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);
    AppState::new(db_path).map_err(|e| anyhow!(e))
}

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();

    tracing::debug!(
        "{} v{} 命令: {}",
        fill_line_aps::APP_NAME,
        fill_line_aps::VERSION,
        command
    );

    match command.as_str() {
        "export" => {
            let app = open_app(args.next())?;
            let exported = app.schedule_api.export_snapshot()?;
            println!("{}", exported.json);
        }
        "import" => {
            let file = args.next().context("缺少快照文件路径")?;
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("无法读取快照文件: {}", file))?;
            let app = open_app(args.next())?;
            let response = ActionResponse::from(app.schedule_api.import_snapshot(&json));
            println!("{}", response.to_json());
            if !response.ok {
                std::process::exit(1);
            }
        }
        "load-master-data" => {
            let products = args.next().context("缺少 products.csv 路径")?;
            let lines = args.next().context("缺少 lines.csv 路径")?;
            let stirrers = args.next().context("缺少 stirrers.csv 路径")?;
            let app = open_app(args.next())?;
            let response = ActionResponse::from(app.schedule_api.load_master_data_csv(
                Path::new(&products),
                Path::new(&lines),
                Path::new(&stirrers),
            ));
            println!("{}", response.to_json());
            if !response.ok {
                std::process::exit(1);
            }
        }
        "history" => {
            let limit = match args.next() {
                Some(raw) => raw
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("无效的条数: {}", raw))?,
                None => DEFAULT_HISTORY_LIMIT,
            };
            let app = open_app(args.next())?;
            for entry in app.schedule_api.recent_history(limit)? {
                println!(
                    "{}  {:<18} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.entry_type.as_str(),
                    entry.message
                );
            }
        }
        "" | "help" | "--help" | "-h" => {
            println!("{} v{}", fill_line_aps::APP_NAME, fill_line_aps::VERSION);
            println!("{}", USAGE);
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }

    Ok(())
}
