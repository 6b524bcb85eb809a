use std::process::ExitCode;

use anyhow::{anyhow, Context};
use dotenvy::dotenv;
use storage::storage::shared;
use storage::{SafetyStorageExt, SharedStorage};
use tracing::{error, info};
use uuid::Uuid;

const USAGE: &str = "usage: prefs <command>
  get <key>                 print the JSON value stored under <key>
  set <key> <json>          store a JSON value
  get-string <key>          print the string stored under <key>
  set-string <key> [value]  store a string; without a value the key is removed
  remove <key>              remove <key>";

enum Command {
    Get(String),
    Set(String, serde_json::Value),
    GetString(String),
    SetString(String, Option<String>),
    Remove(String),
}

impl Command {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let arg = |i: usize| args.get(i).cloned().ok_or_else(|| anyhow!("missing argument\n{USAGE}"));
        let cmd = match args.first().map(String::as_str) {
            Some("get") => Command::Get(arg(1)?),
            Some("set") => {
                let raw = arg(2)?;
                let value = serde_json::from_str(&raw).with_context(|| format!("`{raw}` is not valid JSON"))?;
                Command::Set(arg(1)?, value)
            }
            Some("get-string") => Command::GetString(arg(1)?),
            Some("set-string") => Command::SetString(arg(1)?, args.get(2).cloned()),
            Some("remove") => Command::Remove(arg(1)?),
            _ => return Err(anyhow!("{USAGE}")),
        };
        Ok(cmd)
    }

    fn run(self) -> anyhow::Result<()> {
        let store: SharedStorage = shared::shared()?;
        match self {
            Command::Get(key) => match store.load::<serde_json::Value>(&key)? {
                Some(v) => println!("{}", serde_json::to_string_pretty(&v)?),
                None => println!("(absent)"),
            },
            Command::Set(key, value) => {
                store.save(&value, &key)?;
                info!(event = "set", %key, "value stored");
            }
            Command::GetString(key) => match store.load_string(&key)? {
                Some(s) => println!("{s}"),
                None => println!("(absent)"),
            },
            Command::SetString(key, value) => {
                store.save_string(value.as_deref(), &key)?;
                info!(event = "set_string", %key, removed = value.is_none(), "string stored");
            }
            Command::Remove(key) => {
                store.remove(&key)?;
                info!(event = "remove", %key, "key removed");
            }
        }
        Ok(())
    }
}

fn init_logging(format: configs::LogFormat) {
    match format {
        configs::LogFormat::Compact => common::utils::logging::init_logging_default(),
        configs::LogFormat::Json => common::utils::logging::init_logging_json(),
    }
    info!(service = "prefs", event = "logger_init", "tracing subscriber initialized");
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let command = Command::parse(args)?;
    let cfg = configs::AppConfig::load_and_validate()?;
    if cfg.storage.backend == configs::StorageBackend::File {
        common::env::ensure_parent_dir(&cfg.storage.path)?;
    }
    let store = storage::open(&cfg.storage)?;
    shared::install(store)?;
    command.run()
}

fn main() -> ExitCode {
    // 提前加载 .env，使得 RUST_LOG、CONFIG_PATH 等环境变量生效
    dotenv().ok();
    // 日志格式来自配置；配置读取失败时先用默认格式，错误稍后再报告
    let format = configs::load_default().map(|c| c.logging.format).unwrap_or_default();
    init_logging(format);

    // 基础服务上下文（不含敏感信息）
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志，便于排查问题
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "prefs", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    info!(service = "prefs", event = "start", %service_id, pid, version, "prefs starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => {
            info!(service = "prefs", event = "stop", %service_id, pid, "prefs finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "prefs", event = "run_failed", error = %e, "prefs failed");
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
