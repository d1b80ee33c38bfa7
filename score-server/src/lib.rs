//! Score Server - 板球比赛实时计分核心
//!
//! # 架构概述
//!
//! - **计分** (`scoring`): 命令 → 事件 → 快照，事件日志持久化在 redb
//! - **计分权** (`scoring::rights`): 每场比赛同一时刻只有一位队长可以记分
//! - **实时同步** (`scoring::broadcast`): 按比赛分版本的推送流
//! - **HTTP API** (`api`): 命令、查询、重连同步和 WebSocket 订阅
//!
//! # 模块结构
//!
//! ```text
//! score-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── scoring/       # 比赛事件溯源
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误响应、日志
//! ```

pub mod api;
pub mod core;
pub mod scoring;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use scoring::{MatchStorage, MatchesManager};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符 (`%` / `?`)
#[macro_export]
macro_rules! security_log {
    ($level:literal, $event:expr, $($fields:tt)*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($fields)*
        )
    };
}

/// 设置环境: dotenv, 工作目录, 日志
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    init_logger_with_file(
        &config.log_level,
        config.log_json,
        config.log_dir.as_deref(),
    )?;

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   _____                        
  / ___/_________  ________     
  \__ \/ ___/ __ \/ ___/ _ \    
 ___/ / /__/ /_/ / /  /  __/    
/____/\___/\____/_/   \___/     
    "#
    );
}
