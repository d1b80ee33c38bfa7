use crate::core::{Config, Result, ServerError};
use crate::scoring::{MatchesManager, SyncService};
use std::path::Path;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段内部都是 Arc 共享，Clone 成本极低，可直接作为 axum State。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | manager | MatchesManager | 命令处理 + 订阅 |
/// | sync | SyncService | 断线重连同步 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 比赛命令处理器
    pub manager: MatchesManager,
    /// 重连同步服务
    pub sync: SyncService,
}

impl ServerState {
    pub fn new(config: Config, manager: MatchesManager) -> Self {
        let sync = SyncService::new(manager.clone(), config.max_incremental_sync);
        Self {
            config,
            manager,
            sync,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录 (确保存在)
    /// 2. 比分数据库 (work_dir/scoring.redb)
    /// 3. 同步服务
    pub fn initialize(config: &Config) -> Result<Self> {
        let work_dir = Path::new(&config.work_dir);
        std::fs::create_dir_all(work_dir)?;
        if !work_dir.is_dir() {
            return Err(ServerError::Config(format!(
                "WORK_DIR is not a directory: {}",
                config.work_dir
            )));
        }

        let db_path = config.database_path();
        let manager = MatchesManager::new(
            &db_path,
            config.scoring_rules(),
            config.broadcast_capacity,
        )?;
        tracing::info!(path = %db_path.display(), "Scoring database opened");

        Ok(Self::new(config.clone(), manager))
    }

    /// 服务器实例 epoch (每次启动生成)
    pub fn epoch(&self) -> &str {
        self.manager.epoch()
    }

    pub fn manager(&self) -> &MatchesManager {
        &self.manager
    }
}
