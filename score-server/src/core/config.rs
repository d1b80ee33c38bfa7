use crate::scoring::policy::{ScorerPolicy, ScoringRules};
use std::path::PathBuf;
use std::time::Duration;

/// 服务器配置 - 比分服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (scoring.redb, logs) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志输出 |
/// | LOG_DIR | (none) | 滚动日志文件目录 |
/// | BROADCAST_CAPACITY | 256 | 每场比赛的广播缓冲 |
/// | RIGHTS_REQUEST_TIMEOUT_SECS | 300 | 未审批请求的过期时间 |
/// | RIGHTS_EXPIRY_SCAN_SECS | 30 | 过期扫描间隔 |
/// | MAX_INCREMENTAL_SYNC | 500 | 增量同步的最大事件数 |
/// | SCORER_POLICY | any_captain | any_captain \| fielding_captain_only |
/// | ROTATE_RIGHTS_BETWEEN_INNINGS | false | 换局时释放记分权 |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 关闭超时 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/score HTTP_PORT=8080 SCORER_POLICY=fielding cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 日志 ===
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,

    // === 比分规则 ===
    /// 每场比赛广播通道容量；落后超过该值的订阅者需要重新同步
    pub broadcast_capacity: usize,
    pub rights_request_timeout_secs: u64,
    pub rights_expiry_scan_secs: u64,
    pub max_incremental_sync: u64,
    pub scorer_policy: ScorerPolicy,
    pub rotate_rights_between_innings: bool,

    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let scorer_policy = match std::env::var("SCORER_POLICY") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Invalid SCORER_POLICY, using any_captain");
                ScorerPolicy::default()
            }),
            Err(_) => ScorerPolicy::default(),
        };

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),

            broadcast_capacity: env_or(
                "BROADCAST_CAPACITY",
                crate::scoring::broadcast::DEFAULT_BROADCAST_CAPACITY,
            ),
            rights_request_timeout_secs: env_or("RIGHTS_REQUEST_TIMEOUT_SECS", 300),
            rights_expiry_scan_secs: env_or("RIGHTS_EXPIRY_SCAN_SECS", 30),
            max_incremental_sync: env_or(
                "MAX_INCREMENTAL_SYNC",
                crate::scoring::sync::DEFAULT_MAX_INCREMENTAL_EVENTS,
            ),
            scorer_policy,
            rotate_rights_between_innings: env_or("ROTATE_RIGHTS_BETWEEN_INNINGS", false),

            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 比分数据库路径
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("scoring.redb")
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            scorer_policy: self.scorer_policy,
            rotate_rights_between_innings: self.rotate_rights_between_innings,
        }
    }

    pub fn rights_request_timeout(&self) -> Duration {
        Duration::from_secs(self.rights_request_timeout_secs)
    }

    /// 扫描间隔，至少 1 秒
    pub fn rights_expiry_interval(&self) -> Duration {
        Duration::from_secs(self.rights_expiry_scan_secs.max(1))
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
