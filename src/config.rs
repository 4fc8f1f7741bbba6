use crate::error::{AdvisorError, Result};
use crate::service::ScorerKind;
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub matcher: MatcherConfig,
    pub advice: AdviceConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// 最低相似度 [0,1]
    pub threshold: f64,
    pub scorer: ScorerKind,
    /// 未命中时返回的候选数量
    pub suggestion_limit: usize,
    /// 查询文本最大字符数, 超出时拒绝
    pub max_query_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    /// 数据集未提供 Yield_pct 时使用的堆肥产出率 (%)
    pub default_yield_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "waste_data.csv".to_string(),
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            scorer: ScorerKind::default(),
            suggestion_limit: 5,
            max_query_chars: 200,
        }
    }
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            default_yield_pct: 40.0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> advisor.toml (可选) -> ADVISOR__* 环境变量
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("advisor").required(false))
            .add_source(
                config::Environment::with_prefix("ADVISOR")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let mut cfg: AppConfig = settings.try_deserialize()?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// 兼容简单环境变量
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(path) = std::env::var("DATASET_PATH") {
            self.dataset.path = path;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.matcher.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AdvisorError::Config(format!(
                "matcher.threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.matcher.suggestion_limit == 0 {
            return Err(AdvisorError::Config(
                "matcher.suggestion_limit must be at least 1".to_string(),
            ));
        }
        if self.matcher.max_query_chars == 0 {
            return Err(AdvisorError::Config(
                "matcher.max_query_chars must be at least 1".to_string(),
            ));
        }
        let yield_pct = self.advice.default_yield_pct;
        if yield_pct.is_nan() || yield_pct < 0.0 {
            return Err(AdvisorError::Config(format!(
                "advice.default_yield_pct must be non-negative, got {}",
                self.advice.default_yield_pct
            )));
        }
        Ok(())
    }
}
