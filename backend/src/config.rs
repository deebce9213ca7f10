use std::time::Duration;

use crate::utils::request::DEFAULT_TIMEOUT_SECS;

// =========================================================
// 常量定义
// =========================================================

const DEFAULT_GROQ_KEY_NAME: &str = "GROQ_API_KEY";
const DEFAULT_INTASEND_KEY_NAME: &str = "INTASEND_API_KEY";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 90;

// =========================================================
// 环境抽象
// =========================================================

/// 抽象环境变量接口：负责访问环境变量和 secrets
pub trait EnvAdapter {
    /// 获取环境变量
    fn var(&self, name: &str) -> Option<String>;
    /// 获取 secret
    fn secret(&self, name: &str) -> Option<String>;
}

/// Worker Env 的 EnvAdapter 实现
pub struct WorkerEnv<'a>(pub &'a worker::Env);

impl<'a> EnvAdapter for WorkerEnv<'a> {
    fn var(&self, name: &str) -> Option<String> {
        self.0.var(name).ok().map(|v| v.to_string())
    }

    fn secret(&self, name: &str) -> Option<String> {
        self.0.secret(name).ok().map(|s| s.to_string())
    }
}

// =========================================================
// 运行时配置
// =========================================================

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    /// 为空时支付走测试模式
    pub intasend_api_key: Option<String>,
    pub allowed_origins: Vec<String>,
    pub search_timeout: Duration,
    pub model_timeout: Duration,
}

impl RuntimeConfig {
    pub fn from_env(env: &impl EnvAdapter) -> Self {
        let var = |name: &str| env.var(name).filter(|v| !v.trim().is_empty());
        // secret 优先，允许本地开发时放在 [vars]
        let credential = |name: String| {
            env.secret(&name)
                .or_else(|| env.var(&name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let groq_key_name =
            var("GROQ_API_KEY_NAME").unwrap_or_else(|| DEFAULT_GROQ_KEY_NAME.to_string());
        let intasend_key_name =
            var("INTASEND_API_KEY_NAME").unwrap_or_else(|| DEFAULT_INTASEND_KEY_NAME.to_string());

        let secs = |name: &str, default: u64| {
            Duration::from_secs(
                var(name)
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(default),
            )
        };

        Self {
            groq_api_key: credential(groq_key_name),
            groq_model: var("GROQ_MODEL_NAME").unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            intasend_api_key: credential(intasend_key_name),
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .filter(|list| !list.is_empty())
                .unwrap_or_else(|| vec!["*".to_string()]),
            search_timeout: secs("SEARCH_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            model_timeout: secs("MODEL_TIMEOUT_SECS", DEFAULT_MODEL_TIMEOUT_SECS),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =========================================================
// 测试环境实现 (Mock)
// =========================================================
