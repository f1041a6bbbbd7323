//! config - 配置加载库

use brickline_common::{ContractAddress, ContractName};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 生产环境输出 JSON 格式日志
    #[serde(default)]
    pub json_logs: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

/// 账本网络配置
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_network")]
    pub network: String,
    /// 等待交易最终性的超时（秒）
    #[serde(default = "default_finality_timeout_secs")]
    pub finality_timeout_secs: u64,
    /// 签名提交交易的运营账户
    pub operator_account: Option<String>,
}

fn default_network() -> String {
    "testnet".to_string()
}

fn default_finality_timeout_secs() -> u64 {
    30
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            finality_timeout_secs: default_finality_timeout_secs(),
            operator_account: None,
        }
    }
}

/// 合约地址注册表配置
///
/// 未填写、为空或保留 "YOUR_" 占位符的地址视为"尚未部署"，
/// 对应合约能力在运行期不可用。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractsConfig {
    pub property_registry: Option<String>,
    pub loan_manager: Option<String>,
    pub oracle: Option<String>,
}

impl ContractsConfig {
    /// 解析逻辑合约名对应的已部署地址；占位符视为未配置
    pub fn address_of(&self, name: ContractName) -> Option<ContractAddress> {
        let raw = match name {
            ContractName::PropertyRegistry => self.property_registry.as_deref(),
            ContractName::LoanManager => self.loan_manager.as_deref(),
            ContractName::Oracle => self.oracle.as_deref(),
        };
        raw.filter(|addr| !Self::is_placeholder(addr))
            .map(ContractAddress::new)
    }

    fn is_placeholder(addr: &str) -> bool {
        let trimmed = addr.trim();
        trimmed.is_empty() || trimmed.starts_with("YOUR_")
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub contracts: ContractsConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Env::prefixed("BRICKLINE_").split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests;
