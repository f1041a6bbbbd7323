//! errors - 统一错误处理
//!
//! 全仓库共享的错误分类。每个失败都携带入口点名称、相关 ID
//! 与底层原因，足以渲染为单条人类可读消息。

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 所需逻辑合约没有已部署地址，操作无法发起（不重试）
    #[error("Contract not configured: {0}")]
    ContractNotConfigured(String),

    /// 适配器提交/查询失败，或账本报告执行回滚；重试策略由调用方决定
    #[error("Contract call failed in {entry_point}: {cause}")]
    ContractCallFailed { entry_point: String, cause: String },

    /// 原始返回元组与声明 schema 不符（ABI/schema 漂移，属程序缺陷，不重试）
    #[error("Decode error in {entry_point}: {detail}")]
    Decode { entry_point: String, detail: String },

    /// 贷款状态机不允许的迁移
    #[error("Invalid loan transition: cannot {attempted} a loan in status {current}")]
    InvalidLoanTransition { current: String, attempted: String },

    /// 资源冲突（如重复跟踪同一交易 ID）
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 输入校验失败
    #[error("Validation error: {0}")]
    Validation(String),

    /// 配置加载/内容错误
    #[error("Configuration error: {0}")]
    Config(String),

    /// 账本适配器传输层错误（网络、超时）
    #[error("Ledger error: {0}")]
    Ledger(String),
}

impl AppError {
    pub fn contract_not_configured(name: impl Into<String>) -> Self {
        Self::ContractNotConfigured(name.into())
    }

    pub fn contract_call_failed(entry_point: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::ContractCallFailed {
            entry_point: entry_point.into(),
            cause: cause.into(),
        }
    }

    pub fn decode(entry_point: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Decode {
            entry_point: entry_point.into(),
            detail: detail.into(),
        }
    }

    pub fn invalid_loan_transition(
        current: impl Into<String>,
        attempted: impl Into<String>,
    ) -> Self {
        Self::InvalidLoanTransition {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn ledger(msg: impl Into<String>) -> Self {
        Self::Ledger(msg.into())
    }

    /// 是否值得调用方重试（仅传输层/调用失败类；schema 与配置错误不重试）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Ledger(_) | Self::ContractCallFailed { .. }
        )
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = AppError::contract_call_failed("approveLoan", "transport closed");
        assert_eq!(
            err.to_string(),
            "Contract call failed in approveLoan: transport closed"
        );

        let err = AppError::invalid_loan_transition("Repaid", "repay");
        assert_eq!(
            err.to_string(),
            "Invalid loan transition: cannot repay a loan in status Repaid"
        );
    }

    #[test]
    fn test_retry_classification() {
        assert!(AppError::ledger("timeout").is_retryable());
        assert!(!AppError::decode("getLoan", "missing field").is_retryable());
        assert!(!AppError::contract_not_configured("oracle").is_retryable());
    }
}
