//! 通用类型定义

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// 房产代币 ID（由账本分配，正整数）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
pub struct PropertyId(pub u64);

impl PropertyId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 贷款 ID（由账本分配，正整数）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
pub struct LoanId(pub u64);

impl LoanId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 账户地址
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct AccountAddress(pub String);

impl AccountAddress {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 零地址（合约中表示"暂无"的哨兵值）
    pub fn zero() -> Self {
        Self("0x0000000000000000000000000000000000000000".to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty() || self.0.trim_start_matches("0x").chars().all(|c| c == '0')
    }
}

/// 已部署合约的账本地址
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct ContractAddress(pub String);

impl ContractAddress {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 账本交易 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 金额（以账本最小货币单位存储）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn new(value: u128) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }
}

/// 利率（基点存储，1 bp = 0.01%；账本以缩放整数保存）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}bps")]
pub struct InterestRate(pub u64);

impl InterestRate {
    pub fn from_bps(bps: u64) -> Self {
        Self(bps)
    }

    pub fn bps(&self) -> u64 {
        self.0
    }

    /// 转换为百分比浮点数（仅用于显示）
    pub fn as_percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// 逻辑合约名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractName {
    PropertyRegistry,
    LoanManager,
    Oracle,
}

impl ContractName {
    pub const ALL: [ContractName; 3] = [
        ContractName::PropertyRegistry,
        ContractName::LoanManager,
        ContractName::Oracle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractName::PropertyRegistry => "property_registry",
            ContractName::LoanManager => "loan_manager",
            ContractName::Oracle => "oracle",
        }
    }
}

impl std::fmt::Display for ContractName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_saturating_ops() {
        let a = Amount::new(100);
        let b = Amount::new(30);
        assert_eq!(a.saturating_add(b), Amount::new(130));
        assert_eq!(b.saturating_sub(a), Amount::ZERO);
    }

    #[test]
    fn test_zero_address_detection() {
        assert!(AccountAddress::zero().is_zero());
        assert!(AccountAddress::new("").is_zero());
        assert!(!AccountAddress::new("0x00a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3").is_zero());
    }

    #[test]
    fn test_interest_rate_display_value() {
        let rate = InterestRate::from_bps(550);
        assert_eq!(rate.as_percent(), 5.5);
    }
}
