//! 合约入口点的编码/解码层
//!
//! 固定版本的入口点集合：每个入口点有固定的参数个数、有序类型表、
//! gas 预算档位与是否 payable。传错参数个数/类型是调用方编程错误，
//! 立即 panic（fail fast）而非可恢复错误。

mod schema;

pub use schema::*;

use brickline_common::{AbiKind, AbiValue};
use brickline_ports::CallData;

/// 读操作 gas 预算
pub const GAS_READ: u64 = 100_000;
/// 房产代币化 gas 预算
pub const GAS_TOKENIZE: u64 = 300_000;
/// 贷款写操作 gas 预算
pub const GAS_LOAN_WRITE: u64 = 500_000;

/// 合约入口点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    TokenizeProperty,
    RequestLoan,
    ApproveLoan,
    RepayLoan,
    ClaimCollateral,
    GetProperty,
    GetLoan,
    GetPropertyData,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 8] = [
        EntryPoint::TokenizeProperty,
        EntryPoint::RequestLoan,
        EntryPoint::ApproveLoan,
        EntryPoint::RepayLoan,
        EntryPoint::ClaimCollateral,
        EntryPoint::GetProperty,
        EntryPoint::GetLoan,
        EntryPoint::GetPropertyData,
    ];

    /// 入口点函数名
    pub fn name(&self) -> &'static str {
        match self {
            Self::TokenizeProperty => "tokenizeProperty",
            Self::RequestLoan => "requestLoan",
            Self::ApproveLoan => "approveLoan",
            Self::RepayLoan => "repayLoan",
            Self::ClaimCollateral => "claimCollateral",
            Self::GetProperty => "getProperty",
            Self::GetLoan => "getLoan",
            Self::GetPropertyData => "getPropertyData",
        }
    }

    /// 完整签名
    pub fn signature(&self) -> &'static str {
        match self {
            Self::TokenizeProperty => "tokenizeProperty(string,uint256)",
            Self::RequestLoan => "requestLoan(uint256,uint256,uint256)",
            Self::ApproveLoan => "approveLoan(uint256)",
            Self::RepayLoan => "repayLoan(uint256)",
            Self::ClaimCollateral => "claimCollateral(uint256)",
            Self::GetProperty => "getProperty(uint256)",
            Self::GetLoan => "getLoan(uint256)",
            Self::GetPropertyData => "getPropertyData(string)",
        }
    }

    /// 有序参数类型表
    pub fn params(&self) -> &'static [AbiKind] {
        match self {
            Self::TokenizeProperty => &[AbiKind::Str, AbiKind::U256],
            Self::RequestLoan => &[AbiKind::U256, AbiKind::U256, AbiKind::U256],
            Self::ApproveLoan
            | Self::RepayLoan
            | Self::ClaimCollateral
            | Self::GetProperty
            | Self::GetLoan => &[AbiKind::U256],
            Self::GetPropertyData => &[AbiKind::Str],
        }
    }

    pub fn gas(&self) -> u64 {
        match self {
            Self::TokenizeProperty => GAS_TOKENIZE,
            Self::RequestLoan | Self::ApproveLoan | Self::RepayLoan | Self::ClaimCollateral => {
                GAS_LOAN_WRITE
            }
            Self::GetProperty | Self::GetLoan | Self::GetPropertyData => GAS_READ,
        }
    }

    /// 是否随调用附带原生单位转账
    pub fn is_payable(&self) -> bool {
        matches!(self, Self::ApproveLoan | Self::RepayLoan)
    }

    /// 是否只读查询
    pub fn is_view(&self) -> bool {
        matches!(
            self,
            Self::GetProperty | Self::GetLoan | Self::GetPropertyData
        )
    }
}

impl std::fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 按入口点声明构造调用数据
///
/// # Panics
///
/// 参数个数或类型与入口点声明不符时 panic：这是调用方编程错误，
/// 不进入错误分类体系。
pub fn encode_call(entry_point: EntryPoint, args: Vec<AbiValue>) -> CallData {
    let params = entry_point.params();
    assert_eq!(
        args.len(),
        params.len(),
        "{entry_point}: expected {} argument(s), got {}",
        params.len(),
        args.len()
    );
    for (idx, (arg, expected)) in args.iter().zip(params).enumerate() {
        assert_eq!(
            arg.kind(),
            *expected,
            "{entry_point}: argument {idx} must be {expected}, got {}",
            arg.kind()
        );
    }

    CallData {
        function: entry_point.name().to_string(),
        args,
        gas: entry_point.gas(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_preserves_order_and_gas() {
        let data = encode_call(
            EntryPoint::RequestLoan,
            vec![AbiValue::U256(2), AbiValue::U256(75_000), AbiValue::U256(24)],
        );
        assert_eq!(data.function, "requestLoan");
        assert_eq!(
            data.args,
            vec![AbiValue::U256(2), AbiValue::U256(75_000), AbiValue::U256(24)]
        );
        assert_eq!(data.gas, GAS_LOAN_WRITE);

        let data = encode_call(
            EntryPoint::TokenizeProperty,
            vec![AbiValue::Str("unit 5".into()), AbiValue::U256(250_000)],
        );
        assert_eq!(data.gas, GAS_TOKENIZE);

        let data = encode_call(EntryPoint::GetLoan, vec![AbiValue::U256(7)]);
        assert_eq!(data.gas, GAS_READ);
    }

    #[test]
    #[should_panic(expected = "expected 2 argument(s)")]
    fn test_wrong_arity_fails_fast() {
        encode_call(EntryPoint::TokenizeProperty, vec![AbiValue::Str("x".into())]);
    }

    #[test]
    #[should_panic(expected = "argument 0 must be uint256")]
    fn test_wrong_kind_fails_fast() {
        encode_call(EntryPoint::ApproveLoan, vec![AbiValue::Str("7".into())]);
    }

    #[test]
    fn test_payable_and_view_classification() {
        assert!(EntryPoint::ApproveLoan.is_payable());
        assert!(EntryPoint::RepayLoan.is_payable());
        assert!(!EntryPoint::ClaimCollateral.is_payable());
        assert!(EntryPoint::GetProperty.is_view());
        assert!(!EntryPoint::RequestLoan.is_view());
    }
}
