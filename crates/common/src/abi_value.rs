//! 合约调用参数/返回值的类型标签联合

use serde::{Deserialize, Serialize};

/// 参数/返回字段的类型种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbiKind {
    Str,
    U256,
    U8,
    Bool,
    Address,
}

impl AbiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbiKind::Str => "string",
            AbiKind::U256 => "uint256",
            AbiKind::U8 => "uint8",
            AbiKind::Bool => "bool",
            AbiKind::Address => "address",
        }
    }
}

impl std::fmt::Display for AbiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个调用参数或原始返回字段
///
/// 编码层按入口点声明的参数列表构造有序的 `AbiValue` 序列，
/// 解码层按返回 schema 对原始元组做逐位类型匹配。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AbiValue {
    Str(String),
    U256(u128),
    U8(u8),
    Bool(bool),
    Address(String),
}

impl AbiValue {
    pub fn kind(&self) -> AbiKind {
        match self {
            AbiValue::Str(_) => AbiKind::Str,
            AbiValue::U256(_) => AbiKind::U256,
            AbiValue::U8(_) => AbiKind::U8,
            AbiValue::Bool(_) => AbiKind::Bool,
            AbiValue::Address(_) => AbiKind::Address,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u256(&self) -> Option<u128> {
        match self {
            AbiValue::U256(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self {
            AbiValue::U8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&str> {
        match self {
            AbiValue::Address(a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(AbiValue::Str("x".into()).kind(), AbiKind::Str);
        assert_eq!(AbiValue::U256(1).kind(), AbiKind::U256);
        assert_eq!(AbiValue::Bool(true).kind(), AbiKind::Bool);
        assert_eq!(AbiValue::Address("0xabc".into()).kind(), AbiKind::Address);
    }

    #[test]
    fn test_accessors_reject_wrong_kind() {
        let v = AbiValue::U256(42);
        assert_eq!(v.as_u256(), Some(42));
        assert_eq!(v.as_str(), None);
        assert_eq!(v.as_bool(), None);
    }
}
