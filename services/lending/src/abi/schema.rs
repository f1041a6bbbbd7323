//! 返回值 schema 与按 schema 的定位解码
//!
//! 每个只读入口点声明一张有序的命名字段表，解码按表逐位做类型匹配；
//! 元组短于 schema 或类型不符时以命名字段报 `Decode` 错误。
//! 解码不校验业务不变量，那是调用方的职责。

use brickline_common::{
    AbiKind, AbiValue, AccountAddress, Amount, InterestRate, LoanId, PropertyId,
};
use brickline_errors::{AppError, AppResult};
use chrono::{DateTime, Utc};

use crate::domain::{Loan, LoanStatus, OracleAttestation, Property};

use super::EntryPoint;

/// schema 中的一个命名字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: AbiKind,
}

const fn field(name: &'static str, kind: AbiKind) -> Field {
    Field { name, kind }
}

/// `getProperty` 返回 schema
pub const PROPERTY_SCHEMA: &[Field] = &[
    field("data", AbiKind::Str),
    field("valuation", AbiKind::U256),
    field("locked", AbiKind::Bool),
    field("active_loan_id", AbiKind::U256),
    field("owner", AbiKind::Address),
];

/// `getLoan` 返回 schema
pub const LOAN_SCHEMA: &[Field] = &[
    field("property_id", AbiKind::U256),
    field("borrower", AbiKind::Address),
    field("lender", AbiKind::Address),
    field("amount", AbiKind::U256),
    field("duration", AbiKind::U256),
    field("interest_rate", AbiKind::U256),
    field("start_time", AbiKind::U256),
    field("last_payment_time", AbiKind::U256),
    field("total_repaid", AbiKind::U256),
    field("status", AbiKind::U8),
];

/// `getPropertyData` 返回 schema
pub const ATTESTATION_SCHEMA: &[Field] = &[
    field("validated", AbiKind::Bool),
    field("last_updated", AbiKind::U256),
    field("value", AbiKind::U256),
    field("attestation", AbiKind::Str),
];

/// 入口点声明的返回元组签名
pub fn return_signature(entry_point: EntryPoint) -> Option<&'static str> {
    match entry_point {
        EntryPoint::GetProperty => Some("(string,uint256,bool,uint256,address)"),
        EntryPoint::GetLoan => Some(
            "(uint256,address,address,uint256,uint256,uint256,uint256,uint256,uint256,uint8)",
        ),
        EntryPoint::GetPropertyData => Some("(bool,uint256,uint256,string)"),
        _ => None,
    }
}

fn schema_of(entry_point: EntryPoint) -> Option<&'static [Field]> {
    match entry_point {
        EntryPoint::GetProperty => Some(PROPERTY_SCHEMA),
        EntryPoint::GetLoan => Some(LOAN_SCHEMA),
        EntryPoint::GetPropertyData => Some(ATTESTATION_SCHEMA),
        _ => None,
    }
}

/// 启动期 schema 校验
///
/// 将每张声明 schema 渲染回类型签名并与入口点声明比对，
/// schema 漂移在启动时即以命名字段失败，而不是运行期越界。
pub fn verify_schemas() -> AppResult<()> {
    for entry_point in EntryPoint::ALL {
        let (Some(schema), Some(expected)) = (schema_of(entry_point), return_signature(entry_point))
        else {
            continue;
        };
        let rendered = format!(
            "({})",
            schema
                .iter()
                .map(|f| f.kind.as_str())
                .collect::<Vec<_>>()
                .join(",")
        );
        if rendered != expected {
            let drifted = schema
                .iter()
                .map(|f| f.name)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::decode(
                entry_point.name(),
                format!("schema [{drifted}] renders {rendered}, entry point declares {expected}"),
            ));
        }
    }
    Ok(())
}

/// 按 schema 取第 `idx` 个字段，越界/类型不符均报命名字段错误
fn field_at<'a>(
    entry_point: EntryPoint,
    schema: &'static [Field],
    raw: &'a [AbiValue],
    idx: usize,
) -> AppResult<&'a AbiValue> {
    let declared = &schema[idx];
    let value = raw.get(idx).ok_or_else(|| {
        AppError::decode(
            entry_point.name(),
            format!(
                "raw tuple has {} field(s), missing field {} `{}`",
                raw.len(),
                idx,
                declared.name
            ),
        )
    })?;
    if value.kind() != declared.kind {
        return Err(AppError::decode(
            entry_point.name(),
            format!(
                "field {} `{}` must be {}, got {}",
                idx,
                declared.name,
                declared.kind,
                value.kind()
            ),
        ));
    }
    Ok(value)
}

fn str_at(ep: EntryPoint, schema: &'static [Field], raw: &[AbiValue], idx: usize) -> AppResult<String> {
    Ok(field_at(ep, schema, raw, idx)?
        .as_str()
        .unwrap_or_default()
        .to_string())
}

fn u256_at(ep: EntryPoint, schema: &'static [Field], raw: &[AbiValue], idx: usize) -> AppResult<u128> {
    Ok(field_at(ep, schema, raw, idx)?.as_u256().unwrap_or_default())
}

fn u8_at(ep: EntryPoint, schema: &'static [Field], raw: &[AbiValue], idx: usize) -> AppResult<u8> {
    Ok(field_at(ep, schema, raw, idx)?.as_u8().unwrap_or_default())
}

fn bool_at(ep: EntryPoint, schema: &'static [Field], raw: &[AbiValue], idx: usize) -> AppResult<bool> {
    Ok(field_at(ep, schema, raw, idx)?.as_bool().unwrap_or_default())
}

fn address_at(
    ep: EntryPoint,
    schema: &'static [Field],
    raw: &[AbiValue],
    idx: usize,
) -> AppResult<AccountAddress> {
    Ok(AccountAddress::new(
        field_at(ep, schema, raw, idx)?.as_address().unwrap_or_default(),
    ))
}

/// 秒级时间戳；0 表示"尚未发生"，超出 i64 范围的值视为无效而非截断
fn timestamp(secs: u128) -> Option<DateTime<Utc>> {
    if secs == 0 || secs > i64::MAX as u128 {
        return None;
    }
    DateTime::from_timestamp(secs as i64, 0)
}

/// 解码 `getProperty` 的原始元组
pub fn decode_property(id: PropertyId, raw: &[AbiValue]) -> AppResult<Property> {
    let ep = EntryPoint::GetProperty;
    let schema = PROPERTY_SCHEMA;

    let active_loan_id = u256_at(ep, schema, raw, 3)?;
    Ok(Property {
        id,
        data: str_at(ep, schema, raw, 0)?,
        valuation: Amount::new(u256_at(ep, schema, raw, 1)?),
        locked: bool_at(ep, schema, raw, 2)?,
        active_loan: (active_loan_id != 0).then(|| LoanId(active_loan_id as u64)),
        owner: address_at(ep, schema, raw, 4)?,
    })
}

/// 解码 `getLoan` 的原始元组
pub fn decode_loan(id: LoanId, raw: &[AbiValue]) -> AppResult<Loan> {
    let ep = EntryPoint::GetLoan;
    let schema = LOAN_SCHEMA;

    let lender = address_at(ep, schema, raw, 2)?;
    let status_wire = u8_at(ep, schema, raw, 9)?;
    let status = LoanStatus::from_wire(status_wire).ok_or_else(|| {
        AppError::decode(ep.name(), format!("unknown loan status code {status_wire}"))
    })?;

    Ok(Loan {
        id,
        property_id: PropertyId(u256_at(ep, schema, raw, 0)? as u64),
        borrower: address_at(ep, schema, raw, 1)?,
        lender: (!lender.is_zero()).then_some(lender),
        amount: Amount::new(u256_at(ep, schema, raw, 3)?),
        duration_months: u256_at(ep, schema, raw, 4)? as u64,
        interest_rate: InterestRate::from_bps(u256_at(ep, schema, raw, 5)? as u64),
        start_time: timestamp(u256_at(ep, schema, raw, 6)?),
        last_payment_time: timestamp(u256_at(ep, schema, raw, 7)?),
        total_repaid: Amount::new(u256_at(ep, schema, raw, 8)?),
        status,
    })
}

/// 解码 `getPropertyData` 的原始元组
pub fn decode_attestation(raw: &[AbiValue]) -> AppResult<OracleAttestation> {
    let ep = EntryPoint::GetPropertyData;
    let schema = ATTESTATION_SCHEMA;

    Ok(OracleAttestation {
        validated: bool_at(ep, schema, raw, 0)?,
        last_updated: timestamp(u256_at(ep, schema, raw, 1)?),
        value: Amount::new(u256_at(ep, schema, raw, 2)?),
        attestation: str_at(ep, schema, raw, 3)?,
    })
}
