//! 模拟合约的状态与入口点分发

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use brickline_common::{AbiValue, AccountAddress, Amount, TransactionId};
use brickline_config::ContractsConfig;
use brickline_errors::{AppError, AppResult};
use brickline_ports::{ContractCall, FinalityReport, LedgerClient, SubmissionHandle};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{LOAN_MANAGER_ADDRESS, ORACLE_ADDRESS, PROPERTY_REGISTRY_ADDRESS};

/// 贷款请求未指定利率时合约采用的默认利率（基点）
pub const DEFAULT_INTEREST_RATE_BPS: u128 = 500;

/// 模拟的共识延迟
const CONSENSUS_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
struct PropertyState {
    data: String,
    valuation: u128,
    locked: bool,
    active_loan_id: u128,
    owner: String,
}

#[derive(Debug, Clone)]
struct LoanState {
    property_id: u128,
    borrower: String,
    lender: String,
    amount: u128,
    duration_months: u128,
    interest_rate_bps: u128,
    start_time: u128,
    last_payment_time: u128,
    total_repaid: u128,
    status: u8,
}

impl LoanState {
    fn amount_owed(&self) -> u128 {
        self.amount
            + self.amount * self.interest_rate_bps * self.duration_months / (10_000 * 12)
    }
}

#[derive(Debug, Clone)]
struct AttestationState {
    validated: bool,
    last_updated: u128,
    value: u128,
    attestation: String,
}

#[derive(Default)]
struct Chain {
    properties: HashMap<u128, PropertyState>,
    loans: HashMap<u128, LoanState>,
    attestations: HashMap<String, AttestationState>,
    next_property_id: u128,
    next_loan_id: u128,
    /// 每笔已提交交易记录的最终性状态码
    outcomes: HashMap<String, String>,
}

/// 进程内账本
pub struct MemLedger {
    chain: RwLock<Chain>,
    operator: RwLock<AccountAddress>,
    tx_seq: AtomicU64,
}

impl MemLedger {
    pub fn new(operator: AccountAddress) -> Self {
        Self {
            chain: RwLock::new(Chain {
                next_property_id: 1,
                next_loan_id: 1,
                ..Chain::default()
            }),
            operator: RwLock::new(operator),
            tx_seq: AtomicU64::new(1),
        }
    }

    /// 三个模拟合约的注册表配置
    pub fn contracts_config() -> ContractsConfig {
        ContractsConfig {
            property_registry: Some(PROPERTY_REGISTRY_ADDRESS.to_string()),
            loan_manager: Some(LOAN_MANAGER_ADDRESS.to_string()),
            oracle: Some(ORACLE_ADDRESS.to_string()),
        }
    }

    /// 切换签名提交交易的运营账户（模拟换钱包）
    pub async fn set_operator(&self, operator: AccountAddress) {
        *self.operator.write().await = operator;
    }

    /// 预置一条预言机认证记录
    pub async fn seed_attestation(
        &self,
        external_id: &str,
        validated: bool,
        value: Amount,
        attestation: &str,
    ) {
        let mut chain = self.chain.write().await;
        chain.attestations.insert(
            external_id.to_string(),
            AttestationState {
                validated,
                last_updated: now_secs(),
                value: value.value(),
                attestation: attestation.to_string(),
            },
        );
    }

    fn known_address(address: &str) -> bool {
        matches!(
            address,
            PROPERTY_REGISTRY_ADDRESS | LOAN_MANAGER_ADDRESS | ORACLE_ADDRESS
        )
    }

    /// 执行一笔写调用，返回状态码（`SUCCESS` 或回滚原因）
    fn execute(chain: &mut Chain, operator: &str, call: &ContractCall) -> String {
        let args = &call.data.args;
        let payable = call.payable.map(|a| a.value()).unwrap_or(0);

        match call.data.function.as_str() {
            "tokenizeProperty" => {
                let (Some(data), Some(valuation)) = (
                    args.first().and_then(AbiValue::as_str),
                    args.get(1).and_then(AbiValue::as_u256),
                ) else {
                    return revert("INVALID_ARGUMENTS");
                };
                let id = chain.next_property_id;
                chain.next_property_id += 1;
                chain.properties.insert(
                    id,
                    PropertyState {
                        data: data.to_string(),
                        valuation,
                        locked: false,
                        active_loan_id: 0,
                        owner: operator.to_string(),
                    },
                );
                FinalityReport::SUCCESS.to_string()
            }
            "requestLoan" => {
                let (Some(property_id), Some(amount), Some(duration)) = (
                    args.first().and_then(AbiValue::as_u256),
                    args.get(1).and_then(AbiValue::as_u256),
                    args.get(2).and_then(AbiValue::as_u256),
                ) else {
                    return revert("INVALID_ARGUMENTS");
                };
                let Some(property) = chain.properties.get_mut(&property_id) else {
                    return revert("UNKNOWN_PROPERTY");
                };
                if property.locked {
                    return revert("PROPERTY_ALREADY_COLLATERALIZED");
                }
                if amount == 0 || duration == 0 {
                    return revert("INVALID_LOAN_TERMS");
                }
                let id = chain.next_loan_id;
                property.locked = true;
                property.active_loan_id = id;
                chain.next_loan_id += 1;
                chain.loans.insert(
                    id,
                    LoanState {
                        property_id,
                        borrower: operator.to_string(),
                        lender: String::new(),
                        amount,
                        duration_months: duration,
                        interest_rate_bps: DEFAULT_INTEREST_RATE_BPS,
                        start_time: 0,
                        last_payment_time: 0,
                        total_repaid: 0,
                        status: 0,
                    },
                );
                FinalityReport::SUCCESS.to_string()
            }
            "approveLoan" => {
                let Some(loan_id) = args.first().and_then(AbiValue::as_u256) else {
                    return revert("INVALID_ARGUMENTS");
                };
                let Some(loan) = chain.loans.get_mut(&loan_id) else {
                    return revert("UNKNOWN_LOAN");
                };
                if loan.status != 0 {
                    return revert("LOAN_NOT_PENDING");
                }
                if payable < loan.amount {
                    return revert("INSUFFICIENT_PRINCIPAL");
                }
                loan.lender = operator.to_string();
                loan.start_time = now_secs();
                loan.status = 1;
                FinalityReport::SUCCESS.to_string()
            }
            "repayLoan" => {
                let Some(loan_id) = args.first().and_then(AbiValue::as_u256) else {
                    return revert("INVALID_ARGUMENTS");
                };
                let Some(loan) = chain.loans.get_mut(&loan_id) else {
                    return revert("UNKNOWN_LOAN");
                };
                if loan.status != 1 {
                    return revert("LOAN_NOT_ACTIVE");
                }
                if payable == 0 {
                    return revert("ZERO_REPAYMENT");
                }
                let owed = loan.amount_owed();
                if loan.total_repaid + payable > owed {
                    return revert("REPAY_EXCEEDS_OWED");
                }
                loan.total_repaid += payable;
                loan.last_payment_time = now_secs();
                if loan.total_repaid == owed {
                    loan.status = 2;
                    let property_id = loan.property_id;
                    if let Some(property) = chain.properties.get_mut(&property_id) {
                        property.locked = false;
                        property.active_loan_id = 0;
                    }
                }
                FinalityReport::SUCCESS.to_string()
            }
            "claimCollateral" => {
                let Some(loan_id) = args.first().and_then(AbiValue::as_u256) else {
                    return revert("INVALID_ARGUMENTS");
                };
                let Some(loan) = chain.loans.get_mut(&loan_id) else {
                    return revert("UNKNOWN_LOAN");
                };
                if loan.status != 1 {
                    return revert("LOAN_NOT_ACTIVE");
                }
                loan.status = 3;
                let lender = loan.lender.clone();
                let property_id = loan.property_id;
                if let Some(property) = chain.properties.get_mut(&property_id) {
                    property.owner = lender;
                    property.locked = false;
                    property.active_loan_id = 0;
                }
                FinalityReport::SUCCESS.to_string()
            }
            other => revert(&format!("UNKNOWN_ENTRY_POINT {other}")),
        }
    }
}

fn revert(reason: &str) -> String {
    format!("CONTRACT_REVERT_EXECUTED: {reason}")
}

fn now_secs() -> u128 {
    Utc::now().timestamp().max(0) as u128
}

#[async_trait]
impl LedgerClient for MemLedger {
    async fn submit(&self, call: ContractCall) -> AppResult<SubmissionHandle> {
        if !Self::known_address(call.contract.as_str()) {
            return Err(AppError::ledger(format!(
                "INVALID_CONTRACT_ID: {}",
                call.contract
            )));
        }

        let operator = self.operator.read().await.clone();
        let seq = self.tx_seq.fetch_add(1, Ordering::SeqCst);
        let tx_id = format!("{}@{}", operator, seq);

        let mut chain = self.chain.write().await;
        let status = Self::execute(&mut chain, operator.as_str(), &call);
        debug!(tx_id = %tx_id, function = %call.data.function, status = %status, "Call executed");
        chain.outcomes.insert(tx_id.clone(), status);

        Ok(SubmissionHandle::new(TransactionId::new(tx_id)))
    }

    async fn await_finality(&self, handle: &SubmissionHandle) -> AppResult<FinalityReport> {
        tokio::time::sleep(CONSENSUS_DELAY).await;

        let chain = self.chain.read().await;
        let status = chain
            .outcomes
            .get(handle.tx_id.as_str())
            .cloned()
            .ok_or_else(|| {
                AppError::ledger(format!("unknown transaction {}", handle.tx_id))
            })?;

        Ok(FinalityReport {
            tx_id: handle.tx_id.clone(),
            status_code: status,
            consensus_at: Some(Utc::now()),
            receipt: serde_json::json!({ "tx_id": handle.tx_id.as_str() }),
        })
    }

    async fn query(&self, call: ContractCall) -> AppResult<Vec<AbiValue>> {
        if !Self::known_address(call.contract.as_str()) {
            return Err(AppError::ledger(format!(
                "INVALID_CONTRACT_ID: {}",
                call.contract
            )));
        }

        let chain = self.chain.read().await;
        let args = &call.data.args;
        match call.data.function.as_str() {
            "getProperty" => {
                let id = args
                    .first()
                    .and_then(AbiValue::as_u256)
                    .ok_or_else(|| AppError::ledger("INVALID_ARGUMENTS"))?;
                let property = chain
                    .properties
                    .get(&id)
                    .ok_or_else(|| AppError::ledger(revert("UNKNOWN_PROPERTY")))?;
                Ok(vec![
                    AbiValue::Str(property.data.clone()),
                    AbiValue::U256(property.valuation),
                    AbiValue::Bool(property.locked),
                    AbiValue::U256(property.active_loan_id),
                    AbiValue::Address(property.owner.clone()),
                ])
            }
            "getLoan" => {
                let id = args
                    .first()
                    .and_then(AbiValue::as_u256)
                    .ok_or_else(|| AppError::ledger("INVALID_ARGUMENTS"))?;
                let loan = chain
                    .loans
                    .get(&id)
                    .ok_or_else(|| AppError::ledger(revert("UNKNOWN_LOAN")))?;
                Ok(vec![
                    AbiValue::U256(loan.property_id),
                    AbiValue::Address(loan.borrower.clone()),
                    AbiValue::Address(loan.lender.clone()),
                    AbiValue::U256(loan.amount),
                    AbiValue::U256(loan.duration_months),
                    AbiValue::U256(loan.interest_rate_bps),
                    AbiValue::U256(loan.start_time),
                    AbiValue::U256(loan.last_payment_time),
                    AbiValue::U256(loan.total_repaid),
                    AbiValue::U8(loan.status),
                ])
            }
            "getPropertyData" => {
                let external_id = args
                    .first()
                    .and_then(AbiValue::as_str)
                    .ok_or_else(|| AppError::ledger("INVALID_ARGUMENTS"))?;
                let att = chain
                    .attestations
                    .get(external_id)
                    .ok_or_else(|| AppError::ledger(revert("UNKNOWN_ATTESTATION")))?;
                Ok(vec![
                    AbiValue::Bool(att.validated),
                    AbiValue::U256(att.last_updated),
                    AbiValue::U256(att.value),
                    AbiValue::Str(att.attestation.clone()),
                ])
            }
            other => Err(AppError::ledger(revert(&format!(
                "UNKNOWN_ENTRY_POINT {other}"
            )))),
        }
    }
}
