//! 契约服务
//!
//! 持有逻辑合约名到账本合约地址的注册表，并在编码层与账本端口之上
//! 组合出领域操作。贷款写操作先读取账本当前状态，由状态机预检迁移，
//! 非法迁移在提交前即被拒绝；合法迁移提交后立即返回提交句柄（非阻塞）。
//! 读操作同步查询并解码。本服务从不自动重试，重试策略属于调用方。

use std::collections::HashMap;
use std::sync::Arc;

use brickline_common::{
    AbiValue, AccountAddress, Amount, ContractAddress, ContractName, LoanId, PropertyId,
};
use brickline_config::ContractsConfig;
use brickline_errors::{AppError, AppResult};
use brickline_ports::{ContractCall, LedgerClient, SubmissionHandle};
use chrono::Utc;
use tracing::{info, warn};

use crate::abi::{self, EntryPoint};
use crate::domain::{DefaultPolicy, Loan, OracleAttestation, Property};

/// 契约服务
pub struct ContractService {
    ledger: Arc<dyn LedgerClient>,
    contracts: HashMap<ContractName, ContractAddress>,
    default_policy: Arc<dyn DefaultPolicy>,
}

impl ContractService {
    /// 从配置构建合约注册表
    ///
    /// 占位符/未填写的地址被跳过：对应能力在运行期不可用，
    /// 依赖它的操作将以 `ContractNotConfigured` 失败。
    /// 注册表初始化后只读，无需加锁。
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        contracts: &ContractsConfig,
        default_policy: Arc<dyn DefaultPolicy>,
    ) -> AppResult<Self> {
        abi::verify_schemas()?;

        let mut registry = HashMap::new();
        for name in ContractName::ALL {
            match contracts.address_of(name) {
                Some(address) => {
                    info!(contract = %name, address = %address, "Contract registered");
                    registry.insert(name, address);
                }
                None => {
                    warn!(contract = %name, "Contract not deployed, capability unavailable");
                }
            }
        }

        Ok(Self {
            ledger,
            contracts: registry,
            default_policy,
        })
    }

    /// 指定逻辑合约是否已配置
    pub fn is_configured(&self, name: ContractName) -> bool {
        self.contracts.contains_key(&name)
    }

    fn address(&self, name: ContractName) -> AppResult<&ContractAddress> {
        self.contracts
            .get(&name)
            .ok_or_else(|| AppError::contract_not_configured(name.to_string()))
    }

    /// 提交写调用，返回提交句柄而不等待最终性
    async fn submit(
        &self,
        name: ContractName,
        entry_point: EntryPoint,
        args: Vec<AbiValue>,
        payable: Option<Amount>,
    ) -> AppResult<SubmissionHandle> {
        let address = self.address(name)?.clone();
        let mut call = ContractCall::new(address, abi::encode_call(entry_point, args));
        if let Some(amount) = payable {
            call = call.with_payable(amount);
        }

        let handle = self
            .ledger
            .submit(call)
            .await
            .map_err(|e| AppError::contract_call_failed(entry_point.name(), e.to_string()))?;

        info!(
            entry_point = %entry_point,
            tx_id = %handle.tx_id,
            "Contract call submitted"
        );
        Ok(handle)
    }

    /// 执行只读查询并返回原始元组
    async fn query(
        &self,
        name: ContractName,
        entry_point: EntryPoint,
        args: Vec<AbiValue>,
    ) -> AppResult<Vec<AbiValue>> {
        let address = self.address(name)?.clone();
        let call = ContractCall::new(address, abi::encode_call(entry_point, args));

        self.ledger
            .query(call)
            .await
            .map_err(|e| AppError::contract_call_failed(entry_point.name(), e.to_string()))
    }

    // ============ 写操作 ============

    /// 代币化房产
    pub async fn tokenize_property(
        &self,
        data: &str,
        valuation: Amount,
    ) -> AppResult<SubmissionHandle> {
        self.submit(
            ContractName::PropertyRegistry,
            EntryPoint::TokenizeProperty,
            vec![
                AbiValue::Str(data.to_string()),
                AbiValue::U256(valuation.value()),
            ],
            None,
        )
        .await
    }

    /// 以房产代币为抵押发起贷款请求
    pub async fn request_loan(
        &self,
        property_id: PropertyId,
        amount: Amount,
        duration_months: u64,
    ) -> AppResult<SubmissionHandle> {
        self.submit(
            ContractName::LoanManager,
            EntryPoint::RequestLoan,
            vec![
                AbiValue::U256(property_id.value() as u128),
                AbiValue::U256(amount.value()),
                AbiValue::U256(duration_months as u128),
            ],
            None,
        )
        .await
    }

    /// 批准贷款，随调用转入本金
    ///
    /// 先以状态机预检：仅 Pending 贷款可批准，否则返回
    /// `InvalidLoanTransition` 且不产生任何提交。
    pub async fn approve_loan(
        &self,
        loan_id: LoanId,
        lender: AccountAddress,
        amount: Amount,
    ) -> AppResult<SubmissionHandle> {
        let mut current = self.get_loan(loan_id).await?;
        current.approve(lender, Utc::now())?;

        self.submit(
            ContractName::LoanManager,
            EntryPoint::ApproveLoan,
            vec![AbiValue::U256(loan_id.value() as u128)],
            Some(amount),
        )
        .await
    }

    /// 偿还贷款，随调用转入还款金额
    ///
    /// 预检同上：仅 Approved 贷款可还款，超额还款在提交前拒绝。
    pub async fn repay_loan(&self, loan_id: LoanId, amount: Amount) -> AppResult<SubmissionHandle> {
        let mut current = self.get_loan(loan_id).await?;
        current.record_repayment(amount, Utc::now())?;

        self.submit(
            ContractName::LoanManager,
            EntryPoint::RepayLoan,
            vec![AbiValue::U256(loan_id.value() as u128)],
            Some(amount),
        )
        .await
    }

    /// 违约后清算抵押物
    ///
    /// 由装配时注入的违约策略判定是否允许：条件不满足或贷款不在
    /// Approved 状态时在提交前拒绝。
    pub async fn claim_collateral(&self, loan_id: LoanId) -> AppResult<SubmissionHandle> {
        let mut current = self.get_loan(loan_id).await?;
        current.mark_defaulted(self.default_policy.as_ref(), Utc::now())?;

        self.submit(
            ContractName::LoanManager,
            EntryPoint::ClaimCollateral,
            vec![AbiValue::U256(loan_id.value() as u128)],
            None,
        )
        .await
    }

    // ============ 读操作 ============
    // 读操作从不产生被跟踪交易；失败或空元组上浮为
    // ContractCallFailed / Decode，绝不伪造记录。

    pub async fn get_property(&self, id: PropertyId) -> AppResult<Property> {
        let raw = self
            .query(
                ContractName::PropertyRegistry,
                EntryPoint::GetProperty,
                vec![AbiValue::U256(id.value() as u128)],
            )
            .await?;
        abi::decode_property(id, &raw)
    }

    pub async fn get_loan(&self, id: LoanId) -> AppResult<Loan> {
        let raw = self
            .query(
                ContractName::LoanManager,
                EntryPoint::GetLoan,
                vec![AbiValue::U256(id.value() as u128)],
            )
            .await?;
        abi::decode_loan(id, &raw)
    }

    /// 查询预言机对外部房产标识的认证
    pub async fn get_property_data(&self, external_id: &str) -> AppResult<OracleAttestation> {
        let raw = self
            .query(
                ContractName::Oracle,
                EntryPoint::GetPropertyData,
                vec![AbiValue::Str(external_id.to_string())],
            )
            .await?;
        abi::decode_attestation(&raw)
    }
}
