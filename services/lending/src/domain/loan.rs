//! 贷款实体与生命周期状态机

use brickline_common::{AccountAddress, Amount, InterestRate, LoanId, PropertyId};
use brickline_errors::AppError;
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 贷款状态
///
/// 迁移单调：`Pending → Approved → (Repaid | Defaulted)`，
/// 到达 Repaid/Defaulted 后永不再变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Pending,
    Approved,
    Repaid,
    Defaulted,
}

impl LoanStatus {
    /// 合约侧 uint8 编码
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Pending),
            1 => Some(Self::Approved),
            2 => Some(Self::Repaid),
            3 => Some(Self::Defaulted),
            _ => None,
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Approved => 1,
            Self::Repaid => 2,
            Self::Defaulted => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Repaid | Self::Defaulted)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Repaid => "Repaid",
            Self::Defaulted => "Defaulted",
        };
        f.write_str(s)
    }
}

/// 对贷款尝试的动作（用于迁移错误上下文）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanAction {
    Approve,
    Repay,
    ClaimCollateral,
}

impl std::fmt::Display for LoanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Approve => "approve",
            Self::Repay => "repay",
            Self::ClaimCollateral => "claim collateral on",
        };
        f.write_str(s)
    }
}

/// 贷款领域错误
#[derive(Debug, Error)]
pub enum LoanError {
    #[error("cannot {attempted} a loan in status {current}")]
    IllegalTransition {
        current: LoanStatus,
        attempted: LoanAction,
    },

    #[error("default conditions not met for loan {loan_id}")]
    DefaultNotPermitted { loan_id: LoanId },

    #[error("repayment of {amount} would exceed amount owed {owed} on loan {loan_id}")]
    Overpayment {
        loan_id: LoanId,
        amount: Amount,
        owed: Amount,
    },
}

impl From<LoanError> for AppError {
    fn from(err: LoanError) -> Self {
        match err {
            LoanError::IllegalTransition { current, attempted } => {
                AppError::invalid_loan_transition(current.to_string(), attempted.to_string())
            }
            LoanError::DefaultNotPermitted { .. } => AppError::validation(err.to_string()),
            LoanError::Overpayment { .. } => AppError::validation(err.to_string()),
        }
    }
}

/// 违约判定策略
///
/// 触发违约的确切条件是业务决策，这里仅定义接缝；
/// 默认实现：贷款期限已过且未还清。
pub trait DefaultPolicy: Send + Sync {
    fn permits_default(&self, loan: &Loan, now: DateTime<Utc>) -> bool;
}

/// 期限已过且尚有欠款即允许违约
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationElapsed;

impl DefaultPolicy for DurationElapsed {
    fn permits_default(&self, loan: &Loan, now: DateTime<Utc>) -> bool {
        loan.duration_elapsed(now) && loan.total_repaid < loan.amount_owed()
    }
}

/// 贷款实体
///
/// 金额与期限创建后不可变；`total_repaid` 单调不减且不超过应还总额。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub property_id: PropertyId,
    pub borrower: AccountAddress,
    /// 批准前为空
    pub lender: Option<AccountAddress>,
    pub amount: Amount,
    pub duration_months: u64,
    pub interest_rate: InterestRate,
    /// 批准前为空
    pub start_time: Option<DateTime<Utc>>,
    pub last_payment_time: Option<DateTime<Utc>>,
    pub total_repaid: Amount,
    pub status: LoanStatus,
}

impl Loan {
    /// 创建新的待批准贷款（`requestLoan` 的产物）
    pub fn new_pending(
        id: LoanId,
        property_id: PropertyId,
        borrower: AccountAddress,
        amount: Amount,
        duration_months: u64,
        interest_rate: InterestRate,
    ) -> Self {
        Self {
            id,
            property_id,
            borrower,
            lender: None,
            amount,
            duration_months,
            interest_rate,
            start_time: None,
            last_payment_time: None,
            total_repaid: Amount::ZERO,
            status: LoanStatus::Pending,
        }
    }

    /// 应还总额：本金 + 约定期限内的单利
    ///
    /// `interest = principal · rate_bps / 10_000 · months / 12`
    pub fn amount_owed(&self) -> Amount {
        let principal = self.amount.value();
        let interest = principal * self.interest_rate.bps() as u128 * self.duration_months as u128
            / (10_000 * 12);
        Amount::new(principal + interest)
    }

    /// 贷款期限是否已过（仅对已批准贷款有意义）
    pub fn duration_elapsed(&self, now: DateTime<Utc>) -> bool {
        match self.start_time {
            Some(start) => match start.checked_add_months(Months::new(self.duration_months as u32))
            {
                Some(deadline) => now >= deadline,
                None => false,
            },
            None => false,
        }
    }

    /// 批准贷款：仅 Pending 可进入 Approved，同时固定出借方与起始时间
    pub fn approve(&mut self, lender: AccountAddress, now: DateTime<Utc>) -> Result<(), LoanError> {
        if self.status != LoanStatus::Pending {
            return Err(LoanError::IllegalTransition {
                current: self.status,
                attempted: LoanAction::Approve,
            });
        }
        self.lender = Some(lender);
        self.start_time = Some(now);
        self.status = LoanStatus::Approved;
        Ok(())
    }

    /// 记录一笔还款：仅 Approved 可还款；还满应还总额即进入 Repaid
    pub fn record_repayment(
        &mut self,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<LoanStatus, LoanError> {
        if self.status != LoanStatus::Approved {
            return Err(LoanError::IllegalTransition {
                current: self.status,
                attempted: LoanAction::Repay,
            });
        }
        let owed = self.amount_owed();
        let new_total = self.total_repaid.saturating_add(amount);
        if new_total > owed {
            return Err(LoanError::Overpayment {
                loan_id: self.id,
                amount,
                owed,
            });
        }
        self.total_repaid = new_total;
        self.last_payment_time = Some(now);
        if self.total_repaid == owed {
            self.status = LoanStatus::Repaid;
        }
        Ok(self.status)
    }

    /// 标记违约：仅 Approved 且未还清、且策略允许时可进入 Defaulted
    pub fn mark_defaulted(
        &mut self,
        policy: &dyn DefaultPolicy,
        now: DateTime<Utc>,
    ) -> Result<(), LoanError> {
        if self.status != LoanStatus::Approved {
            return Err(LoanError::IllegalTransition {
                current: self.status,
                attempted: LoanAction::ClaimCollateral,
            });
        }
        if !policy.permits_default(self, now) {
            return Err(LoanError::DefaultNotPermitted { loan_id: self.id });
        }
        self.status = LoanStatus::Defaulted;
        Ok(())
    }
}
