//! 房产代币实体

use brickline_common::{AccountAddress, Amount, LoanId, PropertyId};
use brickline_errors::AppError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("property {property_id} already collateralizes loan {active_loan}")]
    AlreadyCollateralized {
        property_id: PropertyId,
        active_loan: LoanId,
    },
}

impl From<PropertyError> for AppError {
    fn from(err: PropertyError) -> Self {
        AppError::conflict(err.to_string())
    }
}

/// 房产代币
///
/// 一个房产同一时刻最多抵押一笔活跃贷款；
/// 锁定标志与活跃贷款引用必须同时变更。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    /// 自由格式的房产描述负载
    pub data: String,
    /// 估值（账本最小货币单位）
    pub valuation: Amount,
    pub locked: bool,
    pub active_loan: Option<LoanId>,
    pub owner: AccountAddress,
}

impl Property {
    pub fn new(
        id: PropertyId,
        data: impl Into<String>,
        valuation: Amount,
        owner: AccountAddress,
    ) -> Self {
        Self {
            id,
            data: data.into(),
            valuation,
            locked: false,
            active_loan: None,
            owner,
        }
    }

    pub fn can_collateralize(&self) -> bool {
        !self.locked
    }

    /// 锁定为某笔贷款的抵押物
    pub fn lock_for_loan(&mut self, loan_id: LoanId) -> Result<(), PropertyError> {
        if let Some(active) = self.active_loan {
            return Err(PropertyError::AlreadyCollateralized {
                property_id: self.id,
                active_loan: active,
            });
        }
        self.locked = true;
        self.active_loan = Some(loan_id);
        Ok(())
    }

    /// 解除抵押（贷款结清或违约清算后）
    pub fn release(&mut self) {
        self.locked = false;
        self.active_loan = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property() -> Property {
        Property::new(
            PropertyId(2),
            "3BR apartment, 120sqm",
            Amount::new(250_000),
            AccountAddress::new("0.0.1001"),
        )
    }

    #[test]
    fn test_lock_and_release_change_together() {
        let mut prop = property();
        assert!(prop.can_collateralize());

        prop.lock_for_loan(LoanId(7)).unwrap();
        assert!(prop.locked);
        assert_eq!(prop.active_loan, Some(LoanId(7)));

        prop.release();
        assert!(!prop.locked);
        assert_eq!(prop.active_loan, None);
    }

    #[test]
    fn test_at_most_one_active_loan() {
        let mut prop = property();
        prop.lock_for_loan(LoanId(7)).unwrap();

        let err = prop.lock_for_loan(LoanId(8)).unwrap_err();
        assert!(matches!(
            err,
            PropertyError::AlreadyCollateralized {
                active_loan: LoanId(7),
                ..
            }
        ));
        assert_eq!(prop.active_loan, Some(LoanId(7)));
    }
}
