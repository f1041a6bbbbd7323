//! 贷款生命周期集成测试
//!
//! 在进程内账本适配器上组合契约服务、跟踪引擎与领域状态机，
//! 验证端到端语义：链上状态只有在跟踪引擎报告成功后才被视为持久。

use std::sync::Arc;

use brickline_adapter_memledger::MemLedger;
use brickline_common::{AccountAddress, Amount, LoanId, PropertyId};
use brickline_errors::AppError;
use brickline_lending::domain::{DefaultPolicy, DurationElapsed, Loan, LoanStatus};
use brickline_lending::{ContractService, TrackedOutcome, TransactionTracker, TxStatus};
use brickline_ports::{LedgerClient, SubmissionHandle};
use chrono::{DateTime, Utc};

/// 出借方自行决定清算时点（测试装配用的宽松策略）
struct LenderDiscretion;

impl DefaultPolicy for LenderDiscretion {
    fn permits_default(&self, _loan: &Loan, _now: DateTime<Utc>) -> bool {
        true
    }
}

struct Harness {
    ledger: Arc<MemLedger>,
    contracts: ContractService,
    tracker: TransactionTracker,
    borrower: AccountAddress,
    lender: AccountAddress,
}

impl Harness {
    fn new() -> Self {
        Self::with_policy(Arc::new(LenderDiscretion))
    }

    fn with_policy(policy: Arc<dyn DefaultPolicy>) -> Self {
        let borrower = AccountAddress::new("0.0.1001");
        let lender = AccountAddress::new("0.0.2002");
        let ledger = Arc::new(MemLedger::new(borrower.clone()));
        let client: Arc<dyn LedgerClient> = ledger.clone();
        let contracts = ContractService::new(client.clone(), &MemLedger::contracts_config(), policy)
            .expect("schemas verified at startup");
        let tracker = TransactionTracker::new(client);
        Self {
            ledger,
            contracts,
            tracker,
            borrower,
            lender,
        }
    }

    async fn confirm(&self, handle: SubmissionHandle) -> TrackedOutcome {
        self.tracker
            .track(handle)
            .await
            .expect("tracking must yield a terminal outcome")
    }

    /// 代币化一套房产并确认，返回其 ID
    async fn tokenized_property(&self) -> PropertyId {
        let handle = self
            .contracts
            .tokenize_property("3BR apartment, 120sqm", Amount::new(250_000))
            .await
            .unwrap();
        assert!(self.confirm(handle).await.is_success());
        PropertyId(1)
    }

    /// 走到已批准状态的贷款
    async fn approved_loan(&self) -> LoanId {
        let property = self.tokenized_property().await;
        let handle = self
            .contracts
            .request_loan(property, Amount::new(75_000), 24)
            .await
            .unwrap();
        assert!(self.confirm(handle).await.is_success());

        self.ledger.set_operator(self.lender.clone()).await;
        let handle = self
            .contracts
            .approve_loan(LoanId(1), self.lender.clone(), Amount::new(75_000))
            .await
            .unwrap();
        assert!(self.confirm(handle).await.is_success());
        self.ledger.set_operator(self.borrower.clone()).await;
        LoanId(1)
    }
}

#[tokio::test]
async fn test_request_loan_yields_pending_with_requested_terms() {
    let h = Harness::new();
    let property = h.tokenized_property().await;

    let handle = h
        .contracts
        .request_loan(property, Amount::new(75_000), 24)
        .await
        .unwrap();
    assert!(h.confirm(handle).await.is_success());

    let loan = h.contracts.get_loan(LoanId(1)).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Pending);
    assert_eq!(loan.amount, Amount::new(75_000));
    assert_eq!(loan.duration_months, 24);
    assert_eq!(loan.lender, None);
    assert_eq!(loan.borrower, h.borrower);

    // 房产被锁定且引用该贷款
    let prop = h.contracts.get_property(property).await.unwrap();
    assert!(prop.locked);
    assert_eq!(prop.active_loan, Some(LoanId(1)));
}

#[tokio::test]
async fn test_second_approve_rejected_before_submission() {
    let h = Harness::new();
    let loan_id = h.approved_loan().await;

    let loan = h.contracts.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Approved);
    assert_eq!(loan.lender, Some(h.lender.clone()));
    assert!(loan.start_time.is_some());
    let tracked_before = h.tracker.list().await.len();

    // 状态机预检拒绝，没有任何东西被提交上链
    let err = h
        .contracts
        .approve_loan(loan_id, h.lender.clone(), Amount::new(75_000))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidLoanTransition { ref current, .. } if current == "Approved"
    ));
    assert_eq!(h.tracker.list().await.len(), tracked_before);

    let loan = h.contracts.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Approved);
}

#[tokio::test]
async fn test_full_repayment_reaches_repaid_and_releases_property() {
    let h = Harness::new();
    let loan_id = h.approved_loan().await;
    let loan = h.contracts.get_loan(loan_id).await.unwrap();
    let owed = loan.amount_owed();

    // 部分还款后仍为 Approved
    let handle = h
        .contracts
        .repay_loan(loan_id, Amount::new(40_000))
        .await
        .unwrap();
    assert!(h.confirm(handle).await.is_success());
    let loan = h.contracts.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Approved);
    assert_eq!(loan.total_repaid, Amount::new(40_000));
    assert!(loan.last_payment_time.is_some());

    // 补足剩余欠款进入 Repaid，房产解锁
    let handle = h
        .contracts
        .repay_loan(loan_id, owed.saturating_sub(Amount::new(40_000)))
        .await
        .unwrap();
    assert!(h.confirm(handle).await.is_success());

    let loan = h.contracts.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Repaid);
    assert_eq!(loan.total_repaid, owed);

    let prop = h.contracts.get_property(loan.property_id).await.unwrap();
    assert!(!prop.locked);
    assert_eq!(prop.active_loan, None);
    assert_eq!(prop.owner, h.borrower);
}

#[tokio::test]
async fn test_claim_collateral_defaults_loan_and_transfers_property() {
    let h = Harness::new();
    let loan_id = h.approved_loan().await;

    h.ledger.set_operator(h.lender.clone()).await;
    let handle = h.contracts.claim_collateral(loan_id).await.unwrap();
    assert!(h.confirm(handle).await.is_success());

    let loan = h.contracts.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Defaulted);

    // 抵押房产划转给出借方并解锁
    let prop = h.contracts.get_property(loan.property_id).await.unwrap();
    assert_eq!(prop.owner, h.lender);
    assert!(!prop.locked);

    // 违约后还款在提交前即被状态机拒绝
    h.ledger.set_operator(h.borrower.clone()).await;
    let err = h
        .contracts
        .repay_loan(loan_id, Amount::new(1_000))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidLoanTransition { ref current, .. } if current == "Defaulted"
    ));
}

#[tokio::test]
async fn test_duration_policy_blocks_premature_claim() {
    let h = Harness::with_policy(Arc::new(DurationElapsed));
    let loan_id = h.approved_loan().await;

    // 刚批准的贷款未到期：清算在提交前被策略拒绝，贷款保持 Approved
    h.ledger.set_operator(h.lender.clone()).await;
    let err = h.contracts.claim_collateral(loan_id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let loan = h.contracts.get_loan(loan_id).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Approved);
}

#[tokio::test]
async fn test_tracked_outcomes_are_observable_and_clearable() {
    let h = Harness::new();
    let handle = h
        .contracts
        .tokenize_property("unit 5", Amount::new(250_000))
        .await
        .unwrap();
    let tx_id = handle.tx_id.as_str().to_string();
    assert!(h.confirm(handle).await.is_success());

    let snap = h.tracker.status(&tx_id).await.unwrap();
    assert_eq!(snap.status, TxStatus::Success);
    assert_eq!(h.tracker.list().await.len(), 1);

    assert!(h.tracker.clear(&tx_id).await);
    assert!(h.tracker.status(&tx_id).await.is_none());
}

#[tokio::test]
async fn test_missing_property_never_fabricated() {
    let h = Harness::new();
    let err = h.contracts.get_property(PropertyId(99)).await.unwrap_err();
    assert!(matches!(err, AppError::ContractCallFailed { .. }));
}

#[tokio::test]
async fn test_oracle_attestation_read() {
    let h = Harness::new();
    h.ledger
        .seed_attestation("P-2024-001", true, Amount::new(260_000), "county registry check")
        .await;

    let att = h.contracts.get_property_data("P-2024-001").await.unwrap();
    assert!(att.validated);
    assert_eq!(att.value, Amount::new(260_000));
    assert!(att.last_updated.is_some());

    let err = h.contracts.get_property_data("P-404").await.unwrap_err();
    assert!(matches!(err, AppError::ContractCallFailed { .. }));
}
