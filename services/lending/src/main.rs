//! 本地演示入口
//!
//! 在进程内账本上走一遍完整贷款生命周期：
//! 代币化 → 请求贷款 → 批准 → 还清。真实网络部署只需
//! 换一个 `LedgerClient` 实现，服务对象的装配方式不变。

use std::sync::Arc;

use brickline_adapter_memledger::MemLedger;
use brickline_common::{AccountAddress, Amount, LoanId, PropertyId};
use brickline_config::AppConfig;
use brickline_errors::{AppError, AppResult};
use brickline_lending::domain::DurationElapsed;
use brickline_lending::{ContractService, TrackedOutcome, TransactionTracker};
use brickline_ports::{LedgerClient, SubmissionHandle};
use tracing::info;

async fn confirm(tracker: &TransactionTracker, handle: SubmissionHandle) -> AppResult<()> {
    match tracker.track(handle).await? {
        TrackedOutcome::Success { tx_id, .. } => {
            info!(tx_id = %tx_id, "Transaction confirmed");
            Ok(())
        }
        TrackedOutcome::Failed { tx_id, cause } => Err(AppError::ledger(format!(
            "transaction {tx_id} failed: {cause}"
        ))),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load("config").unwrap_or_default();
    if config.telemetry.json_logs {
        brickline_telemetry::init_tracing_json(&config.telemetry.log_level);
    } else {
        brickline_telemetry::init_tracing(&config.telemetry.log_level);
    }

    let borrower = AccountAddress::new(
        config
            .ledger
            .operator_account
            .clone()
            .unwrap_or_else(|| "0.0.1001".to_string()),
    );
    let lender = AccountAddress::new("0.0.2002");

    // 服务对象在启动时各构造一次，按引用传递
    let ledger = Arc::new(MemLedger::new(borrower.clone()));
    let ledger_client: Arc<dyn LedgerClient> = ledger.clone();
    let contracts = ContractService::new(
        ledger_client.clone(),
        &MemLedger::contracts_config(),
        Arc::new(DurationElapsed),
    )?;
    let tracker = TransactionTracker::new(ledger_client);

    info!(network = %config.ledger.network, "Starting lifecycle demo");

    // 1. 代币化房产
    let handle = contracts
        .tokenize_property("3BR apartment, 120sqm", Amount::new(250_000))
        .await?;
    confirm(&tracker, handle).await?;
    let property = contracts.get_property(PropertyId(1)).await?;
    info!(property_id = %property.id, valuation = %property.valuation, "Property tokenized");

    // 2. 借款方请求贷款
    let handle = contracts
        .request_loan(property.id, Amount::new(75_000), 24)
        .await?;
    confirm(&tracker, handle).await?;
    let loan = contracts.get_loan(LoanId(1)).await?;
    info!(loan_id = %loan.id, status = %loan.status, "Loan requested");

    // 3. 出借方批准（切换签名账户）
    ledger.set_operator(lender.clone()).await;
    let handle = contracts.approve_loan(loan.id, lender, loan.amount).await?;
    confirm(&tracker, handle).await?;

    // 4. 借款方还清
    ledger.set_operator(borrower).await;
    let loan = contracts.get_loan(LoanId(1)).await?;
    let handle = contracts.repay_loan(loan.id, loan.amount_owed()).await?;
    confirm(&tracker, handle).await?;

    let loan = contracts.get_loan(LoanId(1)).await?;
    let property = contracts.get_property(property.id).await?;
    info!(
        loan_id = %loan.id,
        status = %loan.status,
        total_repaid = %loan.total_repaid,
        property_locked = property.locked,
        "Lifecycle complete"
    );

    Ok(())
}
