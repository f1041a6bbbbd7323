//! 交易跟踪引擎
//!
//! 每笔被跟踪交易的状态机：`Pending → Success` 或 `Pending → Failed`，
//! 不存在其他迁移；到达终态后记录不可变，重复跟踪同一 ID 被拒绝，
//! 绝不静默覆盖。等待最终性是系统唯一的挂起点，彼此独立的跟踪
//! 操作互不阻塞。引擎只分类结局，不重试也不回滚底层账本交易。

use std::collections::HashMap;
use std::sync::Arc;

use brickline_errors::{AppError, AppResult};
use brickline_ports::{FinalityReport, LedgerClient, SubmissionHandle};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// 被跟踪交易的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

impl TxStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// 被跟踪交易的记录快照
///
/// 记录本体归引擎所有；调用方拿到的是副本，无法直接修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTransaction {
    pub tx_id: String,
    pub status: TxStatus,
    pub error: Option<String>,
}

/// 跟踪调用的终态结果
///
/// 每笔提交的交易恰好观察到一个终态，以返回值交付
/// （取代回调对），保持"恰好一次终态通知"。
#[derive(Debug, Clone)]
pub enum TrackedOutcome {
    Success { tx_id: String, receipt: FinalityReport },
    Failed { tx_id: String, cause: String },
}

impl TrackedOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn tx_id(&self) -> &str {
        match self {
            Self::Success { tx_id, .. } | Self::Failed { tx_id, .. } => tx_id,
        }
    }
}

/// 交易跟踪引擎
///
/// 共享结局注册表用 `RwLock<HashMap>` 保护：并发插入/更新/查询
/// 不丢失更新，读方也不会看到半写状态。
pub struct TransactionTracker {
    ledger: Arc<dyn LedgerClient>,
    registry: RwLock<HashMap<String, TrackedTransaction>>,
}

impl TransactionTracker {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            registry: RwLock::new(HashMap::new()),
        }
    }

    /// 跟踪一笔已提交交易直到账本最终性，返回其终态
    ///
    /// 最终性分类错误（传输失败、超时、非成功状态码）进入
    /// `Failed` 结局，不会越过跟踪边界再次抛出。
    pub async fn track(&self, handle: SubmissionHandle) -> AppResult<TrackedOutcome> {
        let tx_id = handle.tx_id.as_str().to_string();

        {
            let mut registry = self.registry.write().await;
            if registry.contains_key(&tx_id) {
                return Err(AppError::conflict(format!(
                    "transaction {tx_id} is already tracked"
                )));
            }
            registry.insert(
                tx_id.clone(),
                TrackedTransaction {
                    tx_id: tx_id.clone(),
                    status: TxStatus::Pending,
                    error: None,
                },
            );
        }

        // 唯一的挂起点：锁已释放，其他跟踪操作不受影响
        let outcome = match self.ledger.await_finality(&handle).await {
            Ok(report) if report.is_success() => {
                info!(tx_id = %tx_id, "Transaction finalized successfully");
                TrackedOutcome::Success {
                    tx_id: tx_id.clone(),
                    receipt: report,
                }
            }
            Ok(report) => {
                let cause = format!(
                    "transaction failed with status: {}",
                    report.status_code
                );
                warn!(tx_id = %tx_id, cause = %cause, "Transaction rejected by ledger");
                TrackedOutcome::Failed {
                    tx_id: tx_id.clone(),
                    cause,
                }
            }
            Err(err) => {
                let cause = err.to_string();
                warn!(tx_id = %tx_id, cause = %cause, "Finality could not be observed");
                TrackedOutcome::Failed {
                    tx_id: tx_id.clone(),
                    cause,
                }
            }
        };

        self.finalize(&tx_id, &outcome).await;
        Ok(outcome)
    }

    /// 写入终态；已终态的记录不可变
    async fn finalize(&self, tx_id: &str, outcome: &TrackedOutcome) {
        let mut registry = self.registry.write().await;
        let Some(entry) = registry.get_mut(tx_id) else {
            // 等待期间被 clear：放弃等待即取消，不再登记结局
            return;
        };
        if entry.status.is_terminal() {
            return;
        }
        match outcome {
            TrackedOutcome::Success { .. } => {
                entry.status = TxStatus::Success;
                entry.error = None;
            }
            TrackedOutcome::Failed { cause, .. } => {
                entry.status = TxStatus::Failed;
                entry.error = Some(cause.clone());
            }
        }
    }

    /// 查询单笔交易的当前状态（终态后幂等）
    pub async fn status(&self, tx_id: &str) -> Option<TrackedTransaction> {
        self.registry.read().await.get(tx_id).cloned()
    }

    /// 列出所有已知交易的快照（可观测性）
    pub async fn list(&self) -> Vec<TrackedTransaction> {
        self.registry.read().await.values().cloned().collect()
    }

    /// 注销一笔被跟踪交易以限制内存增长
    ///
    /// 只移除本地记录，不影响账本侧结局。
    pub async fn clear(&self, tx_id: &str) -> bool {
        self.registry.write().await.remove(tx_id).is_some()
    }

    /// 清空整个注册表
    pub async fn clear_all(&self) {
        self.registry.write().await.clear();
    }
}
