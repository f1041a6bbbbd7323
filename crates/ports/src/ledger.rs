//! 账本客户端 trait 定义
//!
//! 账本是外部协作者：本层只约定"提交已签名调用"与"执行只读查询"
//! 两种能力。签名、密钥保管与具体网络实现均在端口之外。

use async_trait::async_trait;
use brickline_common::{AbiValue, Amount, ContractAddress, TransactionId};
use brickline_errors::AppResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 面向单个入口点的已编码调用数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallData {
    /// 入口点函数名
    pub function: String,
    /// 有序参数列表
    pub args: Vec<AbiValue>,
    /// 本次调用的 gas 预算
    pub gas: u64,
}

/// 可提交/可查询的完整合约调用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    pub contract: ContractAddress,
    pub data: CallData,
    /// 随调用附带的原生单位转账金额（payable 入口点）
    pub payable: Option<Amount>,
}

impl ContractCall {
    pub fn new(contract: ContractAddress, data: CallData) -> Self {
        Self {
            contract,
            data,
            payable: None,
        }
    }

    pub fn with_payable(mut self, amount: Amount) -> Self {
        self.payable = Some(amount);
        self
    }
}

/// 提交写调用后立即返回的不透明句柄
///
/// 调用方将其交给交易跟踪引擎以得知最终结局。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionHandle {
    pub tx_id: TransactionId,
}

impl SubmissionHandle {
    pub fn new(tx_id: TransactionId) -> Self {
        Self { tx_id }
    }
}

/// 共识确认后账本返回的回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalityReport {
    pub tx_id: TransactionId,
    /// 账本报告的状态码；`SUCCESS` 之外均视为失败
    pub status_code: String,
    pub consensus_at: Option<DateTime<Utc>>,
    /// 不透明回执负载（合约日志、计费信息等）
    pub receipt: serde_json::Value,
}

impl FinalityReport {
    pub const SUCCESS: &'static str = "SUCCESS";

    pub fn is_success(&self) -> bool {
        self.status_code == Self::SUCCESS
    }
}

/// 账本客户端端口
///
/// 实现方不做任何重试：传输错误、执行回滚与超时都原样上浮，
/// 由调用方（契约服务/跟踪引擎）决定如何分类。
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// 提交已签名的写调用，立即返回提交句柄（不等待最终性）
    async fn submit(&self, call: ContractCall) -> AppResult<SubmissionHandle>;

    /// 等待指定交易达到账本最终性并返回回执
    ///
    /// 这是系统中唯一真正的挂起点；实现不得阻塞无关任务。
    async fn await_finality(&self, handle: &SubmissionHandle) -> AppResult<FinalityReport>;

    /// 对指定合约执行只读查询，返回原始结果元组
    async fn query(&self, call: ContractCall) -> AppResult<Vec<AbiValue>>;
}
