//! Lending Service Library
//!
//! 模块化架构：
//! - `abi`: 合约入口点的编码/解码层（无状态纯映射）
//! - `domain`: 贷款生命周期状态机、房产抵押不变量（不感知账本）
//! - `application`: 契约服务（合约调用编排）与交易跟踪引擎

pub mod abi;
pub mod application;
pub mod domain;

pub use application::{ContractService, TrackedOutcome, TrackedTransaction, TransactionTracker, TxStatus};
