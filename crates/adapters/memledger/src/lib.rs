//! adapter-memledger - 进程内账本适配器
//!
//! 在本进程内模拟已部署的房产登记 / 贷款管理 / 预言机合约，
//! 供集成测试与本地演示使用。语义对齐真实合约面：
//! 写调用提交即执行并记录结局，`await_finality` 在模拟的共识
//! 延迟后交付回执；业务违规表现为非成功状态码，而非传输错误。

mod contracts;

pub use contracts::{DEFAULT_INTEREST_RATE_BPS, MemLedger};

/// 模拟账本上部署的合约地址
pub const PROPERTY_REGISTRY_ADDRESS: &str = "0.0.5001";
pub const LOAN_MANAGER_ADDRESS: &str = "0.0.5002";
pub const ORACLE_ADDRESS: &str = "0.0.5003";
