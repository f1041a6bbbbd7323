//! 应用层
//!
//! 显式依赖注入：两个服务对象在进程启动时各构造一次，
//! 以引用（Arc）传给消费方，不使用隐藏的全局单例。

pub mod contract_service;
pub mod tracker;

pub use contract_service::*;
pub use tracker::*;
