//! ports - 抽象 trait 层
//!
//! 定义账本客户端等基础设施的抽象接口

mod ledger;

pub use ledger::*;
