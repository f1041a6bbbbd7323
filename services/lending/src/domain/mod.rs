//! 领域层
//!
//! 纯状态/迁移逻辑。哪些迁移合法、各产出什么由这里定义；
//! 迁移的持久化由账本写入 + 跟踪引擎确认驱动，本层不感知账本。

pub mod loan;
pub mod oracle;
pub mod property;

pub use loan::*;
pub use oracle::*;
pub use property::*;
