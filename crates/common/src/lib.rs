//! common - 通用类型和工具库

pub mod abi_value;
pub mod types;

pub use abi_value::*;
pub use types::*;
