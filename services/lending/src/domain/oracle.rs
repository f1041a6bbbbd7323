//! 预言机房产认证记录

use brickline_common::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 预言机对某外部房产标识的认证结果（只读）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleAttestation {
    pub validated: bool,
    pub last_updated: Option<DateTime<Utc>>,
    /// 预言机认定的估值
    pub value: Amount,
    /// 认证数据负载
    pub attestation: String,
}
