//! Vendor Model

use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorRole {
    /// 店主 (租户本身)
    #[default]
    Owner,
    /// 服务员
    Waiter,
    /// 后厨
    Kitchen,
}

/// Vendor account (租户)
///
/// Staff accounts are vendors too: they carry a subordinate role and point to
/// the owning vendor through `owner_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: VendorRole,
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Subscription tier, checked by callers only
    #[serde(default)]
    pub tier: Option<String>,
}

impl Vendor {
    /// Realtime channel this account listens on
    ///
    /// Staff share the owner's channel; owners (or staff without an owner
    /// link) use their own id.
    pub fn channel_id(&self) -> &str {
        match (self.role, self.owner_id.as_deref()) {
            (VendorRole::Waiter | VendorRole::Kitchen, Some(owner)) => owner,
            _ => &self.id,
        }
    }
}
