//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 3xxx: Vendor errors
/// - 4xxx: Order errors
/// - 6xxx: Menu item errors
/// - 7xxx: Table errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Vendor errors (3xxx)
    Vendor,
    /// Order errors (4xxx)
    Order,
    /// Menu item errors (6xxx)
    MenuItem,
    /// Table errors (7xxx)
    Table,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            3000..4000 => Self::Vendor,
            4000..5000 => Self::Order,
            6000..7000 => Self::MenuItem,
            7000..8000 => Self::Table,
            9000.. => Self::System,
            _ => Self::General,
        }
    }

    /// 分类名称 (日志用)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Vendor => "vendor",
            Self::Order => "order",
            Self::MenuItem => "menu_item",
            Self::Table => "table",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category this error code belongs to
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
