//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    ///
    /// 桌台/菜品引用来自请求体 (下单、改菜)，找不到时按 400 处理，
    /// 而订单/账单作为路径资源找不到时返回 404。
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::OrderNotFound | Self::BillNotGenerated => StatusCode::NOT_FOUND,

            // 429 Too Many Requests
            Self::ConnectionLimitReached => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::StorageFull
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::BillNotGenerated.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidOrderStatus.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::TableNotFound.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::TableVendorMismatch.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::MenuItemNotFound.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::ConnectionLimitReached.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
