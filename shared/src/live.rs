//! Realtime events pushed to vendor channels
//!
//! 线上格式: `{"type": "NEW_ORDER", "order": {...}}`

use crate::order::Order;
use serde::{Deserialize, Serialize};

/// Order lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveEvent {
    NewOrder { order: Order },
    OrderUpdate { order: Order },
    OrderArchived {
        #[serde(rename = "orderId")]
        order_id: String,
    },
}

impl LiveEvent {
    /// Vendor-independent order id carried by the event
    pub fn order_id(&self) -> &str {
        match self {
            LiveEvent::NewOrder { order } | LiveEvent::OrderUpdate { order } => &order.id,
            LiveEvent::OrderArchived { order_id } => order_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LiveEvent::NewOrder { .. } => "NEW_ORDER",
            LiveEvent::OrderUpdate { .. } => "ORDER_UPDATE",
            LiveEvent::OrderArchived { .. } => "ORDER_ARCHIVED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archived_wire_format() {
        let event = LiveEvent::OrderArchived {
            order_id: "o-1".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"ORDER_ARCHIVED","orderId":"o-1"}"#);
        assert_eq!(event.kind(), "ORDER_ARCHIVED");
        assert_eq!(event.order_id(), "o-1");
    }

    #[test]
    fn test_new_order_tag() {
        let raw = r#"{"type":"NEW_ORDER","order":{"id":"o-1","vendorId":"v1","tableId":null,
            "orderNumber":1,"status":"new","items":[{"menuItemId":"tea","name":"Tea","price":"2.00","quantity":1}],
            "totalAmount":"2.00","customerName":null,"archived":false,"createdAt":0,"completedAt":null}}"#;
        let event: LiveEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind(), "NEW_ORDER");
        assert_eq!(event.order_id(), "o-1");
    }
}
