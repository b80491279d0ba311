use super::*;
use crate::catalog::CatalogStorage;
use shared::models::{DiningTable, MenuItem};
use std::str::FromStr;

// ========================================================================
// Helpers
// ========================================================================

fn create_test_manager() -> (OrdersManager, CatalogStorage) {
    create_manager_with(true)
}

fn create_manager_with(strict_status: bool) -> (OrdersManager, CatalogStorage) {
    let db = crate::db::open_in_memory().unwrap();
    let catalog = CatalogStorage::open(db.clone()).unwrap();
    seed_catalog(&catalog);
    let storage = OrderStorage::open(db).unwrap();
    let manager = OrdersManager::new(storage, Arc::new(catalog.clone()), strict_status);
    (manager, catalog)
}

fn money(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

fn menu_item(id: &str, vendor_id: &str, name: &str, price: &str) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        vendor_id: vendor_id.to_string(),
        name: name.to_string(),
        price: money(price),
        category: None,
    }
}

fn dining_table(id: &str, vendor_id: &str, number: &str, is_active: bool) -> DiningTable {
    DiningTable {
        id: id.to_string(),
        vendor_id: vendor_id.to_string(),
        table_number: number.to_string(),
        is_active,
    }
}

/// Vendor v1: tea 2.00, bun 1.50, T1 (#1), T2 (#2), T9 inactive
/// Vendor v2: coffee 3.20, table T-V2 (#1)
fn seed_catalog(catalog: &CatalogStorage) {
    catalog.put_menu_item(&menu_item("tea", "v1", "Tea", "2.00")).unwrap();
    catalog.put_menu_item(&menu_item("bun", "v1", "Bun", "1.50")).unwrap();
    catalog
        .put_menu_item(&menu_item("coffee", "v2", "Coffee", "3.20"))
        .unwrap();
    catalog.put_table(&dining_table("T1", "v1", "1", true)).unwrap();
    catalog.put_table(&dining_table("T2", "v1", "2", true)).unwrap();
    catalog.put_table(&dining_table("T9", "v1", "9", false)).unwrap();
    catalog.put_table(&dining_table("T-V2", "v2", "1", true)).unwrap();
}

fn request(vendor_id: &str, table: Option<&str>, items: Vec<OrderItemInput>) -> PlaceOrderRequest {
    PlaceOrderRequest {
        vendor_id: vendor_id.to_string(),
        table_id: table.map(str::to_string),
        items,
        customer_name: None,
    }
}

fn item(menu_item_id: &str, quantity: u32) -> OrderItemInput {
    OrderItemInput::new(menu_item_id, quantity)
}

fn priced_item(menu_item_id: &str, name: &str, price: &str, quantity: u32) -> OrderItemInput {
    OrderItemInput {
        menu_item_id: menu_item_id.to_string(),
        name: Some(name.to_string()),
        price: Some(money(price)),
        quantity,
    }
}

fn advance_to(manager: &OrdersManager, order_id: &str, target: OrderStatus) -> Order {
    let mut order = manager.get_order(order_id).unwrap();
    for status in OrderStatus::ALL {
        if status == target {
            break;
        }
        if order.status.can_transition_to(status, true) {
            order = manager.set_status(order_id, status).unwrap();
        }
    }
    manager.set_status(order_id, target).unwrap()
}

fn drain(rx: &mut broadcast::Receiver<OrderNotice>) -> Vec<OrderNotice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

fn assert_total_consistent(order: &Order) {
    let expected: Decimal = order
        .items
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum();
    assert_eq!(order.total_amount, expected.round_dp(2));
    assert_eq!(order.total_amount.scale(), 2);
}

mod test_core;
