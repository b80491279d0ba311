use super::*;


#[test]
fn test_place_order_without_table() {
    let (manager, _catalog) = create_test_manager();

    let order = manager
        .place_order(request("v1", None, vec![item("tea", 2)]))
        .unwrap();

    assert_eq!(order.order_number, 1);
    assert_eq!(order.status, OrderStatus::New);
    assert!(order.table_id.is_none());
    assert!(!order.archived);
    assert!(order.completed_at.is_none());
    assert_eq!(order.items[0].name, "Tea");
    assert_eq!(order.total_amount.to_string(), "4.00");

    let stored = manager.get_order(&order.id).unwrap();
    assert_eq!(stored, order);
}


#[test]
fn test_order_numbers_increase_per_vendor() {
    let (manager, _catalog) = create_test_manager();

    let first = manager.place_order(request("v1", None, vec![item("tea", 1)])).unwrap();
    let second = manager.place_order(request("v1", None, vec![item("bun", 1)])).unwrap();
    let other = manager
        .place_order(request("v2", None, vec![item("coffee", 1)]))
        .unwrap();

    assert_eq!(first.order_number, 1);
    assert_eq!(second.order_number, 2);
    assert_eq!(other.order_number, 1);
    assert_ne!(first.id, second.id);
}


#[test]
fn test_place_order_emits_new_order() {
    let (manager, _catalog) = create_test_manager();
    let mut rx = manager.subscribe();

    let order = manager.place_order(request("v1", Some("T1"), vec![item("tea", 1)])).unwrap();

    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].vendor_id, "v1");
    match &notices[0].event {
        LiveEvent::NewOrder { order: sent } => assert_eq!(sent.id, order.id),
        other => panic!("Expected NEW_ORDER, got {other:?}"),
    }
}


#[test]
fn test_supplied_snapshot_is_kept_on_place() {
    let (manager, _catalog) = create_test_manager();

    let order = manager
        .place_order(request(
            "v1",
            None,
            vec![priced_item("tea", "Jasmine Tea", "2.5", 2)],
        ))
        .unwrap();

    assert_eq!(order.items[0].name, "Jasmine Tea");
    assert_eq!(order.items[0].price.to_string(), "2.50");
    assert_eq!(order.total_amount.to_string(), "5.00");
}


#[test]
fn test_missing_price_filled_from_catalog() {
    let (manager, _catalog) = create_test_manager();

    let mut input = item("bun", 3);
    input.name = Some("Steamed Bun".to_string());
    let order = manager.place_order(request("v1", None, vec![input])).unwrap();

    assert_eq!(order.items[0].name, "Steamed Bun");
    assert_eq!(order.items[0].price, money("1.50"));
    assert_eq!(order.total_amount.to_string(), "4.50");
}


#[test]
fn test_set_status_forward() {
    let (manager, _catalog) = create_test_manager();
    let order = manager.place_order(request("v1", None, vec![item("tea", 1)])).unwrap();

    let preparing = manager.set_status(&order.id, OrderStatus::Preparing).unwrap();
    assert_eq!(preparing.status, OrderStatus::Preparing);

    let ready = manager.set_status(&order.id, OrderStatus::Ready).unwrap();
    assert_eq!(ready.status, OrderStatus::Ready);
    assert!(ready.completed_at.is_none());

    let completed = manager.set_status(&order.id, OrderStatus::Completed).unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert!(!completed.archived);
}


#[test]
fn test_set_status_emits_update() {
    let (manager, _catalog) = create_test_manager();
    let order = manager.place_order(request("v1", None, vec![item("tea", 1)])).unwrap();
    let mut rx = manager.subscribe();

    manager.set_status(&order.id, OrderStatus::Preparing).unwrap();

    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    match &notices[0].event {
        LiveEvent::OrderUpdate { order } => assert_eq!(order.status, OrderStatus::Preparing),
        other => panic!("Expected ORDER_UPDATE, got {other:?}"),
    }
}


#[test]
fn test_completion_generates_bill() {
    let (manager, _catalog) = create_test_manager();
    let order = manager
        .place_order(request("v1", Some("T1"), vec![item("tea", 3)]))
        .unwrap();

    assert!(manager.get_bill(&order.id).unwrap().is_none());

    advance_to(&manager, &order.id, OrderStatus::Completed);

    let bill = manager.get_bill(&order.id).unwrap().unwrap();
    assert_eq!(bill.order_id, order.id);
    assert_eq!(bill.vendor_id, "v1");
    assert_eq!(bill.order_number, 1);
    assert_eq!(bill.table_number.as_deref(), Some("1"));
    assert_eq!(bill.total_amount.to_string(), "6.00");
    assert_eq!(bill.items.len(), 1);
    assert_eq!(bill.items[0].name, "Tea");
}


#[test]
fn test_update_items_uses_canonical_prices() {
    let (manager, _catalog) = create_test_manager();
    let order = manager.place_order(request("v1", None, vec![item("tea", 1)])).unwrap();

    let updated = manager
        .update_items(
            &order.id,
            &[
                priced_item("tea", "Free Tea", "0.00", 2),
                priced_item("bun", "Cheap Bun", "0.01", 1),
            ],
        )
        .unwrap();

    assert_eq!(updated.items.len(), 2);
    assert_eq!(updated.items[0].name, "Tea");
    assert_eq!(updated.items[0].price, money("2.00"));
    assert_eq!(updated.items[1].name, "Bun");
    assert_eq!(updated.total_amount.to_string(), "5.50");
    assert_eq!(updated.order_number, order.order_number);
    assert_total_consistent(&updated);
}


#[test]
fn test_update_items_emits_update() {
    let (manager, _catalog) = create_test_manager();
    let order = manager.place_order(request("v1", None, vec![item("tea", 1)])).unwrap();
    let mut rx = manager.subscribe();

    manager.update_items(&order.id, &[item("bun", 2)]).unwrap();

    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    assert!(matches!(notices[0].event, LiveEvent::OrderUpdate { .. }));
}


#[test]
fn test_list_orders_views() {
    let (manager, _catalog) = create_test_manager();
    let first = manager.place_order(request("v1", None, vec![item("tea", 1)])).unwrap();
    let second = manager.place_order(request("v1", None, vec![item("bun", 1)])).unwrap();
    manager.place_order(request("v2", None, vec![item("coffee", 1)])).unwrap();

    advance_to(&manager, &first.id, OrderStatus::Completed);
    manager.archive_order(&first.id).unwrap();

    let current = manager.list_orders("v1", OrderView::Current).unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, second.id);

    let archived = manager.list_orders("v1", OrderView::Archived).unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, first.id);

    let all = manager.list_orders("v1", OrderView::All).unwrap();
    let numbers: Vec<u64> = all.iter().map(|o| o.order_number).collect();
    assert_eq!(numbers, vec![1, 2]);
}


#[test]
fn test_get_order_not_found() {
    let (manager, _catalog) = create_test_manager();
    let err = manager.get_order("nope").unwrap_err();
    assert!(matches!(err, OrderError::OrderNotFound(id) if id == "nope"));
}


#[test]
fn test_parse_status() {
    assert_eq!(parse_status("ready").unwrap(), OrderStatus::Ready);
    assert_eq!(parse_status(" completed ").unwrap(), OrderStatus::Completed);
    assert!(matches!(
        parse_status("cancelled"),
        Err(OrderError::InvalidStatus(raw)) if raw == "cancelled"
    ));
}
