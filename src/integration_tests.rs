#[cfg(test)]
mod tests {
    use crate::actor_framework::{FrameworkError, ResourceRequest};
    use crate::app_system::{init_stock, order_store, stock_store, Config, OrderSystem};
    use crate::clients::{OrderClient, ProductClient};
    use crate::domain::{Order, OrderStatus, PlaceOrder, Product, ProductCreate, ProductPatch};
    use crate::invoice::InvoiceRenderer;
    use crate::mock_framework::{create_mock_client, expect_action, expect_create, expect_get, expect_update};
    use crate::order_actor::OrderError;
    use crate::product_actor::{ProductAction, ProductActionResult, ProductError, Reservation};
    use crate::store::StoreError;
    use tempfile::{tempdir, TempDir};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn request(product: &str, quantity: u32) -> PlaceOrder {
        PlaceOrder {
            name: "Sara".to_string(),
            address: "Dubai Marina".to_string(),
            location: Some("  ".to_string()),
            product: product.to_string(),
            quantity,
        }
    }

    struct Mocks {
        order_client: OrderClient,
        product_rx: mpsc::Receiver<ResourceRequest<Product>>,
        order_rx: mpsc::Receiver<ResourceRequest<Order>>,
    }

    fn mocks(invoice_dir: &std::path::Path) -> Mocks {
        let (product_inner, product_rx) = create_mock_client::<Product>(10);
        let (order_inner, order_rx) = create_mock_client::<Order>(10);
        let invoices = InvoiceRenderer::new(invoice_dir, "RAMAD Perfumes", "AED");
        let order_client = OrderClient::new(order_inner, ProductClient::new(product_inner), invoices);
        Mocks { order_client, product_rx, order_rx }
    }

    // --- Orchestration against mock actors ---

    #[tokio::test]
    async fn test_order_placement_flow() {
        let dir = tempdir().unwrap();
        let Mocks { order_client, mut product_rx, mut order_rx } = mocks(&dir.path().join("invoices"));

        let order_task = tokio::spawn(async move { order_client.place_order(request("Oud Rose", 2)).await });

        // Expect Stock Reservation (Action)
        let (name, action, responder) = expect_action(&mut product_rx).await.expect("Expected Product Action");
        assert_eq!(name, "Oud Rose");
        match action {
            ProductAction::ReserveStock(qty) => assert_eq!(qty, 2),
            _ => panic!("Unexpected action: {:?}", action),
        }
        responder
            .send(Ok(ProductActionResult::ReserveStock(Reservation { unit_price: 150.0, remaining: 3 })))
            .unwrap();

        // Expect Order Create at the reserved price
        let (payload, responder) = expect_create(&mut order_rx).await.expect("Expected Order Create");
        assert_eq!(payload.product, "Oud Rose");
        assert_eq!(payload.quantity, 2);
        assert_eq!(payload.total, 300.0);
        assert_eq!(payload.location, None);
        let order = Order {
            id: "1a2b3c4d".to_string(),
            name: payload.name,
            address: payload.address,
            location: payload.location,
            product: payload.product,
            quantity: payload.quantity,
            total: payload.total,
            status: OrderStatus::Pending,
        };
        responder.send(Ok(order.clone())).unwrap();

        let placement = order_task.await.unwrap().unwrap();
        assert_eq!(placement.order, order);
        let invoice = placement.invoice.expect("invoice rendered");
        assert_eq!(invoice, dir.path().join("invoices").join("invoice_1a2b3c4d.pdf"));
        assert!(invoice.exists());
    }

    #[tokio::test]
    async fn test_insufficient_stock_creates_no_order() {
        let dir = tempdir().unwrap();
        let Mocks { order_client, mut product_rx, mut order_rx } = mocks(dir.path());

        let order_task = tokio::spawn(async move { order_client.place_order(request("Oud Rose", 6)).await });

        let (_, _, responder) = expect_action(&mut product_rx).await.expect("Expected Product Action");
        responder
            .send(Err(FrameworkError::Entity(ProductError::InsufficientStock { requested: 6, available: 5 })))
            .unwrap();

        let result = order_task.await.unwrap();
        assert_eq!(
            result.unwrap_err(),
            OrderError::InsufficientStock { product: "Oud Rose".to_string(), requested: 6, available: 5 }
        );
        assert!(order_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_product_is_reported_as_insufficient_stock() {
        let dir = tempdir().unwrap();
        let Mocks { order_client, mut product_rx, .. } = mocks(dir.path());

        let order_task = tokio::spawn(async move { order_client.place_order(request("Ghost", 1)).await });

        let (_, _, responder) = expect_action(&mut product_rx).await.expect("Expected Product Action");
        responder.send(Err(FrameworkError::NotFound("Ghost".to_string()))).unwrap();

        assert_eq!(
            order_task.await.unwrap().unwrap_err(),
            OrderError::InsufficientStock { product: "Ghost".to_string(), requested: 1, available: 0 }
        );
    }

    #[tokio::test]
    async fn test_failed_order_write_releases_stock() {
        let dir = tempdir().unwrap();
        let Mocks { order_client, mut product_rx, mut order_rx } = mocks(dir.path());

        let order_task = tokio::spawn(async move { order_client.place_order(request("Oud Rose", 2)).await });

        let (_, _, responder) = expect_action(&mut product_rx).await.unwrap();
        responder
            .send(Ok(ProductActionResult::ReserveStock(Reservation { unit_price: 150.0, remaining: 3 })))
            .unwrap();

        let (_, responder) = expect_create(&mut order_rx).await.unwrap();
        responder.send(Err(FrameworkError::Storage("disk full".to_string()))).unwrap();

        // Compensation: the reserved units go back
        let (name, action, responder) = expect_action(&mut product_rx).await.expect("Expected release");
        assert_eq!(name, "Oud Rose");
        assert!(matches!(action, ProductAction::ReleaseStock(2)));
        responder.send(Ok(ProductActionResult::ReleaseStock(5))).unwrap();

        assert_eq!(
            order_task.await.unwrap().unwrap_err(),
            OrderError::DatabaseError("disk full".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_actors() {
        let dir = tempdir().unwrap();
        let Mocks { order_client, mut product_rx, mut order_rx } = mocks(dir.path());

        let zero = order_client.place_order(request("Oud Rose", 0)).await;
        assert_eq!(zero.unwrap_err(), OrderError::InvalidQuantity(0));

        let mut blank = request("Oud Rose", 1);
        blank.name = "   ".to_string();
        assert!(matches!(
            order_client.place_order(blank).await,
            Err(OrderError::ValidationError(_))
        ));

        assert!(product_rx.try_recv().is_err());
        assert!(order_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_invoice_failure_keeps_order() {
        let dir = tempdir().unwrap();
        // A plain file where the invoice directory should be
        let blocked = dir.path().join("invoices");
        std::fs::write(&blocked, b"").unwrap();
        let Mocks { order_client, mut product_rx, mut order_rx } = mocks(&blocked);

        let order_task = tokio::spawn(async move { order_client.place_order(request("Oud Rose", 1)).await });

        let (_, _, responder) = expect_action(&mut product_rx).await.unwrap();
        responder
            .send(Ok(ProductActionResult::ReserveStock(Reservation { unit_price: 150.0, remaining: 4 })))
            .unwrap();

        let (payload, responder) = expect_create(&mut order_rx).await.unwrap();
        let order = Order {
            id: "deadbeef".to_string(),
            name: payload.name,
            address: payload.address,
            location: payload.location,
            product: payload.product,
            quantity: payload.quantity,
            total: payload.total,
            status: OrderStatus::Pending,
        };
        responder.send(Ok(order.clone())).unwrap();

        let placement = order_task.await.unwrap().unwrap();
        assert_eq!(placement.order, order);
        assert_eq!(placement.invoice, None);
    }

    fn pending_order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            name: "Sara".to_string(),
            address: "Dubai Marina".to_string(),
            location: None,
            product: "Oud Rose".to_string(),
            quantity: 1,
            total: 150.0,
            status: OrderStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_track_order_via_mock() {
        let dir = tempdir().unwrap();
        let Mocks { order_client, mut order_rx, .. } = mocks(dir.path());

        let client = order_client.clone();
        let found = tokio::spawn(async move { client.track_order("1a2b3c4d".to_string()).await });
        let (id, responder) = expect_get(&mut order_rx).await.expect("Expected Order Get");
        assert_eq!(id, "1a2b3c4d");
        responder.send(Ok(Some(pending_order("1a2b3c4d")))).unwrap();
        assert_eq!(found.await.unwrap().unwrap(), OrderStatus::Pending);

        let missing = tokio::spawn(async move { order_client.track_order("ffffffff".to_string()).await });
        let (_, responder) = expect_get(&mut order_rx).await.expect("Expected Order Get");
        responder.send(Ok(None)).unwrap();
        assert_eq!(
            missing.await.unwrap().unwrap_err(),
            OrderError::NotFound("ffffffff".to_string())
        );
    }

    #[tokio::test]
    async fn test_update_status_via_mock() {
        let dir = tempdir().unwrap();
        let Mocks { order_client, mut order_rx, mut product_rx } = mocks(dir.path());

        let task = tokio::spawn(async move {
            order_client.update_status("1a2b3c4d".to_string(), OrderStatus::Shipped).await
        });

        let (id, patch, responder) = expect_update(&mut order_rx).await.expect("Expected Order Update");
        assert_eq!(id, "1a2b3c4d");
        assert_eq!(patch.status, Some(OrderStatus::Shipped));
        let mut shipped = pending_order("1a2b3c4d");
        shipped.status = OrderStatus::Shipped;
        responder.send(Ok(shipped.clone())).unwrap();

        assert_eq!(task.await.unwrap().unwrap(), shipped);
        // Status changes never touch stock
        assert!(product_rx.try_recv().is_err());
    }

    // --- End to end against real actors and files ---

    async fn seeded_system() -> (TempDir, Config, OrderSystem) {
        let dir = tempdir().unwrap();
        let config = Config {
            stock_path: dir.path().join("stock.json"),
            orders_path: dir.path().join("orders.json"),
            invoice_dir: dir.path().join("invoices"),
            ..Config::default()
        };
        stock_store(&config)
            .save(&[
                Product::new("Oud Rose", "Oriental", "100ml", 150.0, 5),
                Product::new("White Musk", "Fresh", "50ml", 85.0, 10),
            ])
            .await
            .unwrap();
        let system = OrderSystem::start(&config).await.unwrap();
        (dir, config, system)
    }

    #[tokio::test]
    async fn test_placement_updates_both_stores() {
        let (_dir, config, system) = seeded_system().await;

        let placement = system.order_client.place_order(request("Oud Rose", 2)).await.unwrap();
        assert_eq!(placement.order.total, 300.0);
        assert_eq!(placement.order.status, OrderStatus::Pending);
        assert!(placement.invoice.unwrap().exists());

        assert_eq!(system.product_client.check_stock("Oud Rose".to_string()).await.unwrap(), 3);

        system.shutdown().await.unwrap();

        let stock = stock_store(&config).load().await.unwrap();
        assert_eq!(stock[0].stock, 3);
        assert_eq!(stock[1].stock, 10);
        let orders = order_store(&config).load().await.unwrap();
        assert_eq!(orders, vec![placement.order]);
    }

    #[tokio::test]
    async fn test_over_quantity_leaves_stores_unchanged() {
        let (_dir, config, system) = seeded_system().await;

        let err = system.order_client.place_order(request("Oud Rose", 6)).await.unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { available: 5, .. }));

        system.shutdown().await.unwrap();

        assert_eq!(stock_store(&config).load().await.unwrap()[0].stock, 5);
        assert!(order_store(&config).load().await.unwrap().is_empty());
        assert!(!config.orders_path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_placements_never_oversell() {
        let (_dir, config, system) = seeded_system().await;

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let client = system.order_client.clone();
            tasks.push(tokio::spawn(async move { client.place_order(request("Oud Rose", 1)).await }));
        }
        let mut placed = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                placed += 1;
            }
        }
        assert_eq!(placed, 5);

        system.shutdown().await.unwrap();
        assert_eq!(stock_store(&config).load().await.unwrap()[0].stock, 0);
        assert_eq!(order_store(&config).load().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_track_and_update_status_survive_reload() {
        let (_dir, config, system) = seeded_system().await;

        let id = system.order_client.place_order(request("White Musk", 1)).await.unwrap().order.id;
        assert_eq!(system.order_client.track_order(id.clone()).await.unwrap(), OrderStatus::Pending);

        // No transition is blocked, including moving back out of a terminal state
        system.order_client.update_status(id.clone(), OrderStatus::Delivered).await.unwrap();
        system.order_client.update_status(id.clone(), OrderStatus::Processing).await.unwrap();

        assert_eq!(
            system.order_client.track_order("missing".to_string()).await.unwrap_err(),
            OrderError::NotFound("missing".to_string())
        );
        assert_eq!(
            system.order_client.update_status("missing".to_string(), OrderStatus::Shipped).await.unwrap_err(),
            OrderError::NotFound("missing".to_string())
        );
        system.shutdown().await.unwrap();

        let reloaded = OrderSystem::start(&config).await.unwrap();
        assert_eq!(reloaded.order_client.track_order(id).await.unwrap(), OrderStatus::Processing);
        assert_eq!(
            reloaded.product_client.check_stock("White Musk".to_string()).await.unwrap(),
            9
        );
        reloaded.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_stock_file_fails_startup_until_initialised() {
        let dir = tempdir().unwrap();
        let config = Config {
            stock_path: dir.path().join("stock.json"),
            orders_path: dir.path().join("orders.json"),
            invoice_dir: dir.path().join("invoices"),
            ..Config::default()
        };

        assert!(matches!(OrderSystem::start(&config).await, Err(StoreError::Missing(_))));

        assert!(init_stock(&config).await.unwrap());
        assert!(!init_stock(&config).await.unwrap());

        let system = OrderSystem::start(&config).await.unwrap();
        assert!(system.product_client.list_products().await.unwrap().is_empty());
        assert!(system.order_client.list_orders().await.unwrap().is_empty());
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_second_system_waits_for_the_first() {
        let (_dir, config, first) = seeded_system().await;

        let second_config = config.clone();
        let second = tokio::spawn(async move {
            let system = OrderSystem::start(&second_config).await.unwrap();
            let result = system.order_client.place_order(request("Oud Rose", 5)).await;
            system.shutdown().await.unwrap();
            result
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!second.is_finished());

        first.order_client.place_order(request("Oud Rose", 5)).await.unwrap();
        first.shutdown().await.unwrap();

        // The second system only loads once the first has written and let go
        let err = second.await.unwrap().unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { available: 0, .. }));

        assert_eq!(stock_store(&config).load().await.unwrap()[0].stock, 0);
        assert_eq!(order_store(&config).load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_held_stores_report_busy_after_timeout() {
        let (_dir, config, system) = seeded_system().await;

        let impatient = Config { lock_timeout_ms: 100, ..config.clone() };
        assert!(matches!(OrderSystem::start(&impatient).await, Err(StoreError::Busy(_))));
        assert!(matches!(init_stock(&impatient).await, Err(StoreError::Busy(_))));

        system.shutdown().await.unwrap();
        let system = OrderSystem::start(&impatient).await.unwrap();
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_stock_administration() {
        let (_dir, config, system) = seeded_system().await;
        let products = &system.product_client;

        let added = products
            .create_product(ProductCreate {
                name: "Amber Nights".to_string(),
                category: "Oriental".to_string(),
                size: "75ml".to_string(),
                price: 210.0,
                stock: 3,
            })
            .await
            .unwrap();
        assert_eq!(added, Product::new("Amber Nights", "Oriental", "75ml", 210.0, 3));

        let duplicate = products
            .create_product(ProductCreate {
                name: "Oud Rose".to_string(),
                category: "Other".to_string(),
                size: "10ml".to_string(),
                price: 1.0,
                stock: 1,
            })
            .await;
        assert_eq!(duplicate.unwrap_err(), ProductError::AlreadyExists("Oud Rose".to_string()));

        let bad_price = products
            .update_product("Oud Rose".to_string(), ProductPatch { price: Some(-1.0), ..Default::default() })
            .await;
        assert_eq!(bad_price.unwrap_err(), ProductError::InvalidPrice(-1.0));

        let edited = products
            .update_product(
                "Oud Rose".to_string(),
                ProductPatch { size: Some("50ml".to_string()), stock: Some(12), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(edited, Product::new("Oud Rose", "Oriental", "50ml", 150.0, 12));

        assert_eq!(
            products.update_product("Ghost".to_string(), ProductPatch::default()).await.unwrap_err(),
            ProductError::NotFound("Ghost".to_string())
        );
        assert_eq!(products.get_product("Ghost".to_string()).await.unwrap(), None);

        system.shutdown().await.unwrap();

        let reloaded = OrderSystem::start(&config).await.unwrap();
        assert_eq!(
            reloaded.product_client.get_product("Oud Rose".to_string()).await.unwrap(),
            Some(edited)
        );
        let names: Vec<String> = reloaded
            .product_client
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Oud Rose", "White Musk", "Amber Nights"]);
        reloaded.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_removing_a_product_keeps_its_orders() {
        let (_dir, config, system) = seeded_system().await;

        let order = system.order_client.place_order(request("White Musk", 2)).await.unwrap().order;
        system.product_client.delete_product("White Musk".to_string()).await.unwrap();

        assert_eq!(system.product_client.get_product("White Musk".to_string()).await.unwrap(), None);
        assert_eq!(system.order_client.get_order(order.id.clone()).await.unwrap(), Some(order.clone()));
        assert_eq!(
            system.product_client.delete_product("White Musk".to_string()).await.unwrap_err(),
            ProductError::NotFound("White Musk".to_string())
        );

        // The product is gone, so it can no longer be ordered
        let err = system.order_client.place_order(request("White Musk", 1)).await.unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { available: 0, .. }));
        system.shutdown().await.unwrap();

        assert_eq!(order_store(&config).load().await.unwrap(), vec![order]);
        let stock = stock_store(&config).load().await.unwrap();
        assert_eq!(stock.len(), 1);
        assert_eq!(stock[0].name, "Oud Rose");
    }

    #[tokio::test]
    async fn test_unreadable_order_is_named_at_startup() {
        let (_dir, config, system) = seeded_system().await;
        system.shutdown().await.unwrap();

        std::fs::write(
            &config.orders_path,
            r#"[{"id": "1a2b3c4d", "name": "Sara", "address": "Dubai Marina", "product": "Oud Rose",
                 "quantity": 1, "total": 150.0, "status": "Lost"}]"#,
        )
        .unwrap();

        match OrderSystem::start(&config).await {
            Err(StoreError::InvalidRecord { path, index, id, .. }) => {
                assert_eq!(path, config.orders_path);
                assert_eq!(index, 0);
                assert_eq!(id.as_deref(), Some("1a2b3c4d"));
            }
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Startup should fail on an unreadable order"),
        }
    }
}
