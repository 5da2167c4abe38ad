use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pedidos_api::{
    error::{AppError, AppResult},
    models::{
        LineSnapshot, NewOrderLine, NewProduct, Order, OrderItem, OrderStatus, Product,
        ProductPatch,
    },
    repository::{OrderLineRepository, OrderRepository, ProductRepository},
    routes::params::{OrderListQuery, ProductQuery},
    stock::StockLedger,
    workflow::OrderWorkflowEngine,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tokio::sync::Mutex;
use uuid::Uuid;

// In-memory repositories so the transition rules run without a database.
// The connection handle is threaded through but never touched.

#[derive(Clone)]
struct MockProductRepository {
    rows: Arc<Mutex<HashMap<Uuid, Product>>>,
}

impl MockProductRepository {
    fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn add_product(&self, nome: &str, preco: Decimal, quantidade_estoque: i32) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.rows.lock().await.insert(
            id,
            Product {
                id,
                nome: nome.to_string(),
                categoria: "Eletrônicos".to_string(),
                descricao: None,
                preco,
                quantidade_estoque,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    async fn stock_of(&self, id: Uuid) -> i32 {
        self.rows.lock().await[&id].quantidade_estoque
    }
}

#[async_trait]
impl ProductRepository for MockProductRepository {
    async fn find_page<C: ConnectionTrait>(
        &self,
        _conn: &C,
        _query: &ProductQuery,
    ) -> AppResult<(Vec<Product>, i64)> {
        unimplemented!()
    }

    async fn find_by_id<C: ConnectionTrait>(
        &self,
        _conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Product>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn find_for_update<C: ConnectionTrait>(
        &self,
        _conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Product>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn insert<C: ConnectionTrait>(&self, _conn: &C, _data: NewProduct) -> AppResult<Product> {
        unimplemented!()
    }

    async fn update<C: ConnectionTrait>(
        &self,
        _conn: &C,
        _id: Uuid,
        _patch: &ProductPatch,
    ) -> AppResult<Option<Product>> {
        unimplemented!()
    }

    async fn set_stock<C: ConnectionTrait>(
        &self,
        _conn: &C,
        id: Uuid,
        quantidade_estoque: i32,
    ) -> AppResult<Product> {
        let mut rows = self.rows.lock().await;
        let product = rows.get_mut(&id).expect("product exists");
        product.quantidade_estoque = quantidade_estoque;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete<C: ConnectionTrait>(&self, _conn: &C, id: Uuid) -> AppResult<bool> {
        Ok(self.rows.lock().await.remove(&id).is_some())
    }
}

#[derive(Clone)]
struct MockOrderRepository {
    rows: Arc<Mutex<HashMap<Uuid, Order>>>,
}

impl MockOrderRepository {
    fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn get(&self, id: Uuid) -> Order {
        self.rows.lock().await[&id].clone()
    }

    async fn count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl OrderRepository for MockOrderRepository {
    async fn find_page<C: ConnectionTrait>(
        &self,
        _conn: &C,
        _user_id: Option<Uuid>,
        _query: &OrderListQuery,
    ) -> AppResult<(Vec<Order>, i64)> {
        unimplemented!()
    }

    async fn find_with_lines<C: ConnectionTrait>(
        &self,
        _conn: &C,
        _id: Uuid,
    ) -> AppResult<Option<(Order, Vec<OrderItem>)>> {
        unimplemented!()
    }

    async fn find_for_update<C: ConnectionTrait>(
        &self,
        _conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Order>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn insert<C: ConnectionTrait>(
        &self,
        _conn: &C,
        user_id: Uuid,
        total_pedido: Decimal,
        status: OrderStatus,
    ) -> AppResult<Order> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            total_pedido,
            status,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().await.insert(order.id, order.clone());
        Ok(order)
    }

    async fn set_status<C: ConnectionTrait>(
        &self,
        _conn: &C,
        id: Uuid,
        status: OrderStatus,
    ) -> AppResult<Order> {
        let mut rows = self.rows.lock().await;
        let order = rows.get_mut(&id).expect("order exists");
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}

#[derive(Clone)]
struct MockOrderLineRepository {
    rows: Arc<Mutex<HashMap<Uuid, Vec<OrderItem>>>>,
}

impl MockOrderLineRepository {
    fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl OrderLineRepository for MockOrderLineRepository {
    async fn insert_lines<C: ConnectionTrait>(
        &self,
        _conn: &C,
        order_id: Uuid,
        lines: &[LineSnapshot],
    ) -> AppResult<Vec<OrderItem>> {
        let items: Vec<OrderItem> = lines
            .iter()
            .map(|line| OrderItem {
                id: Uuid::new_v4(),
                product_id: line.product_id,
                quantidade: line.quantidade,
                preco_unitario: line.preco_unitario,
                subtotal: line.subtotal,
            })
            .collect();
        self.rows.lock().await.insert(order_id, items.clone());
        Ok(items)
    }

    async fn find_by_order<C: ConnectionTrait>(
        &self,
        _conn: &C,
        order_id: Uuid,
    ) -> AppResult<Vec<OrderItem>> {
        Ok(self
            .rows
            .lock()
            .await
            .get(&order_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_by_product<C: ConnectionTrait>(
        &self,
        _conn: &C,
        product_id: Uuid,
    ) -> AppResult<i64> {
        let count = self
            .rows
            .lock()
            .await
            .values()
            .flatten()
            .filter(|item| item.product_id == product_id)
            .count();
        Ok(count as i64)
    }
}

type Engine =
    OrderWorkflowEngine<MockProductRepository, MockOrderRepository, MockOrderLineRepository>;

fn setup() -> (
    Engine,
    MockProductRepository,
    MockOrderRepository,
    DatabaseConnection,
) {
    let products = MockProductRepository::new();
    let orders = MockOrderRepository::new();
    let lines = MockOrderLineRepository::new();
    let engine = OrderWorkflowEngine::new(
        StockLedger::new(products.clone()),
        orders.clone(),
        lines.clone(),
    );
    (engine, products, orders, DatabaseConnection::Disconnected)
}

#[tokio::test]
async fn creating_an_order_snapshots_prices_without_debiting_stock() -> anyhow::Result<()> {
    let (engine, products, _, conn) = setup();
    let notebook = products
        .add_product("Notebook", Decimal::new(5000, 2), 10)
        .await;
    let mouse = products.add_product("Mouse", Decimal::new(1990, 2), 3).await;

    let lines = vec![
        NewOrderLine {
            product_id: notebook,
            quantidade: 2,
        },
        NewOrderLine {
            product_id: mouse,
            quantidade: 1,
        },
    ];
    let (order, items) = engine
        .create_order(&conn, Uuid::new_v4(), &lines, None)
        .await?;

    assert_eq!(order.status, OrderStatus::Pendente);
    assert_eq!(order.total_pedido, Decimal::new(11990, 2));
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].preco_unitario, Decimal::new(5000, 2));
    assert_eq!(items[0].subtotal, Decimal::new(10000, 2));
    assert_eq!(items[1].subtotal, Decimal::new(1990, 2));

    // A pending order only reserves intent; stock moves at completion.
    assert_eq!(products.stock_of(notebook).await, 10);
    assert_eq!(products.stock_of(mouse).await, 3);
    Ok(())
}

#[tokio::test]
async fn completing_and_cancelling_moves_stock_exactly_once() -> anyhow::Result<()> {
    let (engine, products, _, conn) = setup();
    let notebook = products
        .add_product("Notebook", Decimal::new(5000, 2), 10)
        .await;

    let lines = vec![NewOrderLine {
        product_id: notebook,
        quantidade: 2,
    }];
    let (order, _) = engine
        .create_order(&conn, Uuid::new_v4(), &lines, None)
        .await?;

    let (order, _) = engine
        .update_order_status(&conn, order.id, OrderStatus::Concluido)
        .await?;
    assert_eq!(order.status, OrderStatus::Concluido);
    assert_eq!(products.stock_of(notebook).await, 8);

    // Completing again is a no-op and must not debit a second time.
    let (order, _) = engine
        .update_order_status(&conn, order.id, OrderStatus::Concluido)
        .await?;
    assert_eq!(order.status, OrderStatus::Concluido);
    assert_eq!(products.stock_of(notebook).await, 8);

    let (order, _) = engine
        .update_order_status(&conn, order.id, OrderStatus::Cancelado)
        .await?;
    assert_eq!(order.status, OrderStatus::Cancelado);
    assert_eq!(products.stock_of(notebook).await, 10);
    Ok(())
}

#[tokio::test]
async fn cancelling_a_pending_order_leaves_stock_alone() -> anyhow::Result<()> {
    let (engine, products, _, conn) = setup();
    let notebook = products
        .add_product("Notebook", Decimal::new(5000, 2), 10)
        .await;

    let lines = vec![NewOrderLine {
        product_id: notebook,
        quantidade: 4,
    }];
    let (order, _) = engine
        .create_order(&conn, Uuid::new_v4(), &lines, None)
        .await?;

    let (order, _) = engine
        .update_order_status(&conn, order.id, OrderStatus::Cancelado)
        .await?;
    assert_eq!(order.status, OrderStatus::Cancelado);
    assert_eq!(products.stock_of(notebook).await, 10);
    Ok(())
}

#[tokio::test]
async fn repeating_the_current_status_does_not_touch_the_row() -> anyhow::Result<()> {
    let (engine, products, orders, conn) = setup();
    let notebook = products
        .add_product("Notebook", Decimal::new(5000, 2), 10)
        .await;

    let lines = vec![NewOrderLine {
        product_id: notebook,
        quantidade: 1,
    }];
    let (order, _) = engine
        .create_order(&conn, Uuid::new_v4(), &lines, None)
        .await?;
    let stamped = orders.get(order.id).await.updated_at;

    let (unchanged, _) = engine
        .update_order_status(&conn, order.id, OrderStatus::Pendente)
        .await?;
    assert_eq!(unchanged.status, OrderStatus::Pendente);
    assert_eq!(unchanged.updated_at, stamped);
    assert_eq!(orders.get(order.id).await.updated_at, stamped);
    Ok(())
}

#[tokio::test]
async fn order_created_as_completed_debits_immediately() -> anyhow::Result<()> {
    let (engine, products, _, conn) = setup();
    let notebook = products
        .add_product("Notebook", Decimal::new(5000, 2), 10)
        .await;

    let lines = vec![NewOrderLine {
        product_id: notebook,
        quantidade: 3,
    }];
    let (order, items) = engine
        .create_order(&conn, Uuid::new_v4(), &lines, Some(OrderStatus::Concluido))
        .await?;

    assert_eq!(order.status, OrderStatus::Concluido);
    assert_eq!(items.len(), 1);
    assert_eq!(products.stock_of(notebook).await, 7);
    Ok(())
}

#[tokio::test]
async fn shortfall_rejects_the_order_before_anything_is_written() -> anyhow::Result<()> {
    let (engine, products, orders, conn) = setup();
    let cabo = products.add_product("Cabo HDMI", Decimal::new(990, 2), 1).await;

    let lines = vec![NewOrderLine {
        product_id: cabo,
        quantidade: 5,
    }];
    let err = engine
        .create_order(&conn, Uuid::new_v4(), &lines, None)
        .await
        .unwrap_err();

    match err {
        AppError::InsufficientStock { produto, disponivel } => {
            assert_eq!(produto, "Cabo HDMI");
            assert_eq!(disponivel, 1);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(orders.count().await, 0);
    assert_eq!(products.stock_of(cabo).await, 1);
    Ok(())
}

#[tokio::test]
async fn unknown_product_rejects_the_order() -> anyhow::Result<()> {
    let (engine, _, orders, conn) = setup();

    let lines = vec![NewOrderLine {
        product_id: Uuid::new_v4(),
        quantidade: 1,
    }];
    let err = engine
        .create_order(&conn, Uuid::new_v4(), &lines, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound));
    assert_eq!(orders.count().await, 0);
    Ok(())
}

#[tokio::test]
async fn unknown_order_rejects_the_transition() {
    let (engine, _, _, conn) = setup();

    let err = engine
        .update_order_status(&conn, Uuid::new_v4(), OrderStatus::Concluido)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn completion_rechecks_stock_at_transition_time() -> anyhow::Result<()> {
    let (engine, products, orders, conn) = setup();
    let notebook = products
        .add_product("Notebook", Decimal::new(5000, 2), 10)
        .await;

    let lines = vec![NewOrderLine {
        product_id: notebook,
        quantidade: 2,
    }];
    let (order, _) = engine
        .create_order(&conn, Uuid::new_v4(), &lines, None)
        .await?;

    // Stock drained after the order was placed but before completion.
    products.set_stock(&conn, notebook, 1).await?;

    let err = engine
        .update_order_status(&conn, order.id, OrderStatus::Concluido)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { .. }));
    assert_eq!(products.stock_of(notebook).await, 1);
    assert_eq!(orders.get(order.id).await.status, OrderStatus::Pendente);
    Ok(())
}
