use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    entity::{
        order_items::{
            ActiveModel as ItemActive, Column as ItemCol, Entity as OrderItems,
            Model as ItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
    },
    error::AppResult,
    models::{LineSnapshot, Order, OrderItem, OrderStatus},
    routes::params::{OrderListQuery, SortOrder},
};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Page of order headers, optionally scoped to one user.
    async fn find_page<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Option<Uuid>,
        query: &OrderListQuery,
    ) -> AppResult<(Vec<Order>, i64)>;

    /// Header plus lines in one joined query.
    async fn find_with_lines<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<(Order, Vec<OrderItem>)>>;

    /// Lock the header row for a status transition.
    async fn find_for_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Order>>;

    async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        total_pedido: Decimal,
        status: OrderStatus,
    ) -> AppResult<Order>;

    async fn set_status<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
        status: OrderStatus,
    ) -> AppResult<Order>;
}

#[async_trait]
pub trait OrderLineRepository: Send + Sync {
    async fn insert_lines<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
        lines: &[LineSnapshot],
    ) -> AppResult<Vec<OrderItem>>;

    async fn find_by_order<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
    ) -> AppResult<Vec<OrderItem>>;

    async fn count_by_product<C: ConnectionTrait>(
        &self,
        conn: &C,
        product_id: Uuid,
    ) -> AppResult<i64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmOrders;

#[async_trait]
impl OrderRepository for SeaOrmOrders {
    async fn find_page<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Option<Uuid>,
        query: &OrderListQuery,
    ) -> AppResult<(Vec<Order>, i64)> {
        let (_, limit, offset) = query.pagination.normalize();

        let mut condition = Condition::all();
        if let Some(user_id) = user_id {
            condition = condition.add(OrderCol::UserId.eq(user_id));
        }
        if let Some(status) = query.status {
            condition = condition.add(OrderCol::Status.eq(status));
        }

        let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

        let mut finder = Orders::find().filter(condition);
        finder = match sort_order {
            SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
            SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
        };

        let total = finder.clone().count(conn).await? as i64;

        let orders = finder
            .limit(limit as u64)
            .offset(offset as u64)
            .all(conn)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect();

        Ok((orders, total))
    }

    async fn find_with_lines<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<(Order, Vec<OrderItem>)>> {
        let mut rows = Orders::find_by_id(id)
            .find_with_related(OrderItems)
            .order_by_asc(ItemCol::CreatedAt)
            .order_by_asc(ItemCol::Id)
            .all(conn)
            .await?;

        match rows.pop() {
            Some((order, items)) => Ok(Some((
                order_from_entity(order),
                items.into_iter().map(order_item_from_entity).collect(),
            ))),
            None => Ok(None),
        }
    }

    async fn find_for_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Order>> {
        let found = Orders::find_by_id(id)
            .lock(LockType::Update)
            .one(conn)
            .await?;
        Ok(found.map(order_from_entity))
    }

    async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        total_pedido: Decimal,
        status: OrderStatus,
    ) -> AppResult<Order> {
        let active = OrderActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            total_pedido: Set(total_pedido),
            status: Set(status),
            created_at: NotSet,
            updated_at: NotSet,
        };
        let order = active.insert(conn).await?;
        Ok(order_from_entity(order))
    }

    async fn set_status<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
        status: OrderStatus,
    ) -> AppResult<Order> {
        let active = OrderActive {
            id: Unchanged(id),
            status: Set(status),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let order = active.update(conn).await?;
        Ok(order_from_entity(order))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmOrderLines;

#[async_trait]
impl OrderLineRepository for SeaOrmOrderLines {
    async fn insert_lines<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
        lines: &[LineSnapshot],
    ) -> AppResult<Vec<OrderItem>> {
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = ItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                quantidade: Set(line.quantidade),
                preco_unitario: Set(line.preco_unitario),
                subtotal: Set(line.subtotal),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(conn)
            .await?;
            items.push(order_item_from_entity(item));
        }
        Ok(items)
    }

    async fn find_by_order<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
    ) -> AppResult<Vec<OrderItem>> {
        let items = OrderItems::find()
            .filter(ItemCol::OrderId.eq(order_id))
            .order_by_asc(ItemCol::CreatedAt)
            .order_by_asc(ItemCol::Id)
            .all(conn)
            .await?
            .into_iter()
            .map(order_item_from_entity)
            .collect();
        Ok(items)
    }

    async fn count_by_product<C: ConnectionTrait>(
        &self,
        conn: &C,
        product_id: Uuid,
    ) -> AppResult<i64> {
        let count = OrderItems::find()
            .filter(ItemCol::ProductId.eq(product_id))
            .count(conn)
            .await?;
        Ok(count as i64)
    }
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total_pedido: model.total_pedido,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: ItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        product_id: model.product_id,
        quantidade: model.quantidade,
        preco_unitario: model.preco_unitario,
        subtotal: model.subtotal,
    }
}
