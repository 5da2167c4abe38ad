use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{NewOrderLine, Order, OrderItem, OrderStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantidade: i32,
}

impl From<&OrderItemRequest> for NewOrderLine {
    fn from(item: &OrderItemRequest) -> Self {
        NewOrderLine {
            product_id: item.product_id,
            quantidade: item.quantidade,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    /// Optional initial status; `Concluído` completes the order in the same
    /// transaction, debiting stock immediately.
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Single-order projection: the header fields with the lines nested under
/// `items`, as the dashboard expects them.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
