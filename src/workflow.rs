use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{LineSnapshot, NewOrderLine, Order, OrderItem, OrderStatus},
    repository::{OrderLineRepository, OrderRepository, ProductRepository},
    stock::{StockDirection, StockLedger},
};

enum StockEffect {
    None,
    Debit,
    Credit,
}

/// Stock consequence of moving an order between two distinct statuses.
/// Completing an order debits stock; cancelling a completed order credits
/// it back; every other transition leaves stock alone.
fn stock_effect(from: OrderStatus, to: OrderStatus) -> StockEffect {
    match (from, to) {
        (_, OrderStatus::Concluido) => StockEffect::Debit,
        (OrderStatus::Concluido, OrderStatus::Cancelado) => StockEffect::Credit,
        _ => StockEffect::None,
    }
}

/// Order creation and status transitions. Methods run on the transaction
/// handle the caller opened; the caller commits, and a drop rolls back.
#[derive(Debug, Clone)]
pub struct OrderWorkflowEngine<P, O, L> {
    ledger: StockLedger<P>,
    orders: O,
    lines: L,
}

impl<P, O, L> OrderWorkflowEngine<P, O, L>
where
    P: ProductRepository,
    O: OrderRepository,
    L: OrderLineRepository,
{
    pub fn new(ledger: StockLedger<P>, orders: O, lines: L) -> Self {
        Self {
            ledger,
            orders,
            lines,
        }
    }

    /// Create an order for `user_id`. Prices are snapshotted from the
    /// catalog at this moment; stock is only checked, not debited, unless
    /// the order is created directly as Concluído.
    pub async fn create_order<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        items: &[NewOrderLine],
        initial_status: Option<OrderStatus>,
    ) -> AppResult<(Order, Vec<OrderItem>)> {
        let mut total_pedido = Decimal::ZERO;
        let mut snapshots = Vec::with_capacity(items.len());

        // Validate every line before anything is persisted.
        for item in items {
            let product = self
                .ledger
                .check_availability(conn, item.product_id, item.quantidade)
                .await?;

            let subtotal = product.preco * Decimal::from(item.quantidade);
            total_pedido += subtotal;

            snapshots.push(LineSnapshot {
                product_id: item.product_id,
                quantidade: item.quantidade,
                preco_unitario: product.preco,
                subtotal,
            });
        }

        let order = self
            .orders
            .insert(conn, user_id, total_pedido, OrderStatus::Pendente)
            .await?;
        let created = self.lines.insert_lines(conn, order.id, &snapshots).await?;

        if initial_status == Some(OrderStatus::Concluido) {
            return self
                .update_order_status(conn, order.id, OrderStatus::Concluido)
                .await;
        }

        Ok((order, created))
    }

    /// Transition an order to `new_status`, applying the stock effect of
    /// the transition. Setting the current status again is a no-op and
    /// leaves the row untouched.
    pub async fn update_order_status<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> AppResult<(Order, Vec<OrderItem>)> {
        // The row lock serializes concurrent transitions on the same order.
        let order = self
            .orders
            .find_for_update(conn, order_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let items = self.lines.find_by_order(conn, order_id).await?;

        if order.status == new_status {
            return Ok((order, items));
        }

        match stock_effect(order.status, new_status) {
            StockEffect::Debit => {
                for item in &items {
                    self.ledger
                        .adjust_stock(conn, item.product_id, item.quantidade, StockDirection::Debit)
                        .await?;
                }
            }
            StockEffect::Credit => {
                for item in &items {
                    self.ledger
                        .adjust_stock(
                            conn,
                            item.product_id,
                            item.quantidade,
                            StockDirection::Credit,
                        )
                        .await?;
                }
            }
            StockEffect::None => {}
        }

        let order = self.orders.set_status(conn, order_id, new_status).await?;
        Ok((order, items))
    }
}
