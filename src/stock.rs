use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Product,
    repository::ProductRepository,
};

#[derive(Debug, Clone, Copy)]
pub enum StockDirection {
    Credit,
    Debit,
}

/// Tracks per-product available quantity. Adjustments lock the product row,
/// so callers must run them on the surrounding transaction.
#[derive(Debug, Clone)]
pub struct StockLedger<P> {
    products: P,
}

impl<P: ProductRepository> StockLedger<P> {
    pub fn new(products: P) -> Self {
        Self { products }
    }

    /// Read-only check that `quantidade` units can be taken. Returns the
    /// product snapshot so callers can reuse its current price.
    pub async fn check_availability<C: ConnectionTrait>(
        &self,
        conn: &C,
        product_id: Uuid,
        quantidade: i32,
    ) -> AppResult<Product> {
        let product = self
            .products
            .find_by_id(conn, product_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if product.quantidade_estoque < quantidade {
            return Err(AppError::InsufficientStock {
                produto: product.nome.clone(),
                disponivel: product.quantidade_estoque,
            });
        }

        Ok(product)
    }

    /// Apply a credit or debit to the product's stock. Debits re-check the
    /// quantity under the row lock; stock never goes negative.
    pub async fn adjust_stock<C: ConnectionTrait>(
        &self,
        conn: &C,
        product_id: Uuid,
        quantidade: i32,
        direction: StockDirection,
    ) -> AppResult<Product> {
        let product = self
            .products
            .find_for_update(conn, product_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let new_stock = match direction {
            StockDirection::Credit => product.quantidade_estoque + quantidade,
            StockDirection::Debit => {
                if product.quantidade_estoque < quantidade {
                    return Err(AppError::InsufficientStock {
                        produto: product.nome.clone(),
                        disponivel: product.quantidade_estoque,
                    });
                }
                product.quantidade_estoque - quantidade
            }
        };

        self.products.set_stock(conn, product_id, new_stock).await
    }
}
