use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    repository::{SeaOrmOrderLines, SeaOrmOrders, SeaOrmProducts, SeaOrmUsers},
    services::auth_service::Identity,
    stock::StockLedger,
    workflow::OrderWorkflowEngine,
};

/// Shared application state. Every collaborator is wired here, once, from
/// explicit constructor arguments; nothing reads globals after startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub engine: OrderWorkflowEngine<SeaOrmProducts, SeaOrmOrders, SeaOrmOrderLines>,
    pub identity: Identity<SeaOrmUsers>,
    pub products: SeaOrmProducts,
    pub orders: SeaOrmOrders,
    pub order_lines: SeaOrmOrderLines,
    pub users: SeaOrmUsers,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: &AppConfig) -> Self {
        let products = SeaOrmProducts;
        let orders = SeaOrmOrders;
        let order_lines = SeaOrmOrderLines;
        let users = SeaOrmUsers;

        let engine = OrderWorkflowEngine::new(StockLedger::new(products), orders, order_lines);
        let identity = Identity::new(users, config.jwt_secret.clone());

        Self {
            pool,
            orm,
            engine,
            identity,
            products,
            orders,
            order_lines,
            users,
        }
    }
}
