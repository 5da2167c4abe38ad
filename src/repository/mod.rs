pub mod orders;
pub mod products;
pub mod users;

pub use orders::{OrderLineRepository, OrderRepository, SeaOrmOrderLines, SeaOrmOrders};
pub use products::{ProductRepository, SeaOrmProducts};
pub use users::{SeaOrmUsers, UserCredentials, UserRepository};
