pub mod config;
pub mod depot;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod tabular;
pub mod upload;

pub use config::DepotConfig;
pub use depot::Depot;
pub use server::Server;
