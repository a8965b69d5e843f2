pub mod connection;
pub mod pool;
pub mod server;

pub use server::{Server, ShutdownHandle};
