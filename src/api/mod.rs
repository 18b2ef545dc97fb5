pub mod auth;
pub mod gateway;
pub mod questions;
pub mod recommendations;
pub mod stats;
pub mod study;
pub mod transport;
pub mod types;

pub use gateway::Gateway;
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
