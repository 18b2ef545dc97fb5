pub mod schema;
pub mod session_store;

pub use schema::Session;
pub use session_store::SessionStore;
