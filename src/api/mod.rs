pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::{api_router, app_router};
pub use server::{start_server, start_server_on, ServerHandle};
