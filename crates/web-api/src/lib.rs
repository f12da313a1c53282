pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::WebhookAuth;
pub use server::ApiServer;
