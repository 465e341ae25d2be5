mod client;
mod session;

pub use client::ApiClient;
pub use session::Session;
