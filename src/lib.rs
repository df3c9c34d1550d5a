//! Movie link aggregation service with a form-driven JSON API.
//!
//! ```rust,no_run
//! use linkhub::api::{self, AppState};
//! use linkhub::client::Catalog;
//! use linkhub::config::Config;
//! use linkhub::extract::LinkExtractor;
//! use linkhub::App;
//!
//! #[tokio::main]
//! async fn main() -> linkhub::Result<()> {
//!     let config = Config::default();
//!     let addr = config.addr;
//!     let state = AppState {
//!         catalog: Catalog::new(),
//!         extractor: LinkExtractor::new()?,
//!         config,
//!     };
//!     let mut app = App::new(state);
//!     api::routes(&mut app);
//!     app.listen(addr).await
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod api;
pub mod bridge;
pub mod client;
pub mod config;
mod error;
pub mod extract;
pub mod models;
mod req;
mod res;
mod server;

pub use error::{Error, Result};
pub use req::Req;
pub use res::Res;
pub use server::App;
