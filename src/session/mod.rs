// Public API - what other modules can use
pub use generators::{PetNameUsernameGenerator, UsernameGenerator};
pub use handlers::create_session;
pub use service::SessionService;
pub use token::TokenConfig;
pub use types::{SessionClaims, SessionResponse};

// Internal modules
mod generators;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
mod token;
mod types;
