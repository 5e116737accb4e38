mod auth_session;
mod context;
mod cookie;
mod store;


pub use auth_session::AuthSession;
pub use context::AuthContext;
pub use store::{delete_session, load_session, save_session};
