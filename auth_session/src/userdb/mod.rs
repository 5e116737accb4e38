mod criteria;
mod errors;
mod password;
mod storage;
mod traits;
mod types;

pub use criteria::{CaseInsensitiveUsername, ExactUsername, UserCriteria, UserCriteriaBuilder};
pub use errors::UserError;
pub use password::{hash_password, verify_password};
pub use storage::UserStore;
pub use traits::{AuthUser, CookieAuth, UserRepository};
pub use types::{Role, User, UserId};

#[cfg(test)]
pub(crate) use password::hash_password_with_iterations;
