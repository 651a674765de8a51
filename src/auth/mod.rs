//! Authentication: form validation and session management.

pub mod validation;
pub mod session;

pub use session::{AuthError, SessionManager};
pub use validation::{is_valid_email, validate_login, validate_post, validate_signup, ValidationErrors};
