//! Authentication and session module

pub mod credentials;
pub mod gate;
pub mod password;
pub mod registration;
pub mod service;
pub mod session;
pub mod token;
pub mod user;

// Re-export main components
pub use credentials::CredentialAuthenticator;
pub use gate::{authenticate_request, Identity};
pub use password::PasswordHasher;
pub use registration::{RegisterRequest, RegistrationService};
pub use service::{AuthService, SharedAuthService, TokenPair};
pub use session::RefreshSessionStore;
pub use token::{Claims, TokenKind, TokenManager};
pub use user::{NewUser, User, UserRole};
