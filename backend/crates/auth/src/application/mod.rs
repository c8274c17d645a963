//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod i18n;
pub mod login_page;
pub mod oidc_login;
pub mod session;
pub mod sign_in;
pub mod sign_out;
pub mod users;

// Re-exports
pub use check_session::{Authenticated, CheckSessionUseCase};
pub use config::{AuthConfig, OidcConfig};
pub use i18n::I18n;
pub use login_page::{LoginPageUseCase, LoginView};
pub use oidc_login::{FederatedLoginOutput, FederatedLoginUseCase};
pub use session::SessionService;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use users::{CreateUserInput, CreateUserOutput, ProfileInput, UpdateUserInput, UserAdminUseCase};
