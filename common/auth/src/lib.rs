pub mod claims;
pub mod codec;
pub mod config;
pub mod error;
pub mod extractors;
pub mod guards;
pub mod roles;
pub mod signer;
pub mod verifier;

pub use claims::Claims;
pub use config::JwtConfig;
pub use error::{AuthError, AuthResult};
pub use extractors::{AuthContext, AuthSession};
pub use guards::{ensure_admin, ensure_role, GuardError};
pub use roles::{Role, ROLE_ADMIN, ROLE_USER};
pub use signer::TokenSigner;
pub use verifier::TokenVerifier;
