pub mod revocation;
pub mod token_verifier;

pub use revocation::TokenRevocationList;
pub use token_verifier::{LoanClaims, TokenVerifier as JwtTokenVerifier};
