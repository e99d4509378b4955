//! Authentication Module
//!
//! Everything needed to turn a bearer credential into a chat participant:
//!
//! - **`sessions`** - JWT claims, token issuing and verification
//! - **`resolver`** - the `IdentityResolver` seam and its JWT implementation
//! - **`directory`** - participant existence and display names

pub mod directory;
pub mod resolver;
pub mod sessions;

pub use directory::{InMemoryDirectory, ParticipantDirectory, PgDirectory};
pub use resolver::{AuthError, IdentityResolver, JwtIdentityResolver, MissingKindPolicy};
pub use sessions::{create_token, verify_token, Claims};
