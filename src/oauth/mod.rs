//! OAuth sign-in: provider definitions, the authorization-code handshake,
//! and resolution of provider profiles into credential store entries.

pub mod handshake;
pub mod linker;
pub mod provider;

pub use linker::resolve_profile;
pub use provider::{Provider, ProviderEndpoints, ProviderProfile};
