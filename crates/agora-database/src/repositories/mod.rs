//! Repository implementations for the Agora auth core.

pub mod session;
pub mod user;

pub use session::SessionRepository;
pub use user::UserRepository;
