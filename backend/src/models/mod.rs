pub mod connection_requests;
pub mod sessions;
pub mod users;

pub use connection_requests::{ConnectionRequest, ConnectionStatus, IncomingRequest, UnknownStatus};
pub use sessions::Session;
pub use users::{Gender, NewUser, ProfilePatch, PublicProfile, User};
