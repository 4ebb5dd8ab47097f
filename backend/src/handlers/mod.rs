pub mod auth;
pub mod extract;
pub mod profile;
pub mod requests;
pub mod response;
pub mod user;

pub use auth::{login, logout, signup};
pub use profile::{change_password, edit_profile, view_profile};
pub use requests::{review_request, send_request};
pub use user::{connections, feed, requests_received};
