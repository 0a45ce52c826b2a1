pub mod auth;
pub mod link;
pub mod partner;
pub mod project;
#[cfg(test)]
pub mod test_utils;
pub mod user;

pub use partner::Partner;
pub use project::Project;
pub use user::User;
