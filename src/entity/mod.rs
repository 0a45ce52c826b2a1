pub mod partner;
pub mod project;
pub mod user;

pub use partner::{ChannelConfig, Overrides};
