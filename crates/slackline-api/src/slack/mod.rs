pub mod client;
pub(crate) mod responses;

pub use client::SlackClient;
