pub mod composer;
pub mod request;
