pub mod period;
pub mod request;
