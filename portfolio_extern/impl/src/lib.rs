pub mod http;
pub mod resume;
