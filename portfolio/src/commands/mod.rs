pub mod email;
pub mod resume;
pub mod serve;
