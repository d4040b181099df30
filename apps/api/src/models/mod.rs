pub mod bid;
pub mod credential;
pub mod job;
pub mod lenient;
pub mod settings;
