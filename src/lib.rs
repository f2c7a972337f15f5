pub mod controller;
pub mod conversation;
pub mod errors;
pub mod prompt;
pub mod providers;
pub mod reply;
pub mod session;
