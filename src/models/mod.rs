pub mod chat;
pub mod diagnosis;
pub mod stream;
