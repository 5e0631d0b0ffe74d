// Public modules
pub mod api_message;
pub mod chat_message;
pub mod role;

// Re-exports
pub use api_message::ApiMessage;
pub use chat_message::ChatMessage;
pub use role::Role;
