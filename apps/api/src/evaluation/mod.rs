pub mod document;
pub mod fields;
pub mod fusion;
pub mod handlers;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod reputation;
pub mod resume;
