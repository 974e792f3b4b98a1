pub mod anthropic;
pub mod base;
pub mod configs;
pub mod factory;
pub mod google;
pub mod groq;
pub mod mock;
pub mod openai;
pub mod unify;
pub mod xai;
