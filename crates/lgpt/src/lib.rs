//! lgpt - A terminal chat client that relays messages to OpenAI or Groq.

pub mod config;
pub mod conversation;
pub mod llm;
pub mod repl;
pub mod settings;
