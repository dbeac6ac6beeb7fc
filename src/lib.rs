pub mod anki;
pub mod batch;
pub mod cli;
pub mod core;
pub mod instructions;
pub mod llm;
pub mod persistence;
pub mod server;
