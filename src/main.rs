use std::process;

use ankiforge::{
    anki::AnkiClient,
    cli::Menu,
    core::Settings,
    instructions::InstructionStore,
    llm::LlmClient,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ankiforge=warn".into()),
        )
        .init();

    let settings = Settings::load();
    let anki = AnkiClient::from_settings(&settings);

    if let Err(e) = anki.version().await {
        eprintln!("Error connecting to AnkiConnect: {}", e);
        eprintln!("Please ensure Anki is running with the AnkiConnect add-on installed");
        process::exit(1);
    }

    let llm = match LlmClient::from_settings(&settings) {
        Ok(client) => Some(client),
        Err(e) => {
            println!("\n⚠️  LLM not configured: {}", e);
            println!("AI features are disabled until a key is set.");
            None
        }
    };

    let instructions = InstructionStore::load();
    let mut menu = Menu::new(anki, llm, settings, instructions);
    menu.run().await;
}
