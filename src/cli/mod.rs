use std::{
    collections::HashMap,
    fs,
    path::Path,
};

use crate::{
    anki::{
        AnkiClient,
        NewNote,
    },
    batch::{
        self,
        BatchJob,
        BatchSummary,
    },
    core::{
        config::split_tags,
        ForgeError,
        Settings,
    },
    instructions::InstructionStore,
    llm::LlmClient,
};

pub mod input;

use input::{
    confirm,
    pick_from,
    read_line,
};

/// Interactive console front end. One instance per process; the LLM client
/// is optional and gates the AI menu entries.
pub struct Menu {
    anki: AnkiClient,
    llm: Option<LlmClient>,
    settings: Settings,
    instructions: InstructionStore,
}

fn sorted(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items
}

impl Menu {
    pub fn new(
        anki: AnkiClient,
        llm: Option<LlmClient>,
        settings: Settings,
        instructions: InstructionStore,
    ) -> Self {
        Self { anki, llm, settings, instructions }
    }

    pub async fn run(&mut self) {
        loop {
            self.print_menu();
            let choice = read_line("\nSelect option: ");
            let llm_available = self.llm.is_some();

            let result = match (choice.as_str(), llm_available) {
                ("1", _) => self.list_decks().await,
                ("2", _) => self.create_deck().await,
                ("3", _) => self.list_models().await,
                ("4", _) => self.show_model_fields().await,
                ("5", _) => self.search_notes().await,
                ("6", _) => self.check_can_add().await,
                ("7", _) => self.add_manual_notes().await,
                ("8", true) => self.add_llm_notes().await,
                ("9", true) => self.batch_import().await,
                ("10", true) => self.configure_instructions().await,
                ("11", true) | ("8", false) => self.configure_settings(),
                ("12", true) | ("9", false) => {
                    println!("Exiting...");
                    break;
                }
                _ => {
                    println!("Invalid option");
                    Ok(())
                }
            };

            if let Err(e) = result {
                println!("\nError: {}", e);
            }
        }
    }

    fn print_menu(&self) {
        println!("\n=== ankiforge ===");
        println!("1. List all decks");
        println!("2. Create new deck");
        println!("3. List all models");
        println!("4. Get model field names");
        println!("5. Search notes");
        println!("6. Check if notes can be added");
        println!("7. Add notes (manual)");

        if self.llm.is_some() {
            println!("8. Add notes with LLM assistance");
            println!("9. Batch import from file");
            println!("10. Configure model instructions");
            println!("11. Configuration settings");
            println!("12. Exit");
        } else {
            println!("8. Configuration settings");
            println!("9. Exit");
        }
    }

    async fn list_decks(&self) -> Result<(), ForgeError> {
        let decks = sorted(self.anki.deck_names().await?);
        println!("\nFound {} decks:", decks.len());
        for deck in decks {
            println!("  - {}", deck);
        }
        Ok(())
    }

    async fn create_deck(&self) -> Result<(), ForgeError> {
        let deck_name = read_line("Enter new deck name: ");
        let deck_id = self.anki.create_deck(&deck_name).await?;
        println!("Deck created with ID: {}", deck_id);
        Ok(())
    }

    async fn list_models(&self) -> Result<(), ForgeError> {
        let models = sorted(self.anki.model_names().await?);
        println!("\nFound {} models:", models.len());
        for model in models {
            println!("  - {}", model);
        }
        Ok(())
    }

    async fn show_model_fields(&self) -> Result<(), ForgeError> {
        if let Some((model_name, field_names)) = self.pick_model().await? {
            println!("\nFields for {}:", model_name);
            for field in field_names {
                println!("  - {}", field);
            }
        }
        Ok(())
    }

    async fn search_notes(&self) -> Result<(), ForgeError> {
        let query = read_line("Enter search query (e.g., 'deck:Default', 'tag:japanese'): ");
        let note_ids = self.anki.find_notes(&query).await?;
        println!("\nFound {} notes", note_ids.len());

        if !note_ids.is_empty() && note_ids.len() <= 10 && confirm("Show note details? (y/n): ") {
            let notes = self.anki.notes_info(&note_ids).await?;
            for note in notes {
                println!("\nNote ID: {}", note.note_id);
                println!("Model: {}", note.model_name);
                println!("Tags: {}", note.tags.join(", "));
                println!("Fields:");
                for (field, value) in &note.fields {
                    let preview: String = value.value.chars().take(50).collect();
                    println!("  {}: {}...", field, preview);
                }
            }
        }
        Ok(())
    }

    async fn check_can_add(&self) -> Result<(), ForgeError> {
        println!("\nChecking if notes can be added...");

        let Some(deck_name) = self.pick_deck(false).await? else { return Ok(()) };
        let Some((model_name, field_names)) = self.pick_model().await? else { return Ok(()) };
        println!("\nFields for {}: {:?}", model_name, field_names);

        let notes = self.collect_notes(&deck_name, &model_name, &field_names, false);
        if notes.is_empty() {
            return Ok(());
        }

        let results = self.anki.can_add_notes(&notes).await?;
        println!("\nResults:");
        for (i, can_add) in results.iter().enumerate() {
            let verdict = if *can_add { "Can be added" } else { "Cannot be added (duplicate?)" };
            println!("  Note {}: {}", i + 1, verdict);
        }
        Ok(())
    }

    async fn add_manual_notes(&self) -> Result<(), ForgeError> {
        println!("\nAdding notes manually...");

        let Some(deck_name) = self.pick_deck(true).await? else { return Ok(()) };
        let Some((model_name, field_names)) = self.pick_model().await? else { return Ok(()) };
        println!("\nFields for {}: {:?}", model_name, field_names);

        let notes = self.collect_notes(&deck_name, &model_name, &field_names, true);
        if notes.is_empty() {
            return Ok(());
        }

        let note_ids = self.anki.add_notes(&notes).await?;
        println!("\nResults:");
        for (i, note_id) in note_ids.iter().enumerate() {
            match note_id {
                Some(id) => println!("  Note {}: Added with ID {}", i + 1, id),
                None => println!("  Note {}: Failed to add", i + 1),
            }
        }
        Ok(())
    }

    async fn add_llm_notes(&mut self) -> Result<(), ForgeError> {
        let (provider, model) = match self.llm.as_ref() {
            Some(llm) => (llm.provider(), llm.model().to_string()),
            None => return Ok(()),
        };

        println!("\nAdding notes with LLM assistance...");
        println!("Using {} ({})", provider, model);

        let Some(deck_name) = self.pick_deck(true).await? else { return Ok(()) };
        let Some((model_name, field_names)) = self.pick_model().await? else { return Ok(()) };
        println!("\nFields for {}: {:?}", model_name, field_names);

        self.review_instructions(&model_name)?;

        let language = read_line("\nTarget language (e.g., English, Spanish, Japanese): ");
        let context = read_line("Additional context (e.g., difficulty level, topic) (optional): ");
        let context = (!context.is_empty()).then_some(context);

        let tags_input = read_line("Default tags for all cards (comma separated, optional): ");
        let mut default_tags = split_tags(&tags_input);
        default_tags.extend(self.settings.default_tags.iter().cloned());

        let auto_add = confirm("Auto-add cards without confirmation? (y/n): ");

        println!("\nEnter words/phrases to create cards (empty line to finish):");
        let mut added_count = 0;

        loop {
            let word = read_line("\nWord/phrase: ");
            if word.is_empty() {
                break;
            }

            println!("Generating card...");
            let Some(llm) = self.llm.as_ref() else { break };
            let mut fields = match llm
                .generate_note(
                    &word,
                    &model_name,
                    &field_names,
                    &language,
                    self.instructions.get(&model_name),
                    context.as_deref(),
                )
                .await
            {
                Ok(fields) => fields,
                Err(e) => {
                    println!("Error generating note: {}", e);
                    continue;
                }
            };

            println!("\nGenerated content:");
            for (field, value) in &fields {
                println!("  {}: {}", field, value);
            }

            let note = NewNote::generated(
                &deck_name,
                &model_name,
                fields.clone(),
                &language,
                &["llm-generated"],
                &default_tags,
            );

            let can_add = self
                .anki
                .can_add_notes(std::slice::from_ref(&note))
                .await?
                .first()
                .copied()
                .unwrap_or(false);

            if can_add {
                if auto_add {
                    added_count += self.try_add(&note).await?;
                    continue;
                }

                println!("✓ This note can be added.");
                let choice = read_line("Add this note? (y/n/e to edit): ");
                match choice.to_lowercase().as_str() {
                    "y" => added_count += self.try_add(&note).await?,
                    "e" => {
                        edit_fields(&field_names, &mut fields);
                        let mut note = note;
                        note.fields = fields;
                        added_count += self.try_add(&note).await?;
                    }
                    _ => {}
                }
            } else {
                println!("✗ Cannot add this note (duplicate?)");
                if confirm("Try adding as duplicate? (y/n): ") {
                    added_count += self.try_add(&note.allow_duplicate()).await?;
                }
            }
        }

        println!("\nTotal cards added: {}", added_count);
        Ok(())
    }

    async fn batch_import(&self) -> Result<(), ForgeError> {
        let Some(llm) = self.llm.as_ref() else { return Ok(()) };

        println!("\nBatch import from file...");
        println!("Using {} ({})", llm.provider(), llm.model());

        let filename = read_line("Enter filename (one word/phrase per line): ");
        if !Path::new(&filename).exists() {
            println!("Error: File '{}' not found", filename);
            return Ok(());
        }

        let words: Vec<String> = fs::read_to_string(&filename)?
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        if words.is_empty() {
            println!("No words found in file");
            return Ok(());
        }
        println!("Found {} words to process", words.len());

        let decks = sorted(self.anki.deck_names().await?);
        let deck_name = pick_from("deck", &decks);

        let models = sorted(self.anki.model_names().await?);
        let model_name = pick_from("model", &models);

        let field_names = match self.anki.model_field_names(&model_name).await {
            Ok(fields) => fields,
            Err(_) => {
                println!("Error: Model '{}' not found!", model_name);
                return Ok(());
            }
        };

        let language = read_line("\nTarget language: ");

        let job = BatchJob {
            deck_name: &deck_name,
            model_name: &model_name,
            field_names: &field_names,
            language: &language,
            instructions: self.instructions.get(&model_name),
            sources: &["llm-generated", "batch-import"],
            default_tags: &self.settings.default_tags,
        };

        let mut results = Vec::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            println!("\nProcessing {}/{}: {}", i + 1, words.len(), word);
            let outcome = batch::generate_one(&self.anki, llm, word, &job).await;
            match &outcome.error {
                None => println!("✓ Added: {}", word),
                Some(e) => println!("✗ Error processing '{}': {}", word, e),
            }
            results.push(outcome);
        }

        let summary = BatchSummary::from_results(&results);
        println!(
            "\nBatch import complete: {} successful, {} failed",
            summary.successful, summary.failed
        );
        Ok(())
    }

    async fn configure_instructions(&mut self) -> Result<(), ForgeError> {
        println!("\nModel Instructions Configuration");
        println!("Current instructions:");
        if self.instructions.is_empty() {
            println!("  No instructions configured yet.");
        } else {
            for (model, instruction) in self.instructions.iter() {
                println!("\n{}:", model);
                println!("  {}", instruction);
            }
        }

        println!("\nOptions:");
        println!("1. Add/update instructions for a model");
        println!("2. Remove instructions for a model");
        println!("3. View example instructions");
        println!("4. Back to main menu");

        match read_line("\nSelect option: ").as_str() {
            "1" => {
                let models = sorted(self.anki.model_names().await?);
                let model_name = pick_from("model", &models);
                let instruction = read_line("Enter instructions: ");
                self.instructions.set(&model_name, &instruction);
                self.instructions.save()?;
                println!("Instructions saved.");
            }
            "2" => {
                let model_name = read_line("Model name to remove: ");
                if self.instructions.remove(&model_name).is_some() {
                    self.instructions.save()?;
                    println!("Instructions removed.");
                } else {
                    println!("Model not found.");
                }
            }
            "3" => {
                println!("\nExample instructions:");
                println!("\nFor vocabulary cards:");
                println!("  'Include example sentence, pronunciation, and part of speech'");
                println!("\nFor cloze cards:");
                println!("  'Create 2-3 cloze deletions focusing on key concepts'");
                println!("\nFor language learning:");
                println!("  'Include native pronunciation, literal translation, and usage context'");
            }
            _ => {}
        }
        Ok(())
    }

    fn configure_settings(&mut self) -> Result<(), ForgeError> {
        println!("\nConfiguration Settings");
        println!("Current configuration:");
        println!("  LLM Provider: {}", self.settings.llm_provider);
        println!("  LLM Model: {}", self.settings.llm_model);
        println!("  Anki Host: {}", self.settings.anki_host);
        println!("  Anki Port: {}", self.settings.anki_port);
        println!("  Default Tags: {}", self.settings.default_tags.join(", "));

        println!("\nOptions:");
        println!("1. Change LLM provider");
        println!("2. Change LLM model");
        println!("3. Change Anki connection");
        println!("4. Set default tags");
        println!("5. Back to main menu");

        match read_line("\nSelect option: ").as_str() {
            "1" => {
                println!("\nAvailable providers:");
                println!("1. Gemini (default)");
                println!("2. OpenAI");
                println!("3. Custom (OpenAI-compatible endpoint)");
                match read_line("Select provider: ").as_str() {
                    "1" => {
                        self.settings.llm_provider = "gemini".to_string();
                        self.settings.llm_model = "gemini-2.5-flash-lite".to_string();
                    }
                    "2" => {
                        self.settings.llm_provider = "openai".to_string();
                        self.settings.llm_model = "gpt-3.5-turbo".to_string();
                    }
                    "3" => {
                        self.settings.llm_provider = "custom".to_string();
                        self.settings.llm_model = String::new();
                    }
                    _ => return Ok(()),
                }
                self.settings.save()?;
                println!("Provider updated. Restart to apply changes.");
            }
            "2" => {
                let new_model =
                    read_line(&format!("Enter new model name (current: {}): ", self.settings.llm_model));
                if !new_model.is_empty() {
                    self.settings.llm_model = new_model;
                    self.settings.save()?;
                    println!("Model updated. Restart to apply changes.");
                }
            }
            "3" => {
                let host =
                    read_line(&format!("Enter Anki host (current: {}): ", self.settings.anki_host));
                let port =
                    read_line(&format!("Enter Anki port (current: {}): ", self.settings.anki_port));
                if !host.is_empty() {
                    self.settings.anki_host = host;
                }
                if let Ok(port) = port.parse() {
                    self.settings.anki_port = port;
                }
                self.settings.save()?;
                println!("Connection settings updated. Restart to apply changes.");
            }
            "4" => {
                let tags_input = read_line("Enter default tags (comma separated): ");
                self.settings.default_tags = split_tags(&tags_input);
                self.settings.save()?;
                println!("Default tags updated.");
            }
            _ => {}
        }
        Ok(())
    }

    /// Deck picker; `None` means the user declined and the flow should
    /// return to the main menu.
    async fn pick_deck(&self, offer_create: bool) -> Result<Option<String>, ForgeError> {
        let decks = sorted(self.anki.deck_names().await?);
        let deck_name = pick_from("deck", &decks);
        if decks.contains(&deck_name) {
            return Ok(Some(deck_name));
        }

        println!("Warning: Deck '{}' not found!", deck_name);
        if offer_create && confirm("Create new deck? (y/n): ") {
            self.anki.create_deck(&deck_name).await?;
            println!("Created deck: {}", deck_name);
            return Ok(Some(deck_name));
        }
        Ok(None)
    }

    async fn pick_model(&self) -> Result<Option<(String, Vec<String>)>, ForgeError> {
        let models = sorted(self.anki.model_names().await?);
        let model_name = pick_from("model", &models);
        match self.anki.model_field_names(&model_name).await {
            Ok(field_names) => Ok(Some((model_name, field_names))),
            Err(_) => {
                println!("Error: Model '{}' not found!", model_name);
                Ok(None)
            }
        }
    }

    /// Prompt for notes until the user stops. The first field is required;
    /// an empty first field ends the current note.
    fn collect_notes(
        &self,
        deck_name: &str,
        model_name: &str,
        field_names: &[String],
        ask_duplicate: bool,
    ) -> Vec<NewNote> {
        let mut notes = Vec::new();
        loop {
            println!("\nNote {}:", notes.len() + 1);
            let mut fields = HashMap::new();

            for (i, field) in field_names.iter().enumerate() {
                if model_name.to_lowercase().contains("cloze") && field == "Text" {
                    println!("(Use {{{{c1::text}}}} format for cloze deletions)");
                }
                let value = read_line(&format!("{}: ", field));
                if value.is_empty() && i == 0 {
                    break;
                }
                if !value.is_empty() {
                    fields.insert(field.clone(), value);
                }
            }

            if fields.is_empty() {
                break;
            }

            let tags_input = read_line("Tags (comma separated, optional): ");
            let mut tags = split_tags(&tags_input);
            tags.extend(self.settings.default_tags.iter().cloned());

            let mut note = NewNote::new(deck_name, model_name, fields, tags);
            if ask_duplicate && confirm("Allow duplicate? (y/n, default n): ") {
                note = note.allow_duplicate();
            }
            notes.push(note);

            if !confirm("\nAdd another note? (y/n): ") {
                break;
            }
        }
        notes
    }

    /// Add one note and report; returns 1 when it landed so callers can
    /// keep a running count.
    async fn try_add(&self, note: &NewNote) -> Result<u32, ForgeError> {
        let note_id = self.anki.add_notes(std::slice::from_ref(note)).await?.into_iter().next().flatten();
        match note_id {
            Some(id) => {
                println!("✓ Note added with ID: {}", id);
                Ok(1)
            }
            None => {
                println!("✗ Failed to add note");
                Ok(0)
            }
        }
    }

    fn review_instructions(&mut self, model_name: &str) -> Result<(), ForgeError> {
        match self.instructions.get(model_name) {
            Some(current) => {
                println!("\nCurrent instructions for {}:", model_name);
                println!("  {}", current);
                if confirm("Update instructions? (y/n): ") {
                    let instruction = read_line("Enter new instructions: ");
                    self.instructions.set(model_name, &instruction);
                    self.instructions.save()?;
                }
            }
            None => {
                println!("\nNo instructions set for {}.", model_name);
                let instruction =
                    read_line("Enter instructions for this model (or press Enter to skip): ");
                if !instruction.is_empty() {
                    self.instructions.set(model_name, &instruction);
                    self.instructions.save()?;
                }
            }
        }
        Ok(())
    }
}

fn edit_fields(field_names: &[String], fields: &mut HashMap<String, String>) {
    for field in field_names {
        let current = fields.get(field).cloned().unwrap_or_default();
        println!("\nCurrent {}: {}", field, current);
        let new_value = read_line(&format!("New {} (press Enter to keep current): ", field));
        if !new_value.is_empty() {
            fields.insert(field.clone(), new_value);
        }
    }
}
