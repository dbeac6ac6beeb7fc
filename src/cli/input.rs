use std::io::{
    self,
    Write,
};

pub fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();

    let mut buffer = String::new();
    io::stdin().read_line(&mut buffer).ok();
    buffer.trim().to_string()
}

pub fn confirm(prompt: &str) -> bool {
    read_line(prompt).eq_ignore_ascii_case("y")
}

/// Print a numbered list and let the user answer with either the number or
/// the literal name.
pub fn pick_from(kind: &str, items: &[String]) -> String {
    println!("\nAvailable {}s:", kind);
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {}", i + 1, item);
    }

    let choice = read_line(&format!("\nSelect {} number (or type the name): ", kind));
    resolve_choice(&choice, items)
}

pub fn resolve_choice(choice: &str, items: &[String]) -> String {
    match choice.parse::<usize>() {
        Ok(n) if n >= 1 && n <= items.len() => items[n - 1].clone(),
        _ => choice.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<String> {
        vec!["Basic".to_string(), "Cloze".to_string()]
    }

    #[test]
    fn number_selects_by_index() {
        assert_eq!(resolve_choice("2", &items()), "Cloze");
    }

    #[test]
    fn name_passes_through() {
        assert_eq!(resolve_choice("Basic", &items()), "Basic");
    }

    #[test]
    fn out_of_range_number_is_treated_as_a_name() {
        assert_eq!(resolve_choice("7", &items()), "7");
        assert_eq!(resolve_choice("0", &items()), "0");
    }
}
