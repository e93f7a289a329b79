//! Terminal prompts for the sign-in form.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Prompt for a username, offering `default` when one is remembered
pub fn username(default: Option<&str>) -> Result<String> {
    match default {
        Some(name) => print!("Username [{}]: ", name),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let input = read_line()?;
    Ok(resolve_default(&input, default))
}

pub fn password() -> Result<String> {
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

/// Ask whether to request access to private repositories
pub fn private_access() -> Result<bool> {
    print!("Request access to private repositories? [y/N]: ");
    io::stdout().flush()?;
    Ok(parse_yes(&read_line()?))
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read from stdin")?;
    Ok(input)
}

fn resolve_default(input: &str, default: Option<&str>) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.unwrap_or_default().to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_yes(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
