use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use super::{Contacts, Menu, MenuEntry};

/// Phrase collections compiled into the binary
const BUILTIN_MENU: &str = include_str!("../../content/menu.toml");

/// On-disk shape of a menu file:
///
/// ```toml
/// [contacts]
/// label = "📞 Контакты"
/// text = "..."
///
/// [[section]]
/// label = "💼 Деловая речь"
/// title = "Деловая речь"
/// items = ["...", "..."]
/// ```
#[derive(Debug, Deserialize)]
struct MenuFile {
    contacts: Contacts,
    #[serde(default, rename = "section")]
    sections: Vec<MenuEntry>,
}

/// Parse a menu from TOML text
pub fn parse_menu(content: &str) -> Result<Menu> {
    let file: MenuFile = toml::from_str(content).context("Invalid menu TOML")?;

    for section in file.sections.iter().filter(|s| s.items.is_empty()) {
        warn!("Section '{}' has no items", section.label);
    }

    Menu::new(file.sections, file.contacts)
}

/// The menu shipped with the bot
pub fn builtin_menu() -> Result<Menu> {
    parse_menu(BUILTIN_MENU).context("Built-in menu is invalid")
}

/// Load the menu from `path`, or the built-in one when no path is configured.
pub async fn load_menu(path: Option<&Path>) -> Result<Menu> {
    let menu = match path {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read menu file: {}", path.display()))?;
            let menu = parse_menu(&content)
                .with_context(|| format!("Failed to load menu from {}", path.display()))?;
            info!("Loaded menu from {}", path.display());
            menu
        }
        None => builtin_menu()?,
    };

    if menu.is_empty() {
        warn!("Menu has no sections, every message will get the fallback reply");
    }

    info!(
        "Menu ready: {} sections, {} items total",
        menu.len(),
        menu.entries().iter().map(|e| e.items.len()).sum::<usize>()
    );
    Ok(menu)
}
