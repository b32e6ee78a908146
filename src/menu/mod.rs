pub mod loader;

use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::Deserialize;
use tracing::debug;

/// Buttons per keyboard row
const KEYBOARD_ROW_WIDTH: usize = 2;

/// A menu section: one keyboard button and the phrase list behind it
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MenuEntry {
    /// Exact button text, emoji prefix included
    pub label: String,
    /// Title used in the list header
    pub title: String,
    pub items: Vec<String>,
}

/// The contacts button and its fixed reply
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Contacts {
    pub label: String,
    pub text: String,
}

/// Immutable label table built once at startup
#[derive(Debug, Clone)]
pub struct Menu {
    entries: Vec<MenuEntry>,
    by_label: HashMap<String, usize>,
    contacts: Contacts,
}

impl Menu {
    /// Build the table, rejecting empty or duplicate labels.
    pub fn new(entries: Vec<MenuEntry>, contacts: Contacts) -> Result<Self> {
        if contacts.label.trim().is_empty() {
            bail!("Contacts label is empty");
        }
        if contacts.label != contacts.label.trim() {
            bail!("Contacts label '{}' has surrounding whitespace", contacts.label);
        }

        let mut by_label = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if entry.label.trim().is_empty() {
                bail!("Section #{} ('{}') has an empty label", idx + 1, entry.title);
            }
            if entry.label != entry.label.trim() {
                bail!("Label '{}' has surrounding whitespace", entry.label);
            }
            if entry.label == contacts.label {
                bail!("Label '{}' clashes with the contacts button", entry.label);
            }
            if by_label.insert(entry.label.clone(), idx).is_some() {
                bail!("Duplicate label '{}'", entry.label);
            }
            debug!(
                "Registered section: {} ({} items)",
                entry.label,
                entry.items.len()
            );
        }

        Ok(Self {
            entries,
            by_label,
            contacts,
        })
    }

    /// Exact, case-sensitive label lookup
    pub fn lookup(&self, label: &str) -> Option<&MenuEntry> {
        self.by_label.get(label).map(|&idx| &self.entries[idx])
    }

    pub fn is_contacts(&self, label: &str) -> bool {
        self.contacts.label == label
    }

    pub fn contacts(&self) -> &Contacts {
        &self.contacts
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Keyboard layout: section labels in menu order, contacts last,
    /// two buttons per row.
    pub fn keyboard_rows(&self) -> Vec<Vec<&str>> {
        let labels: Vec<&str> = self
            .entries
            .iter()
            .map(|e| e.label.as_str())
            .chain(std::iter::once(self.contacts.label.as_str()))
            .collect();

        labels
            .chunks(KEYBOARD_ROW_WIDTH)
            .map(|row| row.to_vec())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
