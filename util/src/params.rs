//! Generic parameters functions
//!
//! Two parameter formats are supported: TOML files deserialised straight into
//! a parameter struct, and flat `key=value` properties files which are parsed
//! into a [`Properties`] map for the caller to validate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use regex::Regex;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Grammar of a single (already joined) properties line: a key, then either
/// `=`, `:` or whitespace, then the value.
const PROPERTY_LINE_PATTERN: &str = r"^(?P<key>[^=:\s]+)(?:\s*[=:]\s*|\s+|$)(?P<value>.*)$";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A set of string properties read from a `key=value` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: HashMap<String, String>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot load the parameter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Properties {
    /// Parse properties from the contents of a file.
    ///
    /// Blank lines and lines starting with `#` or `!` are ignored. A line
    /// ending in an unescaped `\` continues on the next line. If a key
    /// appears more than once the last value wins.
    pub fn parse(source: &str) -> Self {
        // The pattern is a literal so building it cannot fail
        let re = Regex::new(PROPERTY_LINE_PATTERN).unwrap();

        let mut entries = HashMap::new();

        for line in logical_lines(source) {
            if let Some(cap) = re.captures(&line) {
                let key = cap.name("key").map_or("", |m| m.as_str());
                let value = cap.name("value").map_or("", |m| m.as_str().trim_end());
                entries.insert(key.to_string(), value.to_string());
            }
        }

        Properties { entries }
    }

    /// Get the value of a property, or `None` if it wasn't set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of properties set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no properties were set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a TOML parameter file into the parameter struct `P`.
pub fn load<P, Q>(param_file_path: Q) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    Q: AsRef<Path>
{
    // Load the file into a string
    let params_str = match read_to_string(param_file_path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(e))
    };

    // Parse the string into the parameter struct
    match toml::from_str(params_str.as_str()) {
        Ok(p) => Ok(p),
        Err(e) => Err(LoadError::DeserialiseError(e))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Split the source into logical lines, joining continuations and dropping
/// comments and blank lines.
fn logical_lines(source: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for raw in source.lines() {
        let trimmed = raw.trim_start();

        // Comments only count at the start of a logical line
        if current.is_none() && (trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with('!'))
        {
            continue;
        }

        let mut line = current.take().unwrap_or_default();

        // An odd number of trailing backslashes means the last one escapes
        // the line break
        let trailing = trimmed.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            line.push_str(&trimmed[..trimmed.len() - 1]);
            current = Some(line);
        }
        else {
            line.push_str(trimmed);
            lines.push(line);
        }
    }

    // A continuation on the final line just ends the value
    if let Some(line) = current {
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }

    lines
}
