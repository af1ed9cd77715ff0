use std::collections::HashMap;
use std::path::Path;

use tracing::error;

use crate::error::Error;
use crate::types::DEFAULT_LANGUAGE;

/// How to invoke an interpreter for one language: the program, any fixed
/// leading arguments, and the scratch file path appended last.
#[derive(Debug, Clone)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command_for(&self, source: &Path) -> Vec<String> {
        let mut command = Vec::with_capacity(self.args.len() + 2);
        command.push(self.program.clone());
        command.extend(self.args.iter().cloned());
        command.push(source.display().to_string());
        command
    }
}

/// Table from language identifier to command template. Languages are added by
/// registration, not by branching.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    templates: HashMap<String, CommandTemplate>,
}

impl LanguageRegistry {
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn register(&mut self, language: impl Into<String>, template: CommandTemplate) {
        self.templates.insert(language.into(), template);
    }

    /// Produce the argument vector for `language` against `source`, or reject
    /// the language.
    pub fn resolve(&self, language: &str, source: &Path) -> Result<Vec<String>, Error> {
        match self.templates.get(language) {
            Some(template) => Ok(template.command_for(source)),
            None => {
                error!(language = %language, "Unsupported language");
                Err(Error::UnsupportedLanguage(language.to_string()))
            }
        }
    }

    pub fn supports(&self, language: &str) -> bool {
        self.templates.contains_key(language)
    }
}

impl Default for LanguageRegistry {
    /// The supported set at this design point: python only.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(DEFAULT_LANGUAGE, CommandTemplate::new("python3", vec![]));
        registry
    }
}
