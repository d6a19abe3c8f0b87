// FICHIER : migralog/src/executor/shell.rs

use super::Executor;
use crate::changelog::{Changeset, Operation};
use crate::utils::sys;
use crate::utils::Result;
use std::collections::HashMap;
use tracing::debug;

/// Exécuteur par interpréteur externe : le script est envoyé sur le stdin
/// de la commande cible (ex: `mongosh`).
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    default_command: String,
    // Surcharges par tag runWith (ex: "mongosh" -> "mongosh --quiet mydb")
    overrides: HashMap<String, String>,
}

impl ShellExecutor {
    pub fn new(default_command: &str) -> Self {
        Self {
            default_command: default_command.to_string(),
            overrides: HashMap::new(),
        }
    }

    /// Associe une commande spécifique à un tag runWith.
    pub fn with_override(mut self, run_with: &str, command: &str) -> Self {
        self.overrides
            .insert(run_with.to_string(), command.to_string());
        self
    }

    fn command_for(&self, changeset: &Changeset) -> &str {
        changeset
            .run_with
            .as_ref()
            .and_then(|tag| self.overrides.get(tag))
            .map(|s| s.as_str())
            .unwrap_or(&self.default_command)
    }
}

impl Executor for ShellExecutor {
    fn execute(&mut self, changeset: &Changeset, operation: &Operation) -> Result<()> {
        let cmd = self.command_for(changeset);
        debug!(
            "⚙️ Envoi du script de {} vers '{}' ({} octets)",
            changeset.key,
            cmd,
            operation.script.len()
        );

        sys::pipe_through(cmd, &operation.script)?;
        Ok(())
    }
}
