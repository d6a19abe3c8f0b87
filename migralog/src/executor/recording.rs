// FICHIER : migralog/src/executor/recording.rs

use super::Executor;
use crate::changelog::{Changeset, ChangesetKey, Operation};
use crate::utils::{AppError, Result};

/// Trace d'un script passé à l'exécuteur.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    pub changeset: ChangesetKey,
    pub script: String,
}

/// Exécuteur journal : n'exécute rien, enregistre tout.
///
/// Sert de doublure dans les tests (avec panne simulée optionnelle)
/// et de moteur du mode dry-run du CLI.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub journal: Vec<ExecutedStatement>,
    fail_on: Option<ChangesetKey>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arme une panne simulée : tout appel pour cette clé échouera.
    pub fn fail_on(mut self, key: ChangesetKey) -> Self {
        self.fail_on = Some(key);
        self
    }

    /// Nombre d'appels enregistrés pour une clé donnée.
    pub fn count_for(&self, key: &ChangesetKey) -> usize {
        self.journal.iter().filter(|s| &s.changeset == key).count()
    }
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, changeset: &Changeset, operation: &Operation) -> Result<()> {
        if self.fail_on.as_ref() == Some(&changeset.key) {
            return Err(AppError::System(anyhow::anyhow!(
                "panne simulée sur {}",
                changeset.key
            )));
        }

        self.journal.push(ExecutedStatement {
            changeset: changeset.key.clone(),
            script: operation.script.clone(),
        });
        Ok(())
    }
}
