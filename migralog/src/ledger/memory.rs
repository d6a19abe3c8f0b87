// FICHIER : migralog/src/ledger/memory.rs

use super::{Ledger, LedgerEntry};
use crate::changelog::ChangesetKey;
use crate::utils::{AppError, Result};

/// Registre en mémoire : substitut des tests et support du mode dry-run.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Démarre avec un état pré-rempli (copie d'un registre réel, scénarios de tests).
    pub fn with_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }
}

impl Ledger for MemoryLedger {
    fn read(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.entries.clone())
    }

    fn append(&mut self, entry: LedgerEntry) -> Result<()> {
        self.entries.push(entry);
        Ok(())
    }

    fn remove(&mut self, key: &ChangesetKey) -> Result<()> {
        let before = self.entries.len();
        self.entries.retain(|e| &e.key() != key);
        if self.entries.len() == before {
            return Err(AppError::Config(format!(
                "Entrée absente du registre : {}",
                key
            )));
        }
        Ok(())
    }
}
