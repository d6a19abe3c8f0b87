// FICHIER : migralog/src/ledger/file.rs

use super::{Ledger, LedgerEntry};
use crate::changelog::ChangesetKey;
use crate::utils::{fs, AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Document JSON persistant du registre.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerDocument {
    version: u32,
    entries: Vec<LedgerEntry>,
}

impl Default for LedgerDocument {
    fn default() -> Self {
        Self {
            version: 1,
            entries: Vec::new(),
        }
    }
}

/// Registre persisté dans un unique document JSON.
///
/// Chaque mutation est réécrite de manière atomique (fichier temporaire
/// puis rename) : l'entrée N est durable avant que le changeset N+1
/// ne soit considéré.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    document: LedgerDocument,
}

impl FileLedger {
    /// Ouvre le registre, en le créant vide s'il n'existe pas encore.
    pub fn open(path: &Path) -> Result<Self> {
        let document = if fs::exists(path) {
            fs::read_json(path)?
        } else {
            debug!("📄 Registre inexistant, initialisation : {:?}", path);
            LedgerDocument::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        fs::write_json_atomic(&self.path, &self.document)
    }
}

impl Ledger for FileLedger {
    fn read(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.document.entries.clone())
    }

    fn append(&mut self, entry: LedgerEntry) -> Result<()> {
        self.document.entries.push(entry);
        self.persist()
    }

    fn remove(&mut self, key: &ChangesetKey) -> Result<()> {
        let before = self.document.entries.len();
        self.document.entries.retain(|e| &e.key() != key);
        if self.document.entries.len() == before {
            return Err(AppError::Config(format!(
                "Entrée absente du registre : {}",
                key
            )));
        }
        self.persist()
    }
}

// ============================================================================
// TESTS UNITAIRES
// ============================================================================
