// FICHIER : migralog/src/ledger/mod.rs

//! Registre des changesets appliqués.
//!
//! Contrat de durabilité du suivi des migrations. Les implémentations
//! peuvent persister sur disque, en base, ou rester en mémoire (tests).

pub mod file;
pub mod memory;

use crate::changelog::ChangesetKey;
use crate::utils::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Une entrée du registre : un changeset appliqué avec succès
/// et pas encore annulé (correspondance 1:1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub author: String,
    pub id: String,
    #[serde(rename = "appliedAt")]
    pub applied_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(key: &ChangesetKey, applied_at: DateTime<Utc>) -> Self {
        Self {
            author: key.author.clone(),
            id: key.id.clone(),
            applied_at,
        }
    }

    pub fn key(&self) -> ChangesetKey {
        ChangesetKey::new(&self.author, &self.id)
    }
}

/// Contrat de persistance du registre.
///
/// Propriétés exigées des implémentations :
/// - Ordre d'insertion préservé par `read`
/// - `append`/`remove` atomiques à l'échelle d'une entrée
/// - Durabilité déléguée à l'implémentation
///
/// Le registre est une ressource injectée : ouvert par l'appelant,
/// muté exclusivement par l'applicateur.
pub trait Ledger {
    /// Charge toutes les entrées, dans l'ordre d'application.
    fn read(&self) -> Result<Vec<LedgerEntry>>;

    /// Enregistre un changeset appliqué. Doit être durable au retour.
    fn append(&mut self, entry: LedgerEntry) -> Result<()>;

    /// Retire l'entrée correspondant à la clé (après rollback réussi).
    /// Échoue si la clé est absente : le registre serait incohérent.
    fn remove(&mut self, key: &ChangesetKey) -> Result<()>;
}
