// FICHIER : migralog/src/changelog/mod.rs

//! Changelog : la séquence ordonnée des changesets déclarés

pub mod parser;

use crate::utils::{fs, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Identité d'un changeset : la paire (auteur, id).
/// Deux changesets d'un même changelog ne peuvent jamais la partager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangesetKey {
    pub author: String,
    pub id: String,
}

impl ChangesetKey {
    pub fn new(author: &str, id: &str) -> Self {
        Self {
            author: author.to_string(),
            id: id.to_string(),
        }
    }
}

impl fmt::Display for ChangesetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.author, self.id)
    }
}

/// Charge utile opaque. Le moteur ne lit jamais le contenu du script :
/// il le transmet tel quel à l'Executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub script: String,
}

impl Operation {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

/// Un changeset : une opération forward et son rollback optionnel.
/// Immuable après chargement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Changeset {
    pub key: ChangesetKey,
    /// Position de déclaration dans le changelog (seul signal d'ordre).
    pub ordinal: usize,
    /// Tag d'environnement d'exécution (ex: "mongosh"). Jamais interprété ici.
    pub run_with: Option<String>,
    pub forward: Operation,
    pub rollback: Option<Operation>,
}

/// Séquence ordonnée de changesets, en lecture seule après chargement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Changelog {
    changesets: Vec<Changeset>,
}

impl Changelog {
    pub(crate) fn from_changesets(changesets: Vec<Changeset>) -> Self {
        Self { changesets }
    }

    /// Parse un changelog au format texte (voir [`parser`]).
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::from_changesets(parser::parse_changelog(text)?))
    }

    /// Charge un changelog depuis un fichier.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Changeset> {
        self.changesets.iter()
    }

    pub fn len(&self) -> usize {
        self.changesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changesets.is_empty()
    }

    pub fn find(&self, key: &ChangesetKey) -> Option<&Changeset> {
        self.changesets.iter().find(|c| &c.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changeset(author: &str, id: &str, ordinal: usize) -> Changeset {
        Changeset {
            key: ChangesetKey::new(author, id),
            ordinal,
            run_with: None,
            forward: Operation::new("db.createCollection('x');"),
            rollback: None,
        }
    }

    #[test]
    fn test_key_display() {
        let key = ChangesetKey::new("amalik", "orders");
        assert_eq!(key.to_string(), "amalik:orders");
    }

    #[test]
    fn test_find_preserves_declaration_order() {
        let log = Changelog::from_changesets(vec![
            changeset("amalik", "orders", 0),
            changeset("amalik", "person2", 1),
        ]);

        assert_eq!(log.len(), 2);
        let ordinals: Vec<usize> = log.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1]);

        let found = log.find(&ChangesetKey::new("amalik", "person2")).unwrap();
        assert_eq!(found.ordinal, 1);
        assert!(log.find(&ChangesetKey::new("autre", "orders")).is_none());
    }
}
