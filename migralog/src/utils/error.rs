// FICHIER : migralog/src/utils/error.rs

use std::io;

// --- RE-EXPORTS ANYHOW (Pour la flexibilité du CLI) ---
// On expose les outils flexibles pour l'application finale
pub use anyhow::{anyhow, Context};
// On renomme le Result de anyhow pour ne pas qu'il écrase le nôtre
pub use anyhow::Result as AnyResult;

// --- GESTION D'ERREUR STRICTE ---

/// Type de résultat standard pour Migralog.
/// Utilise notre AppError unifiée au lieu d'une erreur générique.
pub type Result<T> = std::result::Result<T, AppError>;

/// Enumération centrale des erreurs de l'application.
/// Elle dérive `thiserror::Error` pour faciliter la conversion automatique.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Erreur de configuration : {0}")]
    Config(String),

    #[error("Erreur d'entrée/sortie : {0}")]
    Io(#[from] io::Error),

    #[error("Erreur de sérialisation : {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erreur Système : {0}")]
    System(#[from] anyhow::Error),

    // --- ERREURS DE CHARGEMENT DU CHANGELOG ---
    #[error("Changeset dupliqué : {author}:{id}")]
    DuplicateChangeset { author: String, id: String },

    #[error("Changeset malformé (ligne {line}) : {reason}")]
    MalformedChangeset { line: usize, reason: String },

    // --- ERREURS D'EXÉCUTION ---
    #[error("Échec d'exécution du changeset {changeset} : {source}")]
    Execution {
        changeset: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Aucun rollback déclaré pour le changeset {changeset}")]
    MissingRollback { changeset: String },

    #[error("Changeset absent du changelog : {changeset}")]
    UnknownChangeset { changeset: String },
}

// Helpers pour convertir des erreurs string en AppError
// Permet de faire : return Err("Mon erreur".into());
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::System(anyhow::anyhow!(s))
    }
}

// Permet de faire : return Err("Mon erreur literal".into());
impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::System(anyhow::anyhow!(s.to_string()))
    }
}
