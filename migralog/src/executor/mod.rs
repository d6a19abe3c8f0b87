// FICHIER : migralog/src/executor/mod.rs

//! Capacité d'exécution : le seul point de contact avec la base cible.
//!
//! Le noyau ne transporte que des scripts opaques ; c'est l'Executor
//! qui sait les faire exécuter (interpréteur externe, journal de test).

pub mod recording;
pub mod shell;

use crate::changelog::{Changeset, Operation};
use crate::utils::Result;

/// Exécute une opération opaque contre le magasin sous-jacent.
///
/// Le changeset est fourni pour son identité (diagnostic) et son tag
/// `run_with` — jamais pour interpréter le contenu du script.
/// Les erreurs remontent brutes : c'est l'applicateur qui les habille
/// avec l'identité du changeset fautif.
pub trait Executor {
    fn execute(&mut self, changeset: &Changeset, operation: &Operation) -> Result<()>;
}
