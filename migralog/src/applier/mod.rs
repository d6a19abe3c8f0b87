// FICHIER : migralog/src/applier/mod.rs

//! Applicateur de migrations : calcule les changesets en attente,
//! les exécute dans l'ordre de déclaration et tient le registre à jour.

use crate::changelog::{Changelog, ChangesetKey};
use crate::executor::Executor;
use crate::ledger::{Ledger, LedgerEntry};
use crate::utils::{AppError, Result};

use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identité du changeset fautif et cause sous-jacente.
#[derive(Debug)]
pub struct RunFailure {
    pub key: ChangesetKey,
    pub error: AppError,
}

/// Résultat (éventuellement partiel) d'une passe apply ou rollback.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Changesets exécutés avec succès durant cette passe, dans l'ordre.
    pub executed: Vec<ChangesetKey>,
    /// Renseigné si la passe s'est arrêtée sur un échec.
    pub failure: Option<RunFailure>,
}

impl RunReport {
    fn started() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            executed: Vec::new(),
            failure: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Partition lecture seule du changelog : appliqué / en attente.
#[derive(Debug)]
pub struct PendingStatus {
    pub applied: Vec<ChangesetKey>,
    pub pending: Vec<ChangesetKey>,
}

#[derive(Debug, Default)]
pub struct Applier;

impl Applier {
    pub fn new() -> Self {
        Self
    }

    /// Applique les changesets en attente, strictement en séquence.
    ///
    /// Garantie centrale : au plus une exécution par paire (auteur, id).
    /// L'entrée de registre est écrite après le succès de l'opération et
    /// avant de considérer le changeset suivant. Premier échec = arrêt
    /// immédiat, rapport partiel (ni retry, ni rollback automatique).
    pub fn apply(
        &self,
        changelog: &Changelog,
        ledger: &mut dyn Ledger,
        executor: &mut dyn Executor,
    ) -> Result<RunReport> {
        let applied: HashSet<ChangesetKey> =
            ledger.read()?.iter().map(|e| e.key()).collect();

        let mut report = RunReport::started();
        info!(
            "🧭 Passe d'application {} : {} changesets déclarés, {} déjà appliqués",
            report.run_id,
            changelog.len(),
            applied.len()
        );

        for changeset in changelog.iter() {
            if applied.contains(&changeset.key) {
                debug!("Changeset {} déjà appliqué, ignoré", changeset.key);
                continue;
            }

            info!("🚀 Application du changeset {}", changeset.key);
            match executor.execute(changeset, &changeset.forward) {
                Ok(()) => {
                    // Enregistrement du succès, durable avant le suivant
                    ledger.append(LedgerEntry::new(&changeset.key, Utc::now()))?;
                    report.executed.push(changeset.key.clone());
                }
                Err(e) => {
                    warn!("⚠️ Échec sur {} : arrêt de la passe", changeset.key);
                    report.failure = Some(RunFailure {
                        key: changeset.key.clone(),
                        error: AppError::Execution {
                            changeset: changeset.key.to_string(),
                            source: anyhow::Error::new(e),
                        },
                    });
                    break;
                }
            }
        }

        Ok(report)
    }

    /// Annule les `count` dernières entrées du registre, de la plus récente
    /// à la plus ancienne. Un `count` supérieur à la taille du registre
    /// annule tout ce qui s'y trouve.
    pub fn rollback(
        &self,
        changelog: &Changelog,
        ledger: &mut dyn Ledger,
        executor: &mut dyn Executor,
        count: usize,
    ) -> Result<RunReport> {
        let entries = ledger.read()?;

        // Tri par date d'application décroissante ; l'ordre d'insertion
        // départage les entrées horodatées au même instant.
        let mut indexed: Vec<(usize, LedgerEntry)> = entries.into_iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| {
            b.applied_at.cmp(&a.applied_at).then(ib.cmp(ia))
        });

        let mut report = RunReport::started();
        info!("🧭 Passe de rollback {} : {} entrées ciblées", report.run_id, count.min(indexed.len()));

        for (_, entry) in indexed.into_iter().take(count) {
            let key = entry.key();

            let changeset = match changelog.find(&key) {
                Some(c) => c,
                None => {
                    warn!("⚠️ Le registre référence {} mais le changelog ne le déclare plus", key);
                    report.failure = Some(RunFailure {
                        error: AppError::UnknownChangeset {
                            changeset: key.to_string(),
                        },
                        key,
                    });
                    break;
                }
            };

            // Vérifié avant toute exécution pour cette entrée
            let rollback_op = match &changeset.rollback {
                Some(op) => op,
                None => {
                    report.failure = Some(RunFailure {
                        error: AppError::MissingRollback {
                            changeset: key.to_string(),
                        },
                        key,
                    });
                    break;
                }
            };

            info!("↩️ Rollback du changeset {}", key);
            match executor.execute(changeset, rollback_op) {
                Ok(()) => {
                    ledger.remove(&key)?;
                    report.executed.push(key);
                }
                Err(e) => {
                    warn!("⚠️ Échec du rollback de {} : arrêt de la passe", key);
                    report.failure = Some(RunFailure {
                        error: AppError::Execution {
                            changeset: key.to_string(),
                            source: anyhow::Error::new(e),
                        },
                        key,
                    });
                    break;
                }
            }
        }

        Ok(report)
    }

    /// Partition appliqué / en attente, sans rien exécuter.
    pub fn status(&self, changelog: &Changelog, ledger: &dyn Ledger) -> Result<PendingStatus> {
        let applied_set: HashSet<ChangesetKey> =
            ledger.read()?.iter().map(|e| e.key()).collect();

        let mut applied = Vec::new();
        let mut pending = Vec::new();
        for changeset in changelog.iter() {
            if applied_set.contains(&changeset.key) {
                applied.push(changeset.key.clone());
            } else {
                pending.push(changeset.key.clone());
            }
        }

        Ok(PendingStatus { applied, pending })
    }
}

// ============================================================================
// TESTS UNITAIRES
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::{Changeset, Operation};
    use crate::executor::recording::RecordingExecutor;
    use crate::ledger::memory::MemoryLedger;

    fn changeset(id: &str, ordinal: usize, with_rollback: bool) -> Changeset {
        Changeset {
            key: ChangesetKey::new("amalik", id),
            ordinal,
            run_with: Some("mongosh".to_string()),
            forward: Operation::new(format!("db.createCollection('{}');", id)),
            rollback: with_rollback.then(|| Operation::new(format!("db.{}.drop();", id))),
        }
    }

    fn two_collections() -> Changelog {
        Changelog::from_changesets(vec![
            changeset("orders", 0, true),
            changeset("person2", 1, true),
        ])
    }

    #[test]
    fn test_apply_on_empty_ledger() {
        let changelog = two_collections();
        let mut ledger = MemoryLedger::new();
        let mut exec = RecordingExecutor::new();

        let report = Applier::new()
            .apply(&changelog, &mut ledger, &mut exec)
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.executed.len(), 2);

        // Le registre reflète l'ordre de déclaration
        let entries = ledger.read().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "orders");
        assert_eq!(entries[1].id, "person2");
        assert!(entries[0].applied_at <= entries[1].applied_at);

        // Chaque opération exécutée exactement une fois
        assert_eq!(exec.count_for(&ChangesetKey::new("amalik", "orders")), 1);
        assert_eq!(exec.count_for(&ChangesetKey::new("amalik", "person2")), 1);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let changelog = two_collections();
        let mut ledger = MemoryLedger::new();
        let mut exec = RecordingExecutor::new();
        let applier = Applier::new();

        applier.apply(&changelog, &mut ledger, &mut exec).unwrap();
        let report = applier.apply(&changelog, &mut ledger, &mut exec).unwrap();

        // Deuxième passe : aucun travail
        assert!(report.is_success());
        assert!(report.executed.is_empty());
        assert_eq!(exec.journal.len(), 2);
        assert_eq!(ledger.read().unwrap().len(), 2);
    }

    #[test]
    fn test_apply_skips_already_applied_prefix() {
        let changelog = two_collections();
        let mut ledger = MemoryLedger::with_entries(vec![LedgerEntry::new(
            &ChangesetKey::new("amalik", "orders"),
            Utc::now(),
        )]);
        let mut exec = RecordingExecutor::new();

        let report = Applier::new()
            .apply(&changelog, &mut ledger, &mut exec)
            .unwrap();

        // Seul person2 s'exécute ; orders reste intact dans le registre
        assert_eq!(report.executed, vec![ChangesetKey::new("amalik", "person2")]);
        assert_eq!(exec.count_for(&ChangesetKey::new("amalik", "orders")), 0);
        assert_eq!(ledger.read().unwrap().len(), 2);
    }

    #[test]
    fn test_apply_stops_on_first_failure() {
        let changelog = Changelog::from_changesets(vec![
            changeset("orders", 0, true),
            changeset("person2", 1, true),
            changeset("company", 2, true),
        ]);
        let mut ledger = MemoryLedger::new();
        let mut exec =
            RecordingExecutor::new().fail_on(ChangesetKey::new("amalik", "person2"));

        let report = Applier::new()
            .apply(&changelog, &mut ledger, &mut exec)
            .unwrap();

        // Rapport partiel : orders appliqué, person2 identifié comme fautif,
        // company jamais tenté
        assert!(!report.is_success());
        assert_eq!(report.executed, vec![ChangesetKey::new("amalik", "orders")]);

        let failure = report.failure.unwrap();
        assert_eq!(failure.key, ChangesetKey::new("amalik", "person2"));
        assert!(matches!(failure.error, AppError::Execution { .. }));

        // Le registre reste cohérent avec "1 changeset appliqué"
        let entries = ledger.read().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "orders");
        assert_eq!(exec.count_for(&ChangesetKey::new("amalik", "company")), 0);
    }

    #[test]
    fn test_rollback_round_trip() {
        let changelog = two_collections();
        let mut ledger = MemoryLedger::new();
        let mut exec = RecordingExecutor::new();
        let applier = Applier::new();

        applier.apply(&changelog, &mut ledger, &mut exec).unwrap();

        let report = applier
            .rollback(&changelog, &mut ledger, &mut exec, 2)
            .unwrap();

        assert!(report.is_success());
        // Ordre inverse de l'application
        assert_eq!(
            report.executed,
            vec![
                ChangesetKey::new("amalik", "person2"),
                ChangesetKey::new("amalik", "orders"),
            ]
        );
        assert!(ledger.read().unwrap().is_empty());

        // Les scripts de rollback sont bien ceux déclarés
        let scripts: Vec<&str> = exec.journal.iter().map(|s| s.script.as_str()).collect();
        assert!(scripts.contains(&"db.person2.drop();"));
        assert!(scripts.contains(&"db.orders.drop();"));
    }

    #[test]
    fn test_rollback_last_n_only() {
        let changelog = two_collections();
        let mut ledger = MemoryLedger::new();
        let mut exec = RecordingExecutor::new();
        let applier = Applier::new();

        applier.apply(&changelog, &mut ledger, &mut exec).unwrap();
        let report = applier
            .rollback(&changelog, &mut ledger, &mut exec, 1)
            .unwrap();

        // Seule l'entrée la plus récente disparaît
        assert_eq!(report.executed, vec![ChangesetKey::new("amalik", "person2")]);
        let entries = ledger.read().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "orders");
    }

    #[test]
    fn test_rollback_count_larger_than_ledger() {
        let changelog = two_collections();
        let mut ledger = MemoryLedger::new();
        let mut exec = RecordingExecutor::new();
        let applier = Applier::new();

        applier.apply(&changelog, &mut ledger, &mut exec).unwrap();
        let report = applier
            .rollback(&changelog, &mut ledger, &mut exec, 10)
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.executed.len(), 2);
        assert!(ledger.read().unwrap().is_empty());
    }

    #[test]
    fn test_rollback_missing_rollback_leaves_ledger_unchanged() {
        let changelog = Changelog::from_changesets(vec![changeset("orders", 0, false)]);
        let mut ledger = MemoryLedger::new();
        let mut exec = RecordingExecutor::new();
        let applier = Applier::new();

        applier.apply(&changelog, &mut ledger, &mut exec).unwrap();
        let report = applier
            .rollback(&changelog, &mut ledger, &mut exec, 1)
            .unwrap();

        assert!(!report.is_success());
        let failure = report.failure.unwrap();
        assert!(matches!(failure.error, AppError::MissingRollback { .. }));

        // Registre intact : rien n'a été exécuté pour cette entrée
        assert_eq!(ledger.read().unwrap().len(), 1);
        assert_eq!(exec.journal.len(), 1); // uniquement le forward initial
    }

    #[test]
    fn test_rollback_unknown_changeset() {
        let changelog = two_collections();
        let mut ledger = MemoryLedger::with_entries(vec![LedgerEntry::new(
            &ChangesetKey::new("amalik", "disparu"),
            Utc::now(),
        )]);
        let mut exec = RecordingExecutor::new();

        let report = Applier::new()
            .rollback(&changelog, &mut ledger, &mut exec, 1)
            .unwrap();

        assert!(!report.is_success());
        let failure = report.failure.unwrap();
        assert!(matches!(failure.error, AppError::UnknownChangeset { .. }));
        assert_eq!(ledger.read().unwrap().len(), 1);
    }

    #[test]
    fn test_status_partition() {
        let changelog = two_collections();
        let mut ledger = MemoryLedger::with_entries(vec![LedgerEntry::new(
            &ChangesetKey::new("amalik", "orders"),
            Utc::now(),
        )]);

        let status = Applier::new().status(&changelog, &ledger).unwrap();
        assert_eq!(status.applied, vec![ChangesetKey::new("amalik", "orders")]);
        assert_eq!(status.pending, vec![ChangesetKey::new("amalik", "person2")]);

        // status ne mute jamais le registre
        assert_eq!(ledger.read().unwrap().len(), 1);
    }
}
