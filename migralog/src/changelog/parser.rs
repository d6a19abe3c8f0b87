// FICHIER : migralog/src/changelog/parser.rs

//! Parseur du format texte "changelog formaté" :
//!
//! ```text
//! // migralog formatted mongodb
//!
//! // changeset amalik:orders runWith:mongosh
//! db.createCollection('orders');
//! //rollback db.orders.drop();
//! ```
//!
//! L'ordre de déclaration est le seul signal d'ordre : pas de timestamp,
//! pas de graphe de dépendances.

use super::{Changeset, ChangesetKey, Operation};
use crate::utils::{AppError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static HEADER_RE: OnceLock<Regex> = OnceLock::new();
static CHANGESET_RE: OnceLock<Regex> = OnceLock::new();
static ROLLBACK_RE: OnceLock<Regex> = OnceLock::new();

fn header_re() -> &'static Regex {
    HEADER_RE.get_or_init(|| {
        Regex::new(r"^//\s*migralog formatted\s+\S+").expect("regex en-tête invalide")
    })
}

fn changeset_re() -> &'static Regex {
    CHANGESET_RE.get_or_init(|| {
        Regex::new(r"^//\s*changeset\s+([^\s:]+):(\S+)(?:\s+runWith:(\S+))?\s*$")
            .expect("regex changeset invalide")
    })
}

fn rollback_re() -> &'static Regex {
    ROLLBACK_RE.get_or_init(|| Regex::new(r"^//rollback\s?(.*)$").expect("regex rollback invalide"))
}

/// Changeset en cours de lecture (non encore validé)
struct PendingChangeset {
    key: ChangesetKey,
    line: usize,
    run_with: Option<String>,
    forward_lines: Vec<String>,
    rollback_lines: Vec<String>,
}

impl PendingChangeset {
    fn finalize(self, ordinal: usize) -> Result<Changeset> {
        let forward = self.forward_lines.join("\n");
        if forward.trim().is_empty() {
            return Err(AppError::MalformedChangeset {
                line: self.line,
                reason: format!("le changeset {} ne déclare aucune opération forward", self.key),
            });
        }

        let rollback = if self.rollback_lines.is_empty() {
            None
        } else {
            Some(Operation::new(self.rollback_lines.join("\n")))
        };

        Ok(Changeset {
            key: self.key,
            ordinal,
            run_with: self.run_with,
            forward: Operation::new(forward),
            rollback,
        })
    }
}

/// Parse le texte complet d'un changelog.
/// Échec global (aucun store partiel) sur doublon ou changeset malformé.
pub fn parse_changelog(text: &str) -> Result<Vec<Changeset>> {
    let mut changesets: Vec<Changeset> = Vec::new();
    let mut seen: HashSet<ChangesetKey> = HashSet::new();
    let mut current: Option<PendingChangeset> = None;
    let mut header_seen = false;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim_end();

        if line.trim().is_empty() {
            continue;
        }

        // La première ligne significative doit être l'en-tête du format
        if !header_seen {
            if header_re().is_match(line.trim_start()) {
                header_seen = true;
                continue;
            }
            return Err(AppError::MalformedChangeset {
                line: line_no,
                reason: "en-tête '// migralog formatted <dialecte>' attendu".to_string(),
            });
        }

        // Ouverture d'un nouveau changeset
        if let Some(caps) = changeset_re().captures(line.trim_start()) {
            if let Some(pending) = current.take() {
                let ordinal = changesets.len();
                changesets.push(pending.finalize(ordinal)?);
            }

            let key = ChangesetKey::new(&caps[1], &caps[2]);
            if !seen.insert(key.clone()) {
                return Err(AppError::DuplicateChangeset {
                    author: key.author,
                    id: key.id,
                });
            }

            current = Some(PendingChangeset {
                key,
                line: line_no,
                run_with: caps.get(3).map(|m| m.as_str().to_string()),
                forward_lines: Vec::new(),
                rollback_lines: Vec::new(),
            });
            continue;
        }

        // Ligne de rollback (rattachée au changeset courant)
        if let Some(caps) = rollback_re().captures(line) {
            match current.as_mut() {
                Some(pending) => pending.rollback_lines.push(caps[1].to_string()),
                None => {
                    return Err(AppError::MalformedChangeset {
                        line: line_no,
                        reason: "rollback déclaré hors de tout changeset".to_string(),
                    });
                }
            }
            continue;
        }

        // Tout autre commentaire est ignoré
        if line.trim_start().starts_with("//") {
            continue;
        }

        // Ligne de script : contenu forward du changeset courant
        match current.as_mut() {
            Some(pending) => pending.forward_lines.push(line.to_string()),
            None => {
                return Err(AppError::MalformedChangeset {
                    line: line_no,
                    reason: "instruction déclarée avant le premier changeset".to_string(),
                });
            }
        }
    }

    if let Some(pending) = current.take() {
        let ordinal = changesets.len();
        changesets.push(pending.finalize(ordinal)?);
    }

    Ok(changesets)
}

// ============================================================================
// TESTS UNITAIRES
// ============================================================================
