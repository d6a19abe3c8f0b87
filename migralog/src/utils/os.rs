// FICHIER : migralog/src/utils/os.rs

use crate::utils::{AppError, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::instrument;

/// Passe une chaîne de caractères dans l'entrée standard (stdin) d'une commande
/// et récupère le résultat (stdout).
/// Typiquement utilisé pour envoyer un script à un interpréteur (mongosh, sh).
#[instrument(skip(input), fields(cmd = cmd))]
pub fn pipe_through(cmd: &str, input: &str) -> Result<String> {
    // 1. Lancement du processus
    let mut child = Command::new(cmd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| AppError::System(anyhow::anyhow!("Outil introuvable '{}': {}", cmd, e)))?;

    // 2. Écriture dans stdin
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).map_err(AppError::Io)?;
    }

    // 3. Attente du résultat
    let output = child.wait_with_output().map_err(AppError::Io)?;

    if output.status.success() {
        let result = String::from_utf8_lossy(&output.stdout).to_string();
        Ok(result)
    } else {
        // Si l'interpréteur échoue (syntaxe invalide ?), on renvoie une erreur explicite
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        Err(AppError::System(anyhow::anyhow!(
            "Echec du pipe '{}': {}",
            cmd,
            stderr
        )))
    }
}
