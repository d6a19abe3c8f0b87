// FICHIER : migralog/src/utils/fs.rs

use crate::utils::{json, AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use tracing::instrument;

// --- RE-EXPORTS (Isolation de la couche OS) ---
pub use std::path::{Path, PathBuf};

/// Crée récursivement un répertoire s'il n'existe pas déjà.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(AppError::Io)?;
    }
    Ok(())
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!(
            "Lecture impossible : {} ({})",
            path.to_string_lossy(),
            e
        ))
    })
}

/// Lit un fichier JSON et le désérialise en T.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_to_string(path)?;
    json::parse(&content)
}

pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(AppError::Io)
}

// --- ÉCRITURE ATOMIQUE ---
// Écriture dans un fichier temporaire voisin puis rename : le fichier final
// est soit l'ancien contenu complet, soit le nouveau, jamais un état partiel.

#[instrument(skip(content, path), fields(path = ?path))]
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path).map_err(AppError::Io)?;

    if let Err(e) = file.write_all(content) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AppError::Io(e));
    }
    file.flush().ok();
    file.sync_all().ok();
    drop(file);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AppError::Io(e));
    }
    Ok(())
}

pub fn write_json_atomic<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let content = json::stringify_pretty(data)?;
    write_atomic(path, content.as_bytes())
}
