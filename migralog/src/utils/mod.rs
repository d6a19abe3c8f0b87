// FICHIER : migralog/src/utils/mod.rs

// =========================================================================
//  MIGRALOG UTILS - Foundation Layer (Stable)
// =========================================================================

// --- 1. MODULES INTERNES ---

pub mod env;
pub mod error;
pub mod fs;
pub mod json;
pub mod logger;
pub mod macros;
pub mod os;

// --- 2. FAÇADES SÉMANTIQUES ---
// Ce sont les points d'entrée que le code applicatif (CLI, applier) DOIT utiliser.

/// **Core Foundation** : Types de base et Erreurs.
pub mod core {
    pub use super::error::{AppError, Result};
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}

/// **System Operations**
pub mod sys {
    pub use super::os::pipe_through;
}

/// **Physical Layer (I/O)** : Accès disque sécurisé (Atomicité).
pub mod io {
    pub use super::fs::{
        ensure_dir, exists, read_json, read_to_string, remove_file, write_atomic,
        write_json_atomic, Path, PathBuf,
    };
}

/// **Data Abstraction** : Manipulation JSON.
pub mod data {
    pub use super::json::{from_value, json, parse, stringify, stringify_pretty, to_value, Map, Value};
    pub use serde::{Deserialize, Serialize};
    pub use std::collections::{HashMap, HashSet};
}

/// **Application Context** : Accès Env/Log.
pub mod context {
    pub use super::env::{get, get_optional, get_or, get_parsed, is_enabled};
    pub use super::logger::init_logging;
}

/// **Le Prélude** : À utiliser via `use migralog::utils::prelude::*;`
pub mod prelude {
    pub use super::core::{AppError, Result, Utc, Uuid};
    pub use super::data::{json, Deserialize, Serialize, Value};
    pub use tracing::{debug, error, info, instrument, warn};
}

// =========================================================================
// 3. EXPORTS LEGACY & UTILITAIRES (Compatibilité Totale)
// =========================================================================
// Ces exports sont requis par le code existant (changelog, ledger, applier).

// --> Erreurs
pub use error::{AppError, Result};
pub use logger::init_logging;

// --> Domaine (Requis par applier et ledger)
pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;

// --> Logging
pub use tracing::{debug, error, info, instrument, warn};

// --> Collections & Types
pub use std::cmp::Ordering;
pub use std::collections::{BTreeMap, HashMap, HashSet};
pub use std::fmt;
