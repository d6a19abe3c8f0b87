// FICHIER : migralog/src/utils/macros.rs

/// Affiche une info à l'utilisateur et logue l'événement
#[macro_export]
macro_rules! user_info {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        println!("{}", msg);
        tracing::info!(event = "user_notification", message = %msg);
    }};
}

/// Affiche un succès (vert) à l'utilisateur
#[macro_export]
macro_rules! user_success {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        println!("✅ {}", msg);
        tracing::info!(event = "user_success", message = %msg);
    }};
}

/// Affiche une erreur à l'utilisateur ET logue l'événement
#[macro_export]
macro_rules! user_error {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        eprintln!("❌ {}", msg);
        tracing::error!(event = "user_error", message = %msg);
    }};
}

// --- TESTS UNITAIRES ---
#[cfg(test)]
mod tests {

    #[test]
    fn test_macros_formatting() {
        // Les macros doivent accepter les arguments de formatage standard
        user_info!("Changelog chargé : {} changesets", 8);
        user_success!("Migration {} appliquée", "amalik:orders");
        user_error!("Échec sur {} (code {})", "amalik:books", 1);
    }
}
