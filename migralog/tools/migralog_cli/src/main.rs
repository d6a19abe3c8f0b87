// FICHIER : migralog/tools/migralog_cli/src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::process;

// Imports Migralog
use migralog::applier::Applier;
use migralog::changelog::Changelog;
use migralog::executor::recording::RecordingExecutor;
use migralog::executor::shell::ShellExecutor;
use migralog::ledger::file::FileLedger;
use migralog::ledger::memory::MemoryLedger;
use migralog::ledger::Ledger;
use migralog::utils::context;
use migralog::{user_error, user_info, user_success};

#[derive(Parser)]
#[command(
    name = "migralog_cli",
    author = "Migralog Team",
    version,
    about = "Outil d'administration des migrations Migralog"
)]
struct Cli {
    #[arg(short, long, env = "MIGRALOG_CHANGELOG", help = "Fichier changelog")]
    changelog: PathBuf,

    #[arg(
        short,
        long,
        env = "MIGRALOG_LEDGER",
        default_value = "migralog-ledger.json",
        help = "Registre des changesets appliqués"
    )]
    ledger: PathBuf,

    #[arg(
        long,
        env = "MIGRALOG_RUN_COMMAND",
        default_value = "mongosh",
        help = "Interpréteur recevant les scripts sur stdin"
    )]
    run_command: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vérifie la structure du changelog sans rien exécuter
    Validate,
    /// Affiche la partition appliqué / en attente
    Status,
    /// Applique les changesets en attente
    Update {
        #[arg(long)]
        dry_run: bool,
    },
    /// Annule les N derniers changesets appliqués
    Rollback {
        count: usize,
        #[arg(long)]
        dry_run: bool,
    },
    /// Liste les entrées du registre dans l'ordre d'application
    History,
}

fn main() -> Result<()> {
    dotenv().ok();
    context::init_logging();

    let cli = Cli::parse();

    // Chargement du changelog (commun à toutes les commandes)
    let changelog = match Changelog::load(&cli.changelog) {
        Ok(log) => log,
        Err(e) => {
            user_error!("Changelog invalide : {}", e);
            process::exit(1);
        }
    };

    let applier = Applier::new();

    match cli.command {
        Commands::Validate => {
            user_success!(
                "Changelog valide : {} changesets ({:?})",
                changelog.len(),
                cli.changelog
            );
        }

        Commands::Status => {
            let ledger = FileLedger::open(&cli.ledger)?;
            let status = applier.status(&changelog, &ledger)?;

            user_info!("📋 État des migrations ({:?})", cli.changelog);
            for key in &status.applied {
                println!("  [appliqué]   {}", key);
            }
            for key in &status.pending {
                println!("  [en attente] {}", key);
            }
            user_info!(
                "{} appliqué(s), {} en attente",
                status.applied.len(),
                status.pending.len()
            );
        }

        Commands::Update { dry_run } => {
            let mut ledger = FileLedger::open(&cli.ledger)?;

            if dry_run {
                // Simulation : registre jetable + exécuteur journal
                let mut sandbox = MemoryLedger::with_entries(ledger.read()?);
                let mut recorder = RecordingExecutor::new();
                let report = applier.apply(&changelog, &mut sandbox, &mut recorder)?;

                user_info!("🔍 Dry-run : {} changeset(s) seraient appliqués", report.executed.len());
                for stmt in &recorder.journal {
                    println!("--- {} ---", stmt.changeset);
                    println!("{}", stmt.script);
                }
                user_info!("Aucune modification effectuée.");
                return Ok(());
            }

            let mut executor = build_executor(&cli.run_command);
            let report = applier.apply(&changelog, &mut ledger, &mut executor)?;

            for key in &report.executed {
                user_success!("Changeset {} appliqué", key);
            }

            match report.failure {
                None => {
                    user_success!("Migration terminée : {} changeset(s) appliqués", report.executed.len());
                }
                Some(failure) => {
                    user_error!("Arrêt sur {} : {}", failure.key, failure.error);
                    user_info!(
                        "Le registre reste cohérent ({} appliqués) : corrigez puis relancez.",
                        report.executed.len()
                    );
                    process::exit(1);
                }
            }
        }

        Commands::Rollback { count, dry_run } => {
            let mut ledger = FileLedger::open(&cli.ledger)?;

            if dry_run {
                let mut sandbox = MemoryLedger::with_entries(ledger.read()?);
                let mut recorder = RecordingExecutor::new();
                let report = applier.rollback(&changelog, &mut sandbox, &mut recorder, count)?;

                user_info!("🔍 Dry-run : {} rollback(s) seraient exécutés", report.executed.len());
                for stmt in &recorder.journal {
                    println!("--- {} ---", stmt.changeset);
                    println!("{}", stmt.script);
                }
                if let Some(failure) = report.failure {
                    user_error!("La passe s'arrêterait sur {} : {}", failure.key, failure.error);
                }
                user_info!("Aucune modification effectuée.");
                return Ok(());
            }

            let mut executor = build_executor(&cli.run_command);
            let report = applier.rollback(&changelog, &mut ledger, &mut executor, count)?;

            for key in &report.executed {
                user_success!("Changeset {} annulé", key);
            }

            match report.failure {
                None => {
                    user_success!("Rollback terminé : {} changeset(s) annulés", report.executed.len());
                }
                Some(failure) => {
                    user_error!("Arrêt sur {} : {}", failure.key, failure.error);
                    process::exit(1);
                }
            }
        }

        Commands::History => {
            let ledger = FileLedger::open(&cli.ledger)?;
            let entries = ledger.read()?;

            user_info!("🗂️ Registre ({:?}) : {} entrée(s)", cli.ledger, entries.len());
            for entry in entries {
                println!(
                    "  {} appliqué le {}",
                    entry.key(),
                    entry.applied_at.to_rfc3339()
                );
            }
        }
    }

    Ok(())
}

/// Construit l'exécuteur réel : interpréteur par défaut + surcharge
/// optionnelle par tag runWith (MIGRALOG_RUN_COMMAND_<TAG>).
fn build_executor(default_command: &str) -> ShellExecutor {
    let mut executor = ShellExecutor::new(default_command);

    // Exemple : MIGRALOG_RUN_COMMAND_MONGOSH=mongosh surcharge le tag "mongosh"
    for (key, value) in std::env::vars() {
        if let Some(tag) = key.strip_prefix("MIGRALOG_RUN_COMMAND_") {
            executor = executor.with_override(&tag.to_lowercase(), &value);
        }
    }

    executor
}

// --- TESTS UNITAIRES ---
#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_generation() {
        let output = Cli::command().render_help().to_string();
        assert!(output.contains("migralog_cli"));
        assert!(output.contains("rollback"));
    }

    #[test]
    fn test_dispatch_rollback_count() {
        let args = vec![
            "migralog_cli",
            "--changelog",
            "changelog.js",
            "rollback",
            "2",
        ];
        let cli = Cli::try_parse_from(args).expect("Parsing failed");
        match cli.command {
            Commands::Rollback { count, dry_run } => {
                assert_eq!(count, 2);
                assert!(!dry_run);
            }
            _ => panic!("Le dispatch vers rollback a échoué"),
        }
    }

    #[test]
    fn test_build_executor_reads_overrides() {
        std::env::set_var("MIGRALOG_RUN_COMMAND_SH", "/bin/sh");
        let _exec = build_executor("mongosh");
        std::env::remove_var("MIGRALOG_RUN_COMMAND_SH");
    }
}
