use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use doc_tidy_core::{
    check_claude_cli, AnalyzeReport, ApplyReport, ClaudeClassifier, DocTidyError, HealthChecker,
    HealthReport, OrganizeConfig, OrganizeEngine, Result,
};

mod args;
use args::{Cli, Commands, ConfigAction, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Health { ref dir }) => {
            let dir = resolve_dir(dir.clone());
            handle_health(&dir, cli.config.as_deref(), cli.json)
        }
        Some(Commands::Config { ref action }) => handle_config(action),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            let dir = resolve_dir(cli.dir.clone());
            handle_organize(&dir, &cli)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn resolve_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| PathBuf::from("."))
}

/// Analyze a directory and either report or execute the suggestions
fn handle_organize(dir: &Path, cli: &Cli) -> Result<()> {
    let mut config = OrganizeConfig::discover(dir, cli.config.as_deref())?;
    if cli.ai {
        config.llm.enabled = true;
    }
    let ai_enabled = config.llm.enabled;

    let mut engine = OrganizeEngine::new(config)?;
    if ai_enabled {
        if check_claude_cli() {
            engine = engine.with_external_classifier(Box::new(ClaudeClassifier::new(dir)));
        } else {
            eprintln!(
                "{} Claude CLI not found, continuing with pattern classification only",
                "[WARN]".yellow().bold()
            );
        }
    }

    let report = engine.generate_suggestions(dir)?;

    if cli.apply {
        let apply_report = engine.apply_moves(dir, cli.dry_run)?;
        if cli.json {
            let combined = serde_json::json!({
                "analyze": report,
                "apply": apply_report,
            });
            println!("{}", serde_json::to_string_pretty(&combined)?);
        } else {
            print_analyze_report(dir, &report);
            print_apply_report(&apply_report);
        }
    } else if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_analyze_report(dir, &report);
    }

    Ok(())
}

fn handle_health(dir: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = OrganizeConfig::discover(dir, config_path)?;
    let checker = HealthChecker::new(config)?;
    let report = checker.check(dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_health_report(dir, &report);
    }

    Ok(())
}

fn handle_config(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = load_global_config()?;
            match config.get(key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(DocTidyError::ConfigKeyNotFound { key: key.clone() });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = load_global_config()?;
            config.set(key, value)?;
            config.save(&OrganizeConfig::global_path()?)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = load_global_config()?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            println!("{}", OrganizeConfig::global_path()?.display());
        }
        ConfigAction::Init => {
            let path = OrganizeConfig::init()?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}

fn load_global_config() -> Result<OrganizeConfig> {
    let path = OrganizeConfig::global_path()?;
    if path.exists() {
        OrganizeConfig::load(&path)
    } else {
        Ok(OrganizeConfig::default())
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "doc-tidy", &mut io::stdout());
}

fn print_analyze_report(dir: &Path, report: &AnalyzeReport) {
    println!();
    println!("Analyzed: {} ({} documents)", dir.display(), report.scanned);
    println!();

    if report.suggestions.is_empty() {
        println!("Everything is in place.");
    } else {
        println!("Suggested moves:");
        println!();
        for s in &report.suggestions {
            println!(
                "  {} -> {}",
                s.current_path.display(),
                s.suggested_path.display().to_string().green()
            );
            println!(
                "    {} {:.0}%{} ({})",
                s.category.cyan().bold(),
                s.confidence * 100.0,
                if s.ai_enhanced { ", ai" } else { "" },
                s.reasons.join("; ")
            );
        }
    }

    println!();
    println!(
        "Placement OK: {}  Protected: {}  Suggestions: {}",
        report.placement_ok,
        report.protected,
        report.suggestions.len()
    );

    print_warnings(&report.warnings);
}

fn print_apply_report(report: &ApplyReport) {
    println!();

    if report.dry_run {
        println!("Dry run - no files were moved.");
        for o in &report.outcomes {
            println!(
                "  {} {} -> {}",
                "would move:".cyan(),
                o.from.display(),
                o.to.display()
            );
        }
    } else {
        for o in &report.outcomes {
            match &o.error {
                None => println!(
                    "  {} {} -> {}",
                    "moved:".green(),
                    o.from.display(),
                    o.to.display()
                ),
                Some(e) => println!(
                    "  {} {} -> {} ({})",
                    "failed:".red(),
                    o.from.display(),
                    o.to.display(),
                    e
                ),
            }
        }
    }

    println!();
    println!(
        "Applied: {}  Failed: {}  Below auto-apply threshold: {}",
        report.applied, report.failed, report.skipped
    );
}

fn print_health_report(dir: &Path, report: &HealthReport) {
    println!();
    println!("Health: {} ({} documents)", dir.display(), report.scanned);
    println!();

    let score = format!("{}/100", report.score);
    let score = if report.score >= 80 {
        score.green().bold()
    } else if report.score >= 50 {
        score.yellow().bold()
    } else {
        score.red().bold()
    };
    println!("Score: {}", score);

    if report.misplaced > 0 {
        println!();
        println!("Misplaced documents: {}", report.misplaced);
        println!("  Run doc-tidy on this directory to see suggested moves.");
    }

    if !report.naming.is_empty() {
        println!();
        println!("Naming:");
        for finding in &report.naming {
            println!("  {} - {}", finding.path.display(), finding.message);
        }
    }

    if !report.stale.is_empty() {
        println!();
        println!("Stale:");
        for path in &report.stale {
            println!("  {}", path.display());
        }
    }

    if !report.orphaned.is_empty() {
        println!();
        println!("Orphaned (not referenced by any other document):");
        for path in &report.orphaned {
            println!("  {}", path.display());
        }
    }

    print_warnings(&report.warnings);
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("{}", "Errors (non-fatal):".yellow().bold());
    for w in warnings {
        println!("  {}", w);
    }
}
