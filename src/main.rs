use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value as Json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triage_engine::config::EngineConfig;
use triage_engine::rules::{execute_with_config, lint, RuleSet};
use triage_engine::value::Case;

#[derive(Parser)]
#[command(name = "triage-engine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic, auditable rule-execution engine for clinical triage workflows")]
struct Cli {
    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a rule set against a case and print actions and trace
    Run {
        /// Path to the rule set document (YAML or JSON)
        #[arg(long)]
        rules: PathBuf,

        /// Path to the case document (YAML or JSON)
        #[arg(long)]
        case: PathBuf,

        /// Optional JSON Schema document to validate the rule set against
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Override the default iteration cap
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Statically analyze a rule set without running it
    Lint {
        /// Path to the rule set document (YAML or JSON)
        #[arg(long)]
        rules: PathBuf,

        /// Optional JSON Schema document to validate the rule set against
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("triage_engine={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("triage-engine v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Run {
            rules,
            case,
            schema,
            max_iterations,
        } => run(&rules, &case, schema.as_deref(), max_iterations),
        Command::Lint { rules, schema } => lint_cmd(&rules, schema.as_deref()),
    }
}

fn load_ruleset(path: &std::path::Path) -> Result<RuleSet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading rule set from {}", path.display()))?;
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        Ok(RuleSet::from_json_str(&text)?)
    } else {
        Ok(RuleSet::from_yaml_str(&text)?)
    }
}

fn load_case(path: &std::path::Path) -> Result<Case> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading case from {}", path.display()))?;
    let case = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&text)?
    } else {
        serde_yaml::from_str(&text)?
    };
    Ok(case)
}

fn load_schema(path: &std::path::Path) -> Result<Json> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading schema from {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn run(
    rules_path: &std::path::Path,
    case_path: &std::path::Path,
    schema_path: Option<&std::path::Path>,
    max_iterations: Option<usize>,
) -> Result<()> {
    let ruleset = load_ruleset(rules_path)?;
    let case = load_case(case_path)?;

    if let Some(schema_path) = schema_path {
        let raw = serde_yaml::from_str::<Json>(&fs::read_to_string(rules_path)?)?;
        let schema = load_schema(schema_path)?;
        let diagnostics = lint(&ruleset, Some(&schema), Some(&raw));
        for diagnostic in &diagnostics {
            tracing::warn!(tag = %diagnostic.tag, "{}", diagnostic.message);
        }
    }

    let config = match max_iterations {
        Some(max_iterations) => EngineConfig { max_iterations },
        None => EngineConfig::default(),
    };

    let (actions, trace) = execute_with_config(&ruleset, &case, &config)?;
    info!(
        action_count = actions.len(),
        trace_len = trace.len(),
        "execution complete"
    );

    let output = serde_json::json!({ "actions": actions, "trace": trace });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn lint_cmd(rules_path: &std::path::Path, schema_path: Option<&std::path::Path>) -> Result<()> {
    let ruleset = load_ruleset(rules_path)?;
    let (raw, schema) = match schema_path {
        Some(schema_path) => {
            let raw = serde_yaml::from_str::<Json>(&fs::read_to_string(rules_path)?)?;
            let schema = load_schema(schema_path)?;
            (Some(raw), Some(schema))
        }
        None => (None, None),
    };
    let diagnostics = lint(&ruleset, schema.as_ref(), raw.as_ref());
    info!(diagnostic_count = diagnostics.len(), "lint complete");
    println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    Ok(())
}
