//! SafeBridge - composite occupational risk scoring
//!
//! Command-line front end for the scorer and the prediction pipeline.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};

use safebridge::prediction::PredictionOutcome;
use safebridge::risk::{HealthSample, IncidentRecord, RiskInputs, RiskLevel, RiskResult};
use safebridge::{
    Collaborators, CompositeScorer, JsonLinesStore, PredictionRequest, PredictionStore,
    RiskPredictor, SafeBridgeConfig, SafeBridgeError, WeightPreset,
};

#[derive(Parser)]
#[command(name = "safebridge")]
#[command(version)]
#[command(about = "Composite occupational risk scoring for field workers", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the configured data directory
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blend four component levels into an overall risk
    Score {
        /// Weather risk level (1-5)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        weather: u8,

        /// Industry risk level (1-5)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        industry: u8,

        /// Health risk level (1-5)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        health: u8,

        /// Historical incident risk level (1-5)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        historical: u8,

        /// Weight preset: balanced, weather-focused, health-focused
        #[arg(long, value_name = "NAME")]
        preset: Option<WeightPreset>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a full prediction for a request file and persist it
    Predict {
        /// JSON prediction request
        #[arg(short, long, value_name = "FILE")]
        request: PathBuf,

        /// Evaluation instant (RFC 3339, defaults to now)
        #[arg(long, value_parser = parse_instant)]
        now: Option<DateTime<Utc>>,

        /// Weight preset: balanced, weather-focused, health-focused
        #[arg(long, value_name = "NAME")]
        preset: Option<WeightPreset>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show saved predictions for a worker
    History {
        /// Worker id
        #[arg(short, long)]
        user: String,

        /// Maximum number of predictions to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record evidence in the data store
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ReportAction {
    /// Record a workplace incident
    Incident {
        /// Emergency type, e.g. heatstroke or fall
        #[arg(long = "type", value_name = "TYPE")]
        kind: String,

        /// Severity level (1-5)
        #[arg(long)]
        severity: u8,

        /// When the incident happened (RFC 3339, defaults to now)
        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,
    },

    /// Record a health sample for a worker
    Health {
        /// Worker id
        #[arg(short, long)]
        user: String,

        /// Heart rate in bpm
        #[arg(long)]
        heart_rate: Option<u32>,

        /// Systolic blood pressure in mmHg
        #[arg(long)]
        systolic: Option<u32>,

        /// Self-reported stress (0-10)
        #[arg(long)]
        stress: Option<u8>,

        /// Self-reported fatigue (0-10)
        #[arg(long)]
        fatigue: Option<u8>,

        /// When the sample was taken (RFC 3339, defaults to now)
        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration as JSON
    Show,
    /// Validate the settings file
    Validate,
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{}': {}", s, e))
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable
    let filter = if cli.verbose {
        "safebridge=debug,info"
    } else {
        "safebridge=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> safebridge::Result<()> {
    let project_path = cli.project.canonicalize().unwrap_or(cli.project.clone());

    if !project_path.exists() {
        return Err(SafeBridgeError::Other(anyhow::anyhow!(
            "Project directory does not exist: {}",
            project_path.display()
        )));
    }

    match cli.command {
        Commands::Score {
            weather,
            industry,
            health,
            historical,
            preset,
            json,
        } => {
            let mut config = SafeBridgeConfig::load(&project_path)?;
            if let Some(preset) = preset {
                config.apply_preset(preset);
            }
            config.validate()?;

            let inputs = RiskInputs::from_levels(
                level_arg("weather", weather)?,
                level_arg("industry", industry)?,
                level_arg("health", health)?,
                level_arg("historical", historical)?,
            );
            let result = CompositeScorer::new(config.to_scorer_config()?).compute(&inputs);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }

        Commands::Predict {
            request,
            now,
            preset,
            json,
        } => {
            let mut config = SafeBridgeConfig::load(&project_path)?;
            if let Some(preset) = preset {
                config.apply_preset(preset);
            }
            config.validate()?;

            let request = read_request(&request)?;
            let store = JsonLinesStore::new(data_dir(&cli.data_dir, &config, &project_path));
            let predictor = RiskPredictor::new(
                config.to_scorer_config()?,
                config.alerts.clone(),
                Collaborators::uniform(&store),
            );
            let outcome = predictor.predict(&request, now.unwrap_or_else(Utc::now))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }

        Commands::History { user, limit, json } => {
            let config = SafeBridgeConfig::load(&project_path)?;
            let store = JsonLinesStore::new(data_dir(&cli.data_dir, &config, &project_path));
            let records = store.predictions_for(&user, limit)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("{} No predictions for {}", "Info:".blue(), user);
            } else {
                println!("\n{} Predictions for {}", "History:".cyan().bold(), user);
                println!("{}", "─".repeat(60));
                for record in &records {
                    println!(
                        "   {}  {}  confidence {:.2}  {} / {} ({})",
                        record.prediction_date,
                        paint_level(record.risk_level),
                        record.confidence_score,
                        record.region,
                        record.industry_sector,
                        record.timeframe
                    );
                }
            }
        }

        Commands::Report { action } => {
            let config = SafeBridgeConfig::load(&project_path)?;
            let store = JsonLinesStore::new(data_dir(&cli.data_dir, &config, &project_path));

            match action {
                ReportAction::Incident { kind, severity, at } => {
                    let at = at.unwrap_or_else(Utc::now);
                    let incident = IncidentRecord::new(at, kind, severity);
                    store.add_incident(&incident)?;
                    println!(
                        "{} Recorded {} incident (severity {}) at {}",
                        "OK".green(),
                        incident.emergency_type,
                        incident.severity_level,
                        incident.created_at.to_rfc3339()
                    );
                }

                ReportAction::Health {
                    user,
                    heart_rate,
                    systolic,
                    stress,
                    fatigue,
                    at,
                } => {
                    let mut sample = HealthSample::new(at.unwrap_or_else(Utc::now));
                    sample.heart_rate = heart_rate;
                    sample.systolic_pressure = systolic;
                    sample.stress_level = stress;
                    sample.fatigue_level = fatigue;
                    store.add_health_sample(&user, sample)?;
                    println!("{} Recorded health sample for {}", "OK".green(), user);
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = SafeBridgeConfig::load(&project_path)?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }

            ConfigAction::Validate => {
                let settings_path = SafeBridgeConfig::settings_path(&project_path);

                if settings_path.exists() {
                    let config = SafeBridgeConfig::load(&project_path)?;
                    config.validate()?;
                    println!("{} settings.json is valid", "OK".green());
                } else {
                    println!(
                        "{} settings.json not found (using defaults)",
                        "Info:".blue()
                    );
                }
            }
        },
    }

    Ok(())
}

fn level_arg(name: &str, value: u8) -> safebridge::Result<RiskLevel> {
    RiskLevel::try_from(value)
        .map_err(|e| SafeBridgeError::invalid_request(format!("{}: {}", name, e)))
}

fn read_request(path: &Path) -> safebridge::Result<PredictionRequest> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        SafeBridgeError::invalid_request(format!("{}: {}", path.display(), e))
    })
}

fn data_dir(overridden: &Option<PathBuf>, config: &SafeBridgeConfig, project: &Path) -> PathBuf {
    match overridden {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => project.join(dir),
        None => config.data_dir(project),
    }
}

fn paint_level(level: RiskLevel) -> ColoredString {
    let text = level.to_string();
    match level {
        RiskLevel::Severe => text.red().bold(),
        RiskLevel::High => text.red(),
        RiskLevel::Moderate => text.yellow(),
        RiskLevel::Low | RiskLevel::Minimal => text.green(),
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{}", title.bold());
    for item in items {
        println!("   - {}", item);
    }
}

fn print_result(result: &RiskResult) {
    println!("\n{} Risk Assessment", "Risk:".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("   Overall:     {}", paint_level(result.overall_risk));
    println!("   Weather:     {}", paint_level(result.weather_risk));
    println!("   Industry:    {}", paint_level(result.industry_risk));
    println!("   Health:      {}", paint_level(result.health_risk));
    println!("   Historical:  {}", paint_level(result.historical_risk));
    println!("   Confidence:  {:.2}", result.confidence);

    print_list("Primary risk factors", &result.analysis.primary_risk_factors);
    print_list("Urgent actions", &result.analysis.urgent_actions);
    print_list("Recommendations", &result.recommendations);
}

fn print_outcome(outcome: &PredictionOutcome) {
    print_result(&outcome.result);

    for score in outcome.inputs.iter().filter(|s| s.is_insufficient()) {
        if let Some(ref message) = score.message {
            println!("{} {}: {}", "Note:".yellow(), score.component.label(), message);
        }
    }

    println!(
        "\n{} Saved prediction {} ({} incidents in window, trend {})",
        "OK".green(),
        outcome.record.id,
        outcome.incident_summary.total_incidents,
        outcome.incident_summary.trend
    );

    if let Some(ref alert) = outcome.notification {
        println!(
            "{} {} (priority {}) sent to {}",
            "Alert:".red().bold(),
            alert.title,
            alert.priority,
            alert.recipient_id
        );
    }
}
