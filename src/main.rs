use clap::Parser;
use ops_primer::config::{Cli, Command, GuideAction};
use ops_primer::utils::error::ErrorSeverity;
use ops_primer::utils::logger;
use ops_primer::{
    AgentConfig, Guide, HttpMetricSource, MetricsExporter, PrimerError, SysinfoCpuSampler,
    SystemdController, Watchdog,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting ops-primer");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let result = match cli.command {
        Command::Guide { action } => run_guide(action),
        Command::Export {
            config,
            endpoint,
            interval,
            cycles,
        } => run_export(&config, endpoint, interval, cycles).await,
        Command::Watch {
            config,
            unit,
            threshold,
            interval,
            cycles,
        } => run_watch(&config, unit, threshold, interval, cycles).await,
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn run_guide(action: GuideAction) -> ops_primer::Result<()> {
    match action {
        GuideAction::List { file } => {
            let guide = Guide::load(&file)?;
            println!("📚 {} entries in {}", guide.len(), file);
            for entry in guide.entries() {
                println!(
                    "  {:>3}. {} ({} words, {} snippet(s))",
                    entry.id,
                    entry.title,
                    entry.answer_words(),
                    entry.snippets.len()
                );
            }
            Ok(())
        }
        GuideAction::Search { query, file } => {
            let guide = Guide::load(&file)?;
            let hits = guide.search(&query);
            if hits.is_empty() {
                println!("🔍 No entries match '{}'", query);
                return Ok(());
            }
            println!("🔍 {} match(es) for '{}':", hits.len(), query);
            for entry in hits {
                println!("  {:>3}. {}", entry.id, entry.title);
            }
            Ok(())
        }
        GuideAction::Check { file } => {
            let guide = Guide::load(&file)?;
            let unanswered = guide.unanswered();
            if unanswered.is_empty() {
                println!("✅ All {} entries have answers", guide.len());
                return Ok(());
            }
            for entry in &unanswered {
                println!("❌ Entry {} ('{}') has no answer", entry.id, entry.title);
            }
            Err(PrimerError::GuideError {
                message: format!("{} entries have empty answers", unanswered.len()),
            })
        }
        GuideAction::Export {
            file,
            format,
            output,
        } => {
            let guide = Guide::load(&file)?;
            let rendered = match format.as_str() {
                "json" => guide.to_json()?,
                "csv" => guide.to_csv()?,
                other => {
                    return Err(PrimerError::InvalidConfigValueError {
                        field: "format".to_string(),
                        value: other.to_string(),
                        reason: "Expected 'json' or 'csv'".to_string(),
                    })
                }
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("📁 Exported {} entries to {}", guide.len(), path);
                }
                None => println!("{}", rendered),
            }
            Ok(())
        }
    }
}

async fn run_export(
    config_path: &str,
    endpoint: Option<String>,
    interval: Option<u64>,
    cycles: Option<u64>,
) -> ops_primer::Result<()> {
    let config = AgentConfig::load_or_default(config_path)?;
    let settings = config.resolve_exporter(endpoint, interval, cycles)?;

    tracing::info!("✅ Exporter config resolved for agent '{}'", config.agent_name());

    let source = HttpMetricSource::new(settings.endpoint.clone());
    let mut exporter = MetricsExporter::new(source, settings);
    exporter.run().await
}

async fn run_watch(
    config_path: &str,
    unit: Option<String>,
    threshold: Option<f32>,
    interval: Option<u64>,
    cycles: Option<u64>,
) -> ops_primer::Result<()> {
    let config = AgentConfig::load_or_default(config_path)?;
    let settings = config.resolve_watchdog(unit, threshold, interval, cycles)?;

    tracing::info!("✅ Watchdog config resolved for agent '{}'", config.agent_name());

    let mut watchdog = Watchdog::new(SysinfoCpuSampler::new(), SystemdController, settings);
    watchdog.run().await
}
