//! reco command-line interface.

mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reco_core::{
    compose_generation, plan, score_response, EvaluationResult, EvaluationSummary,
    GenerationRequest, Tone, ToneCatalog,
};
use reco_runtime::{
    DocumentGenerator, EvaluationOrchestrator, GenerationError, ProviderRegistry, RuntimeConfig,
};

use cli::{Cli, Commands, OutputFormat};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("reco_core=debug,reco_runtime=debug")
        } else {
            EnvFilter::new("reco_core=warn,reco_runtime=info")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let output = cli.output;
    let config_path = cli.config;

    match cli.command {
        Commands::Plan { target_length } => {
            let plan = plan(target_length);
            emit(output, &plan, || {
                format!(
                    "{} chars: {} paragraphs of ~{} chars",
                    plan.target_total_chars, plan.paragraph_count, plan.chars_per_paragraph
                )
            })
        }
        Commands::Tones => cmd_tones(output),
        Commands::Providers => cmd_providers(output),
        Commands::Prompt { request, date } => {
            let request = load_request(&request)?;
            let prompt = compose_generation(&request, date.unwrap_or_else(today))?;
            emit(output, &prompt, || prompt.to_string())
        }
        Commands::Generate {
            request,
            date,
            evaluate,
        } => cmd_generate(output, config_path.as_deref(), &request, date, evaluate).await,
        Commands::Refine {
            letter,
            notes,
            tone,
        } => {
            let tone: Tone = tone.parse()?;
            let current = read_text(&letter)?;
            let (config, generator) = generator(config_path.as_deref())?;
            tracing::debug!(model = %config.generation.model, "Refining");
            let completion = generator
                .refine_document(&current, &notes, tone)
                .await
                .map_err(explain)?;
            emit(output, &completion, || completion.text.clone())
        }
        Commands::AnalyzeStyle { sample } => {
            let sample = read_text(&sample)?;
            let (_, generator) = generator(config_path.as_deref())?;
            let profile = generator.analyze_style(&sample).await.map_err(explain)?;
            emit(output, &profile, || {
                serde_yaml::to_string(&profile).unwrap_or_default()
            })
        }
        Commands::Evaluate { letters } => {
            cmd_evaluate(output, config_path.as_deref(), &letters).await
        }
        Commands::Score { response } => {
            let raw = read_text(&response)?;
            let result = score_response(&raw, Utc::now());
            emit(output, &result, || render_result(&result))
        }
    }
}

fn cmd_tones(output: OutputFormat) -> Result<()> {
    #[derive(Serialize)]
    struct ToneRow {
        tone: Tone,
        label: &'static str,
        register: &'static str,
    }

    let rows: Vec<ToneRow> = Tone::ALL
        .into_iter()
        .map(|tone| {
            let descriptor = ToneCatalog::describe(tone);
            ToneRow {
                tone,
                label: descriptor.label,
                register: descriptor.register,
            }
        })
        .collect();

    emit(output, &rows, || {
        rows.iter()
            .map(|r| format!("{:<11} {}  {}", r.tone.as_str(), r.label, r.register))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn cmd_providers(output: OutputFormat) -> Result<()> {
    #[derive(Serialize)]
    struct ProviderRow {
        provider: &'static str,
        default_model: &'static str,
    }

    let registry = ProviderRegistry::with_defaults();
    let rows = registry
        .available_types()
        .into_iter()
        .map(|provider| {
            Ok(ProviderRow {
                provider,
                default_model: registry.default_model(provider)?,
            })
        })
        .collect::<Result<Vec<_>, reco_runtime::ProviderError>>()?;

    emit(output, &rows, || {
        rows.iter()
            .map(|r| format!("{:<10} {}", r.provider, r.default_model))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

async fn cmd_generate(
    output: OutputFormat,
    config_path: Option<&Path>,
    request_path: &Path,
    date: Option<NaiveDate>,
    evaluate: bool,
) -> Result<()> {
    let request = load_request(request_path)?;
    let mut config = load_config(config_path)?;
    let provider = config
        .build_provider()
        .context("failed to set up LLM provider")?;

    let generator = DocumentGenerator::from_config(provider.clone(), &config);
    let letter = generator
        .generate_document_on(&request, date.unwrap_or_else(today))
        .await
        .map_err(explain)?;

    if !evaluate {
        return emit(output, &letter, || letter.text.clone());
    }

    let evaluation = EvaluationOrchestrator::from_config(provider, &config)
        .evaluate(&letter.text)
        .await
        .map_err(explain)?;

    #[derive(Serialize)]
    struct Generated<'a> {
        letter: &'a reco_runtime::GenerationResult,
        evaluation: &'a EvaluationResult,
    }

    emit(
        output,
        &Generated {
            letter: &letter,
            evaluation: &evaluation,
        },
        || format!("{}\n\n---\n{}", letter.text, render_result(&evaluation)),
    )
}

async fn cmd_evaluate(
    output: OutputFormat,
    config_path: Option<&Path>,
    letters: &[PathBuf],
) -> Result<()> {
    let texts = letters
        .iter()
        .map(|path| read_text(path))
        .collect::<Result<Vec<_>>>()?;

    let mut config = load_config(config_path)?;
    let provider = config
        .build_provider()
        .context("failed to set up LLM provider")?;
    let batch = EvaluationOrchestrator::from_config(provider, &config)
        .evaluate_batch(&texts)
        .await;

    #[derive(Serialize)]
    struct Scored<'a> {
        file: &'a Path,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<&'a EvaluationResult>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    }

    #[derive(Serialize)]
    struct Report<'a> {
        letters: Vec<Scored<'a>>,
        summary: Option<EvaluationSummary>,
    }

    let report = Report {
        letters: letters
            .iter()
            .zip(&batch.outcomes)
            .map(|(file, outcome)| Scored {
                file,
                result: outcome.as_ref().ok(),
                error: outcome.as_ref().err().map(GenerationError::user_message),
            })
            .collect(),
        summary: batch.summary(),
    };

    emit(output, &report, || {
        let mut text = String::new();
        for scored in &report.letters {
            text.push_str(&format!("== {}\n", scored.file.display()));
            match (&scored.result, &scored.error) {
                (Some(result), _) => text.push_str(&render_result(result)),
                (None, Some(error)) => text.push_str(&format!("failed: {error}")),
                (None, None) => {}
            }
            text.push_str("\n\n");
        }
        if let Some(summary) = report.summary.as_ref().filter(|s| s.count > 1) {
            text.push_str(&format!(
                "== summary: {} letters, average {:.2}%\n",
                summary.count, summary.average_percentage
            ));
            for (criterion, average) in &summary.criterion_averages {
                text.push_str(&format!("  {}: {:.2}\n", criterion.label(), average));
            }
        }
        text.trim_end().to_string()
    })?;

    if batch.failures() > 0 {
        return Err(anyhow!(
            "{} of {} letters could not be evaluated",
            batch.failures(),
            letters.len()
        ));
    }
    Ok(())
}

fn render_result(result: &EvaluationResult) -> String {
    let mut lines = vec![format!(
        "Score: {:.2}/5 ({:.2}%)",
        result.average_score, result.percentage
    )];
    for (criterion, score) in result.scores.iter() {
        lines.push(format!("  {}: {}", criterion.label(), score.value()));
    }
    for warning in &result.warnings {
        lines.push(format!(
            "  warning: no score for {}, default {} applied",
            warning.criterion.label(),
            warning.default_applied.value()
        ));
    }
    if !result.improvements.is_empty() {
        lines.push("Improvements:".to_string());
        for improvement in &result.improvements {
            lines.push(format!(
                "  [{} {}점] {} - {}",
                improvement.criterion.label(),
                improvement.score.value(),
                improvement.reason,
                improvement.suggestion
            ));
        }
    }
    lines.join("\n")
}

fn emit<T: Serialize>(output: OutputFormat, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", text()),
    }
    Ok(())
}

fn explain(error: GenerationError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

fn generator(config_path: Option<&Path>) -> Result<(RuntimeConfig, DocumentGenerator)> {
    let mut config = load_config(config_path)?;
    let provider = config
        .build_provider()
        .context("failed to set up LLM provider")?;
    let generator = DocumentGenerator::from_config(provider, &config);
    Ok((config, generator))
}

fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    match path {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(RuntimeConfig::default()),
    }
}

fn load_request(path: &Path) -> Result<GenerationRequest> {
    GenerationRequest::from_file(path)
        .with_context(|| format!("failed to load request {}", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
