use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use futures::future::join_all;

use device_inspector::config::loader::default_settings_path;
use device_inspector::export::suggested_file_name;
use device_inspector::{
    AppError, DiagnosticResult, DiagnosticsService, DiagnosticsSettings, ExportFormat,
    ExportOptions, ExportOutcome, ExportRequest, Exporter, FileSink, LogCollector,
    SettingsManager, StaticHardwareFacts,
};

/// Run every diagnostic once and export the results
#[derive(Parser, Debug)]
#[command(name = "device_inspector", version, about)]
struct Args {
    /// Settings file (JSON); defaults are used when it does not exist
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Export format, repeatable: text, json, pdf, xlsx, qr. All when omitted.
    #[arg(long = "format", value_name = "FMT", value_parser = clap::value_parser!(ExportFormat))]
    formats: Vec<ExportFormat>,

    /// Override the export directory from the settings file
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("[Main] ERROR: {:#}", e);
            return ExitCode::from(2);
        }
    };

    // =========================================================================
    // LOGGING INITIALIZATION - MUST BE FIRST
    // =========================================================================
    let collector = match LogCollector::install(&settings.log_dir, settings.log_level_filter()) {
        Ok(collector) => Some(collector),
        Err(e) => {
            eprintln!("[Main] WARNING: logging to disk disabled: {}", e);
            None
        }
    };
    log::info!(
        "[Main] Device Inspector {} starting",
        device_inspector::VERSION
    );

    let code = if run(settings, &args).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    };

    if let Some(collector) = collector {
        if let Err(e) = collector.wait_for_empty().await {
            eprintln!("[Main] WARNING: log flush failed: {}", e);
        }
    }
    code
}

fn load_settings(args: &Args) -> anyhow::Result<DiagnosticsSettings> {
    let path = args.config.clone().unwrap_or_else(default_settings_path);
    let mut settings = SettingsManager::load(&path)
        .with_context(|| format!("loading settings from {}", path.display()))?;
    if let Some(dir) = &args.out_dir {
        settings.export_dir = dir.clone();
    }
    Ok(settings)
}

/// Returns whether every run and export succeeded
async fn run(settings: DiagnosticsSettings, args: &Args) -> bool {
    let formats = if args.formats.is_empty() {
        ExportFormat::ALL.to_vec()
    } else {
        args.formats.clone()
    };
    let export_dir = settings.export_dir.clone();
    let options = ExportOptions::from_settings(&settings);
    let service = DiagnosticsService::new(Arc::new(StaticHardwareFacts::demo()), settings);

    // Health and benchmark are independent; comparison reads the benchmark
    let (health, benchmark) = tokio::join!(service.run_health(), service.run_benchmark());
    let comparison = service.run_comparison().await;

    let mut results: Vec<DiagnosticResult> = Vec::new();
    let mut all_ok = true;
    for outcome in [
        health.map(DiagnosticResult::from),
        benchmark.map(DiagnosticResult::from),
        comparison.map(DiagnosticResult::from),
    ] {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                let e = AppError::from(e);
                log::error!("[Main] {}", e);
                eprintln!("{}", e.user_message());
                all_ok = false;
            }
        }
    }

    for result in &results {
        println!("{}", summary_line(result));
    }

    let exporter = Exporter::new(options);
    let mut jobs = Vec::new();
    for result in &results {
        for format in &formats {
            let name = suggested_file_name(result.kind(), *format, &exporter.options().generated_at);
            let sink = tokio::sync::Mutex::new(FileSink::new(export_dir.join(name)));
            let request = ExportRequest::new(result.clone(), *format);
            let exporter = &exporter;
            jobs.push(async move { exporter.export(request, &sink).await });
        }
    }

    for outcome in join_all(jobs).await {
        match &outcome {
            ExportOutcome::Success { .. } => println!("{}", outcome.message()),
            ExportOutcome::Failure { .. } => {
                eprintln!("{}", outcome.message());
                all_ok = false;
            }
        }
    }

    all_ok
}

fn summary_line(result: &DiagnosticResult) -> String {
    match result {
        DiagnosticResult::HealthCheck(r) => {
            format!("Health: {}/100 ({})", r.overall_score, r.overall_status)
        }
        DiagnosticResult::Performance(r) => {
            format!("Performance: {}/100 (grade {})", r.overall_score, r.grade)
        }
        DiagnosticResult::Comparison(r) => format!(
            "Comparison: #{} of {} ({:.1} percentile)",
            r.overall_comparison.overall_ranking,
            r.overall_comparison.total_devices,
            r.overall_comparison.percentile
        ),
    }
}
