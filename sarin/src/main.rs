use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mimalloc::MiMalloc;
use sarin_core::{Report, Sarin};
use tokio_util::sync::CancellationToken;
use tracing::error;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let output = args.output.clone();
    let quiet = args.quiet;

    let plan = match args.into_plan() {
        Ok(plan) => plan,
        Err(e) => {
            error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let core = match Sarin::new(plan).await {
        Ok(core) => core,
        Err(e) => {
            error!("setup failed: {e}");
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let progress = if quiet {
        None
    } else {
        Some(progress_bar(core.plan().requests))
    };

    {
        let run = core.run(cancel.clone());
        tokio::pin!(run);
        let mut ticker = tokio::time::interval(Duration::from_millis(250));
        loop {
            tokio::select! {
                _ = &mut run => break,
                _ = ticker.tick() => {
                    if let Some(bar) = &progress {
                        bar.set_position(core.completed());
                    }
                }
            }
        }
    }

    if let Some(bar) = progress {
        bar.set_position(core.completed());
        bar.finish_and_clear();
    }

    match output {
        cli::OutputFormat::None => {}
        cli::OutputFormat::Json => print_json(&core.stats()),
        cli::OutputFormat::Yaml => print_yaml(&core.stats()),
        cli::OutputFormat::Table => print_table(&core.stats()),
    }
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
            );
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {pos} requests [{elapsed_precise}]")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar
        }
    }
}

fn print_json(report: &Report) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("failed to encode report: {e}"),
    }
}

fn print_yaml(report: &Report) {
    match serde_yaml::to_string(report) {
        Ok(yaml) => print!("{yaml}"),
        Err(e) => error!("failed to encode report: {e}"),
    }
}

fn print_table(report: &Report) {
    const HEADERS: [&str; 8] = ["Response", "Count", "Min", "Max", "Average", "P90", "P95", "P99"];

    let mut rows: Vec<[String; 8]> = Vec::with_capacity(report.responses.len() + 1);
    for (label, stat) in &report.responses {
        rows.push([
            label.clone(),
            stat.count.to_string(),
            stat.min.to_string(),
            stat.max.to_string(),
            stat.average.to_string(),
            stat.p90.to_string(),
            stat.p95.to_string(),
            stat.p99.to_string(),
        ]);
    }
    rows.push([
        "Total".to_owned(),
        report.total.count.to_string(),
        report.total.min.to_string(),
        report.total.max.to_string(),
        report.total.average.to_string(),
        report.total.p90.to_string(),
        report.total.p95.to_string(),
        report.total.p99.to_string(),
    ]);

    let mut widths: [usize; 8] = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let print_row = |cells: [&str; 8]| {
        let mut line = String::new();
        for (index, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
            if index > 0 {
                line.push_str("  ");
            }
            line.push_str(&format!("{:<width$}", cell, width = *width));
        }
        println!("{}", line.trim_end());
    };

    print_row(HEADERS);
    print_row(widths.map(|w| "-".repeat(w)).each_ref().map(|s| s.as_str()));
    for row in &rows {
        print_row(row.each_ref().map(|s| s.as_str()));
    }
}
