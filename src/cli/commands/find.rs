//! Find command - list the slices available for an OS

use crate::cli::args::{FindArgs, OutputFormat};
use crate::config::Config;
use crate::error::SliceResult;
use crate::format::FormatKind;
use crate::slice::{scan_registry, ScanOptions, Slice};
use crate::ui::{self, UiContext};
use crate::version::VersionIdentifier;
use console::style;
use serde::Serialize;

/// One row of `sb find` output
#[derive(Debug, Serialize)]
struct SliceSummary<'a> {
    name: &'a str,
    label: &'a str,
    bunch: String,
    path: &'a str,
    os: &'a [VersionIdentifier],
    dependencies: &'a [VersionIdentifier],
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<String>,
}

impl<'a> SliceSummary<'a> {
    fn new(slice: &'a Slice, show: bool) -> Self {
        let identifier = slice.identifier();
        Self {
            name: identifier.name(),
            label: identifier.label(),
            bunch: version_text(identifier),
            path: slice.relative_path(),
            os: slice.os_identifiers(),
            dependencies: slice.dependency_identifiers(),
            script: show.then(|| shell_script(slice)),
        }
    }
}

/// Execute the find command
pub async fn execute(args: FindArgs, config: &Config) -> SliceResult<()> {
    let os = args.os.unwrap_or_else(|| config.registry.os.clone());
    let options = ScanOptions::new(config.registry_major()?, &os)?;
    let registry = scan_registry(&config.registry.root, &options)?;

    let slices: Vec<&Slice> = registry.matching(&args.names).collect();

    if slices.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, &format!("No slices found for '{}'", os));
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&os, &slices, args.show),
        OutputFormat::Json => print_json(&slices, args.show)?,
        OutputFormat::Plain => print_plain(&slices, args.show),
    }

    Ok(())
}

fn print_table(os: &str, slices: &[&Slice], show: bool) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, &format!("Slices for {}", os));

    println!(
        "{:<24} {:<10} {:<40}",
        style("LABEL").bold(),
        style("BUNCH").bold(),
        style("PATH").bold()
    );
    println!("{}", "-".repeat(76));

    for slice in slices {
        println!(
            "{:<24} {:<10} {:<40}",
            slice.identifier().label(),
            version_text(slice.identifier()),
            style(slice.relative_path()).dim()
        );
        if show {
            print_script(slice);
        }
    }

    println!();
    println!("{} slice(s)", slices.len());
}

fn print_json(slices: &[&Slice], show: bool) -> SliceResult<()> {
    let summaries: Vec<SliceSummary> = slices.iter().map(|s| SliceSummary::new(s, show)).collect();
    let json = serde_json::to_string_pretty(&summaries)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(slices: &[&Slice], show: bool) {
    for slice in slices {
        println!("{}", slice.identifier().label());
        if show {
            print_script(slice);
        }
    }
}

fn print_script(slice: &Slice) {
    for line in shell_script(slice).lines() {
        println!("    {}", line);
    }
}

/// A single slice rendered as shell, without its dependencies
fn shell_script(slice: &Slice) -> String {
    FormatKind::Shell.formatter().write(slice.sections())
}

fn version_text(identifier: &VersionIdentifier) -> String {
    let bunch = identifier.bunch();
    format!("{}.{}", bunch.major, bunch.minor)
}
