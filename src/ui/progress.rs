//! Progress indicators with CI fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

const BUILD_TEMPLATE: &str = "  {spinner:.blue} Building {prefix}  {bar:20.blue/dim} \
    {pos}/{len} {msg:.dim}  {elapsed:.dim}";

/// Longest build output line shown next to the bar
const MAX_MESSAGE_CHARS: usize = 60;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if self.interactive {
            eprintln!("{} {}", style("✗").red(), message);
        } else {
            eprintln!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Progress bar for image builds.
///
/// Understands the step markers of the classic Docker builder
/// (`Step N/M : ...`), BuildKit plain output (`#7 [N/M] ...`) and Podman
/// (`STEP N/M: ...`).
pub struct BuildProgress {
    bar: Option<ProgressBar>,
}

impl BuildProgress {
    pub fn new(ctx: &UiContext, tag: &str) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(0);
            let template = ProgressStyle::default_bar()
                .template(BUILD_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(
                template
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                    .progress_chars("━╸─"),
            );
            bar.set_prefix(tag.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Building {}...", tag);
            None
        };
        Self { bar }
    }

    /// Feed one line of build output
    pub fn on_line(&self, line: String) {
        if let Some((n, total, instruction)) = parse_step_line(&line) {
            if let Some(ref bar) = self.bar {
                bar.set_length(total);
                bar.set_position(n);
                bar.set_message(instruction.to_string());
            } else {
                println!("  Step {}/{}: {}", n, total, instruction);
            }
        } else if let Some(ref bar) = self.bar {
            let trimmed = line.trim();
            if !trimmed.is_empty() && !is_build_noise(trimmed) {
                bar.set_message(shorten(trimmed));
            }
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

fn shorten(line: &str) -> String {
    if line.chars().count() <= MAX_MESSAGE_CHARS {
        return line.to_string();
    }
    let head: String = line.chars().take(MAX_MESSAGE_CHARS - 3).collect();
    format!("{}...", head)
}

/// Builder bookkeeping lines that say nothing about the Dockerfile
fn is_build_noise(line: &str) -> bool {
    line.starts_with("--->")
        || line.starts_with("-->")
        || line.starts_with("Removing intermediate")
        || line.starts_with("COMMIT")
        || line.starts_with("Sending build context")
}

/// Parse a build step marker into `(step, total, instruction)`
fn parse_step_line(line: &str) -> Option<(u64, u64, &str)> {
    if let Some(rest) = line
        .strip_prefix("STEP ")
        .or_else(|| line.strip_prefix("Step "))
    {
        let (counts, instruction) = rest.split_once(':')?;
        let (n, total) = parse_counts(counts.trim())?;
        return Some((n, total, instruction.trim()));
    }

    // BuildKit: `#6 [2/3] RUN ...` or `#9 [stage-1 2/3] RUN ...`
    let rest = line.strip_prefix('#')?;
    let open = rest.find('[')?;
    let close = rest.find(']')?;
    if close <= open {
        return None;
    }
    let counts = rest[open + 1..close].split_whitespace().last()?;
    let (n, total) = parse_counts(counts)?;
    Some((n, total, rest[close + 1..].trim()))
}

fn parse_counts(counts: &str) -> Option<(u64, u64)> {
    let (n, total) = counts.split_once('/')?;
    Some((n.parse().ok()?, total.parse().ok()?))
}
