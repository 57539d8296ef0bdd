//! Make command - render layers into a shell script or Dockerfile

use crate::cli::args::MakeArgs;
use crate::config::Config;
use crate::error::{SliceError, SliceResult};
use crate::format::FormatKind;
use crate::layer::{output_path, parse_layer_list, resolve, Resolution};
use crate::ui::{self, UiContext};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// `--out` value that writes to stdout
const STDOUT: &str = "-";

/// Execute the make command
pub async fn execute(args: MakeArgs, config: &Config) -> SliceResult<()> {
    let ctx = UiContext::detect();

    let format = FormatKind::parse(args.format.as_deref().unwrap_or(&config.output.format))?;
    let os = args.os.unwrap_or_else(|| config.registry.os.clone());
    let resolution = resolve_layers(&ctx, &args.layers, &os, config)?;
    let content = resolution.render(format);

    match args.out {
        Some(ref out) if out.as_os_str() == STDOUT => {
            print!("{}", content);
        }
        out => {
            let path = out.unwrap_or_else(|| {
                output_path(&config.output.dir, &resolution.label, format)
            });
            write_output(&path, &content).await?;
            ui::step_ok_detail(
                &ctx,
                &format!("Wrote {} for {} on {}", format, resolution.label, os),
                &path.display().to_string(),
            );
        }
    }

    Ok(())
}

/// Parse, resolve and check a layer list; every missing slice is
/// reported before failing
pub(crate) fn resolve_layers(
    ctx: &UiContext,
    layers: &str,
    os: &str,
    config: &Config,
) -> SliceResult<Resolution> {
    let layers = parse_layer_list(layers)?;
    let resolution = resolve(&config.registry.root, &layers, os, config.registry_major()?)?;

    for missing in &resolution.missing {
        ui::step_error(ctx, &format!("No slice satisfies {} on {}", missing, os));
    }
    resolution.ensure_complete()?;

    Ok(resolution)
}

/// Replace `path` with `content`, creating parent directories
async fn write_output(path: &Path, content: &str) -> SliceResult<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SliceError::io(format!("creating {}", parent.display()), e))?;
    }

    if path.exists() {
        debug!("Replacing {}", path.display());
        fs::remove_file(path)
            .await
            .map_err(|e| SliceError::io(format!("removing {}", path.display()), e))?;
    }

    fs::write(path, content)
        .await
        .map_err(|e| SliceError::io(format!("writing {}", path.display()), e))?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_output_creates_and_replaces() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("jekyll-3").join("jekyll-3.sh");

        write_output(&path, "old\n").await.unwrap();
        write_output(&path, "new\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn missing_slices_fail_resolution() {
        let temp = TempDir::new().unwrap();
        let bunch = temp.path().join("slices-1");
        std::fs::create_dir_all(&bunch).unwrap();
        std::fs::write(bunch.join("debian-8"), "OS\ndebian-8").unwrap();

        let mut config = Config::default();
        config.registry.root = temp.path().to_path_buf();
        config.registry.major = Some(1);

        let ctx = UiContext::non_interactive();
        let err = resolve_layers(&ctx, "node", "debian", &config).unwrap_err();
        assert!(matches!(err, SliceError::MissingSlices(ref names) if names == &["node"]));

        let resolution = resolve_layers(&ctx, "debian", "debian", &config).unwrap();
        assert_eq!(resolution.label, "debian-8");
    }
}
