//! Fetch command - download the newest compatible slice registry

use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::error::{SliceError, SliceResult};
use crate::fetch;
use crate::ui::{self, TaskSpinner, UiContext};
use std::path::PathBuf;
use tokio::task;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> SliceResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let root = config.registry.root.clone();

    let url = match args.url {
        Some(url) => url,
        None => {
            let branch = match args.branch {
                Some(branch) => branch,
                None => latest_branch(&ctx, config).await?,
            };
            fetch::archive_url(&config.fetch.archive_url, &branch)
        }
    };

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Downloading {}...", url));
    let data = match blocking({
        let url = url.clone();
        move || fetch::download(&url)
    })
    .await
    {
        Ok(data) => data,
        Err(e) => {
            spinner.stop_error("Download failed");
            return Err(e);
        }
    };
    spinner.stop(&format!("Downloaded {} KiB", data.len() / 1024));

    tokio::fs::create_dir_all(&root)
        .await
        .map_err(|e| SliceError::io(format!("creating {}", root.display()), e))?;

    // Hidden staging directory; registry scans skip it
    let staging = tempfile::Builder::new()
        .prefix(".fetch-")
        .tempdir_in(&root)
        .map_err(|e| SliceError::io("creating staging directory", e))?;

    let unpacked: PathBuf = blocking({
        let staging = staging.path().to_path_buf();
        move || fetch::unpack(&data, &staging)
    })
    .await?;

    let target = fetch::install_target(&unpacked, &root)?;
    if target.exists() {
        let question = format!("Replace existing {}?", target.display());
        if !ui::confirm(&ctx, &question, true).await? {
            ui::step_warn_hint(
                &ctx,
                &format!("Kept {}", target.display()),
                "Run with --yes to replace it",
            );
            return Ok(());
        }
    }

    let installed = blocking(move || fetch::install(&unpacked, &root)).await?;
    ui::step_ok_detail(&ctx, "Slices installed", &installed.display().to_string());
    Ok(())
}

/// Newest branch of the slice repository for this tool's major version
async fn latest_branch(ctx: &UiContext, config: &Config) -> SliceResult<String> {
    let major = config.registry_major()?;
    let url = config.fetch.branches_url.clone();

    let mut spinner = TaskSpinner::new(ctx);
    spinner.start("Looking up slice releases...");

    let branch = blocking(move || {
        let branches = fetch::list_branches(&url)?;
        fetch::select_branch(&branches, major)
    })
    .await;

    match branch {
        Ok(branch) => {
            spinner.stop(&format!("Latest release for {}.x is {}", major, branch));
            Ok(branch)
        }
        Err(e) => {
            spinner.stop_error("Release lookup failed");
            Err(e)
        }
    }
}

/// Run blocking network or archive work off the async runtime
async fn blocking<T, F>(work: F) -> SliceResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> SliceResult<T> + Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| SliceError::Internal(format!("fetch task failed: {}", e)))?
}
