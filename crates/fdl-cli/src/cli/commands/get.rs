//! `fdl get` – download one URL, or every URL in a list file.

use anyhow::{bail, Context, Result};
use fdl_core::config::FdlConfig;
use fdl_core::resolver::UrlResolver;
use fdl_core::{run_job, JobRequest};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::cli::console::ConsoleSink;

pub async fn run_get(
    cfg: &FdlConfig,
    input: &str,
    file_name: Option<String>,
    output_dir: &Path,
    parts: Option<usize>,
    jobs: Option<usize>,
) -> Result<()> {
    // No site-specific resolvers ship with fdl.
    let resolvers: Vec<Arc<dyn UrlResolver>> = Vec::new();

    if is_url(input) {
        let request = JobRequest {
            file_name_hint: file_name,
            chunks: parts,
            ..JobRequest::new(input, output_dir)
        };
        let report = run_job(request, cfg, &resolvers, Arc::new(ConsoleSink::new()))
            .await
            .with_context(|| format!("download {}", input))?;
        tracing::debug!(path = %report.output_path.display(), elapsed = ?report.elapsed, "saved");
        return Ok(());
    }

    let text = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("read URL list {}", input))?;
    let urls = parse_url_list(&text);
    if urls.is_empty() {
        println!("No URLs in {}", input);
        return Ok(());
    }
    if file_name.is_some() {
        tracing::warn!("--file-name is ignored for URL lists");
        eprintln!("warning: --file-name is ignored for URL lists");
    }

    let jobs = jobs.unwrap_or(cfg.jobs).max(1);
    let total = urls.len();
    tracing::info!(list = input, total, jobs, "processing URL list");

    let cfg = Arc::new(cfg.clone());
    let resolvers = Arc::new(resolvers);
    let mut pending = urls.into_iter().enumerate();
    let mut set = JoinSet::new();
    let mut failed = 0usize;

    loop {
        while set.len() < jobs {
            let Some((i, url)) = pending.next() else {
                break;
            };
            let cfg = Arc::clone(&cfg);
            let resolvers = Arc::clone(&resolvers);
            let request = JobRequest {
                chunks: parts,
                ..JobRequest::new(url.clone(), output_dir)
            };
            set.spawn(async move {
                let sink = Arc::new(ConsoleSink::labelled(&(i + 1).to_string()));
                let res = run_job(request, &cfg, &resolvers, sink).await;
                (url, res)
            });
        }
        let Some(joined) = set.join_next().await else {
            break;
        };
        match joined {
            Ok((_, Ok(_))) => {}
            Ok((url, Err(e))) => {
                failed += 1;
                tracing::error!(url = %url, error = %e, "download failed");
            }
            Err(e) => {
                failed += 1;
                tracing::error!(error = %e, "download task panicked");
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} downloads failed", failed, total);
    }
    Ok(())
}

/// INPUT starting with `http` is a URL; anything else is a list file.
pub(crate) fn is_url(input: &str) -> bool {
    input.starts_with("http")
}

/// One URL per line; blank lines and `#` comments are skipped.
pub(crate) fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
