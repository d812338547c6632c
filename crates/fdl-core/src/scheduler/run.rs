//! Drives one job from URL to stitched output file.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::config::FdlConfig;
use crate::downloader;
use crate::error::JobError;
use crate::fetch_head::{self, ResolveError, ResourceInfo};
use crate::resolver::{find_resolver, UrlResolver};
use crate::segmenter::{max_chunks_for, plan_chunks, Chunk, PlanError};
use crate::sink::{JobSink, Level};
use crate::size_fmt::format_size;
use crate::storage::{self, WorkDir, TEMP_FOLDER};
use crate::url_model::sanitize_file_name;

use super::job::{advance, DownloadJob, JobReport, JobRequest, JobState};
use super::progress::{spawn_aggregator, ProgressSampler, ProgressSnapshot};

/// Fallback chunk count when neither the request nor the config sets one
/// and the platform cannot report its parallelism.
const FALLBACK_CHUNKS: usize = 4;

/// Runs a single download: resolve, plan, fetch in parallel, stitch.
///
/// The sink is opened first and closed last, whatever the outcome; a
/// failure is emitted at [`Level::Fatal`] before it is returned.
pub async fn run_job(
    request: JobRequest,
    cfg: &FdlConfig,
    resolvers: &[Arc<dyn UrlResolver>],
    sink: Arc<dyn JobSink>,
) -> Result<JobReport, JobError> {
    sink.open(&request.url);
    let result = drive(request, cfg, resolvers, &sink).await;
    if let Err(e) = &result {
        tracing::debug!(stage = e.stage(), "job failed");
        sink.emit(Level::Fatal, &e.to_string());
    }
    sink.close();
    result
}

struct Resolved {
    url: String,
    info: ResourceInfo,
    /// `{title}.{extension}` from a page resolver.
    titled_name: Option<String>,
}

async fn drive(
    mut request: JobRequest,
    cfg: &FdlConfig,
    resolvers: &[Arc<dyn UrlResolver>],
    sink: &Arc<dyn JobSink>,
) -> Result<JobReport, JobError> {
    let started = Instant::now();
    let mut state = JobState::Created;
    advance(&mut state, JobState::Resolving);

    // Without a subscriber the snapshots still go somewhere; the report
    // carries the final one.
    let progress_tx = request
        .progress
        .take()
        .unwrap_or_else(|| watch::channel(ProgressSnapshot::default()).0);

    let Planned { mut job, chunks } = match plan(&request, cfg, resolvers).await {
        Ok(planned) => planned,
        Err(e) => {
            advance(&mut state, JobState::Failed);
            return Err(e);
        }
    };
    job.advance(JobState::Planned);
    progress_tx.send_replace(ProgressSnapshot {
        total_size: job.total_size,
        chunk_count: job.chunk_count,
        ..ProgressSnapshot::default()
    });

    sink.emit(
        Level::Info,
        &format!("Downloading \"{}\" ({})", job.output_name, format_size(job.total_size)),
    );

    job.advance(JobState::Fetching);
    let temp_root = cfg.temp_root();
    let work_dir = match WorkDir::create(&temp_root, &job.output_name) {
        Ok(wd) => wd,
        Err(source) => {
            job.advance(JobState::Failed);
            return Err(JobError::WorkDir {
                path: temp_root.join(TEMP_FOLDER),
                source,
            });
        }
    };

    let interval = cfg.progress_interval();
    let sampler = ProgressSampler::new(work_dir.part_paths(chunks.len()), job.total_size, interval);
    let aggregator = spawn_aggregator(sampler, interval, Arc::clone(sink), progress_tx);

    let fetched = {
        let url = job.source_url.clone();
        let wd = work_dir.clone();
        tokio::task::spawn_blocking(move || downloader::fetch_chunks(&url, &chunks, &wd)).await
    };
    let fetched = match fetched {
        Ok(res) => res.map_err(JobError::from),
        Err(_) => Err(JobError::Join("fetch")),
    };
    let finished = aggregator.finish().await.map_err(|_| JobError::Join("progress"));
    let (parts, progress) = match (fetched, finished) {
        (Ok(parts), Ok(progress)) => (parts, progress),
        (Err(e), _) | (_, Err(e)) => {
            job.advance(JobState::Failed);
            discard_work_dir(&work_dir, cfg, sink.as_ref());
            return Err(e);
        }
    };
    job.advance(JobState::Fetched);

    job.advance(JobState::Stitching);
    let output_path = job.output_path();
    let stitched = {
        let out = output_path.clone();
        tokio::task::spawn_blocking(move || storage::stitch(&out, &parts)).await
    };
    let stitched = match stitched {
        Ok(res) => res.map_err(JobError::from),
        Err(_) => Err(JobError::Join("stitch")),
    };
    let written = match stitched {
        Ok(n) => n,
        Err(e) => {
            job.advance(JobState::Failed);
            discard_work_dir(&work_dir, cfg, sink.as_ref());
            return Err(e);
        }
    };
    if let Err(e) = work_dir.remove() {
        tracing::warn!(path = %work_dir.path().display(), error = %e, "could not remove work directory");
    }
    job.advance(JobState::Complete);

    let elapsed = started.elapsed();
    tracing::info!(
        path = %output_path.display(),
        bytes = written,
        chunks = job.chunk_count,
        "download complete"
    );
    sink.emit(Level::Info, &format!("Done downloading \"{}\"", job.output_name));
    sink.emit(Level::Debug, &format!("Download took {}", format_elapsed(elapsed)));

    Ok(JobReport {
        output_path,
        total_size: job.total_size,
        chunk_count: job.chunk_count,
        elapsed,
        progress,
    })
}

struct Planned {
    job: DownloadJob,
    chunks: Vec<Chunk>,
}

/// Resolves the resource, picks the output name and chunk layout.
async fn plan(
    request: &JobRequest,
    cfg: &FdlConfig,
    resolvers: &[Arc<dyn UrlResolver>],
) -> Result<Planned, JobError> {
    let resolved = resolve(&request.url, resolvers).await?;
    let total_size = resolved.info.total_size;
    if total_size == 0 {
        return Err(PlanError::EmptyResource.into());
    }

    let candidate = match request.usable_hint() {
        Some(hint) => hint.to_string(),
        None => resolved
            .titled_name
            .unwrap_or(resolved.info.suggested_name),
    };
    let name = sanitize_file_name(&candidate);
    if name.is_empty() {
        return Err(JobError::EmptyName { candidate });
    }

    let chunk_count = choose_chunk_count(request.chunks, cfg, total_size);
    let chunks = plan_chunks(total_size, chunk_count)?;

    tokio::fs::create_dir_all(&request.output_dir)
        .await
        .map_err(|source| JobError::OutputDir {
            path: request.output_dir.clone(),
            source,
        })?;
    let output_name =
        storage::resolve_name(&request.output_dir, &name).map_err(|source| JobError::OutputDir {
            path: request.output_dir.clone(),
            source,
        })?;

    tracing::debug!(
        url = %resolved.url,
        total_size,
        chunk_count,
        name = %output_name,
        "job planned"
    );

    let job = DownloadJob {
        source_url: resolved.url,
        output_dir: request.output_dir.clone(),
        output_name,
        total_size,
        chunk_count,
        state: JobState::Resolving,
    };
    Ok(Planned { job, chunks })
}

/// Page resolver (if one matches) then HEAD probe, on a blocking thread.
async fn resolve(url: &str, resolvers: &[Arc<dyn UrlResolver>]) -> Result<Resolved, JobError> {
    let page = url.to_string();
    let resolver = find_resolver(resolvers, url);
    let res = tokio::task::spawn_blocking(move || -> Result<Resolved, ResolveError> {
        let (direct, titled_name) = match resolver {
            Some(r) => {
                let collaborator = |e: anyhow::Error| ResolveError::Collaborator {
                    url: page.clone(),
                    reason: format!("{:#}", e),
                };
                let direct = r.resolve_direct_url(&page).map_err(collaborator)?;
                let title = r.resolve_title(&page).map_err(collaborator)?;
                tracing::debug!(page = %page, direct = %direct, "page resolved");
                (direct, Some(format!("{}.{}", title, r.extension())))
            }
            None => (page.clone(), None),
        };
        let info = fetch_head::resolve_resource(&direct)?;
        Ok(Resolved {
            url: direct,
            info,
            titled_name,
        })
    })
    .await
    .map_err(|_| JobError::Join("resolve"))?;
    Ok(res?)
}

/// Request override, then config, then available parallelism; clamped so no
/// chunk is empty.
fn choose_chunk_count(requested: Option<usize>, cfg: &FdlConfig, total_size: u64) -> usize {
    let wanted = requested.or(cfg.chunks).unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_CHUNKS)
    });
    let max = max_chunks_for(total_size);
    if wanted > max {
        tracing::warn!(wanted, max, total_size, "too many chunks for resource size, clamping");
        return max;
    }
    wanted
}

fn discard_work_dir(work_dir: &WorkDir, cfg: &FdlConfig, sink: &dyn JobSink) {
    if cfg.keep_failed_parts {
        sink.emit(
            Level::Info,
            &format!("Kept part files in {}", work_dir.path().display()),
        );
        return;
    }
    if let Err(e) = work_dir.remove() {
        tracing::warn!(path = %work_dir.path().display(), error = %e, "could not remove work directory");
    }
}

/// `{h}h {m}m {s}s {ms}ms`
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let h = total_ms / 3_600_000;
    let m = total_ms / 60_000 % 60;
    let s = total_ms / 1000 % 60;
    let ms = total_ms % 1000;
    format!("{}h {}m {}s {}ms", h, m, s, ms)
}
