//! Fans project building out over all discovered modules.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::core::{PipegenError, Result};
use crate::project::{Project, ProjectBuilder};
use crate::resolver::DependencyResolver;

/// Build a [`Project`] for every module path, at most `max_parallel`
/// in flight at once.
///
/// Every build runs as its own tokio task, so modules resolve in
/// parallel on the runtime's worker threads even though resolution
/// itself does blocking file I/O. Skipped modules (parents, `skip`
/// locals) contribute nothing. On the first builder error no further
/// module starts expensive work; already in-flight builds drain, then
/// that first error is returned. Result order is completion order, so
/// nondeterministic under concurrency.
pub async fn collect_projects(
    resolver: &Arc<DependencyResolver>,
    module_paths: &[String],
    max_parallel: usize,
) -> Result<Vec<Project>> {
    let failed = Arc::new(AtomicBool::new(false));
    let first_error: Arc<Mutex<Option<PipegenError>>> = Arc::new(Mutex::new(None));
    let projects: Arc<Mutex<Vec<Project>>> = Arc::new(Mutex::new(Vec::new()));

    // The map is lazy, so at most `max_parallel` tasks are spawned and
    // unjoined at any moment.
    let joins = stream::iter(module_paths.iter().cloned().map(|path| {
        let resolver = Arc::clone(resolver);
        let failed = Arc::clone(&failed);
        let first_error = Arc::clone(&first_error);
        let projects = Arc::clone(&projects);
        tokio::spawn(async move {
            if failed.load(Ordering::SeqCst) {
                debug!(path = %path, "skipping after earlier failure");
                return;
            }
            match ProjectBuilder::new(&resolver).build(&path).await {
                Ok(Some(project)) => projects.lock().await.push(project),
                Ok(None) => {}
                Err(err) => {
                    warn!(path = %path, %err, "project build failed");
                    failed.store(true, Ordering::SeqCst);
                    let mut slot = first_error.lock().await;
                    if slot.is_none() {
                        *slot = Some(err);
                    }
                }
            }
        })
    }))
    .buffer_unordered(max_parallel.max(1))
    .collect::<Vec<_>>()
    .await;

    for join in joins {
        if let Err(err) = join
            && err.is_panic()
        {
            std::panic::resume_unwind(err.into_panic());
        }
    }

    let first_error = Arc::try_unwrap(first_error)
        .expect("all project build tasks joined")
        .into_inner();
    if let Some(err) = first_error {
        return Err(err);
    }
    let projects =
        Arc::try_unwrap(projects).expect("all project build tasks joined").into_inner();
    Ok(projects)
}
