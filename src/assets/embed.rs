use rayon::prelude::*;

use crate::assets::data_url::{encode_data_url, is_data_url};
use crate::assets::fetch::{ResourceFetcher, truncate_for_log};
use crate::document::{Document, NodeId};
use crate::foundation::error::{CollageError, CollageResult};

/// Options for [`embed_images`].
#[derive(Clone, Debug, Default)]
pub struct EmbedOpts {
    /// Fetch worker count. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Base URL that relative image locators are resolved against.
    pub base_url: Option<String>,
}

/// Outcome of a successful embedding pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmbedReport {
    /// References rewritten to `data:` URLs.
    pub embedded: usize,
    /// References that were already inline and left alone.
    pub already_inline: usize,
    /// Images without any source locator.
    pub missing_href: usize,
}

#[derive(Debug)]
struct EmbedJob {
    node: NodeId,
    url: String,
}

/// Inline every external raster reference in `doc` as a `data:` URL.
///
/// All fetches run concurrently and every one of them runs to completion before this returns.
/// If any fetch fails, the first failure in document order is returned and the document is left
/// untouched; otherwise every reference is rewritten exactly once.
#[tracing::instrument(skip_all)]
pub fn embed_images(
    doc: &mut Document,
    fetcher: &dyn ResourceFetcher,
    opts: &EmbedOpts,
) -> CollageResult<EmbedReport> {
    let mut report = EmbedReport::default();
    let mut jobs = Vec::new();
    for node in doc.descendants_by_tag(doc.root(), "image") {
        let Some(href) = doc.element(node).and_then(|e| e.href()) else {
            report.missing_href += 1;
            continue;
        };
        if is_data_url(href) {
            report.already_inline += 1;
            continue;
        }
        let url = resolve_locator(href, opts.base_url.as_deref())?;
        jobs.push(EmbedJob { node, url });
    }

    if jobs.is_empty() {
        return Ok(report);
    }

    let pool = build_thread_pool(opts.threads)?;
    let results = pool.install(|| {
        jobs.par_iter()
            .map(|job| -> CollageResult<(NodeId, String)> {
                let res = fetcher.fetch(&job.url)?;
                tracing::debug!(
                    url = %truncate_for_log(&job.url),
                    bytes = res.bytes.len(),
                    "fetched image"
                );
                Ok((
                    job.node,
                    encode_data_url(&res.bytes, res.content_type.as_deref()),
                ))
            })
            .collect::<Vec<_>>()
    });

    // Barrier: every fetch has finished. Apply nothing unless all of them succeeded.
    let rewrites = results.into_iter().collect::<CollageResult<Vec<_>>>()?;
    for (node, data_url) in rewrites {
        doc.expect_element_mut(node)?.set_href(data_url);
        report.embedded += 1;
    }

    tracing::info!(
        embedded = report.embedded,
        already_inline = report.already_inline,
        "embedded images"
    );
    Ok(report)
}

/// Resolve an image locator against an optional base URL.
///
/// Absolute URLs, and any locator when no base is set, are returned unchanged.
pub fn resolve_locator(href: &str, base: Option<&str>) -> CollageResult<String> {
    let Some(base) = base else {
        return Ok(href.to_owned());
    };
    if url::Url::parse(href).is_ok() {
        return Ok(href.to_owned());
    }
    let base = url::Url::parse(base)
        .map_err(|e| CollageError::validation(format!("invalid base URL \"{base}\": {e}")))?;
    let joined = base.join(href).map_err(|e| {
        CollageError::validation(format!("cannot resolve \"{href}\" against {base}: {e}"))
    })?;
    Ok(joined.to_string())
}

fn build_thread_pool(threads: Option<usize>) -> CollageResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CollageError::validation(
            "embedding 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CollageError::validation(format!("failed to build fetch thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/embed.rs"]
mod tests;
