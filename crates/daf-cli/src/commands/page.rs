use anyhow::Context;
use daf_engine::{CachedRequestHandler, PageResponse, RequestHandler};
use daf_sefaria::{HttpRequestMaker, RecordedRequestMaker, RecordingRequestMaker, RequestMaker, RetryConfig};

use crate::bootstrap::{Loaded, engine_options};
use crate::cli::{GlobalFlags, PageArgs};
use crate::output::output;

/// Handle `daf page`.
pub async fn handle(args: &PageArgs, loaded: Loaded, flags: &GlobalFlags) -> anyhow::Result<()> {
    let pages = fetch(args, loaded).await?;
    match pages.as_slice() {
        [page] => output(page, flags.format),
        _ => output(&pages, flags.format),
    }
}

async fn fetch(args: &PageArgs, loaded: Loaded) -> anyhow::Result<Vec<PageResponse>> {
    if let Some(dir) = &args.replay {
        return render(RecordedRequestMaker::new(dir), args, loaded).await;
    }

    let sefaria = &loaded.config.sefaria;
    let http = HttpRequestMaker::new(
        &sefaria.base_url,
        &sefaria.user_agent,
        sefaria.timeout(),
        RetryConfig {
            max_attempts: sefaria.max_attempts,
            base_delay: sefaria.base_delay(),
            max_delay: sefaria.max_delay(),
        },
    )
    .context("failed to build HTTP client")?;

    match &args.record {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            render(RecordingRequestMaker::new(http, dir), args, loaded).await
        }
        None => render(http, args, loaded).await,
    }
}

async fn render<R: RequestMaker>(
    maker: R,
    args: &PageArgs,
    loaded: Loaded,
) -> anyhow::Result<Vec<PageResponse>> {
    let options = engine_options(&loaded.config)?;
    let handler = RequestHandler::new(maker)?.with_tables(loaded.tables).with_options(options);
    let failed = |page: &str| format!("failed to render {} {page}", args.book);

    let mut rendered = Vec::with_capacity(args.pages.len());
    if loaded.config.cache.enabled {
        let cached = CachedRequestHandler::new(handler, loaded.config.cache.max_weight)?;
        for page in &args.pages {
            let response = cached
                .handle_request(&args.book, page)
                .await
                .with_context(|| failed(page.as_str()))?;
            rendered.push(response);
        }
        return Ok(rendered);
    }

    for page in &args.pages {
        let result = handler.render(&args.book, page).await.with_context(|| failed(page.as_str()))?;
        if !result.complete {
            tracing::warn!(book = %args.book, %page, "some commentary could not be fetched");
        }
        rendered.push(result.page);
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use daf_config::DafConfig;
    use daf_core::StaticTables;
    use daf_sefaria::MemoryRequestMaker;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn loaded(cache: bool) -> Loaded {
        let mut config = DafConfig::default();
        config.cache.enabled = cache;
        Loaded { config, tables: StaticTables::default() }
    }

    fn args(pages: &[&str], replay: Option<PathBuf>) -> PageArgs {
        PageArgs {
            book: "Brachot".to_string(),
            pages: pages.iter().map(ToString::to_string).collect(),
            replay,
            record: None,
        }
    }

    fn corpus() -> MemoryRequestMaker {
        MemoryRequestMaker::new()
            .with_text("Berakhot 2a", vec!["מאימתי"], vec!["From when"])
            .with_text("Berakhot 2b", vec!["תנא"], vec!["It was taught"])
    }

    #[tokio::test]
    async fn replays_recorded_pages() {
        let dir = tempfile::tempdir().unwrap();
        let recorded = render(
            RecordingRequestMaker::new(corpus(), dir.path()),
            &args(&["2a", "2b"], None),
            loaded(false),
        )
        .await
        .unwrap();

        let replayed = fetch(&args(&["2a", "2b"], Some(dir.path().to_path_buf())), loaded(false))
            .await
            .unwrap();
        assert_eq!(replayed, recorded);
        assert_eq!(replayed[1].title, "Berakhot 2b");
    }

    #[tokio::test]
    async fn repeated_pages_are_rendered_once_with_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let pages = render(
            RecordingRequestMaker::new(corpus(), dir.path()),
            &args(&["2a", "2a"], None),
            loaded(true),
        )
        .await
        .unwrap();
        assert_eq!(pages[0], pages[1]);

        let replayed = fetch(&args(&["2a"], Some(dir.path().to_path_buf())), loaded(true)).await.unwrap();
        assert_eq!(replayed, vec![pages[0].clone()]);
    }

    #[tokio::test]
    async fn missing_recordings_fail_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let error = fetch(&args(&["2a"], Some(dir.path().to_path_buf())), loaded(false)).await.unwrap_err();
        assert!(format!("{error:#}").starts_with("failed to render Brachot 2a"));
    }
}
