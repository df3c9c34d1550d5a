//! The link API: an index page and four GET endpoints.
//!
//! Search scans the catalog's result list; download follows a movie page
//! to its intermediate download page and on to the final page URL; final
//! lists every provider link by quality; src chains all three per search
//! hit. Handler failures render as `{"error": ...}` JSON bodies.

use std::sync::Arc;

use crate::client::Catalog;
use crate::config::Config;
use crate::extract::LinkExtractor;
use crate::models::{
    CombinedEntry, CombinedResponse, DownloadInfo, DownloadQuality, SearchHit, SearchResponse,
};
use crate::{App, Error, Req, Res, Result};

/// Shared state behind every handler.
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    pub extractor: LinkExtractor,
}

/// Register the index page and the four API routes.
pub fn routes(app: &mut App<AppState>) {
    app.get("/", index);
    app.get("/api/search", search);
    app.get("/api/download", download);
    app.get("/api/final", final_links);
    app.get("/api/src", combined);
}

async fn index(_req: Req, _state: Arc<AppState>) -> Result<Res> {
    Ok(Res::html(include_str!("../assets/index.html")))
}

async fn search(req: Req, state: Arc<AppState>) -> Result<Res> {
    let query = req
        .query_param("query")
        .ok_or_else(|| Error::bad_request("Query parameter is required"))?;
    let results = search_hits(&state, &query).await?;
    Ok(Res::json(&SearchResponse { query, results }))
}

async fn download(req: Req, state: Arc<AppState>) -> Result<Res> {
    let url = req
        .query_param("url")
        .ok_or_else(|| Error::bad_request("URL parameter is required"))?;
    let info = download_info(&state, &url).await?;
    Ok(Res::json(&info))
}

async fn final_links(req: Req, state: Arc<AppState>) -> Result<Res> {
    let url = req
        .query_param("url")
        .ok_or_else(|| Error::bad_request("URL parameter is required"))?;

    let html = state.catalog.get_text(&url).await?;
    let sections = state.extractor.provider_sections(&html);
    if sections.is_empty() {
        return Err(Error::not_found("No download links found"));
    }

    let mut body = serde_json::Map::new();
    for (quality, links) in sections {
        body.insert(quality, serde_json::to_value(links)?);
    }
    Ok(Res::json(&serde_json::Value::Object(body)))
}

async fn combined(req: Req, state: Arc<AppState>) -> Result<Res> {
    let query = req
        .query_param("query")
        .ok_or_else(|| Error::bad_request("Query parameter is required"))?;

    let hits = search_hits(&state, &query).await?;
    let mut results = Vec::new();
    for hit in hits {
        match resolve_entry(&state, &hit).await {
            Ok(entry) => results.push(entry),
            Err(err) => {
                tracing::warn!(title = %hit.title, error = %err, "skipping search hit");
            }
        }
    }

    Ok(Res::json(&CombinedResponse {
        ok: true,
        developer: state.config.developer.clone(),
        results,
    }))
}

async fn search_hits(state: &AppState, query: &str) -> Result<Vec<SearchHit>> {
    let encoded = serde_urlencoded::to_string([("s", query)]).unwrap_or_default();
    let url = format!("{}/?{}", state.config.catalog_base_url, encoded);
    let html = state.catalog.get_text(&url).await?;
    Ok(state.extractor.search_hits(&html))
}

async fn download_info(state: &AppState, url: &str) -> Result<DownloadInfo> {
    let html = state.catalog.get_text(url).await?;

    let (link, selected_row) = match state.extractor.best_download_block(&html) {
        Some(block) => (block.link, Some(block.raw)),
        None => {
            let link = state
                .extractor
                .fallback_download_link(&html)
                .ok_or_else(|| Error::not_found("Download link not found on the page."))?;
            (link, None)
        }
    };

    let intermediate = state.catalog.get_text(&link).await?;
    let final_page_url = state.extractor.final_page_url(&intermediate).ok_or_else(|| {
        Error::not_found("Final download page URL not found on intermediate page.")
    })?;

    let selected_quality_info = selected_row
        .map(|row| state.extractor.quality_info(&row))
        .unwrap_or_default();

    Ok(DownloadInfo {
        intermediate_page_url: link,
        final_page_url,
        selected_quality_info,
    })
}

/// Resolve one search hit down to its provider links. Any failure along
/// the chain drops the hit from the combined response.
async fn resolve_entry(state: &AppState, hit: &SearchHit) -> Result<CombinedEntry> {
    let info = download_info(state, &hit.url).await?;
    let final_html = state.catalog.get_text(&info.final_page_url).await?;

    let sections = state.extractor.provider_sections(&final_html);
    if sections.is_empty() {
        return Err(Error::not_found("No download links found"));
    }

    let download_link = sections
        .into_iter()
        .map(|(quality, links)| DownloadQuality {
            quality,
            links: links.into_iter().map(|link| link.url).collect(),
        })
        .collect();

    Ok(CombinedEntry {
        title: hit.title.clone(),
        year: hit.year.clone(),
        kind: hit.kind.clone(),
        poster: hit.thumbnail.clone(),
        download_link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_index_and_api_routes() {
        let state = AppState {
            config: Config::default(),
            catalog: Catalog::new(),
            extractor: LinkExtractor::new().unwrap(),
        };
        let mut app = App::new(state);
        routes(&mut app);

        assert_eq!(app.route_count(), 5);
        for path in ["/", "/api/search", "/api/download", "/api/final", "/api/src"] {
            assert!(app.has_route(path), "missing route {path}");
        }
    }
}
