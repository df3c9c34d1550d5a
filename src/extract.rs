//! Regex extraction over catalog HTML.
//!
//! The catalog has no API; search pages, movie pages, and download pages
//! are plain HTML and get scanned with the patterns below. Patterns are
//! compiled once and shared through [`LinkExtractor`].

use regex::Regex;

use crate::models::{ProviderLink, QualityInfo, SearchHit};
use crate::{Error, Result};

/// A download table row carrying a `/links/` anchor.
#[derive(Debug, Clone)]
pub struct DownloadBlock {
    /// Intermediate download page URL.
    pub link: String,
    /// Raw row markup, kept for quality/size/language capture.
    pub raw: String,
    /// Parsed numeric quality of the row.
    pub quality: u32,
}

/// Compiled patterns for every page kind the service scrapes.
pub struct LinkExtractor {
    result_item: Regex,
    title_anchor: Regex,
    year: Regex,
    kind: Regex,
    description: Regex,
    img_src: Regex,
    link_row: Regex,
    qua: Regex,
    siz: Regex,
    lan: Regex,
    links_href: Regex,
    downbtn_anchor: Regex,
    final_url: Regex,
    quality_div: Regex,
    heading: Regex,
    anchor: Regex,
    href: Regex,
    tag: Regex,
    digits: Regex,
}

impl LinkExtractor {
    /// Compile the pattern set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            result_item: compile(r#"class=["'][^"']*result-item"#)?,
            title_anchor: compile(r#"(?s)class=["']title["'][^>]*>\s*<a\b([^>]*)>(.*?)</a>"#)?,
            year: compile(r#"(?s)class=["']year["'][^>]*>(.*?)<"#)?,
            kind: compile(r#"(?s)class=["']movies["'][^>]*>(.*?)<"#)?,
            description: compile(r#"(?s)class=["']contenido["'][^>]*>\s*<p[^>]*>(.*?)</p>"#)?,
            img_src: compile(r#"<img\b[^>]*?src=["']([^"']+)["']"#)?,
            link_row: compile(r#"(?s)<tr\b[^>]*\bid=["']link-[^"']*["'][^>]*>.*?</tr>"#)?,
            qua: compile(r#"class=['"]qua['"]>([^<]+)"#)?,
            siz: compile(r#"class=['"]siz['"]>\[([^\]]+)"#)?,
            lan: compile(r#"class=['"]lan['"]>\(([^\)]+)"#)?,
            links_href: compile(r#"<a\b[^>]*?href=["']([^"']*/links/[^"']*)["']"#)?,
            downbtn_anchor: compile(
                r#"(?s)<a\b[^>]*?href=["']([^"']+)["'][^>]*>\s*<button\b[^>]*\bdownbtn"#,
            )?,
            final_url: compile(r#"https?://linkedmoviehub\.top[^\s'"]+"#)?,
            quality_div: compile(r#"<div\b[^>]*\bclass=["'][^"']*quality[^"']*["']"#)?,
            heading: compile(r#"(?s)<h2[^>]*>(.*?)</h2>"#)?,
            anchor: compile(r#"(?s)<a\b([^>]*)>(.*?)</a>"#)?,
            href: compile(r#"href\s*=\s*["']([^"']+)["']"#)?,
            tag: compile(r#"<[^>]*>"#)?,
            digits: compile(r#"\d+"#)?,
        })
    }

    /// Numeric quality of a label like `1080p`; 0 when no digits appear.
    pub fn parse_quality(&self, quality: &str) -> u32 {
        self.digits
            .find(quality)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }

    /// Result items on a catalog search page. Items without a titled link
    /// are dropped, matching how the page renders partial entries.
    pub fn search_hits(&self, html: &str) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        for chunk in chunks(&self.result_item, html) {
            let Some(title) = self.title_anchor.captures(chunk) else {
                continue;
            };
            let attrs = title.get(1).map_or("", |m| m.as_str());
            let Some(url) = self.href.captures(attrs).map(|c| c[1].to_string()) else {
                continue;
            };

            hits.push(SearchHit {
                title: self.text_content(title.get(2).map_or("", |m| m.as_str())),
                url,
                year: self
                    .capture_text(&self.year, chunk)
                    .unwrap_or_else(|| "N/A".to_string()),
                kind: self
                    .capture_text(&self.kind, chunk)
                    .unwrap_or_else(|| "Unknown".to_string()),
                description: self
                    .capture_text(&self.description, chunk)
                    .unwrap_or_default(),
                thumbnail: self
                    .img_src
                    .captures(chunk)
                    .map(|c| c[1].to_string())
                    .unwrap_or_default(),
            });
        }
        hits
    }

    /// The `link-` row with the numerically highest quality that carries a
    /// `/links/` anchor. Ties keep the earlier row.
    pub fn best_download_block(&self, html: &str) -> Option<DownloadBlock> {
        let mut best: Option<DownloadBlock> = None;
        for row in self.link_row.find_iter(html) {
            let raw = row.as_str();
            let quality = self
                .qua
                .captures(raw)
                .map_or(0, |c| self.parse_quality(&c[1]));
            let Some(link) = self.links_href.captures(raw).map(|c| c[1].to_string()) else {
                continue;
            };

            if best.as_ref().is_none_or(|b| quality > b.quality) {
                best = Some(DownloadBlock {
                    link,
                    raw: raw.to_string(),
                    quality,
                });
            }
        }
        best
    }

    /// Anchor wrapping a `downbtn` button; the fallback when no link row
    /// matched.
    pub fn fallback_download_link(&self, html: &str) -> Option<String> {
        self.downbtn_anchor
            .captures(html)
            .map(|c| c[1].to_string())
    }

    /// First final-page URL on an intermediate download page.
    pub fn final_page_url(&self, html: &str) -> Option<String> {
        self.final_url.find(html).map(|m| m.as_str().to_string())
    }

    /// Quality, bracketed size, and parenthesized language from a selected
    /// row; `Unknown` where a field is absent.
    pub fn quality_info(&self, block: &str) -> QualityInfo {
        let mut info = QualityInfo::default();
        if let Some(c) = self.qua.captures(block) {
            info.quality = c[1].trim().to_string();
        }
        if let Some(c) = self.siz.captures(block) {
            info.size = c[1].trim().to_string();
        }
        if let Some(c) = self.lan.captures(block) {
            info.language = c[1].trim().to_string();
        }
        info
    }

    /// Quality sections on a final download page: each `quality` div's h2
    /// label with the `down-btn` provider anchors that follow it, up to the
    /// next section. Sections without links are dropped.
    pub fn provider_sections(&self, html: &str) -> Vec<(String, Vec<ProviderLink>)> {
        let mut sections = Vec::new();
        for chunk in chunks(&self.quality_div, html) {
            let Some(label) = self
                .heading
                .captures(chunk)
                .map(|c| self.text_content(&c[1]))
            else {
                continue;
            };

            let mut links = Vec::new();
            for anchor in self.anchor.captures_iter(chunk) {
                let attrs = &anchor[1];
                if !attrs.contains("down-btn") {
                    continue;
                }
                let Some(url) = self.href.captures(attrs).map(|c| c[1].to_string()) else {
                    continue;
                };
                links.push(ProviderLink {
                    provider: self.text_content(&anchor[2]),
                    url,
                });
            }

            if !links.is_empty() {
                sections.push((label, links));
            }
        }
        sections
    }

    fn capture_text(&self, pattern: &Regex, chunk: &str) -> Option<String> {
        pattern
            .captures(chunk)
            .map(|c| self.text_content(c.get(1).map_or("", |m| m.as_str())))
    }

    fn text_content(&self, fragment: &str) -> String {
        let stripped = self.tag.replace_all(fragment, " ");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| Error::Custom(format!("invalid pattern: {}", err)))
}

/// Slice `html` into chunks, each starting at a marker match and running
/// to the next match or the end of the document.
fn chunks<'a>(marker: &Regex, html: &'a str) -> Vec<&'a str> {
    let starts: Vec<usize> = marker.find_iter(html).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(html.len());
            &html[start..end]
        })
        .collect()
}
