//! Response shapes for the link API.
//!
//! Field names follow the wire contract the page consumes; `type` and
//! `downloadLink` are renamed on serialization.

use serde::{Deserialize, Serialize};

/// One search result from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub year: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub thumbnail: String,
}

/// Body of `GET /api/search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

/// Quality/size/language captured from the selected download row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityInfo {
    pub quality: String,
    pub size: String,
    pub language: String,
}

impl Default for QualityInfo {
    fn default() -> Self {
        Self {
            quality: "Unknown".to_string(),
            size: "Unknown".to_string(),
            language: "Unknown".to_string(),
        }
    }
}

/// Body of `GET /api/download`.
#[derive(Debug, Serialize)]
pub struct DownloadInfo {
    pub intermediate_page_url: String,
    pub final_page_url: String,
    pub selected_quality_info: QualityInfo,
}

/// One provider anchor on the final download page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderLink {
    pub provider: String,
    pub url: String,
}

/// Links for one quality tier in the combined response.
#[derive(Debug, Serialize)]
pub struct DownloadQuality {
    pub quality: String,
    pub links: Vec<String>,
}

/// One fully resolved movie in the combined response.
#[derive(Debug, Serialize)]
pub struct CombinedEntry {
    pub title: String,
    pub year: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub poster: String,
    #[serde(rename = "downloadLink")]
    pub download_link: Vec<DownloadQuality>,
}

/// Body of `GET /api/src`.
#[derive(Debug, Serialize)]
pub struct CombinedResponse {
    pub ok: bool,
    pub developer: String,
    pub results: Vec<CombinedEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renamed_fields_on_the_wire() {
        let entry = CombinedEntry {
            title: "First".into(),
            year: "2021".into(),
            kind: "Movie".into(),
            poster: String::new(),
            download_link: vec![DownloadQuality {
                quality: "1080p".into(),
                links: vec!["https://a".into()],
            }],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("type").is_some());
        assert!(json.get("downloadLink").is_some());
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn quality_info_defaults_to_unknown() {
        let info = QualityInfo::default();
        assert_eq!(info.quality, "Unknown");
        assert_eq!(info.size, "Unknown");
        assert_eq!(info.language, "Unknown");
    }
}
