//! Statute lists from the e-Gov registry.
//!
//! Two list endpoints exist:
//! - API v1 `lawlists/1`: every statute, as XML (`LawNameListInfo` records).
//! - API v2 `laws?category_cd=…`: statutes of one official category, as JSON,
//!   including kana readings and abbreviations.

use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

use crate::config::HarvesterConfig;
use crate::error::{HarvesterError, Result};
use crate::http::{bytes_to_string, create_client, download_bytes};
use crate::types::StatuteReference;
use crate::xml::{find_child, find_descendants, own_text, parse_document};

/// Pseudo-category covering the whole registry.
pub const ALL_CATEGORY: &str = "すべて";

/// Official e-Gov statute categories and their codes.
pub const CATEGORIES: &[(&str, &str)] = &[
    ("憲法", "001"),
    ("刑事", "002"),
    ("財務通則", "003"),
    ("水産業", "004"),
    ("観光", "005"),
    ("国会", "006"),
    ("警察", "007"),
    ("国有財産", "008"),
    ("鉱業", "009"),
    ("郵務", "010"),
    ("行政組織", "011"),
    ("消防", "012"),
    ("国税", "013"),
    ("工業", "014"),
    ("電気通信", "015"),
    ("国家公務員", "016"),
    ("国土開発", "017"),
    ("事業", "018"),
    ("商業", "019"),
    ("労働", "020"),
    ("行政手続", "021"),
    ("土地", "022"),
    ("国債", "023"),
    ("金融・保険", "024"),
    ("環境保全", "025"),
    ("統計", "026"),
    ("都市計画", "027"),
    ("教育", "028"),
    ("外国為替・貿易", "029"),
    ("厚生", "030"),
    ("地方自治", "031"),
    ("道路", "032"),
    ("文化", "033"),
    ("陸運", "034"),
    ("社会福祉", "035"),
    ("地方財政", "036"),
    ("河川", "037"),
    ("産業通則", "038"),
    ("海運", "039"),
    ("社会保険", "040"),
    ("司法", "041"),
    ("災害対策", "042"),
    ("農業", "043"),
    ("航空", "044"),
    ("防衛", "045"),
    ("民事", "046"),
    ("建築・住宅", "047"),
    ("林業", "048"),
    ("貨物運送", "049"),
    ("外事", "050"),
];

/// Look up the code of an official category.
///
/// # Examples
/// ```
/// use hourei_harvester::catalog::category_code;
///
/// assert_eq!(category_code("建築・住宅"), Some("047"));
/// assert_eq!(category_code("宇宙"), None);
/// ```
pub fn category_code(name: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|(category, _)| *category == name)
        .map(|(_, code)| *code)
}

/// Which list to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Every statute (API v1).
    All,
    /// One official category (API v2).
    Category { name: String, code: String },
}

impl CatalogSource {
    /// Resolve a category name; `すべて` (or no name) selects every statute.
    pub fn from_name(name: Option<&str>) -> Result<Self> {
        match name {
            None | Some(ALL_CATEGORY) => Ok(Self::All),
            Some(name) => category_code(name)
                .map(|code| Self::Category {
                    name: name.to_string(),
                    code: code.to_string(),
                })
                .ok_or_else(|| HarvesterError::UnknownCategory(name.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORY,
            Self::Category { name, .. } => name,
        }
    }
}

/// The currently loaded statute list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatuteCatalog {
    entries: Vec<StatuteReference>,
}

impl StatuteCatalog {
    pub fn new(entries: Vec<StatuteReference>) -> Self {
        Self { entries }
    }

    /// Find the statute shown under `label`. The first match wins.
    pub fn resolve(&self, label: &str) -> Option<&StatuteReference> {
        self.entries.iter().find(|entry| entry.display_label == label)
    }

    /// Statutes whose display label contains `keyword`.
    pub fn search<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a StatuteReference> {
        self.entries
            .iter()
            .filter(move |entry| entry.display_label.contains(keyword))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatuteReference> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load a statute list from the registry.
pub fn load_catalog(config: &HarvesterConfig, source: &CatalogSource) -> Result<StatuteCatalog> {
    let client = create_client(config.list_timeout)?;
    let entries = match source {
        CatalogSource::All => fetch_all(&client, config)?,
        CatalogSource::Category { code, .. } => fetch_category(&client, config, code)?,
    };
    tracing::info!(source = source.name(), count = entries.len(), "Loaded statute list");
    Ok(StatuteCatalog::new(entries))
}

/// Download the full statute list (API v1).
pub fn fetch_all(client: &Client, config: &HarvesterConfig) -> Result<Vec<StatuteReference>> {
    let url = config.list_v1_url();
    let bytes = download_list(client, &url, config)?;
    parse_law_list_xml(&bytes_to_string(&bytes, "statute list"))
}

/// Download the statutes of one category (API v2).
pub fn fetch_category(
    client: &Client,
    config: &HarvesterConfig,
    code: &str,
) -> Result<Vec<StatuteReference>> {
    let url = Url::parse_with_params(
        &config.list_v2_url(),
        &[
            ("category_cd", code.to_string()),
            ("limit", config.category_limit.to_string()),
        ],
    )?;
    let bytes = download_list(client, url.as_str(), config)?;
    parse_category_json(&bytes)
}

fn download_list(client: &Client, url: &str, config: &HarvesterConfig) -> Result<Vec<u8>> {
    download_bytes(client, url, config.max_response_size).map_err(|e| match e {
        HarvesterError::Http(source) => HarvesterError::ListDownload {
            url: url.to_string(),
            source,
        },
        other => other,
    })
}

/// Parse the API v1 statute list.
///
/// Missing `LawName` or `LawId` children become empty strings.
pub fn parse_law_list_xml(xml: &str) -> Result<Vec<StatuteReference>> {
    let doc = parse_document(xml)?;

    let entries = find_descendants(doc.root(), "LawNameListInfo")
        .map(|info| {
            let name = find_child(info, "LawName").map(own_text).unwrap_or_default();
            let id = find_child(info, "LawId").map(own_text).unwrap_or_default();
            StatuteReference::new(name, id)
        })
        .collect();

    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct LawsResponse {
    #[serde(default)]
    laws: Vec<LawEntry>,
}

#[derive(Debug, Deserialize)]
struct LawEntry {
    #[serde(default)]
    law_info: Option<LawInfo>,
    #[serde(default)]
    current_revision_info: Option<RevisionInfo>,
}

#[derive(Debug, Deserialize)]
struct LawInfo {
    #[serde(default)]
    law_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RevisionInfo {
    #[serde(default)]
    law_title: Option<String>,
    #[serde(default)]
    law_title_kana: Option<String>,
    #[serde(default)]
    abbrev: Option<String>,
    #[serde(default)]
    law_revision_id: Option<String>,
}

impl RevisionInfo {
    fn is_empty(&self) -> bool {
        self.law_title.is_none()
            && self.law_title_kana.is_none()
            && self.abbrev.is_none()
            && self.law_revision_id.is_none()
    }
}

/// Parse the API v2 category list, sorted by kana reading.
///
/// Entries without revision info are skipped. The law ID comes from
/// `law_info.law_id`, falling back to the prefix of `law_revision_id`.
pub fn parse_category_json(bytes: &[u8]) -> Result<Vec<StatuteReference>> {
    let response: LawsResponse = serde_json::from_slice(bytes)?;

    let mut entries: Vec<StatuteReference> = response
        .laws
        .into_iter()
        .filter_map(|entry| {
            let info = entry.current_revision_info.filter(|info| !info.is_empty())?;

            let id = entry
                .law_info
                .and_then(|law_info| law_info.law_id)
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| {
                    info.law_revision_id
                        .as_deref()
                        .and_then(|rev| rev.split('_').next())
                        .unwrap_or_default()
                        .to_string()
                });

            let reference = StatuteReference::new(info.law_title.unwrap_or_default(), id)
                .with_abbreviation(info.abbrev.as_deref().unwrap_or_default())
                .with_kana(info.law_title_kana.unwrap_or_default());

            Some(reference)
        })
        .collect();

    entries.sort_by(|a, b| a.kana.cmp(&b.kana));
    Ok(entries)
}
