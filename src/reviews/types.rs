use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{path::PathBuf, time::SystemTime};

/// Metadata header of a review document. Keys follow the camelCase names
/// used by the content files; everything is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    #[serde(alias = "coverImage")]
    pub featured_image: Option<String>,
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,
    pub author: Option<String>,
    pub is_review: bool,
    pub product_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub product_price: Option<String>,
    pub rating: Option<f64>,
    pub affiliate_link: Option<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub verdict: Option<String>,
}

/// Accepts strings, numbers and booleans for fields that are text on our
/// side but are often written unquoted in front matter (`date: 2024-01-01`,
/// `productPrice: 199.90`).
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        // TOML datetimes arrive as a single-entry table
        Some(serde_json::Value::Object(map)) if map.len() == 1 => map
            .into_iter()
            .next()
            .and_then(|(_, v)| v.as_str().map(str::to_string)),
        Some(_) => None,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub slug: String,
    pub path: PathBuf,
    pub title: String,
    pub date: Option<DateTime<Utc>>,
    pub front_matter: FrontMatter,
    pub content: String,
    pub html_content: String,
    #[serde(skip)]
    pub last_modified: Option<SystemTime>,
}

impl Review {
    pub fn summary(&self) -> ReviewSummary {
        ReviewSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            excerpt: self.front_matter.excerpt.clone().unwrap_or_default(),
            cover_image: self.front_matter.featured_image.clone(),
            category: self.front_matter.category.clone(),
            date: self.date,
            is_review: self.front_matter.is_review,
        }
    }
}

/// Listing projection of a review document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub is_review: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewsConfig {
    pub source_directory: PathBuf,
    pub url_prefix: String,
    pub refresh_interval_minutes: Option<u64>,
    /// Hosts whose links are rendered as sponsored affiliate links.
    pub affiliate_hosts: Vec<String>,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            source_directory: PathBuf::from("content/reviews"),
            url_prefix: String::from("/reviews"),
            refresh_interval_minutes: None,
            affiliate_hosts: vec![
                String::from("shopee.com.br"),
                String::from("amazon.com.br"),
                String::from("amzn.to"),
                String::from("mercadolivre.com.br"),
            ],
        }
    }
}
