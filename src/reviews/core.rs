use super::{error::ReviewsError, types::*};
use chrono::{DateTime, NaiveDate, Utc};
use gray_matter::{Matter, engine::YAML};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};
use std::{
    cmp::Ordering,
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

const EXTENSIONS: [&str; 3] = ["md", "mdx", "markdown"];

/// File-backed review documents, cached in memory and refreshed on demand.
pub struct ReviewsLibrary {
    config: ReviewsConfig,
    reviews: Arc<RwLock<HashMap<String, Review>>>,
    sorted_slugs: Arc<RwLock<Vec<String>>>,
}

impl ReviewsLibrary {
    pub fn new(config: ReviewsConfig) -> Self {
        Self {
            config,
            reviews: Arc::new(RwLock::new(HashMap::new())),
            sorted_slugs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Rescan the content directory. A missing directory leaves the library
    /// empty and is not an error. Returns the number of loaded reviews.
    pub async fn refresh_reviews(&self) -> Result<usize, ReviewsError> {
        let dir = &self.config.source_directory;
        info!("Refreshing reviews from directory: {:?}", dir);

        let new_reviews = if tokio::fs::try_exists(dir).await.unwrap_or(false) {
            self.scan_directory(dir).await?
        } else {
            warn!("Reviews directory {:?} does not exist, serving none", dir);
            HashMap::new()
        };

        let mut sorted_slugs: Vec<String> = new_reviews.keys().cloned().collect();
        sorted_slugs.sort_by(|a, b| newest_first(&new_reviews[a], &new_reviews[b]));

        let count = new_reviews.len();
        info!("Found {} reviews", count);

        let mut reviews = self.reviews.write().await;
        let mut slugs = self.sorted_slugs.write().await;
        *reviews = new_reviews;
        *slugs = sorted_slugs;

        Ok(count)
    }

    pub fn start_background_refresh(library: Arc<ReviewsLibrary>, interval_minutes: u64) {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_minutes * 60));
            interval.tick().await;

            loop {
                interval.tick().await;
                info!("Starting scheduled reviews refresh");

                if let Err(e) = library.refresh_reviews().await {
                    error!("Failed to refresh reviews: {}", e);
                }
            }
        });
    }

    async fn scan_directory(&self, dir: &Path) -> Result<HashMap<String, Review>, ReviewsError> {
        let mut reviews = HashMap::new();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() || !has_review_extension(&path) {
                continue;
            }

            match self.load_review(&path).await {
                Ok(review) => {
                    debug!("Loaded review: {}", review.slug);
                    reviews.insert(review.slug.clone(), review);
                }
                Err(e) => {
                    error!("Failed to load review {:?}: {}", path, e);
                }
            }
        }

        Ok(reviews)
    }

    async fn load_review(&self, path: &Path) -> Result<Review, ReviewsError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let last_modified = tokio::fs::metadata(path).await?.modified().ok();

        let slug = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .ok_or_else(|| ReviewsError::InvalidFormat(format!("Invalid file name {:?}", path)))?;

        let (front_matter, content) = parse_front_matter(&raw)?;

        let date = match front_matter.date.as_deref() {
            Some(value) => match parse_date(value) {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!("Review {}: {}", slug, e);
                    None
                }
            },
            None => None,
        };

        let html_content = self.render_markdown(&content);
        let title = front_matter
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| slug.clone());

        Ok(Review {
            slug,
            path: path.to_path_buf(),
            title,
            date,
            front_matter,
            content,
            html_content,
            last_modified,
        })
    }

    /// Listing projection of every review, newest first.
    pub async fn list_reviews(&self) -> Vec<ReviewSummary> {
        let reviews = self.reviews.read().await;
        let slugs = self.sorted_slugs.read().await;

        slugs
            .iter()
            .filter_map(|slug| reviews.get(slug).map(Review::summary))
            .collect()
    }

    /// Full review for `slug`, reloading it from disk when the file changed
    /// or appeared since the last scan.
    pub async fn get_review(&self, slug: &str) -> Option<Review> {
        if slug.is_empty() || slug.contains(['/', '\\']) || slug.contains("..") {
            return None;
        }

        if let Some(review) = self.get_review_if_fresh(slug).await {
            return Some(review);
        }

        let path = match self.locate(slug).await {
            Some(path) => path,
            None => {
                self.forget(slug).await;
                return None;
            }
        };

        match self.load_review(&path).await {
            Ok(review) => {
                debug!("Reloaded review: {}", slug);
                let mut reviews = self.reviews.write().await;
                reviews.insert(slug.to_string(), review.clone());
                drop(reviews);
                self.resort().await;
                Some(review)
            }
            Err(e) => {
                error!("Failed to reload review {}: {}", slug, e);
                None
            }
        }
    }

    async fn get_review_if_fresh(&self, slug: &str) -> Option<Review> {
        let reviews = self.reviews.read().await;
        let review = reviews.get(slug)?;

        if let Ok(metadata) = tokio::fs::metadata(&review.path).await
            && let (Ok(file_modified), Some(loaded_modified)) =
                (metadata.modified(), review.last_modified)
            && file_modified <= loaded_modified
        {
            return Some(review.clone());
        }

        None
    }

    async fn locate(&self, slug: &str) -> Option<PathBuf> {
        for ext in EXTENSIONS {
            let candidate = self.config.source_directory.join(format!("{}.{}", slug, ext));
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Some(candidate);
            }
        }
        None
    }

    async fn forget(&self, slug: &str) {
        let mut reviews = self.reviews.write().await;
        if reviews.remove(slug).is_some() {
            let mut slugs = self.sorted_slugs.write().await;
            slugs.retain(|s| s != slug);
            debug!("Review {} no longer exists on disk", slug);
        }
    }

    async fn resort(&self) {
        let reviews = self.reviews.read().await;
        let mut slugs = self.sorted_slugs.write().await;
        let mut sorted: Vec<String> = reviews.keys().cloned().collect();
        sorted.sort_by(|a, b| newest_first(&reviews[a], &reviews[b]));
        *slugs = sorted;
    }

    /// Render a markdown body to HTML. Links to configured affiliate hosts
    /// are marked sponsored and open in a new tab.
    pub fn render_markdown(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);

        let mut open_links: Vec<bool> = Vec::new();
        let events = Parser::new_ext(markdown, options).map(|event| match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                if self.is_affiliate_url(&dest_url) {
                    open_links.push(true);
                    Event::InlineHtml(
                        format!(
                            r#"<a href="{}" rel="nofollow sponsored noopener noreferrer" target="_blank" class="affiliate-link">"#,
                            escape_attr(&dest_url)
                        )
                        .into(),
                    )
                } else {
                    open_links.push(false);
                    Event::Start(Tag::Link {
                        link_type,
                        dest_url,
                        title,
                        id,
                    })
                }
            }
            Event::End(TagEnd::Link) => {
                if open_links.pop().unwrap_or(false) {
                    Event::InlineHtml("</a>".into())
                } else {
                    Event::End(TagEnd::Link)
                }
            }
            other => other,
        });

        let mut html_output = String::new();
        html::push_html(&mut html_output, events);
        html_output
    }

    pub fn is_affiliate_url(&self, link: &str) -> bool {
        let Ok(parsed) = url::Url::parse(link) else {
            return false;
        };
        let Some(host) = parsed.host_str().map(str::to_ascii_lowercase) else {
            return false;
        };

        self.config.affiliate_hosts.iter().any(|allowed| {
            let allowed = allowed.to_ascii_lowercase();
            host == allowed || host.ends_with(&format!(".{}", allowed))
        })
    }
}

fn has_review_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

fn newest_first(a: &Review, b: &Review) -> Ordering {
    match (a.date, b.date) {
        (Some(da), Some(db)) => db.cmp(&da).then_with(|| a.slug.cmp(&b.slug)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.slug.cmp(&b.slug),
    }
}

/// Split a document into its front matter and body. YAML headers use `---`
/// fences, TOML headers use `+++`.
pub(crate) fn parse_front_matter(content: &str) -> Result<(FrontMatter, String), ReviewsError> {
    let content = content.trim_start_matches('\u{feff}');
    let leading = content.trim_start();

    if leading.starts_with("+++") {
        let parts: Vec<&str> = leading.splitn(3, "+++").collect();
        if parts.len() < 3 {
            return Err(ReviewsError::InvalidFormat(
                "Unterminated +++ front matter block".to_string(),
            ));
        }
        let front_matter: FrontMatter = toml_edit::de::from_str(parts[1])?;
        return Ok((front_matter, parts[2].trim().to_string()));
    }

    if leading.starts_with("---") {
        let matter = Matter::<YAML>::new();
        let parsed = matter.parse(leading);
        let front_matter = match parsed.data {
            Some(data) => data
                .deserialize::<FrontMatter>()
                .map_err(|e| ReviewsError::YamlError(e.to_string()))?,
            None => FrontMatter::default(),
        };
        return Ok((front_matter, parsed.content.trim().to_string()));
    }

    Err(ReviewsError::InvalidFormat(
        "Review must start with a --- or +++ front matter block".to_string(),
    ))
}

pub(crate) fn parse_date(date_str: &str) -> Result<DateTime<Utc>, ReviewsError> {
    let date_str = date_str.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(date.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(midnight.and_utc());
    }

    Err(ReviewsError::DateParseError(format!(
        "Unable to parse date: {}",
        date_str
    )))
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
