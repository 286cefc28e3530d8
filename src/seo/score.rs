use crate::blog::{BlogPost, PostDraft, SeoFields};
use crate::slug::slugify;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const TITLE_RANGE: RangeInclusive<usize> = 30..=60;
pub const DESCRIPTION_RANGE: RangeInclusive<usize> = 120..=160;
pub const GOOD_WORD_COUNT: usize = 300;
pub const MIN_WORD_COUNT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Good,
    Warning,
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckId {
    Title,
    Description,
    FocusKeyword,
    KeywordInTitle,
    KeywordInDescription,
    KeywordInSlug,
    CoverImage,
    Content,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoCheck {
    pub id: CheckId,
    pub status: CheckStatus,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoReport {
    pub checks: Vec<SeoCheck>,
    /// Percentage of checks that passed, 0 to 100.
    pub score: u8,
}

/// Editor fields the score is computed from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeoInput {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub seo: SeoFields,
}

impl From<&PostDraft> for SeoInput {
    fn from(draft: &PostDraft) -> Self {
        Self {
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            excerpt: draft.excerpt.clone(),
            content: draft.content.clone(),
            cover_image: draft.cover_image.clone(),
            seo: draft.seo.clone(),
        }
    }
}

impl From<&BlogPost> for SeoInput {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            cover_image: post.cover_image.clone(),
            seo: post.seo.clone(),
        }
    }
}

impl SeoInput {
    pub fn effective_title(&self) -> &str {
        non_blank(self.seo.meta_title.as_deref()).unwrap_or(self.title.trim())
    }

    pub fn effective_description(&self) -> &str {
        non_blank(self.seo.meta_description.as_deref()).unwrap_or(self.excerpt.trim())
    }
}

/// Score how complete a post's search metadata is. Advisory only.
pub fn score(input: &SeoInput) -> SeoReport {
    let mut checks = Vec::with_capacity(6);

    let title = input.effective_title();
    let title_len = title.chars().count();
    checks.push(if TITLE_RANGE.contains(&title_len) {
        check(CheckId::Title, CheckStatus::Good, "Title length looks good.")
    } else if title_len > 0 {
        check(
            CheckId::Title,
            CheckStatus::Warning,
            format!("Title has {title_len} characters; aim for 30 to 60."),
        )
    } else {
        check(CheckId::Title, CheckStatus::Bad, "Add a title.")
    });

    let description = input.effective_description();
    let description_len = description.chars().count();
    checks.push(if DESCRIPTION_RANGE.contains(&description_len) {
        check(
            CheckId::Description,
            CheckStatus::Good,
            "Description length looks good.",
        )
    } else if description_len > 0 {
        check(
            CheckId::Description,
            CheckStatus::Warning,
            format!("Description has {description_len} characters; aim for 120 to 160."),
        )
    } else {
        check(
            CheckId::Description,
            CheckStatus::Bad,
            "Write a meta description or an excerpt.",
        )
    });

    match non_blank(input.seo.focus_keyword.as_deref()) {
        Some(keyword) => {
            let keyword_lower = keyword.to_lowercase();

            checks.push(if title.to_lowercase().contains(&keyword_lower) {
                check(
                    CheckId::KeywordInTitle,
                    CheckStatus::Good,
                    "Focus keyword appears in the title.",
                )
            } else {
                check(
                    CheckId::KeywordInTitle,
                    CheckStatus::Bad,
                    "Use the focus keyword in the title.",
                )
            });

            checks.push(if description.to_lowercase().contains(&keyword_lower) {
                check(
                    CheckId::KeywordInDescription,
                    CheckStatus::Good,
                    "Focus keyword appears in the description.",
                )
            } else {
                check(
                    CheckId::KeywordInDescription,
                    CheckStatus::Warning,
                    "Mention the focus keyword in the description.",
                )
            });

            let keyword_slug = slugify(keyword);
            checks.push(
                if !keyword_slug.is_empty() && input.slug.contains(&keyword_slug) {
                    check(
                        CheckId::KeywordInSlug,
                        CheckStatus::Good,
                        "Focus keyword appears in the URL.",
                    )
                } else {
                    check(
                        CheckId::KeywordInSlug,
                        CheckStatus::Warning,
                        "Include the focus keyword in the slug.",
                    )
                },
            );
        }
        None => checks.push(check(
            CheckId::FocusKeyword,
            CheckStatus::Bad,
            "Define a focus keyword.",
        )),
    }

    checks.push(
        if non_blank(input.cover_image.as_deref()).is_some() {
            check(CheckId::CoverImage, CheckStatus::Good, "Cover image set.")
        } else {
            check(
                CheckId::CoverImage,
                CheckStatus::Warning,
                "Add a cover image for social sharing.",
            )
        },
    );

    let words = word_count(&input.content);
    checks.push(if words > GOOD_WORD_COUNT {
        check(
            CheckId::Content,
            CheckStatus::Good,
            format!("{words} words of content."),
        )
    } else if words > MIN_WORD_COUNT {
        check(
            CheckId::Content,
            CheckStatus::Warning,
            format!("{words} words; more than 300 ranks better."),
        )
    } else {
        check(
            CheckId::Content,
            CheckStatus::Bad,
            format!("Only {words} words; write at least 100."),
        )
    });

    let good = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Good)
        .count();
    let score = (100.0 * good as f64 / checks.len() as f64).round() as u8;

    SeoReport { checks, score }
}

fn check(id: CheckId, status: CheckStatus, tip: impl Into<String>) -> SeoCheck {
    SeoCheck {
        id,
        status,
        tip: tip.into(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Words in a body that may contain HTML markup.
pub fn word_count(content: &str) -> usize {
    strip_tags(content).split_whitespace().count()
}

pub(crate) fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(report: &SeoReport) -> Vec<(CheckId, CheckStatus)> {
        report.checks.iter().map(|c| (c.id, c.status)).collect()
    }

    fn title_status(title: &str) -> CheckStatus {
        let input = SeoInput {
            title: title.to_string(),
            ..SeoInput::default()
        };
        score(&input).checks[0].status
    }

    #[test]
    fn test_title_boundaries() {
        assert_eq!(title_status(&"a".repeat(30)), CheckStatus::Good);
        assert_eq!(title_status(&"a".repeat(60)), CheckStatus::Good);
        assert_eq!(title_status(&"a".repeat(29)), CheckStatus::Warning);
        assert_eq!(title_status(&"a".repeat(61)), CheckStatus::Warning);
        assert_eq!(title_status(""), CheckStatus::Bad);
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        assert_eq!(title_status(&"ã".repeat(30)), CheckStatus::Good);
    }

    #[test]
    fn test_meta_title_overrides_title() {
        let input = SeoInput {
            title: "curto".to_string(),
            seo: SeoFields {
                meta_title: Some("x".repeat(40)),
                ..SeoFields::default()
            },
            ..SeoInput::default()
        };
        assert_eq!(score(&input).checks[0].status, CheckStatus::Good);
    }

    #[test]
    fn test_example_post_scores_twenty() {
        let input = SeoInput {
            title: "t".repeat(45),
            content: vec!["palavra"; 50].join(" "),
            ..SeoInput::default()
        };
        let report = score(&input);

        assert_eq!(
            statuses(&report),
            vec![
                (CheckId::Title, CheckStatus::Good),
                (CheckId::Description, CheckStatus::Bad),
                (CheckId::FocusKeyword, CheckStatus::Bad),
                (CheckId::CoverImage, CheckStatus::Warning),
                (CheckId::Content, CheckStatus::Bad),
            ]
        );
        assert_eq!(report.score, 20);
    }

    #[test]
    fn test_focus_keyword_checks() {
        let input = SeoInput {
            title: "Melhor Air Fryer de 2024: review completo".to_string(),
            slug: "melhor-air-fryer-2024".to_string(),
            excerpt: "Sem a palavra".to_string(),
            cover_image: Some("/img.jpg".to_string()),
            content: format!("<p>{}</p>", vec!["texto"; 301].join(" ")),
            seo: SeoFields {
                focus_keyword: Some("air fryer".to_string()),
                ..SeoFields::default()
            },
        };
        let report = score(&input);

        assert_eq!(
            statuses(&report),
            vec![
                (CheckId::Title, CheckStatus::Good),
                (CheckId::Description, CheckStatus::Warning),
                (CheckId::KeywordInTitle, CheckStatus::Good),
                (CheckId::KeywordInDescription, CheckStatus::Warning),
                (CheckId::KeywordInSlug, CheckStatus::Good),
                (CheckId::CoverImage, CheckStatus::Good),
                (CheckId::Content, CheckStatus::Good),
            ]
        );
        assert_eq!(report.score, 71);
    }

    #[test]
    fn test_keyword_missing_from_title_is_bad() {
        let input = SeoInput {
            title: "Um título qualquer".to_string(),
            seo: SeoFields {
                focus_keyword: Some("Robô".to_string()),
                ..SeoFields::default()
            },
            ..SeoInput::default()
        };
        assert_eq!(score(&input).checks[2].status, CheckStatus::Bad);
    }

    #[test]
    fn test_word_count_thresholds() {
        let words = |n: usize| SeoInput {
            content: vec!["w"; n].join(" "),
            ..SeoInput::default()
        };
        let content_status = |n| score(&words(n)).checks.last().unwrap().status;

        assert_eq!(content_status(100), CheckStatus::Bad);
        assert_eq!(content_status(101), CheckStatus::Warning);
        assert_eq!(content_status(300), CheckStatus::Warning);
        assert_eq!(content_status(301), CheckStatus::Good);
    }

    #[test]
    fn test_word_count_ignores_markup() {
        assert_eq!(word_count("<h2>Olá</h2><p>mundo <strong>bonito</strong></p>"), 3);
        assert_eq!(word_count("<img src=\"a b c.jpg\">"), 0);
        assert_eq!(word_count(""), 0);
    }
}
