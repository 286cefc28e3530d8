use crate::AppState;
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::fmt::Write;

/// `GET /sitemap.xml`: home, every published article and every category.
pub async fn sitemap_handler(State(app_state): State<AppState>) -> Response {
    let (articles, categories) = tokio::join!(
        app_state.feed.all_slugs(),
        app_state.feed.category_slugs()
    );

    let xml = render_sitemap(
        app_state.base_url(),
        &app_state.config.reviews.url_prefix,
        &articles,
        &categories,
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        xml,
    )
        .into_response()
}

pub fn render_sitemap(
    base_url: &str,
    article_prefix: &str,
    article_slugs: &[String],
    category_slugs: &[String],
) -> String {
    let base = base_url.trim_end_matches('/');
    let article_prefix = article_prefix.trim_end_matches('/');

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    push_url(&mut xml, &format!("{}/", base));
    for slug in article_slugs {
        push_url(
            &mut xml,
            &format!("{}{}/{}", base, article_prefix, urlencoding::encode(slug)),
        );
    }
    for slug in category_slugs {
        push_url(
            &mut xml,
            &format!("{}/categories/{}", base, urlencoding::encode(slug)),
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

fn push_url(xml: &mut String, loc: &str) {
    let _ = writeln!(xml, "  <url><loc>{}</loc></url>", escape_xml(loc));
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_home_articles_and_categories() {
        let xml = render_sitemap(
            "https://achados.example/",
            "/reviews",
            &["air-fryer".to_string(), "robo".to_string()],
            &["casa-inteligente".to_string()],
        );

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://achados.example/</loc>"));
        assert!(xml.contains("<loc>https://achados.example/reviews/air-fryer</loc>"));
        assert!(xml.contains("<loc>https://achados.example/reviews/robo</loc>"));
        assert!(xml.contains("<loc>https://achados.example/categories/casa-inteligente</loc>"));
        assert_eq!(xml.matches("<url>").count(), 4);
    }

    #[test]
    fn test_escapes_file_slugs() {
        let xml = render_sitemap("http://x", "/reviews", &["a&b".to_string()], &[]);
        assert!(xml.contains("/reviews/a%26b"));
        assert!(!xml.contains("a&b"));
    }
}
