use axum_test::TestServer;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use vitrine::store::{DynDocumentStore, providers::memory::MemoryStore};
use vitrine::{AppState, Config, admin::hash_password, create_app};

pub const ADMIN_EMAIL: &str = "isa@example.com";
pub const ADMIN_PASSWORD: &str = "senha-forte";

fn write_templates(templates_dir: &Path) {
    let pages_dir = templates_dir.join("pages");
    let partials_dir = templates_dir.join("partials");
    fs::create_dir_all(&pages_dir).unwrap();
    fs::create_dir_all(&partials_dir).unwrap();

    fs::write(
        partials_dir.join("_header.html.liquid"),
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{{ page_title }}</title>
    <meta name="description" content="{{ meta_description }}">
    <link rel="canonical" href="{{ canonical_url }}">
    {% if json_ld %}<script type="application/ld+json">{{ json_ld }}</script>{% endif %}
</head>
<body>
<nav>{% for category in categories %}<a href="/categories/{{ category.slug }}">{{ category.name }}</a>{% endfor %}</nav>
<main>"#,
    )
    .unwrap();
    fs::write(
        partials_dir.join("_footer.html.liquid"),
        "</main><footer>&copy; {{ current_year }} {{ site_name }}</footer></body></html>",
    )
    .unwrap();

    let listing = r#"{% include "_header.html.liquid" %}
{% for post in posts %}
<article data-origin="{{ post.origin }}">
    <a href="{{ post.url }}">{{ post.title }}</a>
    <span class="category">{{ post.category }}</span>
</article>
{% endfor %}
{% include "_footer.html.liquid" %}"#;
    fs::write(pages_dir.join("index.html.liquid"), listing).unwrap();
    fs::write(
        pages_dir.join("category.html.liquid"),
        format!("<h1>{{{{ category.name }}}}</h1>\n{}", listing),
    )
    .unwrap();

    fs::write(
        pages_dir.join("article.html.liquid"),
        r#"{% include "_header.html.liquid" %}
<article data-origin="{{ article.origin }}">
    <h1>{{ article.title }}</h1>
    {% if article.product %}<p class="price">{{ article.product.price }}</p>{% endif %}
    {{ article.html_content }}
</article>
{% include "_footer.html.liquid" %}"#,
    )
    .unwrap();
}

fn write_reviews(reviews_dir: &Path) {
    fs::create_dir_all(reviews_dir).unwrap();
    fs::write(
        reviews_dir.join("air-fryer-mondial.mdx"),
        r#"---
title: "Air Fryer Mondial"
excerpt: "Testamos por 30 dias."
category: Casa Inteligente
date: 2024-03-10
isReview: true
productName: Air Fryer Mondial 4L
productPrice: 349.90
rating: 4.5
affiliateLink: https://shopee.com.br/air-fryer
---

Compre [aqui](https://shopee.com.br/air-fryer).
"#,
    )
    .unwrap();
    fs::write(
        reviews_dir.join("como-limpar-air-fryer.md"),
        r#"---
title: "Como limpar a air fryer"
excerpt: "Passo a passo."
category: Dicas
date: 2024-01-05
---

Use detergente neutro.
"#,
    )
    .unwrap();
}

pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.app.name = "Achados".to_string();
    config.app.description = "Reviews sinceros".to_string();
    config.app.session_secret = "integration-secret".to_string();
    config.app.base_url = Some("https://achados.example".to_string());
    config.templates.directory = root.join("templates");
    config.static_files.directory = root.join("static");
    config.reviews.source_directory = root.join("reviews");
    config.admin.email = ADMIN_EMAIL.to_string();
    config.admin.password_sha256 = hash_password(ADMIN_PASSWORD);
    config
}

pub async fn server_with_store(store: DynDocumentStore) -> (TempDir, TestServer, AppState) {
    let temp_dir = TempDir::new().unwrap();
    write_templates(&temp_dir.path().join("templates"));
    write_reviews(&temp_dir.path().join("reviews"));
    fs::create_dir_all(temp_dir.path().join("static")).unwrap();
    fs::write(temp_dir.path().join("static/style.css"), "body { margin: 0; }").unwrap();

    let app_state = AppState::new(test_config(temp_dir.path()), store).await;
    let server = TestServer::new(create_app(app_state.clone())).unwrap();
    (temp_dir, server, app_state)
}

pub async fn setup_server() -> (TempDir, TestServer, AppState) {
    server_with_store(Arc::new(MemoryStore::new())).await
}
