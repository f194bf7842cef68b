//! Server-rendered page templates.
//!
//! Templates are compiled into the binary and registered once at startup.

use handlebars::{handlebars_helper, Handlebars, TemplateError};
use serde_json::Value;

const LAYOUT_HEAD: &str = include_str!("../templates/partials/head.hbs");
const LAYOUT_NAV: &str = include_str!("../templates/partials/nav.hbs");
const PROJECT_CARD: &str = include_str!("../templates/partials/project_card.hbs");

const PAGES: &[(&str, &str)] = &[
    ("home", include_str!("../templates/home.hbs")),
    ("portfolio", include_str!("../templates/portfolio.hbs")),
    ("project", include_str!("../templates/project.hbs")),
    ("login", include_str!("../templates/login.hbs")),
    ("admin", include_str!("../templates/admin.hbs")),
];

/// Build the template registry with helpers, partials and pages.
pub fn build() -> Result<Handlebars<'static>, TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(false);

    handlebars_helper!(exists: |v: Value| !v.is_null());
    handlebars.register_helper("exists", Box::new(exists));

    handlebars_helper!(stringeq: |s1: String, s2: String| s1.eq(&s2));
    handlebars.register_helper("stringeq", Box::new(stringeq));

    handlebars_helper!(join: |items: Value| join_items(&items));
    handlebars.register_helper("join", Box::new(join));

    handlebars_helper!(asset: |url: String| asset_url(&url));
    handlebars.register_helper("asset", Box::new(asset));

    handlebars.register_partial("head", LAYOUT_HEAD)?;
    handlebars.register_partial("nav", LAYOUT_NAV)?;
    handlebars.register_partial("project_card", PROJECT_CARD)?;

    for (name, source) in PAGES {
        handlebars.register_template_string(name, *source)?;
    }

    Ok(handlebars)
}

fn join_items(items: &Value) -> String {
    match items {
        Value::Array(values) => values
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

/// Root-relative form of a stored URL; absolute and rooted URLs are kept.
fn asset_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.starts_with('/') || url.contains("://") || url.starts_with("data:") {
        url.to_string()
    } else {
        format!("/{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_templates_compile() {
        let handlebars = build().expect("templates should compile");
        for (name, _) in PAGES {
            assert!(handlebars.has_template(name), "missing template {name}");
        }
    }

    #[test]
    fn join_helper_lists_strings() {
        let handlebars = build().unwrap();
        let out = handlebars
            .render_template("{{join tools}}", &json!({"tools": ["Rust", "Axum"]}))
            .unwrap();
        assert_eq!(out, "Rust, Axum");
    }

    #[test]
    fn asset_helper_roots_relative_urls() {
        assert_eq!(asset_url("uploads/gallery/a.png"), "/uploads/gallery/a.png");
        assert_eq!(asset_url("https://cdn.test/a.png"), "https://cdn.test/a.png");
        assert_eq!(asset_url("/static/x.css"), "/static/x.css");
    }

    #[test]
    fn login_page_shows_error() {
        let handlebars = build().unwrap();
        let html = handlebars
            .render("login", &json!({"page_title": "Sign in", "error": "Invalid credentials"}))
            .unwrap();
        assert!(html.contains("Invalid credentials"));
    }
}
