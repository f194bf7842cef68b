//! Sitemap XML rendering.

use crate::types::{Date, DbId};

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Date,
    pub changefreq: &'static str,
    pub priority: f32,
}

/// A project as far as the sitemap is concerned.
#[derive(Debug, Clone, Copy)]
pub struct SitemapProject {
    pub id: DbId,
    pub updated_at: Option<Date>,
}

/// Build the full entry list: fixed pages first, then one entry per project.
pub fn build_entries(base_url: &str, projects: &[SitemapProject], today: Date) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');
    let mut entries = vec![
        SitemapEntry {
            loc: format!("{base}/"),
            lastmod: today,
            changefreq: "daily",
            priority: 1.0,
        },
        SitemapEntry {
            loc: format!("{base}/portfolio"),
            lastmod: today,
            changefreq: "weekly",
            priority: 0.9,
        },
    ];
    entries.extend(projects.iter().map(|p| SitemapEntry {
        loc: project_url(base, p.id),
        lastmod: p.updated_at.unwrap_or(today),
        changefreq: "monthly",
        priority: 0.8,
    }));
    entries
}

/// Public URL of a project's detail page.
pub fn project_url(base_url: &str, id: DbId) -> String {
    format!("{}/project?id={id}", base_url.trim_end_matches('/'))
}

/// Render a `urlset` document.
pub fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            entry.lastmod.format("%Y-%m-%d")
        ));
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.changefreq
        ));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
