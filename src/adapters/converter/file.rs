//! Filesystem converter backed by pandoc

use super::{DocumentConverter, DumpOutput, DumpRequest, OutputOptions, PageType};
use crate::adapters::confluence::{is_same_origin, ConfluenceApi};
use crate::domain::context::ResultExt;
use crate::domain::{ConvertError, DumpError, PageId, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Asset subdirectories created next to every exported page
pub const ASSET_DIRS: [&str; 3] = ["attachments", "embeds", "scripts"];

/// Create `path` and its asset subdirectories
pub async fn prepare_outdir(path: &Path) -> Result<()> {
    for dir in ASSET_DIRS {
        let sub = path.join(dir);
        tokio::fs::create_dir_all(&sub)
            .await
            .with_context(|| format!("Failed to create {}", sub.display()))?;
    }
    Ok(())
}

/// Writes HTML and RST files, downloading images through the Confluence API
pub struct FileConverter {
    api: Arc<dyn ConfluenceApi>,
    pandoc: PathBuf,
}

impl FileConverter {
    pub fn new(api: Arc<dyn ConfluenceApi>) -> Self {
        Self {
            api,
            pandoc: PathBuf::from("pandoc"),
        }
    }

    /// Use a specific pandoc binary instead of the one on `PATH`
    pub fn with_pandoc(mut self, pandoc: impl Into<PathBuf>) -> Self {
        self.pandoc = pandoc.into();
        self
    }

    /// Whether an image source lives on the Confluence site
    fn is_site_image(&self, src: &str) -> bool {
        is_same_origin(self.api.base_url(), src)
            || src.starts_with("/wiki/")
            || src.starts_with("/download/")
    }

    /// Download site images and point their `src` at the local copies
    async fn localize_images(&self, request: &DumpRequest, html: String) -> Result<String> {
        let sources = image_sources(&html);
        if sources.is_empty() {
            return Ok(html);
        }

        let (image_dir, prefix) = if request.options.sphinx {
            (request.outdir_base.join("_images"), "_images")
        } else {
            (request.outdir_base.join("attachments"), "attachments")
        };
        tokio::fs::create_dir_all(&image_dir)
            .await
            .map_err(|e| write_error(&image_dir, e))?;

        let mut html = html;
        let mut used = HashSet::new();
        for src in sources.iter().filter(|s| self.is_site_image(s)) {
            let file_name = unique_name(local_image_name(&request.page_id, src), &mut used);
            let target = image_dir.join(&file_name);

            let bytes = match self.api.download(src).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(
                        page_id = %request.page_id,
                        src = %src,
                        error = %e,
                        "Failed to download image, keeping remote source"
                    );
                    continue;
                }
            };

            tokio::fs::write(&target, bytes)
                .await
                .map_err(|e| write_error(&target, e))?;

            let local = format!("{prefix}/{file_name}");
            html = rewrite_src(&html, src, &local);
            tracing::debug!(page_id = %request.page_id, src = %src, local = %local, "Saved image");
        }

        Ok(html)
    }

    /// Run `pandoc -f html -t rst` over `html`
    async fn html_to_rst(&self, html: &str) -> Result<String> {
        let mut child = Command::new(&self.pandoc)
            .args(["-f", "html", "-t", "rst"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ConvertError::PandocUnavailable(format!("{}: {}", self.pandoc.display(), e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(html.as_bytes())
                .await
                .map_err(|e| ConvertError::PandocFailed(format!("writing input: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ConvertError::PandocFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(ConvertError::PandocFailed(format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl DocumentConverter for FileConverter {
    async fn dump(&self, request: DumpRequest) -> Result<DumpOutput> {
        let OutputOptions { html, rst, .. } = request.options;
        if !html && !rst {
            return Err(DumpError::Validation(
                "No output format selected (enable HTML or RST)".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&request.outdir_content)
            .await
            .map_err(|e| write_error(&request.outdir_content, e))?;

        let mut body = self.localize_images(&request, request.html.clone()).await?;
        if let PageType::Report { children } = &request.page_type {
            body.push_str(&report_index(children));
        }

        let html_path = request.outdir_content.join(format!("{}.html", request.title));
        if html {
            let document = html_document(&request, &body);
            tokio::fs::write(&html_path, document)
                .await
                .map_err(|e| write_error(&html_path, e))?;
            tracing::debug!(page_id = %request.page_id, path = %html_path.display(), "Wrote HTML");
        }

        let path = if rst {
            let converted = self.html_to_rst(&body).await?;
            let rst_path = request.outdir_content.join(format!("{}.rst", request.title));
            let document = rst_document(&request, &converted);
            tokio::fs::write(&rst_path, document)
                .await
                .map_err(|e| write_error(&rst_path, e))?;
            tracing::debug!(page_id = %request.page_id, path = %rst_path.display(), "Wrote RST");
            rst_path
        } else {
            html_path
        };

        Ok(DumpOutput {
            url: request.page_url,
            path,
        })
    }
}

fn write_error(path: &Path, e: std::io::Error) -> DumpError {
    DumpError::Conversion(ConvertError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Unique `src` values of all `<img>` elements, in document order
fn image_sources(html: &str) -> Vec<String> {
    let document = Html::parse_fragment(html);
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    let mut sources: Vec<String> = Vec::new();
    for src in document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
    {
        if !sources.iter().any(|s| s == src) {
            sources.push(src.to_string());
        }
    }
    sources
}

/// `{page_id}_{last path segment}` with unsafe characters replaced
fn local_image_name(page_id: &PageId, src: &str) -> String {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let segment = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("image");
    let safe: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{page_id}_{safe}")
}

/// Reserve `name`, inserting `_1`, `_2`, ... before the extension when taken
fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{ext}")),
        _ => (name.clone(), String::new()),
    };
    let mut n = 1;
    loop {
        let candidate = format!("{stem}_{n}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Replace a `src` attribute value; the raw markup may carry `&amp;`
fn rewrite_src(html: &str, src: &str, local: &str) -> String {
    let replacement = format!("src=\"{local}\"");
    let escaped = src.replace('&', "&amp;");
    html.replace(&format!("src=\"{escaped}\""), &replacement)
        .replace(&format!("src=\"{src}\""), &replacement)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn report_index(children: &[crate::domain::ChildRecord]) -> String {
    let mut index = String::from("\n<h2>Pages</h2>\n<ul>\n");
    for child in children {
        let name = escape_html(&child.name);
        match &child.filename {
            Some(filename) => index.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                escape_html(filename),
                name
            )),
            None => index.push_str(&format!("<li>{name}</li>\n")),
        }
    }
    index.push_str("</ul>\n");
    index
}

fn html_document(request: &DumpRequest, body: &str) -> String {
    let title = escape_html(&request.title);
    let mut head = format!("<meta charset=\"utf-8\">\n<title>{title}</title>\n");
    head.push_str(&format!(
        "<meta name=\"confluence-page-id\" content=\"{}\">\n",
        request.page_id
    ));
    head.push_str(&format!(
        "<meta name=\"source\" content=\"{}\">\n",
        escape_html(&request.page_url)
    ));
    if !request.labels.is_empty() {
        head.push_str(&format!(
            "<meta name=\"labels\" content=\"{}\">\n",
            escape_html(&request.labels.join(","))
        ));
    }
    if let Some(parent) = &request.parent_id {
        head.push_str(&format!("<meta name=\"parent\" content=\"{parent}\">\n"));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n{head}</head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    )
}

fn rst_document(request: &DumpRequest, converted: &str) -> String {
    let mut doc = String::new();

    if request.options.tags && !request.labels.is_empty() {
        doc.push_str(&format!(".. tags:: {}\n\n", request.labels.join(", ")));
    }

    let underline = "=".repeat(request.title.chars().count().max(1));
    doc.push_str(&format!("{}\n{}\n\n", request.title, underline));
    doc.push_str(converted.trim_end());
    doc.push('\n');

    if request.options.show_labels && !request.labels.is_empty() {
        doc.push_str(&format!("\n**Labels:** {}\n", request.labels.join(", ")));
    }

    doc
}
