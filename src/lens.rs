// =============================================================================
// lens.rs — THE REVERSE IMAGE INFORMANT
// =============================================================================
//
// The lens collaborator: upload a local photo to an external image-search
// endpoint as multipart form data, then comb the response HTML for
// absolute links. That's the whole trick. The endpoint is best-effort —
// it is configurable precisely because public image-search endpoints have
// the life expectancy of a mayfly — but the upload mechanics and the link
// extraction are honest, testable machinery.
//
// We send a browser User-Agent here, unlike everywhere else in this
// engine, because image-search endpoints answer curl-shaped clients with
// a blank stare.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use colored::Colorize;
use reqwest::multipart;
use scraper::{Html, Selector};
use tracing::info;

use crate::config::CollaboratorEndpoints;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/105.0.0.0 Safari/537.36";

/// Pull every absolute http(s) link out of a document. Relative links,
/// fragments, and javascript: pseudo-links are noise here — the operator
/// wants destinations they can open.
pub fn extract_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").expect("static selector is valid");

    doc.select(&anchor_selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with("http"))
        .map(str::to_string)
        .collect()
}

/// Upload the image and return whatever absolute links the search
/// response contains.
pub async fn search(
    client: &reqwest::Client,
    endpoint: &str,
    image_path: &Path,
) -> anyhow::Result<Vec<String>> {
    let bytes = tokio::fs::read(image_path)
        .await
        .with_context(|| format!("could not open file: {}", image_path.display()))?;

    let file_name = image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let form = multipart::Form::new().part(
        "encoded_image",
        multipart::Part::bytes(bytes).file_name(file_name),
    );

    let response = client
        .post(endpoint)
        .multipart(form)
        .send()
        .await
        .context("could not send the upload request")?;

    let status = response.status();
    if status.as_u16() != 200 {
        bail!("unexpected status code: {status}");
    }

    let html = response
        .text()
        .await
        .context("could not read the search response")?;

    let links = extract_links(&html);
    info!(links = links.len(), "lens search complete");
    Ok(links)
}

/// The lens mode: upload, extract, print.
pub async fn run(image_path: &Path) -> anyhow::Result<()> {
    let endpoints = CollaboratorEndpoints::from_env();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .context("failed to build HTTP client")?;

    let links = search(&client, &endpoints.lens_upload_url, image_path).await?;

    if links.is_empty() {
        println!("{}", "No results found for the image.".yellow());
        return Ok(());
    }

    println!("{}", "Found Result Links:".green().bold());
    for link in links {
        println!("{link}");
    }
    Ok(())
}
