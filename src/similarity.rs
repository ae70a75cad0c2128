// =============================================================================
// similarity.rs — THE DOCUMENT OVERLAP ORACLE
// =============================================================================
//
// The websimilarity collaborator: fetch two or more pages, boil each one
// down to a set of lower-cased words, and score every pair by Jaccard
// overlap (intersection over union). It answers exactly one question —
// "are these pages made of the same words?" — and answers it well enough
// to spot mirrored profiles and copy-pasted bios.
//
// The math is a set operation, the fetching is plain HTTP, and the only
// genuinely fussy part is convincing an HTML document to give up its
// visible text without also handing us 400KB of inline JavaScript.
//
// Scoring is embarrassingly parallel, so every pair gets its own rayon
// task. For three URLs that's three pairs across all your cores, which is
// like dispatching a fleet of trucks to deliver one envelope each. We
// wouldn't have it any other way.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{bail, Context};
use colored::Colorize;
use rayon::prelude::*;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Splits text on any run of non-letter, non-digit characters.
/// Unicode classes, because usernames and bios are not ASCII-only.
static WORD_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{N}]+").expect("word boundary regex is valid")
});

/// Lower-case a text and shatter it into a set of words. Duplicates
/// collapse — this is set similarity, not frequency analysis.
pub fn tokenize(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    WORD_BOUNDARY
        .split(&lower)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Jaccard overlap: |A ∩ B| / |A ∪ B|, in [0, 1]. Two empty sets have an
/// empty union and score 0.0 — identical nothings are still nothing.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Pull the visible text out of an HTML document: everything under <body>
/// except script, style, and noscript subtrees. No semantic parsing, no
/// readability heuristics — just the words a human would see.
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let body_selector = Selector::parse("body").expect("static selector is valid");

    let mut out = String::new();
    if let Some(body) = doc.select(&body_selector).next() {
        push_visible_text(body, &mut out);
    }
    out.trim().to_string()
}

fn push_visible_text(el: ElementRef, out: &mut String) {
    if matches!(el.value().name(), "script" | "style" | "noscript") {
        return;
    }
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            push_visible_text(child_el, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

/// Fetch one URL and reduce it to visible text. Anything but a 200 is an
/// error — a soft-404 full of boilerplate would poison the comparison.
pub async fn fetch_visible_text(client: &reqwest::Client, url: &str) -> anyhow::Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("could not fetch {url}"))?;

    let status = response.status();
    if status.as_u16() != 200 {
        bail!("request failed, status code: {status}");
    }

    let html = response
        .text()
        .await
        .with_context(|| format!("could not read body from {url}"))?;
    Ok(visible_text(&html))
}

/// The websimilarity mode: fetch every URL, then print the pairwise
/// overlap for each pair that fetched successfully. One dead URL skips
/// its pairs with a warning; it does not abort the run.
pub async fn run(urls_arg: &str) -> anyhow::Result<()> {
    let urls: Vec<&str> = urls_arg
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .collect();

    if urls.len() < 2 {
        bail!("please provide at least 2 URLs to compare with --urls (comma-separated)");
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent("handle-hunter/1.0 (websimilarity)")
        .build()
        .context("failed to build HTTP client")?;

    println!("{}", "Fetching text from websites...".bold());
    let mut word_sets: HashMap<&str, HashSet<String>> = HashMap::new();
    for url in &urls {
        match fetch_visible_text(&client, url).await {
            Ok(text) => {
                println!("{} Fetched text from {url}.", "✓".green());
                word_sets.insert(url, tokenize(&text));
            }
            Err(e) => {
                warn!(url, error = %e, "fetch failed — skipping this URL's pairs");
                println!("{} Could not fetch {url}: {e:#}", "✗".red());
            }
        }
    }
    println!("{}", "-------------------------------------------".dimmed());

    // All pairs, original order, scored in parallel.
    let mut pairs = Vec::new();
    for i in 0..urls.len() {
        for j in (i + 1)..urls.len() {
            if let (Some(a), Some(b)) = (word_sets.get(urls[i]), word_sets.get(urls[j])) {
                pairs.push((urls[i], urls[j], a, b));
            }
        }
    }

    let scores: Vec<(&str, &str, f64)> = pairs
        .par_iter()
        .map(|(u1, u2, a, b)| (*u1, *u2, jaccard(a, b)))
        .collect();

    for (u1, u2, score) in scores {
        println!(
            "Text similarity between '{u1}' and '{u2}': {}",
            format!("{:.2}%", score * 100.0).cyan().bold()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_tokenize_lowercases_and_splits_on_punctuation() {
        let tokens = tokenize("Hello, World! Hello again?");
        assert_eq!(tokens, set(&["hello", "world", "again"]));
    }

    #[test]
    fn test_tokenize_keeps_digits_and_unicode_letters() {
        let tokens = tokenize("café42 — naïve");
        assert_eq!(tokens, set(&["café42", "naïve"]));
    }

    #[test]
    fn test_tokenize_empty_text_is_an_empty_set() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ,,, !!! ").is_empty());
    }

    #[test]
    fn test_jaccard_identical_sets_score_one() {
        let a = set(&["one", "two", "three"]);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn test_jaccard_disjoint_sets_score_zero() {
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["c", "d"])), 0.0);
    }

    #[test]
    fn test_jaccard_empty_union_scores_zero() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        // intersection {b, c} = 2, union {a, b, c, d} = 4
        let score = jaccard(&set(&["a", "b", "c"]), &set(&["b", "c", "d"]));
        assert!((score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let html = r#"<html><head><style>body { color: red }</style></head>
            <body><p>visible words</p><script>var hidden = "sneaky";</script></body></html>"#;
        let text = visible_text(html);
        assert!(text.contains("visible words"));
        assert!(!text.contains("sneaky"));
        assert!(!text.contains("color"));
    }

    #[tokio::test]
    async fn test_fetch_visible_text_happy_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><h1>Hello</h1><script>nope()</script></body></html>",
            ))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let text = fetch_visible_text(&client, &format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert!(text.contains("Hello"));
        assert!(!text.contains("nope"));
    }

    #[tokio::test]
    async fn test_fetch_visible_text_rejects_non_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let result = fetch_visible_text(&client, &format!("{}/gone", server.uri())).await;
        assert!(result.is_err());
    }
}
