//! Integration tests for the HTTP insight lookup.
//!
//! Each test serves a canned results page from a local axum server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::RawQuery;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use tokio::net::TcpListener;
use triage::{HttpInsightLookup, SAFETY_MESSAGE, SymptomAnalyzer, TriageError, UrgencyLevel};

const SNIPPET_A: &str =
    "Migraine is a primary headache disorder characterized by recurrent headaches.";
const SNIPPET_B: &str =
    "Influenza commonly presents with fever, cough, sore throat and muscle aches.";

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/search")
}

async fn results_page(RawQuery(query): RawQuery) -> Html<String> {
    Html(format!(
        r#"<html><head><script>var q = "{q}";</script></head><body>
        <nav>Sign in to see your search history, saved places and account settings.</nav>
        <div class="BNeawe">{SNIPPET_A}</div>
        <div class="BNeawe">short</div>
        <div class="BNeawe s3v9rd">{SNIPPET_B}</div>
        <div class="BNeawe">The query that reached the server was {q} and it is echoed here.</div>
        <footer>Results are personalized. Learn more about privacy and terms of service.</footer>
        </body></html>"#,
        q = query.unwrap_or_default()
    ))
}

fn symptoms(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn snippets_are_extracted_from_the_page() {
    let url = serve(Router::new().route("/search", get(results_page))).await;
    let lookup = HttpInsightLookup::new(url, Duration::from_secs(5)).unwrap();
    let analyzer = SymptomAnalyzer::new(Arc::new(lookup));

    let report = analyzer
        .analyze(&symptoms(&["headache", "fever"]))
        .await
        .unwrap();

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.results[0], SNIPPET_A);
    assert_eq!(report.results[1], SNIPPET_B);
    assert!(report.results[2].contains("q=headache+fever+disease+symptoms"));
    assert_eq!(report.analysis.insights, report.results);
    assert_eq!(report.analysis.urgency_level, UrgencyLevel::Medium);
}

#[tokio::test]
async fn symptoms_are_percent_encoded_in_the_query() {
    let url = serve(Router::new().route("/search", get(results_page))).await;
    let lookup = HttpInsightLookup::new(url, Duration::from_secs(5)).unwrap();
    let analyzer = SymptomAnalyzer::new(Arc::new(lookup));

    let report = analyzer
        .analyze(&symptoms(&["rash & itching", "fever#2"]))
        .await
        .unwrap();

    let echoed = report.results.last().unwrap();
    assert!(
        echoed.contains("q=rash+%26+itching+fever%232+disease+symptoms"),
        "unexpected query: {echoed}"
    );
}

#[tokio::test]
async fn custom_result_class_selects_other_containers() {
    let page = || async {
        Html(format!(
            r#"<div class="BNeawe">{SNIPPET_A}</div><div class="result">{SNIPPET_B}</div>"#
        ))
    };
    let url = serve(Router::new().route("/search", get(page))).await;
    let lookup = HttpInsightLookup::new(url, Duration::from_secs(5))
        .unwrap()
        .with_result_class("result");
    let analyzer = SymptomAnalyzer::new(Arc::new(lookup));

    let report = analyzer.analyze(&symptoms(&["fever"])).await.unwrap();
    assert_eq!(report.results, vec![SNIPPET_B.to_string()]);
}

#[tokio::test]
async fn error_status_is_a_lookup_failure() {
    let url = serve(Router::new().route(
        "/search",
        get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    ))
    .await;
    let lookup = HttpInsightLookup::new(url, Duration::from_secs(5)).unwrap();
    let analyzer = SymptomAnalyzer::new(Arc::new(lookup));
    let input = symptoms(&["chest pain"]);

    let err = analyzer.analyze(&input).await.unwrap_err();
    assert!(matches!(err, TriageError::Lookup(ref m) if m.contains("429")));

    let report = analyzer.analyze_with_fallback(&input).await.unwrap();
    assert_eq!(report.analysis.insights, vec![SAFETY_MESSAGE.to_string()]);
    assert_eq!(report.analysis.urgency_level, UrgencyLevel::High);
}

#[tokio::test]
async fn unreachable_host_degrades_gracefully() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let lookup =
        HttpInsightLookup::new(format!("http://{addr}/search"), Duration::from_secs(2)).unwrap();
    let analyzer = SymptomAnalyzer::new(Arc::new(lookup));

    let report = analyzer
        .analyze_with_fallback(&symptoms(&["cough"]))
        .await
        .unwrap();
    assert!(report.results.is_empty());
    assert_eq!(report.analysis.insights, vec![SAFETY_MESSAGE.to_string()]);
}
