use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::insights::InsightLookup;
use crate::urgency::{UrgencyLevel, classify_urgency};

/// Shown in place of insights when the lookup is unavailable.
pub const SAFETY_MESSAGE: &str = "We couldn't retrieve additional information right now. \
     If your symptoms are severe or worsening, please contact a healthcare professional \
     or emergency services.";

const GENERAL_RECOMMENDATIONS: [&str; 3] =
    ["Consult a doctor", "Get relevant tests", "Monitor symptoms"];

/// Snippets must be longer than this many characters to be kept.
const MIN_SNIPPET_CHARS: usize = 50;
const MAX_INSIGHTS: usize = 3;
const MAX_RESULTS: usize = 5;

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub possible_conditions: Vec<String>,
    pub recommendations: Vec<String>,
    pub urgency_level: UrgencyLevel,
    pub should_see_doctor: bool,
    pub insights: Vec<String>,
}

impl Analysis {
    fn new(urgency_level: UrgencyLevel, insights: Vec<String>) -> Self {
        Self {
            possible_conditions: Vec::new(),
            recommendations: GENERAL_RECOMMENDATIONS.map(String::from).to_vec(),
            urgency_level,
            should_see_doctor: true,
            insights,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomReport {
    pub analysis: Analysis,
    pub results: Vec<String>,
}

/// Classifies symptoms and enriches them with lookup snippets.
pub struct SymptomAnalyzer<L: ?Sized> {
    lookup: Arc<L>,
    timeout: Duration,
}

impl<L: InsightLookup + ?Sized> SymptomAnalyzer<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self::with_timeout(lookup, DEFAULT_LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(lookup: Arc<L>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    /// Analyzes `symptoms`, failing if the lookup fails or times out.
    #[tracing::instrument(skip(self))]
    pub async fn analyze(&self, symptoms: &[String]) -> Result<SymptomReport> {
        let symptoms = validate(symptoms)?;
        let urgency = classify_urgency(&symptoms);
        metrics::counter!("symptom_analyses_total", "urgency" => urgency.as_str()).increment(1);

        let results = match tokio::time::timeout(self.timeout, self.snippets(&symptoms)).await {
            Ok(Ok(results)) => results,
            Ok(Err(e)) => {
                metrics::counter!("insight_lookup_failures_total").increment(1);
                return Err(e);
            }
            Err(_) => {
                metrics::counter!("insight_lookup_failures_total").increment(1);
                return Err(TriageError::LookupTimeout(self.timeout));
            }
        };

        tracing::info!(urgency = %urgency, snippets = results.len(), "Symptoms analyzed");
        let insights = results.iter().take(MAX_INSIGHTS).cloned().collect();
        Ok(SymptomReport {
            analysis: Analysis::new(urgency, insights),
            results,
        })
    }

    /// Like [`analyze`](Self::analyze), but a failed lookup yields a report
    /// carrying only the safety message. Invalid input still fails.
    pub async fn analyze_with_fallback(&self, symptoms: &[String]) -> Result<SymptomReport> {
        match self.analyze(symptoms).await {
            Err(e) if e.is_lookup_failure() => {
                tracing::warn!(error = %e, "Insight lookup unavailable, using safety message");
                Ok(fallback_report(symptoms))
            }
            other => other,
        }
    }

    async fn snippets(&self, symptoms: &[String]) -> Result<Vec<String>> {
        let mut stream = self.lookup.lookup(symptoms).await?;
        let mut results = Vec::with_capacity(MAX_RESULTS);

        while let Some(snippet) = stream.next().await {
            let snippet = snippet?;
            if snippet.chars().count() > MIN_SNIPPET_CHARS {
                results.push(snippet);
                if results.len() == MAX_RESULTS {
                    break;
                }
            }
        }
        Ok(results)
    }
}

fn validate(symptoms: &[String]) -> Result<Vec<String>> {
    let cleaned: Vec<String> = symptoms
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if cleaned.is_empty() {
        return Err(TriageError::InvalidSymptoms);
    }
    Ok(cleaned)
}

fn fallback_report(symptoms: &[String]) -> SymptomReport {
    SymptomReport {
        analysis: Analysis::new(
            classify_urgency(symptoms),
            vec![SAFETY_MESSAGE.to_string()],
        ),
        results: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticInsightLookup;

    fn long(tag: &str) -> String {
        format!("{tag}: {}", "x".repeat(60))
    }

    fn symptoms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn short_snippets_are_dropped_and_counts_capped() {
        let mut snippets: Vec<String> = (0..8).map(|i| long(&i.to_string())).collect();
        snippets.insert(1, "too short".to_string());
        snippets.insert(2, "y".repeat(50));
        let analyzer = SymptomAnalyzer::new(Arc::new(StaticInsightLookup::new(snippets)));

        let report = analyzer.analyze(&symptoms(&["cough"])).await.unwrap();
        assert_eq!(report.results.len(), 5);
        assert_eq!(report.analysis.insights, report.results[..3].to_vec());
        assert!(report.results.iter().all(|s| s.chars().count() > 50));
    }

    #[tokio::test]
    async fn blank_symptoms_are_invalid() {
        let lookup = Arc::new(StaticInsightLookup::empty());
        let analyzer = SymptomAnalyzer::new(lookup.clone());

        for input in [symptoms(&[]), symptoms(&["  ", ""])] {
            let err = analyzer.analyze_with_fallback(&input).await.unwrap_err();
            assert!(matches!(err, TriageError::InvalidSymptoms));
            assert_eq!(err.to_string(), "Invalid symptoms provided");
        }
        assert_eq!(lookup.calls(), 0);
    }

    #[tokio::test]
    async fn fixed_fields_are_always_present() {
        let analyzer = SymptomAnalyzer::new(Arc::new(StaticInsightLookup::empty()));
        let report = analyzer.analyze(&symptoms(&["mild headache"])).await.unwrap();

        let analysis = report.analysis;
        assert!(analysis.possible_conditions.is_empty());
        assert_eq!(
            analysis.recommendations,
            vec!["Consult a doctor", "Get relevant tests", "Monitor symptoms"]
        );
        assert_eq!(analysis.urgency_level, UrgencyLevel::Medium);
        assert!(analysis.should_see_doctor);
        assert!(analysis.insights.is_empty());
    }

    #[tokio::test]
    async fn lookup_failure_falls_back_to_safety_message() {
        let analyzer = SymptomAnalyzer::new(Arc::new(StaticInsightLookup::failing("offline")));
        let input = symptoms(&["chest pain"]);

        assert!(matches!(
            analyzer.analyze(&input).await,
            Err(TriageError::Lookup(_))
        ));

        let report = analyzer.analyze_with_fallback(&input).await.unwrap();
        assert_eq!(report.analysis.insights, vec![SAFETY_MESSAGE.to_string()]);
        assert_eq!(report.analysis.urgency_level, UrgencyLevel::High);
        assert!(report.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookup_times_out() {
        let lookup = StaticInsightLookup::new([long("late")]).with_delay(Duration::from_secs(30));
        let analyzer = SymptomAnalyzer::new(Arc::new(lookup));
        let input = symptoms(&["fever"]);

        assert!(matches!(
            analyzer.analyze(&input).await,
            Err(TriageError::LookupTimeout(d)) if d == DEFAULT_LOOKUP_TIMEOUT
        ));
        let report = analyzer.analyze_with_fallback(&input).await.unwrap();
        assert_eq!(report.analysis.insights, vec![SAFETY_MESSAGE.to_string()]);
    }

    #[test]
    fn analysis_uses_camel_case_fields() {
        let json = serde_json::to_value(Analysis::new(UrgencyLevel::High, vec![])).unwrap();
        assert_eq!(json["urgencyLevel"], "high");
        assert_eq!(json["shouldSeeDoctor"], true);
        assert!(json["possibleConditions"].as_array().unwrap().is_empty());
    }
}
