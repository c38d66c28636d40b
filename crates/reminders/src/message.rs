use health_store::AssessmentRecord;

/// SMS text inviting a user back to the assessment.
///
/// Mentions the date and wellbeing score of `last_assessment` when there is one.
pub fn compose_message(app_url: &str, last_assessment: Option<&AssessmentRecord>) -> String {
    let mut message = String::from("Time for your mental health check-in! ");

    if let Some(record) = last_assessment {
        message.push_str(&format!(
            "Your last assessment was on {}. ",
            record.completed_at.format("%b %-d")
        ));

        let wellbeing = record.score("wellbeing").unwrap_or(0.0);
        message.push_str(&format!(
            "Your previous well-being score was {}/100. ",
            wellbeing.round()
        ));
    }

    message.push_str(&format!(
        "\nComplete your assessment here: {}/mental-health",
        app_url.trim_end_matches('/')
    ));
    message
}
