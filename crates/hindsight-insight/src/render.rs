use hindsight_schema::GeneratedInsight;

/// Fixed plain-text rendering: header with the title-cased topic, summary,
/// then bulleted sections in contract order, closing with an integer-percent
/// confidence line. Empty sections are omitted, the order never changes.
pub fn render_text(insight: &GeneratedInsight) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "Personal Growth Insights: {}",
        title_case(&insight.topic)
    ));
    lines.push(String::new());
    lines.push(format!("Summary: {}", insight.summary));

    if !insight.key_learnings.is_empty() {
        lines.push(String::new());
        lines.push("Key Learnings:".to_string());
        for item in &insight.key_learnings {
            lines.push(format!("  - {item}"));
        }
    }

    if !insight.evolution_timeline.is_empty() {
        lines.push(String::new());
        lines.push("Evolution Timeline:".to_string());
        for stage in &insight.evolution_timeline {
            lines.push(format!("  - {}: {}", stage.stage, stage.description));
        }
    }

    if !insight.breakthrough_moments.is_empty() {
        lines.push(String::new());
        lines.push("Breakthrough Moments:".to_string());
        for moment in &insight.breakthrough_moments {
            let short_id: String = moment.conversation_id.to_string().chars().take(8).collect();
            lines.push(format!("  - [{short_id}] \"{}\"", moment.content));
        }
    }

    if !insight.next_steps.is_empty() {
        lines.push(String::new());
        lines.push("Next Steps:".to_string());
        for step in &insight.next_steps {
            lines.push(format!("  - {step}"));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Confidence: {}%",
        (insight.confidence_score * 100.0).round() as i64
    ));

    lines.join("\n")
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
