//! Compact text rendering of recommendations for the roadmap prompt.

use crate::engine::RecommendationResult;

/// Separator between tags.
pub const TAG_SEPARATOR: &str = ", ";

/// Render one line per result: `- {title}: {description} (tags: {tags})`.
///
/// An empty tag list renders as `(tags: )`.
pub fn summarize(results: &[RecommendationResult]) -> String {
    results
        .iter()
        .map(|result| {
            let job = &result.job;
            format!(
                "- {}: {} (tags: {})",
                job.title,
                job.description,
                job.tags.join(TAG_SEPARATOR)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::corpus::JobPosting;

    fn result(id: usize, title: &str, tags: &[&str], score: f32) -> RecommendationResult {
        RecommendationResult {
            job: Arc::new(JobPosting {
                id,
                title: title.to_string(),
                description: format!("{title} work."),
                tags: tags.iter().map(ToString::to_string).collect(),
            }),
            score,
        }
    }

    #[test]
    fn test_one_line_per_result() {
        let summary = summarize(&[
            result(0, "Data Scientist", &["python", "ml"], 0.9),
            result(1, "Backend Engineer", &["go"], 0.4),
        ]);

        assert_eq!(
            summary,
            "- Data Scientist: Data Scientist work. (tags: python, ml)\n\
             - Backend Engineer: Backend Engineer work. (tags: go)"
        );
    }

    #[test]
    fn test_empty_tags() {
        let summary = summarize(&[result(0, "Generalist", &[], 0.1)]);
        assert_eq!(summary, "- Generalist: Generalist work. (tags: )");
    }

    #[test]
    fn test_no_results() {
        assert_eq!(summarize(&[]), "");
    }
}
