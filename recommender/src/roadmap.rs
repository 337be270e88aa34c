//! Learning roadmap generation.
//!
//! The roadmap itself comes from a local language model; this module owns the
//! prompt and the call boundary. Model output is returned as-is and never
//! parsed.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use coach_embeddings::ExternalCommand;
use tracing::{info, warn};

use crate::engine::RecommendationResult;
use crate::error::{RecommenderError, Result};
use crate::summary::summarize;

/// Instructions placed ahead of every roadmap prompt.
pub const ROADMAP_PREAMBLE: &str = "You are an expert AI career coach. Given a user's background and possible job roles, produce:\n\
     1. Best matched role and reason.\n\
     2. Key skills to learn.\n\
     3. 3/6/12-month learning roadmap with milestones.\n\
     4. Example projects to build.\n\
     Be practical and concise.";

/// Text returned when generation fails.
pub const ROADMAP_FALLBACK: &str = "Failed to generate plan. Please check Ollama setup.";

/// A rendered roadmap request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapPrompt {
    background: String,
    roles: String,
}

impl RoadmapPrompt {
    /// Create a prompt from the user's background and summarized roles.
    pub fn new(background: impl Into<String>, roles: impl Into<String>) -> Self {
        Self {
            background: background.into(),
            roles: roles.into(),
        }
    }

    /// Create a prompt from recommendation results.
    pub fn from_results(background: impl Into<String>, results: &[RecommendationResult]) -> Self {
        Self::new(background, summarize(results))
    }
}

impl fmt::Display for RoadmapPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ROADMAP_PREAMBLE}\nUser background:\n{}\n\nTop roles:\n{}\n\nNow create the plan.",
            self.background, self.roles
        )
    }
}

/// Trait for roadmap generators.
#[async_trait]
pub trait RoadmapGenerator: Send + Sync {
    /// Get the name of this generator.
    fn name(&self) -> &str;

    /// Produce free-form roadmap text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Roadmaps through `ollama run <model>`, with the prompt on stdin.
pub struct OllamaRoadmapGenerator {
    command: ExternalCommand,
    model: String,
}

impl OllamaRoadmapGenerator {
    /// Create a generator that runs the `ollama` binary from `PATH`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            command: ExternalCommand::new("ollama").with_timeout(Duration::from_secs(300)),
            model: model.into(),
        }
    }

    /// Replace the command template.
    pub fn with_command(mut self, command: ExternalCommand) -> Self {
        self.command = command;
        self
    }

    /// The generation model.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl RoadmapGenerator for OllamaRoadmapGenerator {
    fn name(&self) -> &str {
        "ollama-run"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        info!(model = %self.model, "Generating roadmap");
        self.command
            .run(&["run", &self.model], Some(prompt.as_bytes()))
            .await
            .map_err(|e| RecommenderError::Roadmap(e.to_string()))
    }
}

/// Generate a roadmap for `background` and the recommended roles.
///
/// Never fails: a generator error is logged and replaced by
/// [`ROADMAP_FALLBACK`].
pub async fn generate_plan<G>(
    generator: &G,
    background: &str,
    results: &[RecommendationResult],
) -> String
where
    G: RoadmapGenerator + ?Sized,
{
    let prompt = RoadmapPrompt::from_results(background, results).to_string();
    match generator.generate(&prompt).await {
        Ok(plan) => plan,
        Err(e) => {
            warn!(generator = generator.name(), error = %e, "Roadmap generation failed");
            ROADMAP_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::corpus::JobPosting;

    /// Records prompts and replies with a canned answer.
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
        reply: Option<String>,
    }

    impl RecordingGenerator {
        fn replying(reply: Option<&str>) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                reply: reply.map(str::to_string),
            }
        }
    }

    #[async_trait]
    impl RoadmapGenerator for RecordingGenerator {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .ok_or_else(|| RecommenderError::Roadmap("model offline".to_string()))
        }
    }

    fn results() -> Vec<RecommendationResult> {
        vec![RecommendationResult {
            job: Arc::new(JobPosting {
                id: 0,
                title: "ML Engineer".to_string(),
                description: "Ships models.".to_string(),
                tags: vec!["python".to_string(), "pytorch".to_string()],
            }),
            score: 0.82,
        }]
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = RoadmapPrompt::new("I know Python.", "- ML Engineer").to_string();

        assert!(prompt.starts_with(ROADMAP_PREAMBLE));
        assert!(prompt.ends_with(
            "\nUser background:\nI know Python.\n\nTop roles:\n- ML Engineer\n\nNow create the plan."
        ));
    }

    #[tokio::test]
    async fn test_generate_plan_passes_summary() {
        let generator = RecordingGenerator::replying(Some("Month 1: linear algebra"));

        let plan = generate_plan(&generator, "I know Python.", &results()).await;

        assert_eq!(plan, "Month 1: linear algebra");
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- ML Engineer: Ships models. (tags: python, pytorch)"));
    }

    #[tokio::test]
    async fn test_generate_plan_fallback() {
        let generator = RecordingGenerator::replying(None);
        let plan = generate_plan(&generator, "I know Python.", &results()).await;
        assert_eq!(plan, ROADMAP_FALLBACK);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ollama_generator_reads_prompt_from_stdin() {
        // $1=run $2=<model>; echo the model then the prompt.
        let generator = OllamaRoadmapGenerator::new("tiny").with_command(
            ExternalCommand::new("sh").with_leading_args(["-c", "echo \"[$1 $2]\"; cat", "ollama"]),
        );

        let output = generator.generate("plan please").await.unwrap();
        assert_eq!(output, "[run tiny]\nplan please");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ollama_generator_failure() {
        let generator = OllamaRoadmapGenerator::new("tiny")
            .with_command(ExternalCommand::new("sh").with_leading_args(["-c", "exit 2", "ollama"]));

        let err = generator.generate("plan please").await.unwrap_err();
        assert!(matches!(err, RecommenderError::Roadmap(_)));
    }
}
