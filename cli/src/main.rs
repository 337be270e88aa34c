//! `career-coach`: suggest job roles for a profile and draft a learning roadmap.
//!
//! Usage: career-coach --top-k 3 "I know Python and SQL, want to become an ML engineer"

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use coach_recommender::{
    CareerRecommender, QueryConfig, RecommendationResult, RecommenderConfig, generate_plan,
};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "career-coach", version)]
#[command(about = "Recommend job roles for a profile and draft a learning roadmap")]
struct Cli {
    /// Background, skills and goals. Read from stdin when omitted or `-`.
    profile: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "CAREER_COACH_CONFIG")]
    config: Option<PathBuf>,

    /// Job corpus JSON file, overrides the configuration
    #[arg(long)]
    jobs: Option<PathBuf>,

    /// Number of roles to suggest
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Embedding model, overrides the configuration
    #[arg(long)]
    model: Option<String>,

    /// Skip roadmap generation
    #[arg(long)]
    no_roadmap: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    roles: &'a [RecommendationResult],
    roadmap: Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(&cli).await?;
    let top_k = resolve_top_k(cli.top_k, &config.query)?;

    let profile = read_profile(cli.profile.as_deref()).await?;
    ensure!(
        !profile.trim().is_empty(),
        "please describe your background, skills and goals"
    );

    let recommender = CareerRecommender::from_config(&config)
        .await
        .context("failed to build the recommender")?;
    info!(stats = ?recommender.stats(), "Recommender ready");

    let roles = recommender.recommend_roles(&profile, top_k).await?;

    let roadmap = if config.roadmap.enabled && !cli.no_roadmap {
        let generator = config.roadmap.build_generator();
        Some(generate_plan(&generator, &profile, &roles).await)
    } else {
        None
    };

    if cli.json {
        let report = Report {
            roles: &roles,
            roadmap: roadmap.as_deref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_roles(&roles));
        if let Some(plan) = roadmap {
            println!("\nPersonalized Career Roadmap:\n\n{}", plan.trim_end());
        }
    }

    Ok(())
}

/// Log to stderr so stdout carries only results. `RUST_LOG` overrides the
/// default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_config(cli: &Cli) -> Result<RecommenderConfig> {
    let mut config = match &cli.config {
        Some(path) => RecommenderConfig::from_toml_file(path)
            .await
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => RecommenderConfig::default(),
    };

    if let Some(jobs) = &cli.jobs {
        config.corpus_path = jobs.clone();
    }
    if let Some(model) = &cli.model {
        config.embedding.model = model.clone();
    }

    config.validate()?;
    Ok(config)
}

fn resolve_top_k(requested: Option<usize>, query: &QueryConfig) -> Result<usize> {
    let k = requested.unwrap_or(query.default_top_k);
    ensure!(
        (1..=query.max_top_k).contains(&k),
        "--top-k must be between 1 and {}, got {k}",
        query.max_top_k
    );
    Ok(k)
}

async fn read_profile(arg: Option<&str>) -> Result<String> {
    match arg {
        Some(text) if text != "-" => Ok(text.to_string()),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("failed to read profile from stdin")?;
            Ok(text)
        }
    }
}

fn render_roles(roles: &[RecommendationResult]) -> String {
    let mut out = String::from("Top matched roles:\n");
    for (i, role) in roles.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n{}. {} (match {:.3})\n   {}",
            i + 1,
            role.job.title,
            role.score,
            role.job.description
        );
    }
    out
}
