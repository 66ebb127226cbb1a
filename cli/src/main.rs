//! CLI entrypoint for agri-advisor
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use advisor_application::ports::language_model::LanguageModel;
use advisor_application::{AdvisorService, SessionStore, SpecialistRegistry};
use advisor_domain::QueryRequest;
use advisor_infrastructure::{
    ConfigLoader, CropSpecialist, FinanceSpecialist, GeminiLanguageModel, InMemorySessionCache,
    PolicySpecialist, WeatherSpecialist,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agri-advisor", about = "Multi-specialist agricultural advisory engine")]
struct Cli {
    /// Question to ask (omit with --chat for interactive mode)
    question: Option<String>,

    /// Interactive chat mode with a persistent session
    #[arg(long)]
    chat: bool,

    /// Location hint (district, state, or "lat,lon")
    #[arg(long)]
    location: Option<String>,

    /// Crop hint
    #[arg(long)]
    crop: Option<String>,

    /// Resume an existing session
    #[arg(long)]
    session: Option<String>,

    /// Explicit config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip config files and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Print the reply as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting agri-advisor");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };
    let behavior = config.behavior_config();

    // === Dependency Injection ===
    let model: Option<Arc<dyn LanguageModel>> = GeminiLanguageModel::try_new(&config.model)
        .map(|m| Arc::new(m) as Arc<dyn LanguageModel>);

    let fetch_timeout = Duration::from_secs(behavior.realtime_fetch_timeout_secs);
    let mut weather = WeatherSpecialist::new(config.weather.feed_url.clone(), fetch_timeout);
    let mut finance = FinanceSpecialist::new();
    if let Some(model) = &model {
        weather = weather.with_model(Arc::clone(model));
        finance = finance.with_model(Arc::clone(model));
    }

    let registry = Arc::new(
        SpecialistRegistry::new()
            .register(CropSpecialist::new())
            .register(weather)
            .register_session_aware(finance)
            .register(PolicySpecialist::new()),
    );

    let store = Arc::new(
        SessionStore::new(behavior.clone()).with_cache(Arc::new(InMemorySessionCache::new())),
    );
    let service = AdvisorService::new(registry, store, model, behavior);

    if cli.chat {
        return chat_loop(&service, &cli).await;
    }

    let question = match cli.question.clone() {
        Some(q) => q,
        None => bail!("Question is required. Use --chat for interactive mode."),
    };

    let reply = service.handle(request(&cli, &question, cli.session.clone())).await;
    print_reply(&reply, cli.json)?;
    Ok(())
}

fn request(cli: &Cli, question: &str, session_id: Option<String>) -> QueryRequest {
    let mut request = QueryRequest::new(question);
    if let Some(location) = &cli.location {
        request = request.with_location(location.clone());
    }
    if let Some(crop) = &cli.crop {
        request = request.with_crop(crop.clone());
    }
    if let Some(session_id) = session_id {
        request = request.with_session(session_id);
    }
    request
}

async fn chat_loop(service: &AdvisorService, cli: &Cli) -> Result<()> {
    println!("agri-advisor chat. Type 'exit' to quit.");
    let stdin = std::io::stdin();
    let mut session_id = cli.session.clone();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let reply = service.handle(request(cli, line, session_id.clone())).await;
        session_id = Some(reply.session_id.clone());
        print_reply(&reply, cli.json)?;
    }
    Ok(())
}

fn print_reply(reply: &advisor_domain::AdvisorReply, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reply)?);
        return Ok(());
    }

    println!();
    println!("{}", reply.answer);
    if !reply.evidence.is_empty() {
        println!();
        println!("Sources:");
        for evidence in &reply.evidence {
            println!("  - {}: {}", evidence.source, evidence.excerpt);
        }
    }
    println!();
    println!(
        "[confidence {:.2} | specialists: {} | trace: {} | session: {}]",
        reply.confidence,
        if reply.agents_consulted.is_empty() {
            "none".to_string()
        } else {
            reply.agents_consulted.join(", ")
        },
        reply.workflow_trace,
        reply.session_id
    );
    Ok(())
}
