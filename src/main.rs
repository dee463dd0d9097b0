use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use uxr_sim_lib::config::{Settings, SettingsOverrides};
use uxr_sim_lib::llm::{ChatClientFactory, ClientFactory};
use uxr_sim_lib::research::{execute_research, LogObserver, ResearchConfig};
use uxr_sim_lib::server::{self, ServerAppState};
use uxr_sim_lib::shutdown::{register_signal_handlers, ShutdownState};

/// Simulated user research: personas, interviews and synthesis driven by a language model
#[derive(Parser, Debug)]
#[command(name = "uxr-sim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to ~/.uxr-sim/config.toml)
    #[arg(long, global = true, env = "UXR_CONFIG")]
    config: Option<PathBuf>,

    /// Model provider preset (e.g. cerebras, openai)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model name, overriding the provider default
    #[arg(long, global = true)]
    model: Option<String>,

    /// API key used when a request carries no credentials
    #[arg(long, global = true, env = "UXR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Port to bind the server to
        #[arg(long, env = "UXR_PORT")]
        port: Option<u16>,

        /// Address to bind the server to
        #[arg(long)]
        bind: Option<String>,

        /// Allowed CORS origin (repeatable; any origin when omitted)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },

    /// Run one research workflow and print the report as JSON
    Run {
        /// Research question
        question: String,

        /// Target audience
        audience: String,

        /// Number of personas to interview
        #[arg(long)]
        interviews: Option<u32>,

        /// Number of interview questions
        #[arg(long)]
        questions: Option<u32>,

        /// Ask one follow-up question per interview
        #[arg(long)]
        follow_up: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    let mut overrides = SettingsOverrides {
        provider: cli.provider,
        model: cli.model,
        api_key: cli.api_key,
        ..Default::default()
    };

    match cli.command {
        Command::Serve {
            port,
            bind,
            cors_origins,
        } => {
            overrides.port = port;
            overrides.bind = bind;
            overrides.cors_origins = cors_origins;
            serve(settings.merge(&overrides))
        }
        Command::Run {
            question,
            audience,
            interviews,
            questions,
            follow_up,
        } => {
            let settings = settings.merge(&overrides);
            let config = ResearchConfig::new(
                question,
                audience,
                interviews.unwrap_or(settings.research.default_interviews),
                questions.unwrap_or(settings.research.default_questions),
                settings.model.resolved_api_key().unwrap_or_default(),
            )
            .with_follow_up(follow_up);
            config.validate(&settings.research)?;

            let factory = ChatClientFactory::new(settings.model.clone());
            let client = factory.build(&config.credentials)?;
            let report = execute_research(client.as_ref(), config, &settings.research, &LogObserver)?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

fn serve(settings: Settings) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow!("Failed to create tokio runtime: {}", e))?;

    rt.block_on(async {
        let shutdown_state = ShutdownState::new();
        if let Err(e) = register_signal_handlers(shutdown_state.clone()) {
            log::warn!("Failed to register signal handlers: {}", e);
        }

        if settings.model.resolved_api_key().is_none() {
            log::warn!("No API key configured; requests must carry credentials");
        }

        let factory: Arc<dyn ClientFactory> = Arc::new(ChatClientFactory::new(settings.model.clone()));
        let state = ServerAppState::new(settings, factory, shutdown_state);

        server::run_server(state).await.map_err(|e| anyhow!(e))
    })
}
