use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use podium_interview::{
    create_router, AppState, Config, HttpAiClient, InMemoryPreviewRegistry, MediaCapture, MediaCaptureProvider,
    NatsResultPublisher, PreviewRegistry, ResponseArtifact, Services, SetupMetadata, SubmissionConfig,
    SubmissionCoordinator, SyntheticCaptureProvider,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "podium-interview", version, about = "Mock interview sessions with recorded answers and AI review")]
struct Cli {
    /// Config file, without extension
    #[arg(long, default_value = "config/podium-interview")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve,

    /// Run one interview from the terminal and print the report
    Practice {
        #[arg(long)]
        company: String,

        #[arg(long)]
        position: String,

        #[arg(long, default_value = "Mid-level")]
        experience: String,

        #[arg(long, default_value_t = 3)]
        questions: usize,

        /// Answer every question with this video file instead of recording
        #[arg(long)]
        video: Option<String>,

        /// Seconds to record each answer with the synthetic camera
        #[arg(long, default_value_t = 3)]
        record_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Podium Interview v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("AI service: {}", cfg.ai.base_url);

    let services = build_services(&cfg).await?;

    match cli.command {
        Command::Serve => serve(&cfg, services).await,
        Command::Practice {
            company,
            position,
            experience,
            questions,
            video,
            record_secs,
        } => {
            let setup = SetupMetadata::new(company, position, experience, questions);
            let video = video.map(|path| shellexpand::tilde(&path).into_owned());
            practice(services, setup, video, Duration::from_secs(record_secs)).await
        }
    }
}

async fn build_services(cfg: &Config) -> Result<Services> {
    let ai = Arc::new(HttpAiClient::new(cfg.ai.clone())?);

    let registry: Arc<dyn PreviewRegistry> = Arc::new(InMemoryPreviewRegistry::new());
    let provider: Arc<dyn MediaCaptureProvider> = Arc::new(SyntheticCaptureProvider::new());
    let capture = MediaCapture::new(provider, registry, cfg.capture.to_capture_config());

    let mut coordinator = SubmissionCoordinator::new(
        ai.clone(),
        SubmissionConfig {
            review_timeout: Duration::from_secs(cfg.submission.review_timeout_secs),
            score_range: cfg.ai.score,
        },
    );

    if cfg.ai.summary_path.is_some() {
        coordinator = coordinator.with_summarizer(ai.clone());
    }

    if let Some(url) = &cfg.results.nats_url {
        match NatsResultPublisher::connect(url).await {
            Ok(publisher) => coordinator = coordinator.with_result_store(Arc::new(publisher)),
            Err(e) => warn!("Results will not be published: {:#}", e),
        }
    }

    Ok(Services {
        questions: ai,
        capture,
        coordinator: Arc::new(coordinator),
    })
}

async fn serve(cfg: &Config, services: Services) -> Result<()> {
    let app = create_router(AppState::new(services));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP API listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn practice(
    services: Services,
    setup: SetupMetadata,
    video: Option<String>,
    record_for: Duration,
) -> Result<()> {
    let setup = setup.validated()?;
    let questions = services
        .questions
        .generate_questions(&setup)
        .await
        .context("Failed to generate questions")?;

    let mut controller = services.controller();
    controller.start(questions, setup)?;

    loop {
        let (index, count, question) = {
            let state = controller.state().context("Interview is not running")?;
            let index = state.current_index();
            (index, state.questions().len(), state.question(index).unwrap_or_default().to_string())
        };
        info!("Question {}/{}: {}", index + 1, count, question);

        match &video {
            Some(path) => {
                let artifact = ResponseArtifact::from_file(path, controller.registry()).await?;
                controller.answer_current(artifact)?;
            }
            None => {
                controller.start_recording().await?;
                tokio::time::sleep(record_for).await;
                controller.stop_recording().await?;
            }
        }

        if !controller.advance()? {
            break;
        }
    }

    let report = controller.complete().await?;
    info!(
        "Interview scored {} ({}), {} of {} answers reviewed",
        report.score,
        report.category,
        report.success_count(),
        report.feedbacks.len()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
