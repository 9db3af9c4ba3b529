use std::{process, sync::Arc};

use postboard::{
    application::{error::AppError, posts::PostService, repos::PostsRepo},
    config,
    infra::{
        error::InfraError,
        http::{self, ApiState},
        memory::InMemoryPostsRepo,
        notify, telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repo: Arc<dyn PostsRepo> = Arc::new(InMemoryPostsRepo::new());
    let dispatcher = notify::build_dispatcher(&settings.notifications)
        .map_err(|err| AppError::from(InfraError::configuration(err.to_string())))?;

    if dispatcher.is_empty() {
        warn!(
            target = "postboard::notify",
            "no notification channels enabled; post updates will not be announced"
        );
    } else {
        info!(
            target = "postboard::notify",
            channels = ?dispatcher.channels(),
            "notification channels enabled"
        );
    }

    let posts = PostService::new(repo, dispatcher);
    let router = http::build_router(ApiState::new(posts));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "postboard::http",
        addr = %settings.server.addr,
        "listening for requests"
    );

    http::serve(listener, router).await.map_err(AppError::from)
}
