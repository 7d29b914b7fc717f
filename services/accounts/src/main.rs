use sea_orm::Database;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use fitbase_accounts::config::AccountsConfig;
use fitbase_accounts::infra::mailer::SmtpNotifier;
use fitbase_accounts::router::build_router;
use fitbase_accounts::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json())
        .init();

    let config = AccountsConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let notifier = SmtpNotifier::new(
        &config.smtp_host,
        config.smtp_port,
        config.smtp_username,
        config.smtp_password,
        &config.mail_from,
    )
    .expect("failed to build SMTP notifier");

    let state = AppState {
        db,
        notifier,
        jwt_secret: config.jwt_secret,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.accounts_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("accounts service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
