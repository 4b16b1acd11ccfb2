#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! REST API for the batch email service

use std::{
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use anyhow::Result;
use clap::Parser;
use mailroom::{
    domain::{
        batch::{BatchOptions, EmailBatchServiceImpl, SenderIdentity},
        communication::email_addresses::EmailAddress,
        rules::SendToRelatedContactAction,
        tokens::{RendererConfig, TokenRenderer},
    },
    infrastructure::{
        db::postgres::{DatabaseConnectionDetails, PostgresDatabase},
        email::smtp::{SMTPConfig, SMTPMailer},
        http::{
            servers::{http::HttpServer, https::HttpsServer},
            state::AppState,
            HttpServerConfig, Server,
        },
    },
};

/// Sender identity, token and batch options
#[derive(Debug, Parser)]
pub struct MailConfig {
    /// The default from display name
    #[clap(long, env = "MAIL_FROM_NAME")]
    pub from_name: String,

    /// The default from address
    #[clap(long, env = "MAIL_FROM_EMAIL")]
    pub from_email: String,

    /// The organisation name, available as a domain token
    #[clap(long, env = "DOMAIN_NAME", default_value = "")]
    pub domain_name: String,

    /// Run rendered output through the secondary templating pass
    #[clap(long, env = "SECONDARY_PASS", default_value = "false")]
    pub secondary_pass: bool,

    /// Keep sending after a per-recipient delivery failure
    #[clap(long, env = "CONTINUE_ON_ERROR", default_value = "false")]
    pub continue_on_error: bool,

    /// Per-request processing deadline in seconds
    #[clap(long, env = "SEND_DEADLINE_SECS", default_value = "60")]
    pub send_deadline_secs: u64,
}

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The HTTP server configuration
    #[clap(flatten)]
    pub server: HttpServerConfig,

    /// The database connection details
    #[clap(flatten)]
    pub db: DatabaseConnectionDetails,

    /// The SMTP transport configuration
    #[clap(flatten)]
    pub smtp: SMTPConfig,

    /// The sending configuration
    #[clap(flatten)]
    pub mail: MailConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Failed to load environment: {}", e);

        return Err(e.into());
    }

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let postgres = Arc::new(PostgresDatabase::new(&args.db.connection_string).await?);
    let mailer = Arc::new(SMTPMailer::new(args.smtp));

    let mut renderer_config = RendererConfig {
        secondary_pass: args.mail.secondary_pass,
        ..RendererConfig::default()
    };

    if !args.mail.domain_name.is_empty() {
        renderer_config
            .domain_tokens
            .insert("name".to_string(), args.mail.domain_name.clone());
    }

    let identity = SenderIdentity {
        name: args.mail.from_name.clone(),
        email: EmailAddress::new(&args.mail.from_email)?,
    };

    let options = BatchOptions {
        continue_on_error: args.mail.continue_on_error,
        deadline: Duration::from_secs(args.mail.send_deadline_secs),
    };

    let batch = EmailBatchServiceImpl::new(
        Arc::clone(&postgres),
        Arc::clone(&postgres),
        mailer,
        Arc::clone(&postgres),
        Arc::new(TokenRenderer::new(renderer_config)),
        identity,
        options,
    );

    let rules = SendToRelatedContactAction::new(
        Arc::clone(&postgres),
        batch.clone(),
        Arc::clone(&postgres),
    );

    let state = AppState::new(batch, rules);

    let http_port = args.server.http_port;
    let https_port = args.server.https_port;

    let _ = tokio::join!(
        tokio::spawn(
            HttpServer::new(
                SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), http_port),
                &args.server.base_url,
            )
            .await?
            .run()
        ),
        tokio::spawn(
            HttpServer::new(
                SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), http_port),
                &args.server.base_url,
            )
            .await?
            .run()
        ),
        tokio::spawn(
            HttpsServer::new(
                SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), https_port),
                &args.server.cert_path,
                &args.server.key_path,
                state.clone(),
            )
            .await?
            .run()
        ),
        tokio::spawn(
            HttpsServer::new(
                SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), https_port),
                &args.server.cert_path,
                &args.server.key_path,
                state,
            )
            .await?
            .run()
        ),
    );

    Ok(())
}
