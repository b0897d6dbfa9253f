//! Atelier Operator - Main Entry Point

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kube::api::Api;
use kube::Client;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use atelier_model::{AppDefinition, ConversionService, Session, Workspace};
use atelier_operator::reconcile::{
    AppDefinitionValidationHandler, ReconcileMachine, WorkspaceStorageOrchestrator,
};
use atelier_operator::watcher::{run_controller, OperatorState};
use atelier_operator::{web, KubeResourceClient};
use atelier_shared::OperatorConfig;
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};

/// Atelier Kubernetes Operator
#[derive(Parser, Debug)]
#[command(name = "atelier-operator")]
#[command(version = "0.1.0")]
#[command(about = "Kubernetes operator for Atelier development environments", long_about = None)]
struct Args {
    /// Kubernetes namespace to watch (overrides ATELIER_NAMESPACE)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Conversion webhook port (overrides ATELIER_WEBHOOK_PORT)
    #[arg(long)]
    pub webhook_port: Option<u16>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    info!("Starting Atelier Operator");

    let mut config = OperatorConfig::from_env().context("Invalid operator configuration")?;
    if let Some(namespace) = args.namespace {
        config.namespace = namespace;
    }
    if let Some(port) = args.webhook_port {
        config.webhook_port = port;
    }
    info!(namespace = %config.namespace, webhook_port = config.webhook_port, "Operator configuration");

    let k8s_client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    info!("Connected to Kubernetes");

    let state = OperatorState::new(k8s_client.clone(), config.clone());

    // Conversion webhook is validated before any controller starts, so a
    // build missing an adapter fails here instead of at the first request.
    let conversion = Arc::new(ConversionService::new().context("Conversion setup failed")?);
    let webhook_port = config.webhook_port;
    tokio::spawn(async move {
        if let Err(e) = web::serve(conversion, webhook_port).await {
            error!(error = %e, "Conversion webhook failed");
        }
    });
    info!("Conversion webhook started");

    let retries = config.conflict_retry_limit;
    let workspaces: Arc<KubeResourceClient<Workspace>> = Arc::new(
        KubeResourceClient::namespaced(k8s_client.clone(), state.namespace(), retries),
    );
    let volumes: Arc<KubeResourceClient<PersistentVolume>> =
        Arc::new(KubeResourceClient::cluster(k8s_client.clone(), retries));
    let claims: Arc<KubeResourceClient<PersistentVolumeClaim>> = Arc::new(
        KubeResourceClient::namespaced(k8s_client.clone(), state.namespace(), retries),
    );
    let sessions: Arc<KubeResourceClient<Session>> = Arc::new(KubeResourceClient::namespaced(
        k8s_client.clone(),
        state.namespace(),
        retries,
    ));
    let app_definitions: Arc<KubeResourceClient<AppDefinition>> = Arc::new(
        KubeResourceClient::namespaced(k8s_client.clone(), state.namespace(), retries),
    );

    let workspace_machine = Arc::new(ReconcileMachine::new(
        "Workspace",
        workspaces.clone(),
        Arc::new(WorkspaceStorageOrchestrator::new(
            config.clone(),
            workspaces,
            volumes,
            claims,
            sessions,
        )),
    ));
    let workspace_api: Api<Workspace> = Api::namespaced(k8s_client.clone(), state.namespace());
    tokio::spawn(run_controller(workspace_api, workspace_machine, "Workspace"));
    info!("Workspace controller started");

    let app_definition_machine = Arc::new(ReconcileMachine::new(
        "AppDefinition",
        app_definitions,
        Arc::new(AppDefinitionValidationHandler),
    ));
    let app_definition_api: Api<AppDefinition> =
        Api::namespaced(k8s_client.clone(), state.namespace());
    tokio::spawn(run_controller(
        app_definition_api,
        app_definition_machine,
        "AppDefinition",
    ));
    info!("AppDefinition controller started");

    info!("Operator is running. Press Ctrl+C to stop.");
    let _ = signal::ctrl_c().await;
    info!("Shutting down operator...");

    Ok(())
}
