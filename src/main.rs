//! Hearthtales backend entry point.
//!
//! Composition root: loads configuration, wires the adapter graph into the
//! use-case handlers once, and serves the API. Every dependency is explicit;
//! nothing is resolved lazily at call time.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hearthtales::adapters::http::{
    invitation_routes, package_routes, project_routes, wallet_routes, webhook_routes,
    InvitationAppState, PackageAppState, ProjectAppState, WalletAppState,
};
use hearthtales::adapters::notify::LoggingReceiptNotifier;
use hearthtales::adapters::postgres::{
    PostgresInvitationRepository, PostgresPackageCatalog, PostgresProjectStore,
    PostgresReceiptStore, PostgresUserDirectory, PostgresWalletStore,
};
use hearthtales::adapters::stripe::{MockPaymentGateway, StripeConfig, StripePaymentGateway};
use hearthtales::application::handlers::billing::{
    ConfirmPurchaseHandler, HandlePaymentWebhookHandler, ListPackagesHandler,
    StartPackagePurchaseHandler,
};
use hearthtales::application::handlers::invitation::{
    AcceptInvitationHandler, CleanupExpiredInvitationsHandler, CreateInvitationHandler,
    InvalidateProjectInvitationsHandler, ResendInvitationHandler,
};
use hearthtales::application::handlers::project::CreateProjectHandler;
use hearthtales::application::handlers::wallet::{
    GetTransactionHistoryHandler, GetWalletHandler, GrantResourcesHandler,
    ReconcileWalletHandler,
};
use hearthtales::config::AppConfig;
use hearthtales::domain::project::RoleAssignmentValidator;
use hearthtales::domain::wallet::ResourceWalletService;
use hearthtales::ports::{
    Clock, InvitationRepository, LedgerReader, PaymentGateway, ProjectStore, ReceiptNotifier,
    ReceiptStore, SystemClock, UserDirectory, WalletStore,
};

/// How often the invitation expiry sweep runs.
const EXPIRY_SWEEP_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.server.log_level)?)
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Applied database migrations");
    }

    // Storage adapters
    let wallet_store = Arc::new(PostgresWalletStore::new(pool.clone()));
    let invitations: Arc<dyn InvitationRepository> =
        Arc::new(PostgresInvitationRepository::new(pool.clone()));
    let projects: Arc<dyn ProjectStore> = Arc::new(PostgresProjectStore::new(pool.clone()));
    let receipts: Arc<dyn ReceiptStore> = Arc::new(PostgresReceiptStore::new(pool.clone()));
    let catalog = Arc::new(PostgresPackageCatalog::new(pool.clone()));
    let users: Arc<dyn UserDirectory> = Arc::new(PostgresUserDirectory::new(pool.clone()));
    let ledger: Arc<dyn LedgerReader> = wallet_store.clone();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // External collaborators
    let gateway: Arc<dyn PaymentGateway> = if config.payment.use_mock_gateway {
        tracing::warn!("Using the mock payment gateway; no real payments will be processed");
        Arc::new(MockPaymentGateway::new())
    } else {
        let stripe_config = StripeConfig::new(
            config.payment.stripe_api_key.clone(),
            config.payment.stripe_webhook_secret.clone(),
        )
        .with_require_livemode(config.is_production());
        Arc::new(StripePaymentGateway::new(stripe_config))
    };
    let notifier: Arc<dyn ReceiptNotifier> = Arc::new(LoggingReceiptNotifier);

    // Domain services
    let wallet_service = Arc::new(ResourceWalletService::new(
        wallet_store.clone() as Arc<dyn WalletStore>,
        ledger.clone(),
        clock.clone(),
        config.wallet.to_policy(),
    ));
    let role_validator = Arc::new(RoleAssignmentValidator::new(projects.clone()));

    // Use-case handlers
    let confirm_purchase = Arc::new(ConfirmPurchaseHandler::new(
        gateway.clone(),
        catalog.clone(),
        receipts.clone(),
        ledger.clone(),
        wallet_service.clone(),
        notifier.clone(),
        clock.clone(),
    ));

    let invitation_state = InvitationAppState {
        create_invitation: Arc::new(CreateInvitationHandler::new(
            invitations.clone(),
            projects.clone(),
            users.clone(),
            wallet_service.clone(),
            role_validator.clone(),
            clock.clone(),
        )),
        accept_invitation: Arc::new(AcceptInvitationHandler::new(
            invitations.clone(),
            projects.clone(),
            users.clone(),
            wallet_service.clone(),
            role_validator.clone(),
            clock.clone(),
        )),
        resend_invitation: Arc::new(ResendInvitationHandler::new(
            invitations.clone(),
            projects.clone(),
            clock.clone(),
        )),
        invalidate_invitations: Arc::new(InvalidateProjectInvitationsHandler::new(
            invitations.clone(),
            projects.clone(),
            clock.clone(),
        )),
    };

    let package_state = PackageAppState {
        list_packages: Arc::new(ListPackagesHandler::new(catalog.clone())),
        start_purchase: Arc::new(StartPackagePurchaseHandler::new(
            gateway.clone(),
            catalog.clone(),
        )),
        confirm_purchase: confirm_purchase.clone(),
        payment_webhook: Arc::new(HandlePaymentWebhookHandler::new(
            gateway.clone(),
            confirm_purchase,
        )),
    };

    let project_state = ProjectAppState {
        create_project: Arc::new(CreateProjectHandler::new(
            projects.clone(),
            wallet_service.clone(),
            clock.clone(),
        )),
    };

    let wallet_state = WalletAppState {
        get_wallet: Arc::new(GetWalletHandler::new(wallet_service.clone())),
        transaction_history: Arc::new(GetTransactionHistoryHandler::new(ledger.clone())),
        grant_resources: Arc::new(GrantResourcesHandler::new(wallet_service.clone())),
        reconcile_wallet: Arc::new(ReconcileWalletHandler::new(wallet_service)),
    };

    // Periodic invitation expiry sweep; bookkeeping only, every consumer
    // re-checks deadlines against the clock.
    let sweep = CleanupExpiredInvitationsHandler::new(invitations, clock);
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(EXPIRY_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            if let Err(err) = sweep.handle().await {
                tracing::warn!(error = %err, "Invitation expiry sweep failed");
            }
        }
    });

    let cors = {
        let origins: Vec<HeaderValue> = config
            .server
            .cors_origins_list()
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        if origins.is_empty() {
            CorsLayer::new()
        } else {
            CorsLayer::new().allow_origin(AllowOrigin::list(origins))
        }
    };

    let app = Router::new()
        .nest(
            "/api/invitations",
            invitation_routes().with_state(invitation_state),
        )
        .nest(
            "/api/packages",
            package_routes().with_state(package_state.clone()),
        )
        .nest("/api/webhooks", webhook_routes().with_state(package_state))
        .nest("/api/projects", project_routes().with_state(project_state))
        .nest("/api/wallet", wallet_routes().with_state(wallet_state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors);

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, environment = ?config.server.environment, "Hearthtales backend listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
