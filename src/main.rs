use std::{net::SocketAddr, sync::Arc};

use mongodb::Client;

use tradedesk::{
    config,
    routes,
    services::{
        banking::BankingClient,
        db_init,
        matching::{self, MatchingQueue},
        mongo_store::MongoStore,
        order_service::OrderWorkflow,
    },
    AppState,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();
    let workflow_cfg = settings.workflow();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = db_init::ensure_indexes(&db).await {
        tracing::warn!(error = %e, "could not ensure indexes");
    }

    let banking = BankingClient::new(
        workflow_cfg.remote_loan_service_base_url.clone(),
        workflow_cfg.loan_request_timeout,
    )
    .expect("Failed to build banking service client");

    let (matcher, handoff_rx) = MatchingQueue::channel();
    tokio::spawn(matching::run_handoff(handoff_rx));

    let orders = OrderWorkflow::new(
        &workflow_cfg,
        Arc::new(MongoStore::new(db)),
        Arc::new(banking),
        Arc::new(matcher),
    );

    let state = AppState {
        settings: settings.clone(),
        orders: Arc::new(orders),
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().expect("HOST must be an IP address"),
        settings.port,
    ));
    tracing::info!(banking = %workflow_cfg.remote_loan_service_base_url, "listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
