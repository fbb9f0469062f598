mod config;
mod errors;
mod gateway;
mod handlers;
mod models;
mod query;
mod workflow;


use std::env;
use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use dotenvy::dotenv;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::GatewayConfig;
use gateway::{Gateway, RestGateway};
use workflow::{PendingDeletes, SaleWorkflow, ViewSequences};

/// Shared application state: the injected gateway handle plus the small
/// amount of interaction state kept between requests.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub sale: Arc<Mutex<SaleWorkflow>>,
    pub pending: Arc<Mutex<PendingDeletes>>,
    pub sequences: Arc<ViewSequences>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            sale: Arc::new(Mutex::new(SaleWorkflow::new())),
            pending: Arc::new(Mutex::new(PendingDeletes::default())),
            sequences: Arc::new(ViewSequences::default()),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = GatewayConfig::from_env();
    let gateway = RestGateway::new(config).expect("Failed to build gateway client");
    let state = AppState::new(Arc::new(gateway));

    // Build the application router
    let app = create_router(state);

    // Get port from environment or use default
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    println!("phone-admin server starting on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::banner))
        .route("/api/stats", get(handlers::stats))
        .route("/api/brands", get(handlers::brands))

        // Inventory
        .route("/api/phones", get(handlers::phones::list_phones))
        .route("/api/phones", post(handlers::phones::create_phone))
        .route("/api/phones/:id", put(handlers::phones::update_phone))
        .route("/api/phones/:id/delete-request", post(handlers::phones::request_delete_phone))
        .route("/api/phones/:id/delete-confirm", post(handlers::phones::confirm_delete_phone))
        .route("/api/phones/delete-cancel", post(handlers::phones::cancel_delete_phone))

        // Sale transfer
        .route("/api/phones/:id/sell", post(handlers::phones::open_sale))
        .route("/api/sale", post(handlers::phones::submit_sale))
        .route("/api/sale/cancel", post(handlers::phones::cancel_sale))

        // Customer history
        .route("/api/customers", get(handlers::customers::list_customers))
        .route("/api/customers/:id/delete-request", post(handlers::customers::request_delete_customer))
        .route("/api/customers/:id/delete-confirm", post(handlers::customers::confirm_delete_customer))
        .route("/api/customers/delete-cancel", post(handlers::customers::cancel_delete_customer))

        // Sales history
        .route("/api/sales", get(handlers::sales::list_sales))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
