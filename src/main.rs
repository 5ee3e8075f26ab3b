// cinelog server - movie catalog, reviews, and profiles over HTTP

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use cinelog::{app_state::AppState, config::Config, http::create_app_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    // Build main application router
    let app = Router::new()
        .nest("/api/v1", create_app_router(app_state))
        .layer(CorsLayer::permissive());

    // Start server
    let addr = config.server_address();
    println!("🎬 cinelog server starting on http://{}", addr);
    println!("📋 API Documentation:");
    println!("  GET    /api/v1/movies                    - Popular movies");
    println!("  GET    /api/v1/movies/search?q=          - Search by title");
    println!("  GET    /api/v1/movies/year/{{year}}        - Movies by year");
    println!("  GET    /api/v1/movies/{{id}}               - Movie detail");
    println!("  GET    /api/v1/movies/{{id}}/reviews       - Reviews + stats");
    println!("  POST   /api/v1/reviews                   - Create review");
    println!("  PUT    /api/v1/reviews/{{id}}              - Update review");
    println!("  DELETE /api/v1/reviews/{{id}}?userId=      - Delete review");
    println!("  GET    /api/v1/users/{{uid}}/reviews       - Reviews by author");
    println!("  GET    /api/v1/users/{{uid}}/profile       - Profile view");
    println!("  POST   /api/v1/auth/register             - Register");
    println!("  POST   /api/v1/auth/login                - Login");
    println!("  POST   /api/v1/auth/logout               - Logout");
    println!("  POST   /api/v1/contact                   - Contact message");

    let listener = TcpListener::bind(addr.as_str()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
