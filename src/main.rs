use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use freelance_hub_backend::applications::{ApplicationService, TracingNotifier};
use freelance_hub_backend::auth::jwks::JwksCache;
use freelance_hub_backend::auth::jwt::TokenVerifier;
use freelance_hub_backend::cache::RedisCache;
use freelance_hub_backend::config::AppConfig;
use freelance_hub_backend::create_pool;
use freelance_hub_backend::handlers;
use freelance_hub_backend::opportunities::OpportunityService;
use freelance_hub_backend::store::SeaOrmStore;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let db = create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run database migrations");
    let store = Arc::new(SeaOrmStore::new(db.clone()));
    let db_data = web::Data::new(db);

    let applications = web::Data::new(
        ApplicationService::new(Arc::clone(&store), Arc::new(TracingNotifier))
            .with_policy(config.profile_policy.clone())
            .with_remote_timeout(config.remote_timeout),
    );
    let opportunities = web::Data::new(OpportunityService::new(
        store,
        config.list_retry,
        config.remote_timeout,
    ));

    // Initialize Redis cache
    let redis_cache = RedisCache::new(&config.redis_url)
        .await
        .expect("Failed to connect to Redis");
    let redis_data = web::Data::new(Arc::new(redis_cache));
    let cache_config = web::Data::new(config.cache);
    tracing::info!("Connected to Redis");

    let verifier = match &config.supabase_jwt_secret {
        Some(secret) => {
            tracing::info!("Verifying tokens with the shared JWT secret");
            TokenVerifier::Secret(secret.clone())
        }
        None => {
            let project_ref = config
                .supabase_project_ref()
                .expect("Invalid SUPABASE_URL format. Expected: https://PROJECT.supabase.co");
            let jwks = JwksCache::new(project_ref, &config.supabase_anon_key, config.remote_timeout)
                .expect("Failed to build JWKS client");
            TokenVerifier::Jwks(Arc::new(jwks))
        }
    };
    let verifier = web::Data::new(verifier);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(redis_data.clone())
            .app_data(cache_config.clone())
            .app_data(verifier.clone())
            .app_data(applications.clone())
            .app_data(opportunities.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
