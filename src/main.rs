use std::sync::Arc;

use config::Config;
use handlers::auth::configure_cors;
use repositories::{
    posts_repo::PostsRepository, profile_repo::ProfileRepository, user_repo::UserRepository,
    MemoryRepo, PostgresRepo,
};
use routes::create_router;
use services::{
    auth::AuthService, posts::PostsService, profile::ProfileService, user::UserService,
};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use self::errors::{Error, Result};

mod config;
mod errors;
mod extractors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth_service: AuthService,
    pub posts_service: PostsService,
    pub profile_service: ProfileService,
    pub users_service: UserService,
}

/// Storage behind the services; one implementation serves all three.
struct Stores {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostsRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl Stores {
    fn from_repo<R>(repo: R) -> Self
    where
        R: UserRepository + PostsRepository + ProfileRepository + Clone + 'static,
    {
        Self {
            users: Arc::new(repo.clone()),
            posts: Arc::new(repo.clone()),
            profiles: Arc::new(repo),
        }
    }
}

impl AppState {
    pub fn new(
        config: Config,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostsRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            auth_service: AuthService::new(
                users.clone(),
                config.jwt_secret.clone(),
                config.jwt_maxage,
            ),
            posts_service: PostsService::new(posts, users.clone()),
            profile_service: ProfileService::new(profiles, users.clone()),
            users_service: UserService::new(users),
            config,
        }
    }
}

async fn connect_store(config: &Config) -> Result<Stores> {
    let Some(database_url) = &config.database_url else {
        warn!("DATABASE_URL not set, using the in-memory store; data is lost on restart");
        return Ok(Stores::from_repo(MemoryRepo::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    info!("✅ Connection to the database is successful!");

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(Stores::from_repo(PostgresRepo::new(pool)))
}

async fn run() -> Result<()> {
    let config = Config::init()?;
    let stores = connect_store(&config).await?;

    let cors = configure_cors(&config)?;
    let port = config.port;
    let app_state = Arc::new(AppState::new(
        config,
        stores.users,
        stores.posts,
        stores.profiles,
    ));

    let app = create_router(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("[::]:{port}"))
        .await
        .map_err(|err| Error::Config(format!("cannot bind port {port}: {err}")))?;
    info!("🚀 Listening on {}", port);

    axum::serve(listener, app)
        .await
        .map_err(|err| Error::Config(format!("server error: {err}")))
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        error!("🔥 Failed to start server: {:?}", err);
        std::process::exit(1);
    }
}
