use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use stockroom::auth::{IdentityStore, hash_password};
use stockroom::db::schema::IdentityCreate;
use stockroom::{AuthConfig, DatabaseConfig, Email, create_app, normalize_roles};

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Product and user management API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Bind address
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        #[arg(long, default_value = "memory")]
        db_url: String,
        /// Fall back to the insecure development signing secret when
        /// STOCKROOM_JWT_SECRET is unset
        #[arg(long, env = "STOCKROOM_ALLOW_DEV_SECRET", default_value_t = false)]
        allow_dev_secret: bool,
    },
    /// Initialize the database
    Init {
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
    /// Create an identity directly (operator seeding, e.g. the first admin)
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Comma-separated list of roles (defaults to "user")
        #[arg(long)]
        roles: Option<String>,
        #[arg(long, default_value = "memory")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("stockroom=info".parse()?))
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            db_url,
            allow_dev_secret,
        } => {
            let auth_config = AuthConfig::from_env(allow_dev_secret)?;

            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url: {}", db_config.url);

            let (app, _state) = create_app(db_config, auth_config).await?;

            let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
            info!("API server listening on http://{bind}:{port}");

            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = stockroom::create_connection(db_config).await?;
            stockroom::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::CreateUser {
            name,
            email,
            password,
            roles,
            db_url,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = stockroom::create_connection(db_config).await?;
            stockroom::ensure_schema(&db).await?;

            let store = IdentityStore::new(db);
            let email = Email::normalized(&email);
            if store.find_by_email(&email).await?.is_some() {
                bail!("an identity with email '{}' already exists", email);
            }

            let roles = normalize_roles(roles.map(|s| {
                s.split(',')
                    .map(|role| role.trim().to_string())
                    .filter(|role| !role.is_empty())
                    .collect()
            }));

            let create = IdentityCreate {
                subject_id: uuid::Uuid::new_v4().to_string(),
                name,
                email: email.into_inner(),
                phone: None,
                status: "active".to_string(),
                roles: roles.clone(),
                password_digest: hash_password(&password)?,
            };
            let record = store.create_identity(&create).await?;

            println!("Identity created successfully!");
            println!();
            println!("  Subject: {}", record.subject_id);
            println!("  Email:   {}", record.email);
            println!("  Roles:   {}", roles.join(", "));
        }
    }

    Ok(())
}
