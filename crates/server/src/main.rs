use std::net::SocketAddr;
use std::sync::Arc;

use api::auth::{hash_password, AuthConfig, DEMO_COMPANY_ID, DEMO_USER_ID};
use api::entities::roles;
use api::repo::now_rfc3339;
use api::{build_router, AppState};
use chrono::{Duration, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use serde_json::{json, Value};
use store::{Filter, Row, RowStore, SqlStore, StoreConfig};
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "crm-server", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run HTTP server
    Serve {
        #[arg(long, env = "BIND", default_value = "127.0.0.1:8080")]
        bind: String,
    },
    /// Run migrations (up|down|reset)
    Migrate {
        #[arg(long, default_value = "up")]
        action: String,
    },
    /// Seed demo data
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = StoreConfig::from_env();

    match cli.cmd {
        Cmd::Migrate { action } => {
            let sql = SqlStore::connect(&config.sql_url()?).await?;
            match action.as_str() {
                "up" => Migrator::up(sql.connection(), None).await?,
                "down" => Migrator::down(sql.connection(), None).await?,
                "reset" => Migrator::reset(sql.connection()).await?,
                _ => eprintln!("Unknown action: {} (use up|down|reset)", action),
            }
            Ok(())
        }
        Cmd::Seed => {
            let store = store::connect(&config).await?;
            seed(store.as_ref()).await
        }
        Cmd::Serve { bind } => {
            let store = store::connect(&config).await?;
            let state = AppState {
                store,
                auth: Arc::new(AuthConfig::from_env()),
            };
            let app = build_router(state)
                .layer(CompressionLayer::new())
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                );

            let addr: SocketAddr = bind.parse()?;
            let listener = TcpListener::bind(addr).await?;
            info!("listening on http://{}", addr);
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await?;
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    use tokio::signal;
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler")
    };
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
}

fn object(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("seed rows are object literals"),
    }
}

/// Seed the demo tenant used by the fixed-id demo login, plus a handful of
/// records to browse. Safe to re-run: bails if the demo company exists.
async fn seed(store: &dyn RowStore) -> anyhow::Result<()> {
    let demo_company = DEMO_COMPANY_ID.to_string();
    let existing = store
        .find_one(
            "companies",
            &Filter::new().eq("id", demo_company.clone()),
        )
        .await?;
    if existing.is_some() {
        info!("demo tenant already seeded, nothing to do");
        return Ok(());
    }

    let now = now_rfc3339();
    store
        .insert(
            "companies",
            object(json!({
                "id": demo_company,
                "company_name": "Demo Company",
                "first_name": "Demo",
                "last_name": "User",
                "email": "demo@crm.test",
                "phone_number": "+15550000000",
                "city": "Springfield",
                "country": "USA",
                "industry": "Services",
                "created_at": now,
                "updated_at": now,
            })),
        )
        .await?;

    // Super Admin role, every capability flag set.
    let role_id = Uuid::new_v4().to_string();
    let mut role = object(json!({
        "id": role_id,
        "company_id": demo_company,
        "role_name": "Super Admin",
        "description": "Full system access with all permissions",
        "created_at": now,
        "updated_at": now,
    }));
    for field in roles::SCHEMA.fields {
        if matches!(field.kind, api::repo::FieldKind::Bool) {
            role.insert(field.column.to_string(), Value::from(true));
        }
    }
    store.insert("roles", role).await?;

    store
        .insert(
            "users",
            object(json!({
                "id": DEMO_USER_ID.to_string(),
                "company_id": demo_company,
                "role_id": role_id,
                "email": "demo@crm.test",
                "password_hash": hash_password("demo1234")?,
                "first_name": "Demo",
                "last_name": "User",
                "department": "Management",
                "position": "Super Admin",
                "is_active": true,
                "created_at": now,
                "updated_at": now,
            })),
        )
        .await?;

    let customer_id = Uuid::new_v4().to_string();
    store
        .insert(
            "customers",
            object(json!({
                "id": customer_id,
                "company_id": demo_company,
                "first_name": "Ada",
                "last_name": "Lovelace",
                "mobile_number": "+15550100001",
                "email": "ada@example.test",
                "city": "London",
                "status": "active",
                "created_by": DEMO_USER_ID.to_string(),
                "created_at": now,
                "updated_at": now,
            })),
        )
        .await?;
    store
        .insert(
            "customers",
            object(json!({
                "id": Uuid::new_v4().to_string(),
                "company_id": demo_company,
                "first_name": "Grace",
                "last_name": "Hopper",
                "mobile_number": "+15550100002",
                "email": "grace@example.test",
                "status": "lead",
                "created_by": DEMO_USER_ID.to_string(),
                "created_at": now,
                "updated_at": now,
            })),
        )
        .await?;

    let overdue = (Utc::now() - Duration::days(3)).to_rfc3339_opts(SecondsFormat::Millis, true);
    let upcoming = (Utc::now() + Duration::days(7)).to_rfc3339_opts(SecondsFormat::Millis, true);
    store
        .insert(
            "tasks",
            object(json!({
                "id": Uuid::new_v4().to_string(),
                "company_id": demo_company,
                "customer_id": customer_id,
                "title": "Follow up on proposal",
                "status": "pending",
                "priority": "high",
                "due_date": overdue,
                "created_by": DEMO_USER_ID.to_string(),
                "created_at": now,
                "updated_at": now,
            })),
        )
        .await?;
    store
        .insert(
            "tasks",
            object(json!({
                "id": Uuid::new_v4().to_string(),
                "company_id": demo_company,
                "customer_id": customer_id,
                "title": "Schedule kickoff call",
                "status": "pending",
                "priority": "medium",
                "due_date": upcoming,
                "created_by": DEMO_USER_ID.to_string(),
                "created_at": now,
                "updated_at": now,
            })),
        )
        .await?;

    info!("seeded demo tenant {}", demo_company);
    Ok(())
}
