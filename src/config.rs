// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{MemoryStateStore, PgStateStore, StateStore},
    models::{
        appointment::Appointment,
        catalog::{ServiceOffering, Stylist},
        gallery::GalleryItem,
        media::MediaPolicy,
        product::Product,
    },
    services::{
        notification::{LogNotifier, NotificationSink, WebhookNotifier},
        AdminDirectory, AuthService, BookingService, BranchRegistry, ClientService, MediaService,
        RecordStore, SessionService,
    },
};

// ---
// Configurações lidas do ambiente (o .env é carregado antes)
// ---
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub token_ttl_hours: i64,
    pub demo_mode: bool,
    pub seed_admin_password: Option<String>,
    pub media_dir: PathBuf,
    pub media_max_files: usize,
    pub media_max_size_mb: u64,
    pub whatsapp_webhook_url: Option<String>,
    pub notify_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            jwt_secret: "dev-secret-change-me".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            token_ttl_hours: 12,
            demo_mode: false,
            seed_admin_password: None,
            media_dir: PathBuf::from("./media"),
            media_max_files: 10,
            media_max_size_mb: 10,
            whatsapp_webhook_url: None,
            notify_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{name} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Settings::default();

        let demo_mode = parsed("DEMO_MODE", false)?;
        let jwt_secret = match optional("JWT_SECRET") {
            Some(secret) => secret,
            None if demo_mode => {
                tracing::warn!("JWT_SECRET is not set; using the demo secret");
                defaults.jwt_secret
            }
            None => anyhow::bail!("JWT_SECRET must be set (or DEMO_MODE=true)"),
        };

        Ok(Self {
            database_url: optional("DATABASE_URL"),
            jwt_secret,
            bind_addr: optional("BIND_ADDR").unwrap_or(defaults.bind_addr),
            token_ttl_hours: parsed("TOKEN_TTL_HOURS", defaults.token_ttl_hours)?,
            demo_mode,
            seed_admin_password: optional("SEED_ADMIN_PASSWORD"),
            media_dir: optional("MEDIA_DIR").map(PathBuf::from).unwrap_or(defaults.media_dir),
            media_max_files: parsed("MEDIA_MAX_FILES", defaults.media_max_files)?,
            media_max_size_mb: parsed("MEDIA_MAX_SIZE_MB", defaults.media_max_size_mb)?,
            whatsapp_webhook_url: optional("WHATSAPP_WEBHOOK_URL"),
            notify_timeout: Duration::from_secs(parsed("NOTIFY_TIMEOUT_SECS", 5)?),
            request_timeout: Duration::from_secs(parsed("REQUEST_TIMEOUT_SECS", 30)?),
        })
    }

    pub fn media_policy(&self) -> MediaPolicy {
        MediaPolicy {
            max_files: self.media_max_files,
            max_size: self.media_max_size_mb * 1024 * 1024,
            ..MediaPolicy::default()
        }
    }

    /// Upload pode trazer um lote cheio + overhead do multipart.
    pub fn upload_body_limit(&self) -> usize {
        let per_file = self.media_max_size_mb as usize * 1024 * 1024;
        per_file.saturating_mul(self.media_max_files.max(1)) + 1024 * 1024
    }

    /// Postgres quando `DATABASE_URL` existe; senão, store em memória.
    pub async fn connect_store(&self) -> anyhow::Result<Arc<dyn StateStore>> {
        let Some(database_url) = &self.database_url else {
            tracing::warn!("⚠️ DATABASE_URL not set: state lives in memory and is lost on restart");
            return Ok(Arc::new(MemoryStateStore::new()));
        };

        // 1. Pool de conexões
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .context("connecting to the database")?;
        tracing::info!("✅ Database connection established");

        // 2. Migrações
        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("running database migrations")?;
        tracing::info!("✅ Database migrations applied");

        Ok(Arc::new(PgStateStore::new(db_pool)))
    }

    pub fn notifier(&self) -> Arc<dyn NotificationSink> {
        match &self.whatsapp_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(LogNotifier),
        }
    }
}

// ---
// Estado compartilhado da aplicação
// ---
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<BranchRegistry>,
    pub admins: Arc<AdminDirectory>,
    pub auth: AuthService,
    pub appointments: RecordStore<Appointment>,
    pub clients: ClientService,
    pub products: RecordStore<Product>,
    pub gallery: RecordStore<GalleryItem>,
    pub services: RecordStore<ServiceOffering>,
    pub stylists: RecordStore<Stylist>,
    pub media: MediaService,
    pub booking: BookingService,
    pub notifier: Arc<dyn NotificationSink>,
}

impl AppState {
    pub async fn build(
        settings: Settings,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> anyhow::Result<Self> {
        let registry = Arc::new(BranchRegistry::init(store.clone()).await);
        let admins = Arc::new(
            AdminDirectory::init(store.clone(), registry.clone(), settings.seed_admin_password.clone())
                .await
                .context("initialising the admin directory")?,
        );
        let sessions = SessionService::new(store.clone(), registry.clone());
        let auth = AuthService::new(
            admins.clone(),
            registry.clone(),
            sessions,
            settings.jwt_secret.clone(),
            chrono::Duration::hours(settings.token_ttl_hours),
            settings.demo_mode,
        );

        let appointments = RecordStore::new(store.clone());
        let services = RecordStore::new(store.clone());
        let stylists = RecordStore::new(store.clone());
        let booking = BookingService::new(
            registry.clone(),
            services.clone(),
            stylists.clone(),
            appointments.clone(),
            notifier.clone(),
            settings.notify_timeout,
        );
        let media = MediaService::new(settings.media_dir.clone(), settings.media_policy());

        tracing::info!("🧩 Application state ready (notifier: {})", notifier.name());

        Ok(Self {
            registry,
            admins,
            auth,
            appointments,
            clients: ClientService::new(RecordStore::new(store.clone())),
            products: RecordStore::new(store.clone()),
            gallery: RecordStore::new(store),
            services,
            stylists,
            media,
            booking,
            notifier,
            settings: Arc::new(settings),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_policy_uses_megabytes() {
        let settings = Settings {
            media_max_files: 3,
            media_max_size_mb: 2,
            ..Settings::default()
        };
        let policy = settings.media_policy();
        assert_eq!(policy.max_files, 3);
        assert_eq!(policy.max_size, 2 * 1024 * 1024);
        assert!(settings.upload_body_limit() > 6 * 1024 * 1024);
    }

    #[tokio::test]
    async fn state_builds_on_the_memory_store() {
        let state = AppState::build(
            Settings::default(),
            Arc::new(MemoryStateStore::new()),
            Arc::new(LogNotifier),
        )
        .await
        .unwrap();
        assert_eq!(state.registry.all().await.len(), 3);
    }
}
