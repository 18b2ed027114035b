use anyhow::Context;
use api::{App, Settings};
use core::convert::Infallible;
use std::{
    env,
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

fn var_or<T: core::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value.parse().with_context(|| format!("invalid value for {name}")),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).context(name.to_owned()),
    }
}

fn session_ttl(hours: u64) -> anyhow::Result<Duration> {
    let secs = hours.checked_mul(3600).context("SESSION_TTL_HOURS is too large")?;
    Ok(Duration::from_secs(secs))
}

fn play_idle(secs: u64) -> anyhow::Result<Duration> {
    anyhow::ensure!(secs > 0, "PLAY_IDLE_SECS must be positive");
    Ok(Duration::from_secs(secs))
}

/// How often the janitor sweeps. Never longer than five minutes.
fn sweep_period(play_idle: Duration) -> Duration {
    play_idle.clamp(Duration::from_secs(1), Duration::from_secs(300))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse environment variables
    let port: u16 = var_or("PORT", 3000)?;
    let content_dir = env::var("CONTENT_DIR").map_or_else(|_| PathBuf::from("content"), PathBuf::from);
    let session_ttl = session_ttl(var_or("SESSION_TTL_HOURS", 720)?)?;
    let play_idle = play_idle(var_or("PLAY_IDLE_SECS", 3600)?)?;

    let mut config = db::Config::new();
    config
        .user(&env::var("PG_USERNAME").context("PG_USERNAME")?)
        .password(&env::var("PG_PASSWORD").context("PG_PASSWORD")?)
        .host(&env::var("PG_HOSTNAME").context("PG_HOSTNAME")?)
        .dbname(&env::var("PG_DATABASE").context("PG_DATABASE")?)
        .port(var_or("PG_PORT", 5432)?);

    let content = content::ContentStore::load(&content_dir)?;
    log::info!(
        "Serving content from {} with login sessions lasting {}h and play sessions idling out after {}s.",
        content_dir.display(),
        session_ttl.as_secs() / 3600,
        play_idle.as_secs()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let (db, tcp) = runtime.block_on(async {
        let (client, conn) = config.connect(db::NoTls).await?;
        let tcp = tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).await?;
        tokio::spawn(async move {
            if let Err(err) = conn.await {
                log::error!("Database connection closed: {err}");
            }
        });
        anyhow::Ok((db::Database::from(client), tcp))
    })?;

    let app = Arc::new(App::new(db, content, Settings { session_ttl, play_idle }));
    let seeded = runtime.block_on(app.seed_topics())?;
    log::info!("Seeded {seeded} new topics.");

    let janitor = Arc::clone(&app);
    runtime.spawn(async move {
        let mut interval = tokio::time::interval(sweep_period(play_idle));
        loop {
            interval.tick().await;
            janitor.sweep().await;
        }
    });

    log::info!("Listening on port {port}.");
    runtime.block_on(async move {
        let mut stop = core::pin::pin!(tokio::signal::ctrl_c());
        loop {
            let stream = tokio::select! {
                biased;
                res = &mut stop => break res?,
                conn = tcp.accept() => match conn {
                    Ok((stream, _)) => stream,
                    Err(err) => {
                        log::error!("Cannot accept connection: {err}");
                        continue;
                    }
                },
            };

            let outer = app.clone();
            tokio::spawn(async move {
                let service = hyper::service::service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                    let inner = outer.clone();
                    async move { Ok::<_, Infallible>(inner.respond(req).await) }
                });
                let io = hyper_util::rt::TokioIo::new(stream);
                if let Err(err) = hyper::server::conn::http1::Builder::new().serve_connection(io, service).await {
                    log::error!("Connection failed: {err}");
                }
            });
        }

        log::info!("Shutting down.");
        anyhow::Ok(())
    })?;

    Ok(())
}
