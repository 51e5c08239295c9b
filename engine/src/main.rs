use chrono::Utc;
use engine::conditions::CONDITION_TICK;
use engine::progress::{AnnounceError, Announcer, PROGRESS_TICK};
use engine::Navigator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SAMPLE_NETWORK_PATH: &str = "engine/data/network.json";
const DEFAULT_CONDITION_SEED: u64 = 42;

/// Voice collaborator for the headless demo: callouts go to the log.
struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&self, message: &str) -> Result<(), AnnounceError> {
        tracing::info!(target: "voice", "{message}");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let network_path =
        std::env::var("NETWORK_JSON").unwrap_or_else(|_| SAMPLE_NETWORK_PATH.to_string());
    let seed = std::env::var("CONDITION_SEED")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_CONDITION_SEED);

    let mut navigator = Navigator::from_file(&network_path, seed, Utc::now())
        .expect("load road network")
        .with_announcer(Box::new(LogAnnouncer));
    tracing::info!("loaded road network from {network_path}");
    let view = navigator.active_view();
    tracing::info!(
        "navigating the {} route: {:.0} m, about {:.1} min",
        view.profile,
        view.distance_m,
        view.eta_minutes
    );

    let mut condition_timer = tokio::time::interval(CONDITION_TICK);
    let mut progress_timer = tokio::time::interval(PROGRESS_TICK);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = condition_timer.tick() => {
                navigator.tick_conditions(Utc::now());
                if navigator.accept_suggestion(Utc::now()) {
                    let view = navigator.active_view();
                    tracing::info!(
                        "switched to the {} route, about {:.1} min",
                        view.profile,
                        view.eta_minutes
                    );
                }
            }
            _ = progress_timer.tick() => {
                navigator.tick_progress(Utc::now());
            }
            _ = &mut shutdown => {
                tracing::info!("stopping simulation");
                break;
            }
        }
    }
}
