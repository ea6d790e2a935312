//! Publication point for query results.
//!
//! The presentation layer subscribes to a [`DashboardState`] and calls
//! [`Dashboard::search`] for every query. Overlapping searches are allowed;
//! only the most recently started one may publish its outcome.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    model::{Place, QueryResult, WeatherReport},
    provider::WeatherProvider,
};

/// What the presentation layer should be showing.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Idle,
    Pending { place: String },
    Ready(WeatherReport),
    /// A failed query clears whatever was shown before.
    Failed { message: String },
}

impl DashboardState {
    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            DashboardState::Ready(report) => Some(report),
            _ => None,
        }
    }
}

/// Whether a search got to publish its result.
#[derive(Debug)]
pub enum Publication {
    Published(QueryResult),
    /// A newer search was started before this one settled.
    Superseded,
}

#[derive(Debug)]
pub struct Dashboard {
    provider: Arc<dyn WeatherProvider>,
    latest_ticket: AtomicU64,
    state: watch::Sender<DashboardState>,
}

impl Dashboard {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        let (state, _) = watch::channel(DashboardState::Idle);
        Self { provider, latest_ticket: AtomicU64::new(0), state }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Run a query and publish its outcome unless a newer search has started meanwhile.
    pub async fn search(&self, place: &Place) -> Publication {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        self.publish_if_latest(ticket, || DashboardState::Pending { place: place.to_string() });

        let result = self.provider.fetch_weather(place).await;

        let published = self.publish_if_latest(ticket, || match &result {
            Ok(report) => DashboardState::Ready(report.clone()),
            Err(err) => DashboardState::Failed { message: err.user_message().to_string() },
        });

        if published {
            info!(%place, ticket, ok = result.is_ok(), "published weather query");
            Publication::Published(result)
        } else {
            debug!(%place, ticket, "discarding result of superseded query");
            Publication::Superseded
        }
    }

    /// The ticket check runs under the channel's write lock, so a result can never
    /// overwrite the state of a search that started after it.
    fn publish_if_latest(&self, ticket: u64, next: impl FnOnce() -> DashboardState) -> bool {
        self.state.send_if_modified(|state| {
            if self.latest_ticket.load(Ordering::SeqCst) != ticket {
                return false;
            }
            *state = next();
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Endpoint, WeatherError},
        model::CurrentConditions,
    };
    use async_trait::async_trait;
    use std::{collections::HashMap, sync::Mutex};
    use tokio::sync::oneshot;

    /// Provider whose answers are handed in by the test, one per place.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        pending: Mutex<HashMap<String, oneshot::Receiver<QueryResult>>>,
    }

    impl ScriptedProvider {
        fn expect(&self, place: &str) -> oneshot::Sender<QueryResult> {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().insert(place.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn fetch_weather(&self, place: &Place) -> QueryResult {
            let rx = self.pending.lock().unwrap().remove(place.as_str()).expect("unscripted place");
            rx.await.expect("script dropped")
        }
    }

    fn report(place: &str) -> WeatherReport {
        WeatherReport {
            current: CurrentConditions {
                place: place.to_string(),
                temperature_c: 20.0,
                humidity_pct: 50,
                category: "Clear".into(),
                description: "clear sky".into(),
            },
            forecast: Vec::new(),
        }
    }

    fn not_found() -> WeatherError {
        WeatherError::Decode { endpoint: Endpoint::Current, reason: "city not found".into() }
    }

    fn setup() -> (Arc<ScriptedProvider>, Dashboard) {
        let provider = Arc::new(ScriptedProvider::default());
        let dashboard = Dashboard::new(provider.clone());
        (provider, dashboard)
    }

    fn place(name: &str) -> Place {
        Place::parse(name).unwrap()
    }

    #[tokio::test]
    async fn starts_idle() {
        let (_, dashboard) = setup();
        assert_eq!(dashboard.state(), DashboardState::Idle);
    }

    #[tokio::test]
    async fn success_publishes_report() {
        let (provider, dashboard) = setup();
        provider.expect("Paris").send(Ok(report("Paris"))).unwrap();

        let publication = dashboard.search(&place("Paris")).await;

        assert!(matches!(publication, Publication::Published(Ok(_))));
        assert_eq!(dashboard.state(), DashboardState::Ready(report("Paris")));
    }

    #[tokio::test]
    async fn pending_is_visible_while_in_flight() {
        let (provider, dashboard) = setup();
        let tx = provider.expect("Paris");
        let mut rx = dashboard.subscribe();

        let paris = place("Paris");
        let search = dashboard.search(&paris);
        let observer = async {
            rx.changed().await.unwrap();
            let seen = rx.borrow_and_update().clone();
            tx.send(Ok(report("Paris"))).unwrap();
            seen
        };

        let (_, seen) = tokio::join!(search, observer);
        assert_eq!(seen, DashboardState::Pending { place: "Paris".into() });
    }

    #[tokio::test]
    async fn failure_clears_previous_report() {
        let (provider, dashboard) = setup();
        provider.expect("Paris").send(Ok(report("Paris"))).unwrap();
        dashboard.search(&place("Paris")).await;

        provider.expect("Atlantis").send(Err(not_found())).unwrap();
        let publication = dashboard.search(&place("Atlantis")).await;

        assert!(matches!(publication, Publication::Published(Err(_))));
        let state = dashboard.state();
        assert!(state.report().is_none());
        assert_eq!(
            state,
            DashboardState::Failed { message: WeatherError::USER_MESSAGE.to_string() }
        );
    }

    #[tokio::test]
    async fn later_search_wins_when_earlier_one_settles_last() {
        let (provider, dashboard) = setup();
        let slow_tx = provider.expect("Slow");
        let fast_tx = provider.expect("Fast");

        let (slow_place, fast_place) = (place("Slow"), place("Fast"));
        let slow = dashboard.search(&slow_place);
        let fast = dashboard.search(&fast_place);
        let driver = async {
            tokio::task::yield_now().await;
            fast_tx.send(Ok(report("Fast"))).unwrap();
            tokio::task::yield_now().await;
            slow_tx.send(Ok(report("Slow"))).unwrap();
        };

        let (slow, fast, ()) = tokio::join!(slow, fast, driver);

        assert!(matches!(slow, Publication::Superseded));
        assert!(matches!(fast, Publication::Published(Ok(_))));
        assert_eq!(dashboard.state(), DashboardState::Ready(report("Fast")));
    }

    #[tokio::test]
    async fn earlier_search_settling_first_is_still_discarded() {
        let (provider, dashboard) = setup();
        let first_tx = provider.expect("First");
        let second_tx = provider.expect("Second");

        let (first_place, second_place) = (place("First"), place("Second"));
        let first = dashboard.search(&first_place);
        let second = dashboard.search(&second_place);
        let driver = async {
            tokio::task::yield_now().await;
            first_tx.send(Err(not_found())).unwrap();
            tokio::task::yield_now().await;
            second_tx.send(Ok(report("Second"))).unwrap();
        };

        let (first, second, ()) = tokio::join!(first, second, driver);

        assert!(matches!(first, Publication::Superseded));
        assert!(matches!(second, Publication::Published(Ok(_))));
        assert_eq!(dashboard.state(), DashboardState::Ready(report("Second")));
    }
}
