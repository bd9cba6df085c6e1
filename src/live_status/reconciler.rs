use crate::channel::{LiveIntent, LivePresenter};
use crate::live_status::endpoints::StatusEndpoint;
use crate::processes::periodic_task::PeriodicTask;

/// Mirrors the streaming source's live flag onto the live channel.
///
/// The cached flag belongs to this reconciler alone. Admin overrides don't
/// touch it, so the next observed change wins.
#[derive(Debug)]
pub struct LiveStatusReconciler<E, P> {
  endpoint: E,
  presenter: P,
  is_live: bool,
}

impl<E, P> LiveStatusReconciler<E, P>
where
  E: StatusEndpoint<Observation = bool>,
  P: LivePresenter,
{
  pub fn new(endpoint: E, presenter: P, initial_live_status: bool) -> Self {
    tracing::info!("Initial Live Status: {}", initial_live_status);

    Self {
      endpoint,
      presenter,
      is_live: initial_live_status,
    }
  }

  pub fn is_live(&self) -> bool {
    self.is_live
  }

  /// Presents the new state when `observed` differs from the cached one.
  ///
  /// The cached value follows the observation even when presenting fails.
  /// Returns whether the presenter was invoked.
  pub async fn reconcile(&mut self, observed: bool) -> bool {
    if observed == self.is_live {
      return false;
    }

    if observed {
      tracing::info!("Channel ONLINE event");
    } else {
      tracing::info!("Channel OFFLINE event");
    }

    if let Err(error) = self.presenter.present(LiveIntent::from(observed)).await {
      tracing::error!("Failed to present the live channel. Reason: {}", error);
    }

    self.is_live = observed;

    true
  }
}

impl<E, P> PeriodicTask for LiveStatusReconciler<E, P>
where
  E: StatusEndpoint<Observation = bool> + 'static,
  P: LivePresenter + 'static,
{
  fn name(&self) -> &'static str {
    "live status"
  }

  async fn tick(&mut self) {
    match self.endpoint.fetch().await {
      Ok(observed) => {
        self.reconcile(observed).await;
      }

      Err(error) => {
        tracing::error!("Failed to check the live status. Reason: {}", error);
      }
    }
  }
}
