//! Single-flight access token refresh
//!
//! Every `401` funnels through one [`RefreshCoordinator`]. Refreshes are
//! serialized behind an async mutex. Each settled refresh bumps a
//! generation counter and records its outcome; a caller whose request went
//! out before that refresh settled joins the recorded outcome instead of
//! spending the refresh token again. Store writes happen under the lock, so
//! an older refresh can never overwrite a newer token.

use super::AssistClient;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of one refresh attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A current access token is stored and can be used for the replay
    Refreshed(String),
    /// No refresh token was stored; the session has been cleared
    NoRefreshToken,
    /// The refresh call failed; the session has been cleared
    Failed(String),
}

/// What a caller of [`RefreshCoordinator::refresh`] gets back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub outcome: RefreshOutcome,
    /// The attempt was made by another caller; its expiry, if any, has
    /// already been reported
    pub joined: bool,
}

/// Serializes refresh attempts for one client and all of its clones
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    generation: AtomicU64,
    last: Mutex<Option<RefreshOutcome>>,
}

impl RefreshCoordinator {
    /// Generation to capture before sending a request that may need a refresh
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Obtain a usable access token after `rejected` was refused by the
    /// server. `observed` is the generation captured before that request
    /// was sent.
    pub async fn refresh(
        &self,
        client: &AssistClient,
        rejected: Option<&str>,
        observed: u64,
    ) -> Settled {
        let mut last = self.last.lock().await;
        let session = client.session();

        if let Some(current) = session.access_token() {
            if rejected != Some(current.as_str()) {
                debug!("Access token already replaced, reusing it");
                return Settled {
                    outcome: RefreshOutcome::Refreshed(current),
                    joined: true,
                };
            }
        }

        if self.generation() != observed {
            if let Some(outcome) = last
                .as_ref()
                .filter(|o| !matches!(o, RefreshOutcome::Refreshed(_)))
            {
                debug!("Joining the refresh that settled while this request was in flight");
                return Settled {
                    outcome: outcome.clone(),
                    joined: true,
                };
            }
        }

        let outcome = match session.refresh_token() {
            None => {
                debug!("No refresh token stored");
                clear_session(client);
                RefreshOutcome::NoRefreshToken
            }
            Some(refresh_token) => {
                let refreshed = client
                    .exchange_refresh_token(&refresh_token)
                    .await
                    .and_then(|access_token| {
                        session.set_access_token(&access_token)?;
                        Ok(access_token)
                    });
                match refreshed {
                    Ok(access_token) => {
                        info!("Access token refreshed");
                        RefreshOutcome::Refreshed(access_token)
                    }
                    Err(e) => {
                        warn!(error = %e, "Token refresh failed");
                        clear_session(client);
                        RefreshOutcome::Failed(e.to_string())
                    }
                }
            }
        };

        *last = Some(outcome.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);
        Settled {
            outcome,
            joined: false,
        }
    }
}

fn clear_session(client: &AssistClient) {
    if let Err(e) = client.session().clear() {
        warn!(error = %e, "Failed to clear session");
    }
}
