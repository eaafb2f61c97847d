use std::sync::Arc;
use std::time::{Duration, Instant};

use poise::serenity_prelude::{CreateMessage, Http, Mentionable};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};

use crate::tierlist::{SessionBook, TestSession};

/// Abandons test sessions left paired for longer than the configured timeout.
pub struct SessionSweeper {
    http: Arc<Http>,
    sessions: Arc<SessionBook>,
    timeout: Duration,
    period: Duration,
}

impl SessionSweeper {
    pub fn new(
        http: Arc<Http>,
        sessions: Arc<SessionBook>,
        timeout: Duration,
        period: Duration,
    ) -> Self {
        Self {
            http,
            sessions,
            timeout,
            period,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut interval = interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            timeout_secs = self.timeout.as_secs(),
            period_secs = self.period.as_secs(),
            "⏳ Session sweeper started"
        );

        loop {
            interval.tick().await;
            self.sweep().await;
        }
    }

    #[instrument(skip_all, fields(expired))]
    async fn sweep(&self) {
        let expired = self.sessions.reap_expired(Instant::now(), self.timeout).await;
        if expired.is_empty() {
            debug!("⏳ No stale sessions");
            return;
        }

        tracing::Span::current().record("expired", expired.len());
        for session in &expired {
            info!(
                session_id = %session.id,
                tester = %session.tester,
                candidate = %session.candidate,
                "⏳ Session timed out"
            );
            self.notify(session).await;
        }
    }

    async fn notify(&self, session: &TestSession) {
        let Some(channel_id) = session.ticket_channel else {
            return;
        };

        let message = CreateMessage::new().content(format!(
            "⏳ {} {} this test session timed out and was closed without a result.",
            session.candidate.mention(),
            session.tester.mention()
        ));
        if let Err(e) = channel_id.send_message(self.http.as_ref(), message).await {
            warn!(error = %e, %channel_id, "⏳ ⚠️ Failed to post timeout notice");
        }
    }
}
