//! Controller flows for the CLI subcommands
//!
//! Each flow drives the same [`Controller`] as the TUI, waiting on its event
//! channel instead of a frame loop.

use std::time::Duration;

use anyhow::{Context, Result, bail};

use super::controller::{Controller, LoadState, Notice};
use crate::assistant::AssistKind;
use crate::catalog::find_question;
use crate::progress::Status;

/// Start the controller and wait until the catalog and progress are mirrored
pub async fn connect(controller: &mut Controller, timeout: Duration) -> Result<()> {
    controller.start();

    let ready = controller
        .wait_until(timeout, |c| {
            matches!(c.load_state(), LoadState::Failed(_))
                || (*c.load_state() == LoadState::Ready && c.progress_loaded())
        })
        .await;

    if let LoadState::Failed(reason) = controller.load_state() {
        bail!("{reason}");
    }
    if !ready {
        bail!("Timed out waiting for the store");
    }

    for notice in controller.take_notices() {
        match notice {
            Notice::Error(message) => tracing::warn!("{message}"),
            Notice::Info(message) => tracing::info!("{message}"),
            Notice::Reply { .. } => {}
        }
    }
    Ok(())
}

/// Write a status and wait for the store to confirm it
pub async fn set_status(
    controller: &mut Controller,
    question_id: &str,
    status: Status,
    timeout: Duration,
) -> Result<()> {
    if find_question(controller.catalog(), question_id).is_none() {
        bail!("No question with id {question_id}");
    }
    if !controller.set_status(question_id, status) {
        bail!("Not signed in");
    }
    if !controller.wait_until(timeout, |c| c.pending_writes() == 0).await {
        bail!("Timed out saving {question_id}");
    }

    match controller.take_notices().into_iter().find_map(|n| match n {
        Notice::Error(message) => Some(message),
        _ => None,
    }) {
        Some(message) => bail!("{message}"),
        None => Ok(()),
    }
}

/// Ask for a hint and return the reply's title and text
pub async fn hint(
    controller: &mut Controller,
    question_id: &str,
    timeout: Duration,
) -> Result<(String, String)> {
    let question = find_question(controller.catalog(), question_id)
        .map(|(_, question)| question.clone())
        .with_context(|| format!("No question with id {question_id}"))?;

    controller.request_assistance(&question, AssistKind::Hint);
    if !controller.wait_until(timeout, |c| c.assistance_pending().is_none()).await {
        bail!("Timed out waiting for the assistant");
    }

    let mut reply = None;
    for notice in controller.take_notices() {
        match notice {
            Notice::Reply { title, text } => reply = Some((title, text)),
            Notice::Error(message) => tracing::warn!("{message}"),
            Notice::Info(_) => {}
        }
    }
    reply.context("The assistant did not reply")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::app::ClientContext;
    use crate::assistant::Assistant;
    use crate::identity::LocalIdentity;
    use crate::store::MemoryStore;

    const WAIT: Duration = Duration::from_secs(5);

    /// Replies after `delay`
    struct SlowAssistant {
        delay: Duration,
    }

    #[async_trait]
    impl Assistant for SlowAssistant {
        async fn generate(&self, _prompt: &str) -> String {
            tokio::time::sleep(self.delay).await;
            "Think about parity.".to_string()
        }
    }

    async fn connected(delay: Duration) -> Controller {
        let context = ClientContext::new(
            Arc::new(MemoryStore::new()),
            Arc::new(LocalIdentity::ephemeral()),
            Arc::new(SlowAssistant { delay }),
            "test-app",
        );
        let mut controller = Controller::new(context);
        connect(&mut controller, WAIT).await.unwrap();
        controller
    }

    #[tokio::test]
    async fn hint_returns_the_reply() {
        let mut controller = connected(Duration::ZERO).await;
        let (title, text) = hint(&mut controller, "cses_1068", WAIT).await.unwrap();
        assert!(title.contains("Hint"));
        assert_eq!(text, "Think about parity.");
    }

    #[tokio::test]
    async fn hint_times_out_with_an_error() {
        let mut controller = connected(Duration::from_secs(30)).await;
        let err = hint(&mut controller, "cses_1068", Duration::from_millis(50)).await.unwrap_err();
        assert_eq!(err.to_string(), "Timed out waiting for the assistant");
        controller.shutdown();
    }

    #[tokio::test]
    async fn unknown_question_is_rejected() {
        let mut controller = connected(Duration::ZERO).await;
        assert!(hint(&mut controller, "cses_9999", WAIT).await.is_err());
        assert!(set_status(&mut controller, "cses_9999", Status::Solved, WAIT).await.is_err());
    }

    #[tokio::test]
    async fn set_status_is_confirmed_by_the_store() {
        let mut controller = connected(Duration::ZERO).await;
        set_status(&mut controller, "cses_1068", Status::Attempting, WAIT).await.unwrap();
        assert!(
            controller.wait_until(WAIT, |c| c.status_of("cses_1068") == Status::Attempting).await
        );
    }
}
