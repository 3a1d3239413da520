//! CDP-backed [`DialogSource`]: `Page.javascriptDialogOpening` events in,
//! `Page.handleJavaScriptDialog` commands out.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    DialogType, EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::page::Page;
use futures::StreamExt;

use crate::dialog::{DialogEvent, DialogKind, DialogResponse, DialogSource};

impl From<DialogType> for DialogKind {
    fn from(value: DialogType) -> Self {
        match value {
            DialogType::Alert => DialogKind::Alert,
            DialogType::Confirm => DialogKind::Confirm,
            DialogType::Prompt => DialogKind::Prompt,
            DialogType::Beforeunload => DialogKind::BeforeUnload,
        }
    }
}

/// Feeds one page's dialog events into its relay and answers them.
pub(crate) struct CdpDialogSource {
    events: EventStream<EventJavascriptDialogOpening>,
    page: Page,
}

impl CdpDialogSource {
    /// Subscribe before anything on the page can raise a dialog.
    pub(crate) async fn subscribe(page: &Page) -> Result<Self> {
        let events = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .context("failed to subscribe to javascript dialog events")?;
        Ok(Self {
            events,
            page: page.clone(),
        })
    }
}

#[async_trait]
impl DialogSource for CdpDialogSource {
    async fn next_dialog(&mut self) -> Option<DialogEvent> {
        let event = self.events.next().await?;
        Some(DialogEvent {
            kind: event.r#type.clone().into(),
            message: event.message.clone(),
            default_prompt: event.default_prompt.clone(),
        })
    }

    async fn resolve(&mut self, _event: &DialogEvent, response: DialogResponse) -> Result<()> {
        let builder = match response {
            DialogResponse::Accept {
                prompt_text: Some(text),
            } => HandleJavaScriptDialogParams::builder()
                .accept(true)
                .prompt_text(text),
            DialogResponse::Accept { prompt_text: None } => {
                HandleJavaScriptDialogParams::builder().accept(true)
            }
            DialogResponse::Dismiss => HandleJavaScriptDialogParams::builder().accept(false),
        };
        let params = builder.build().map_err(|e| anyhow!(e))?;
        self.page
            .execute(params)
            .await
            .context("Page.handleJavaScriptDialog failed")?;
        Ok(())
    }
}
