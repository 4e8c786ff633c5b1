use std::{fmt::Display, future::Future};

use teloxide::{prelude::Requester, types::ChatId, Bot, RequestError};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

use crate::quiz::Lead;

/// Drains submitted leads until every sender is gone. Each lead is logged
/// as JSON and then handed to `deliver`; a failed delivery is logged and
/// does not stop the loop.
pub async fn forward_leads<F, Fut, E>(mut leads: UnboundedReceiver<Lead>, mut deliver: F)
where
    F: FnMut(Lead) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    while let Some(lead) = leads.recv().await {
        let id = lead.id;
        match serde_json::to_string(&lead) {
            Ok(body) => info!(lead = %id, %body, "lead received"),
            Err(e) => error!(lead = %id, error = %e, "lead can't be serialized"),
        }

        if let Err(e) = deliver(lead).await {
            error!(lead = %id, error = %e, "lead notification failed");
        }
    }
    info!("lead channel closed");
}

/// Sends the lead summary to the manager chat, if one is configured.
pub async fn notify_manager(bot: Bot, chat: Option<ChatId>, lead: Lead) -> Result<(), RequestError> {
    if let Some(chat) = chat {
        bot.send_message(chat, lead.to_string()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use indexmap::IndexMap;

    use super::*;
    use crate::quiz::{ChannelLeadSink, LeadContact, LeadSink};

    fn lead(name: &str) -> Lead {
        Lead::new(
            IndexMap::from([("room_type".to_owned(), "Комната".to_owned())]),
            LeadContact {
                name: name.to_owned(),
                phone: "1".to_owned(),
                email: "a@b.co".to_owned(),
                comment: None,
            },
        )
    }

    #[tokio::test]
    async fn forwards_every_lead_until_senders_drop() {
        let (sink, rx) = ChannelLeadSink::channel();
        let seen = Arc::new(Mutex::new(Vec::new()));

        sink.accept(lead("Ann")).unwrap();
        sink.accept(lead("Bob")).unwrap();
        drop(sink);

        let collected = Arc::clone(&seen);
        forward_leads(rx, move |lead: Lead| {
            let collected = Arc::clone(&collected);
            async move {
                collected.lock().unwrap().push(lead.contact.name);
                Ok::<_, String>(())
            }
        })
        .await;

        assert_eq!(*seen.lock().unwrap(), ["Ann", "Bob"]);
    }

    #[tokio::test]
    async fn failed_delivery_does_not_stop_forwarding() {
        let (sink, rx) = ChannelLeadSink::channel();
        let attempts = Arc::new(Mutex::new(0));

        sink.accept(lead("Ann")).unwrap();
        sink.accept(lead("Bob")).unwrap();
        drop(sink);

        let counter = Arc::clone(&attempts);
        forward_leads(rx, move |_lead: Lead| {
            let counter = Arc::clone(&counter);
            async move {
                *counter.lock().unwrap() += 1;
                Err::<(), _>("manager chat unreachable")
            }
        })
        .await;

        assert_eq!(*attempts.lock().unwrap(), 2);
    }
}
