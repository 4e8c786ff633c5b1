use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use super::contact::ContactInfo;

#[derive(Debug, Error)]
pub enum LeadSinkError {
    #[error("lead channel is closed")]
    Closed,
    #[error("lead rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadContact {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

impl From<&ContactInfo> for LeadContact {
    fn from(contact: &ContactInfo) -> Self {
        let comment = contact.comment().trim();
        Self {
            name: contact.name().trim().to_owned(),
            phone: contact.phone().trim().to_owned(),
            email: contact.email().trim().to_owned(),
            comment: (!comment.is_empty()).then(|| comment.to_owned()),
        }
    }
}

/// A finished quiz: every answer keyed by question id, in question order,
/// plus the customer's contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub answers: IndexMap<String, String>,
    pub contact: LeadContact,
}

impl Lead {
    pub fn new(answers: IndexMap<String, String>, contact: LeadContact) -> Self {
        Self {
            id: Uuid::new_v4(),
            answers,
            contact,
        }
    }
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Новая заявка {}", self.id)?;
        for (question, answer) in &self.answers {
            writeln!(f, "{question}: {answer}")?;
        }
        writeln!(f, "Имя: {}", self.contact.name)?;
        writeln!(f, "Телефон: {}", self.contact.phone)?;
        write!(f, "Email: {}", self.contact.email)?;
        if let Some(comment) = &self.contact.comment {
            write!(f, "\nКомментарий: {comment}")?;
        }
        Ok(())
    }
}

/// Receives leads once a submission passes validation. How they travel on
/// from here is up to the implementor.
pub trait LeadSink {
    fn accept(&self, lead: Lead) -> Result<(), LeadSinkError>;
}

/// Hands leads to an async consumer without blocking the submitting handler.
#[derive(Debug, Clone)]
pub struct ChannelLeadSink {
    tx: UnboundedSender<Lead>,
}

impl ChannelLeadSink {
    pub fn channel() -> (Self, UnboundedReceiver<Lead>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl LeadSink for ChannelLeadSink {
    fn accept(&self, lead: Lead) -> Result<(), LeadSinkError> {
        self.tx.send(lead).map_err(|_| LeadSinkError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Lead {
        let mut answers = IndexMap::new();
        answers.insert("room_type".to_owned(), "Студия".to_owned());
        answers.insert("budget".to_owned(), "До 300 000 руб.".to_owned());
        Lead::new(
            answers,
            LeadContact {
                name: "Ann".into(),
                phone: "+70001112233".into(),
                email: "a@b.co".into(),
                comment: None,
            },
        )
    }

    #[test]
    fn contact_is_trimmed_and_blank_comment_dropped() {
        let info = ContactInfo::new(" Ann ", " 123 ", " a@b.co").with_comment("   ");
        let contact = LeadContact::from(&info);

        assert_eq!(contact.name, "Ann");
        assert_eq!(contact.phone, "123");
        assert_eq!(contact.email, "a@b.co");
        assert_eq!(contact.comment, None);
    }

    #[test]
    fn json_keeps_question_order_and_omits_missing_comment() {
        let json = serde_json::to_string(&sample()).unwrap();

        let room = json.find("room_type").unwrap();
        let budget = json.find("budget").unwrap();
        assert!(room < budget);
        assert!(!json.contains("comment"));

        let back: Lead = serde_json::from_str(&json).unwrap();
        assert_eq!(back.contact.comment, None);
        assert_eq!(back.answers.get_index(0).map(|(k, _)| k.as_str()), Some("room_type"));
    }

    #[test]
    fn display_lists_answers_and_contact() {
        let text = sample().to_string();

        assert!(text.contains("room_type: Студия"));
        assert!(text.contains("Телефон: +70001112233"));
        assert!(!text.contains("Комментарий"));
    }

    #[tokio::test]
    async fn channel_sink_delivers_and_reports_closed() {
        let (sink, mut rx) = ChannelLeadSink::channel();
        let lead = sample();

        sink.accept(lead.clone()).unwrap();
        assert_eq!(rx.recv().await, Some(lead));

        drop(rx);
        assert!(matches!(sink.accept(sample()), Err(LeadSinkError::Closed)));
    }
}
