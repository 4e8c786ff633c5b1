//! The renovation quiz: question catalog, session flow, contact form
//! validation and the lead handed off at the end.

pub mod contact;
pub mod flow;
pub mod lead;
pub mod question;

pub use contact::{validate_contact, ContactErrors, ContactField, ContactInfo, ValidationError};
pub use flow::{FlowError, QuizFlow, QuizState, Step, SubmitError};
pub use lead::{ChannelLeadSink, Lead, LeadContact, LeadSink, LeadSinkError};
pub use question::{Questionnaire, QuestionnaireError, QuizQuestion};
