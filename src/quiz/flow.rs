use std::collections::BTreeMap;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::{
    contact::{validate_contact, ContactErrors, ContactField, ContactInfo},
    lead::{Lead, LeadContact, LeadSink, LeadSinkError},
    question::{QuizQuestion, Questionnaire},
};

/// Misuse of the flow by the presentation layer. Never caused by what the
/// customer typed, and never leaves the session modified.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("step {step} is out of range, the quiz has {count} questions")]
    StepOutOfRange { step: usize, count: usize },
    #[error("answer for step {got} while step {expected} is active")]
    StepMismatch { expected: usize, got: usize },
    #[error("'{option}' is not an option of question '{question}'")]
    UnknownOption { question: String, option: String },
    #[error("all questions are already answered")]
    AlreadyCompleted,
    #[error("already at the first step")]
    AtFirstStep,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("contact form has {} invalid field(s)", .0.len())]
    Invalid(ContactErrors),
    #[error("the quiz is not completed yet")]
    NotCompleted,
    #[error(transparent)]
    Sink(#[from] LeadSinkError),
}

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Question(usize),
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizState {
    current_step_index: usize,
    answers: BTreeMap<usize, String>,
    completed: bool,
}

impl QuizState {
    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn step(&self) -> Step {
        if self.completed {
            Step::Completed
        } else {
            Step::Question(self.current_step_index)
        }
    }
}

/// One quiz session: question answers followed by the contact form.
///
/// The flow owns all mutable session state. A presentation layer keeps one
/// `QuizFlow` per open quiz, forwards user actions into it and renders the
/// read accessors.
#[derive(Debug, Clone)]
pub struct QuizFlow {
    questionnaire: Questionnaire,
    state: QuizState,
    contact: ContactInfo,
}

impl QuizFlow {
    pub fn new(questionnaire: Questionnaire) -> Self {
        Self {
            questionnaire,
            state: QuizState::default(),
            contact: ContactInfo::default(),
        }
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn step(&self) -> Step {
        self.state.step()
    }

    pub fn current_step_index(&self) -> usize {
        self.state.current_step_index
    }

    pub fn question_count(&self) -> usize {
        self.questionnaire.len()
    }

    pub fn is_completed(&self) -> bool {
        self.state.completed
    }

    /// The question on screen, `None` once the contact form is shown.
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match self.step() {
            Step::Question(idx) => self.questionnaire.question(idx),
            Step::Completed => None,
        }
    }

    pub fn answer(&self, step: usize) -> Option<&str> {
        self.state.answers.get(&step).map(String::as_str)
    }

    /// The option previously picked for the question on screen.
    pub fn selected_answer(&self) -> Option<&str> {
        match self.step() {
            Step::Question(idx) => self.answer(idx),
            Step::Completed => None,
        }
    }

    /// 1-based step number for progress display; the contact form is the
    /// last step.
    pub fn display_step(&self) -> usize {
        match self.step() {
            Step::Question(idx) => idx + 1,
            Step::Completed => self.total_display_steps(),
        }
    }

    pub fn total_display_steps(&self) -> usize {
        self.question_count() + 1
    }

    pub fn progress_percent(&self) -> u8 {
        let percent = self.display_step() * 100 / self.total_display_steps();
        u8::try_from(percent).unwrap_or(100)
    }

    pub fn select_answer(&mut self, step: usize, option: &str) -> Result<Step, FlowError> {
        let count = self.question_count();
        let question = self
            .questionnaire
            .question(step)
            .ok_or(FlowError::StepOutOfRange { step, count })?;

        if self.state.completed {
            return Err(FlowError::AlreadyCompleted);
        }
        if step != self.state.current_step_index {
            return Err(FlowError::StepMismatch {
                expected: self.state.current_step_index,
                got: step,
            });
        }
        if !question.allows(option) {
            return Err(FlowError::UnknownOption {
                question: question.id().to_owned(),
                option: option.to_owned(),
            });
        }

        debug!(question = question.id(), option, step, "answer recorded");
        self.state.answers.insert(step, option.to_owned());

        if step + 1 < count {
            self.state.current_step_index = step + 1;
        } else {
            self.state.completed = true;
        }

        Ok(self.step())
    }

    /// Moves back one step. Answers are kept so the previous choice stays
    /// highlighted; leaving the contact form keeps what was typed there.
    pub fn go_to_previous_step(&mut self) -> Result<Step, FlowError> {
        if self.state.completed {
            self.state.completed = false;
        } else if self.state.current_step_index > 0 {
            self.state.current_step_index -= 1;
        } else {
            return Err(FlowError::AtFirstStep);
        }

        debug!(step = ?self.step(), "moved back");
        Ok(self.step())
    }

    pub fn update_contact_field(&mut self, field: ContactField, value: impl Into<String>) {
        self.contact.set(field, value);
    }

    /// Validates the contact form and, if it is clean, hands the lead to
    /// `sink` and starts a fresh session.
    ///
    /// On validation failure the errors are stored on the contact form for
    /// display and returned; nothing else changes. A sink failure also
    /// leaves the session as it was so the customer can retry.
    pub fn submit<S: LeadSink + ?Sized>(&mut self, sink: &S) -> Result<Uuid, SubmitError> {
        if !self.state.completed {
            return Err(SubmitError::NotCompleted);
        }

        let errors = validate_contact(&self.contact);
        self.contact.set_errors(errors.clone());
        if !errors.is_empty() {
            debug!(invalid = errors.len(), "contact form rejected");
            return Err(SubmitError::Invalid(errors));
        }

        let lead = Lead::new(self.answers_by_id(), LeadContact::from(&self.contact));
        let id = lead.id;
        sink.accept(lead)?;

        debug!(lead = %id, "lead submitted");
        self.reset();
        Ok(id)
    }

    /// Drops the session without producing a lead.
    pub fn cancel(&mut self) {
        debug!(step = ?self.step(), "quiz cancelled");
        self.reset();
    }

    fn reset(&mut self) {
        self.state = QuizState::default();
        self.contact = ContactInfo::default();
    }

    fn answers_by_id(&self) -> IndexMap<String, String> {
        self.questionnaire
            .questions()
            .iter()
            .enumerate()
            .filter_map(|(idx, question)| {
                self.state
                    .answers
                    .get(&idx)
                    .map(|answer| (question.id().to_owned(), answer.clone()))
            })
            .collect()
    }
}

impl Default for QuizFlow {
    fn default() -> Self {
        Self::new(Questionnaire::default())
    }
}
