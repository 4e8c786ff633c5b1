use crate::quiz::{ContactField, QuizFlow};

/// Per-chat dialogue state. Every state past `Start` owns the chat's quiz
/// session; returning to `Start` drops it.
#[derive(Debug, Clone, Default)]
pub enum BotState {
    #[default]
    Start,
    Answering {
        flow: QuizFlow,
    },
    Contact {
        flow: QuizFlow,
        field: ContactField,
    },
    // Re-asking fields that failed validation on submit.
    Correcting {
        flow: QuizFlow,
        field: ContactField,
    },
}

impl BotState {
    pub fn flow_mut(&mut self) -> Option<&mut QuizFlow> {
        match self {
            BotState::Start => None,
            BotState::Answering { flow }
            | BotState::Contact { flow, .. }
            | BotState::Correcting { flow, .. } => Some(flow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_start_has_no_session() {
        assert!(BotState::Start.flow_mut().is_none());

        let mut state = BotState::Contact {
            flow: QuizFlow::default(),
            field: ContactField::Phone,
        };
        assert!(state.flow_mut().is_some());
    }
}
