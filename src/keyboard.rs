use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::quiz::{ContactField, QuizQuestion};

pub const START_QUIZ: &str = "Пройти квиз📝";
pub const BACK: &str = "Назад";
pub const SKIP: &str = "Пропустить";

const BACK_DATA: &str = "back";
const ANSWER_PREFIX: &str = "a:";

/// Payload of an inline button press. Options travel by index: Telegram
/// caps callback data at 64 bytes and the option texts are Cyrillic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Answer { step: usize, option: usize },
    Back,
}

impl CallbackAction {
    pub fn data(self) -> String {
        match self {
            CallbackAction::Answer { step, option } => format!("{ANSWER_PREFIX}{step}:{option}"),
            CallbackAction::Back => BACK_DATA.to_owned(),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        if data == BACK_DATA {
            return Some(CallbackAction::Back);
        }

        let (step, option) = data.strip_prefix(ANSWER_PREFIX)?.split_once(':')?;
        Some(CallbackAction::Answer {
            step: step.parse().ok()?,
            option: option.parse().ok()?,
        })
    }
}

pub(crate) fn landing_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(START_QUIZ)]])
}

pub(crate) fn options_keyboard(
    step: usize,
    question: &QuizQuestion,
    selected: Option<&str>,
) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = question
        .options()
        .iter()
        .enumerate()
        .map(|(option, text)| {
            let label = if selected == Some(text.as_str()) {
                format!("✅ {text}")
            } else {
                text.clone()
            };
            vec![InlineKeyboardButton::callback(
                label,
                CallbackAction::Answer { step, option }.data(),
            )]
        })
        .collect();

    if step > 0 {
        keyboard.push(vec![InlineKeyboardButton::callback(
            format!("⬅️ {BACK}"),
            CallbackAction::Back.data(),
        )]);
    }

    InlineKeyboardMarkup::new(keyboard)
}

pub(crate) fn contact_keyboard(field: ContactField) -> ReplyMarkup {
    match field {
        ContactField::Name => {
            ReplyMarkup::Keyboard(KeyboardMarkup::new(vec![vec![KeyboardButton::new(BACK)]]))
        }
        ContactField::Comment => {
            ReplyMarkup::Keyboard(KeyboardMarkup::new(vec![vec![KeyboardButton::new(SKIP)]]))
        }
        ContactField::Phone | ContactField::Email => ReplyMarkup::kb_remove(),
    }
}
