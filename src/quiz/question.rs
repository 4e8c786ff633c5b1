use std::{collections::HashSet, fmt, sync::Arc};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionnaireError {
    #[error("questionnaire has no questions")]
    Empty,
    #[error("duplicate question id '{0}'")]
    DuplicateId(String),
    #[error("question '{0}' has no options")]
    NoOptions(String),
    #[error("question '{id}' lists option '{option}' twice")]
    DuplicateOption { id: String, option: String },
}

/// One immutable quiz question: an identifier, the prompt shown to the
/// customer and the ordered set of options they can pick from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    id: String,
    prompt: String,
    options: Vec<String>,
}

impl QuizQuestion {
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn option(&self, idx: usize) -> Option<&str> {
        self.options.get(idx).map(String::as_str)
    }

    pub fn option_index(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|option| option == value)
    }

    pub fn allows(&self, value: &str) -> bool {
        self.option_index(value).is_some()
    }
}

impl fmt::Display for QuizQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prompt)?;
        for (i, option) in self.options.iter().enumerate() {
            write!(f, "\n{}) {}", i + 1, option)?;
        }
        Ok(())
    }
}

/// The fixed, ordered list of questions a session walks through.
///
/// Cloning is cheap: the questions are shared behind an `Arc`, so every
/// dialogue can carry its own handle without copying the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    questions: Arc<[QuizQuestion]>,
}

impl Questionnaire {
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, QuestionnaireError> {
        if questions.is_empty() {
            return Err(QuestionnaireError::Empty);
        }

        let mut ids = HashSet::new();
        for question in &questions {
            if !ids.insert(question.id()) {
                return Err(QuestionnaireError::DuplicateId(question.id().to_owned()));
            }
            if question.options().is_empty() {
                return Err(QuestionnaireError::NoOptions(question.id().to_owned()));
            }

            let mut seen = HashSet::new();
            for option in question.options() {
                if !seen.insert(option.as_str()) {
                    return Err(QuestionnaireError::DuplicateOption {
                        id: question.id().to_owned(),
                        option: option.clone(),
                    });
                }
            }
        }

        Ok(Self {
            questions: questions.into(),
        })
    }

    /// The renovation calculator shown on the landing page.
    pub fn renovation() -> Self {
        let questions = vec![
            QuizQuestion::new(
                "room_type",
                "Какой тип помещения вы хотите отремонтировать?",
                ["Квартира", "Комната", "Студия", "Другое"],
            ),
            QuizQuestion::new(
                "work_scope",
                "Какой объем работ вас интересует?",
                ["Косметический ремонт", "Капитальный ремонт", "Ремонт под ключ"],
            ),
            QuizQuestion::new(
                "style",
                "Какой стиль интерьера предпочитаете?",
                ["Современный", "Классический", "Лофт", "Минимализм", "Другой"],
            ),
            QuizQuestion::new(
                "budget",
                "Какой бюджет вы планируете выделить?",
                [
                    "До 300 000 руб.",
                    "300 000 – 600 000 руб.",
                    "Более 600 000 руб.",
                ],
            ),
            QuizQuestion::new(
                "timeframe",
                "В какие сроки планируете завершить ремонт?",
                ["До 1 месяца", "1-3 месяца", "Более 3 месяцев"],
            ),
        ];

        Self {
            questions: questions.into(),
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn question(&self, idx: usize) -> Option<&QuizQuestion> {
        self.questions.get(idx)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::renovation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renovation_catalog_passes_validation() {
        let catalog = Questionnaire::renovation();
        let rebuilt = Questionnaire::new(catalog.questions().to_vec()).unwrap();

        assert_eq!(rebuilt.len(), 5);
        assert_eq!(rebuilt.question(0).unwrap().id(), "room_type");
        assert_eq!(rebuilt.question(4).unwrap().id(), "timeframe");
    }

    #[test]
    fn rejects_empty_questionnaire() {
        assert_eq!(Questionnaire::new(vec![]), Err(QuestionnaireError::Empty));
    }

    #[test]
    fn rejects_duplicate_ids_and_options() {
        let dup_id = Questionnaire::new(vec![
            QuizQuestion::new("a", "A?", ["x"]),
            QuizQuestion::new("a", "B?", ["y"]),
        ]);
        assert_eq!(dup_id, Err(QuestionnaireError::DuplicateId("a".into())));

        let dup_option = Questionnaire::new(vec![QuizQuestion::new("a", "A?", ["x", "x"])]);
        assert_eq!(
            dup_option,
            Err(QuestionnaireError::DuplicateOption {
                id: "a".into(),
                option: "x".into()
            })
        );

        let no_options = Questionnaire::new(vec![QuizQuestion::new("a", "A?", Vec::<String>::new())]);
        assert_eq!(no_options, Err(QuestionnaireError::NoOptions("a".into())));
    }

    #[test]
    fn option_lookup() {
        let question = QuizQuestion::new("style", "Style?", ["Лофт", "Минимализм"]);

        assert_eq!(question.option_index("Минимализм"), Some(1));
        assert_eq!(question.option(0), Some("Лофт"));
        assert!(!question.allows("Барокко"));
        assert_eq!(question.to_string(), "Style?\n1) Лофт\n2) Минимализм");
    }
}
