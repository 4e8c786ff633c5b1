use teloxide::{
    dispatching::dialogue::GetChatId,
    payloads::{AnswerCallbackQuerySetters, EditMessageTextSetters, SendMessageSetters},
    prelude::Requester,
    types::{CallbackQuery, ChatId, Message, ReplyMarkup},
    Bot,
};
use tracing::{info, instrument, warn};

use crate::{
    collector::ask_field,
    commands::landing_text,
    keyboard::{landing_keyboard, options_keyboard, CallbackAction, START_QUIZ},
    quiz::{ContactField, Questionnaire, QuizFlow, Step},
    state::BotState,
    HandlerResult, UserDialogue,
};

const STALE_BUTTON: &str = "Этот вопрос уже неактуален";

pub(crate) fn question_text(flow: &QuizFlow) -> Option<String> {
    let question = flow.current_question()?;
    Some(format!(
        "Шаг {} из {}\n\n{}",
        flow.display_step(),
        flow.total_display_steps(),
        question.prompt()
    ))
}

pub(crate) fn contact_header(flow: &QuizFlow) -> String {
    format!(
        "Шаг {} из {}\n\nОставьте ваши контактные данные",
        flow.display_step(),
        flow.total_display_steps()
    )
}

pub(crate) async fn send_question(bot: &Bot, chat_id: ChatId, flow: &QuizFlow) -> HandlerResult {
    if let (Some(question), Some(text)) = (flow.current_question(), question_text(flow)) {
        bot.send_message(chat_id, text)
            .reply_markup(options_keyboard(
                flow.current_step_index(),
                question,
                flow.selected_answer(),
            ))
            .await?;
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, questionnaire))]
pub(crate) async fn offer_quiz(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    questionnaire: Questionnaire,
) -> HandlerResult {
    match msg.text() {
        Some(START_QUIZ) => {
            info!(chat = %msg.chat.id, "quiz opened");
            let flow = QuizFlow::new(questionnaire);

            bot.send_message(msg.chat.id, "Рассчитайте стоимость ремонта")
                .reply_markup(ReplyMarkup::kb_remove())
                .await?;
            send_question(&bot, msg.chat.id, &flow).await?;
            dialogue.update(BotState::Answering { flow }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, landing_text())
                .reply_markup(landing_keyboard())
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, q, flow), fields(chat = ?q.chat_id(), data = ?q.data))]
pub(crate) async fn take_answer(
    bot: Bot,
    dialogue: UserDialogue,
    q: CallbackQuery,
    mut flow: QuizFlow,
) -> HandlerResult {
    let result = match q.data.as_deref().and_then(CallbackAction::parse) {
        Some(CallbackAction::Answer { step, option }) => {
            let value = flow
                .questionnaire()
                .question(step)
                .and_then(|question| question.option(option))
                .map(str::to_owned);
            match value {
                Some(value) => flow.select_answer(step, &value),
                None => {
                    warn!(step, option, "answer button outside the questionnaire");
                    return stale_callback(bot, q).await;
                }
            }
        }
        Some(CallbackAction::Back) => flow.go_to_previous_step(),
        None => {
            warn!("unrecognised callback data");
            return stale_callback(bot, q).await;
        }
    };

    let step = match result {
        Ok(step) => step,
        Err(e) => {
            warn!(error = %e, "button press rejected by the quiz");
            return stale_callback(bot, q).await;
        }
    };

    bot.answer_callback_query(&q.id).await?;
    let Some(chat_id) = q.chat_id() else {
        return Ok(());
    };

    match step {
        Step::Question(idx) => {
            match (&q.message, flow.current_question(), question_text(&flow)) {
                (Some(message), Some(question), Some(text)) => {
                    bot.edit_message_text(chat_id, message.id(), text)
                        .reply_markup(options_keyboard(idx, question, flow.selected_answer()))
                        .await?;
                }
                _ => send_question(&bot, chat_id, &flow).await?,
            }
            dialogue.update(BotState::Answering { flow }).await?;
        }
        Step::Completed => {
            info!(%chat_id, "all questions answered");
            if let Some(message) = &q.message {
                bot.edit_message_text(chat_id, message.id(), contact_header(&flow))
                    .await?;
            } else {
                bot.send_message(chat_id, contact_header(&flow)).await?;
            }
            ask_field(&bot, chat_id, ContactField::Name, flow.contact()).await?;
            dialogue
                .update(BotState::Contact {
                    flow,
                    field: ContactField::Name,
                })
                .await?;
        }
    }

    Ok(())
}

pub(crate) async fn stale_callback(bot: Bot, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(&q.id).text(STALE_BUTTON).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot))]
pub(crate) async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    info!(chat = %msg.chat.id, text = ?msg.text(), "unexpected message");
    bot.send_message(
        msg.chat.id,
        "Выберите вариант ответа кнопкой под вопросом или отправьте /cancel, чтобы закрыть квиз.",
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_text_shows_progress_out_of_six() {
        let mut flow = QuizFlow::default();
        assert_eq!(
            question_text(&flow).unwrap(),
            "Шаг 1 из 6\n\nКакой тип помещения вы хотите отремонтировать?"
        );

        flow.select_answer(0, "Студия").unwrap();
        assert!(question_text(&flow).unwrap().starts_with("Шаг 2 из 6"));
    }

    #[test]
    fn contact_step_is_the_sixth() {
        let mut flow = QuizFlow::default();
        let answers: Vec<String> = flow
            .questionnaire()
            .questions()
            .iter()
            .map(|q| q.options()[0].clone())
            .collect();
        for (step, answer) in answers.iter().enumerate() {
            flow.select_answer(step, answer).unwrap();
        }

        assert_eq!(question_text(&flow), None);
        assert!(contact_header(&flow).starts_with("Шаг 6 из 6"));
    }
}
