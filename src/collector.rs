use std::sync::Arc;

use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, Message, ReplyMarkup},
    Bot,
};
use tracing::{error, info, instrument, warn};

use crate::{
    keyboard::{contact_keyboard, landing_keyboard, BACK, SKIP},
    quiz::{ContactErrors, ContactField, ContactInfo, LeadSink, QuizFlow, SubmitError},
    runner::send_question,
    state::BotState,
    HandlerResult, UserDialogue,
};

fn placeholder(field: ContactField) -> &'static str {
    match field {
        ContactField::Name => "Иван Иванов",
        ContactField::Phone => "+7 (___) ___-__-__",
        ContactField::Email => "example@mail.ru",
        ContactField::Comment => "удобное время для звонка, адрес объекта",
    }
}

pub(crate) fn field_prompt(field: ContactField, contact: &ContactInfo) -> String {
    let mut prompt = format!("{}, например: {}", field.label(), placeholder(field));
    if !field.is_required() {
        prompt.push_str(&format!("\nНеобязательно, можно нажать «{SKIP}»."));
    }

    let current = contact.get(field);
    if !current.is_empty() {
        prompt.push_str(&format!("\nСейчас: {current}"));
    }
    if let Some(error) = contact.error(field) {
        prompt.push_str(&format!("\n⚠️ {error}"));
    }
    prompt
}

pub(crate) fn errors_text(errors: &ContactErrors) -> String {
    let mut text = String::from("Ошибка. Пожалуйста, проверьте поля:");
    for (field, error) in errors {
        text.push_str(&format!("\n• {field}: {error}"));
    }
    text
}

pub(crate) async fn ask_field(
    bot: &Bot,
    chat_id: ChatId,
    field: ContactField,
    contact: &ContactInfo,
) -> HandlerResult {
    bot.send_message(chat_id, field_prompt(field, contact))
        .reply_markup(contact_keyboard(field))
        .await?;
    Ok(())
}

fn record(flow: &mut QuizFlow, field: ContactField, text: &str) {
    let value = if field == ContactField::Comment && text == SKIP {
        ""
    } else {
        text
    };
    flow.update_contact_field(field, value);
}

#[instrument(level = "info", skip(bot, dialogue, flow, sink))]
pub(crate) async fn receive_contact_field<Sink: LeadSink + Send + Sync + 'static>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (mut flow, field): (QuizFlow, ContactField),
    sink: Arc<Sink>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Пожалуйста, отправьте ответ текстом.")
            .await?;
        return Ok(());
    };

    if field == ContactField::Name && text == BACK {
        return back_to_questions(bot, dialogue, msg.chat.id, flow).await;
    }

    record(&mut flow, field, text);
    match field.next() {
        Some(next) => {
            ask_field(&bot, msg.chat.id, next, flow.contact()).await?;
            dialogue
                .update(BotState::Contact { flow, field: next })
                .await?;
        }
        None => submit_lead(&bot, &dialogue, msg.chat.id, flow, sink.as_ref()).await?,
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, flow, sink))]
pub(crate) async fn receive_correction<Sink: LeadSink + Send + Sync + 'static>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (mut flow, field): (QuizFlow, ContactField),
    sink: Arc<Sink>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Пожалуйста, отправьте ответ текстом.")
            .await?;
        return Ok(());
    };

    record(&mut flow, field, text);
    match flow.contact().errors().keys().next().copied() {
        Some(next) => {
            ask_field(&bot, msg.chat.id, next, flow.contact()).await?;
            dialogue
                .update(BotState::Correcting { flow, field: next })
                .await?;
        }
        None => submit_lead(&bot, &dialogue, msg.chat.id, flow, sink.as_ref()).await?,
    }

    Ok(())
}

async fn back_to_questions(
    bot: Bot,
    dialogue: UserDialogue,
    chat_id: ChatId,
    mut flow: QuizFlow,
) -> HandlerResult {
    if let Err(e) = flow.go_to_previous_step() {
        warn!(error = %e, "contact form without answered questions");
        return Ok(());
    }

    bot.send_message(chat_id, "Возвращаемся к вопросам")
        .reply_markup(ReplyMarkup::kb_remove())
        .await?;
    send_question(&bot, chat_id, &flow).await?;
    dialogue.update(BotState::Answering { flow }).await?;
    Ok(())
}

async fn submit_lead<S: LeadSink + Sync + ?Sized>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    mut flow: QuizFlow,
    sink: &S,
) -> HandlerResult {
    match flow.submit(sink) {
        Ok(lead) => {
            info!(%chat_id, %lead, "lead submitted");
            bot.send_message(
                chat_id,
                "Успешно! Ваша заявка принята. Мы свяжемся с вами в ближайшее время!",
            )
            .reply_markup(landing_keyboard())
            .await?;
            dialogue.update(BotState::Start).await?;
        }
        Err(SubmitError::Invalid(errors)) => {
            info!(%chat_id, invalid = errors.len(), "contact form rejected");
            bot.send_message(chat_id, errors_text(&errors)).await?;

            let field = errors.keys().next().copied().unwrap_or(ContactField::Name);
            ask_field(bot, chat_id, field, flow.contact()).await?;
            dialogue.update(BotState::Correcting { flow, field }).await?;
        }
        Err(SubmitError::Sink(e)) => {
            error!(%chat_id, error = %e, "lead was not delivered");
            bot.send_message(
                chat_id,
                "Не удалось отправить заявку. Попробуйте ещё раз через минуту.",
            )
            .await?;
            ask_field(bot, chat_id, ContactField::Comment, flow.contact()).await?;
            dialogue
                .update(BotState::Contact {
                    flow,
                    field: ContactField::Comment,
                })
                .await?;
        }
        Err(SubmitError::NotCompleted) => {
            warn!(%chat_id, "submit before the last question");
            send_question(bot, chat_id, &flow).await?;
            dialogue.update(BotState::Answering { flow }).await?;
        }
    }

    Ok(())
}
