use teloxide::{
    payloads::SendMessageSetters, prelude::Requester, types::Message, utils::command::BotCommands,
    Bot,
};
use tracing::{info, instrument};

use crate::{keyboard::landing_keyboard, state::BotState, HandlerResult, UserDialogue};

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "показать список команд.")]
    Help,
    #[command(description = "главная страница и квиз.")]
    Start,
    #[command(description = "закрыть квиз.")]
    Cancel,
}

pub(crate) fn landing_text() -> &'static str {
    "Ремонт квартир под ключ - быстро, качественно, с гарантией\n\n\
     Превратим ваше жилье в пространство вашей мечты с профессиональным подходом \
     и вниманием к деталям.\n\n\
     Хотите узнать стоимость ремонта вашей квартиры? Пройдите короткий квиз.\n\
     Или позвоните нам: +7 (495) 123-45-67"
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Closes any open quiz and shows the landing offer again.
async fn close_quiz(bot: &Bot, dialogue: &UserDialogue, msg: &Message, text: &str) -> HandlerResult {
    if let Some(mut state) = dialogue.get().await? {
        if let Some(flow) = state.flow_mut() {
            info!(chat = %msg.chat.id, step = ?flow.step(), "quiz closed");
            flow.cancel();
        }
    }

    bot.send_message(msg.chat.id, text)
        .reply_markup(landing_keyboard())
        .await?;
    dialogue.update(BotState::Start).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn cancel(bot: Bot, dialogue: UserDialogue, msg: Message) -> HandlerResult {
    close_quiz(&bot, &dialogue, &msg, "Квиз закрыт.").await
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn start(bot: Bot, msg: Message, dialogue: UserDialogue) -> HandlerResult {
    close_quiz(&bot, &dialogue, &msg, landing_text()).await
}
