use std::{error::Error, sync::Arc};

use renovation_quiz::{
    config::Config,
    notifier::{forward_leads, notify_manager},
    quiz::{ChannelLeadSink, Questionnaire},
    schema::schema,
    state::BotState,
};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    update_listeners::webhooks::{self, Options},
};
use tracing::info;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

fn init_tracing(directives: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(directives)?)
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    // teloxide itself reports through `log`.
    tracing_log::LogTracer::init()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env()?;
    init_tracing(&config.log_level)?;

    let bot = Bot::new(config.token.clone());
    let questionnaire = Questionnaire::renovation();
    info!(questions = questionnaire.len(), "Starting bot...");

    let (sink, leads) = ChannelLeadSink::channel();
    let notifier = tokio::spawn(forward_leads(leads, {
        let bot = bot.clone();
        let manager_chat = config.manager_chat;
        move |lead| notify_manager(bot.clone(), manager_chat, lead)
    }));

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![
            InMemStorage::<BotState>::new(),
            questionnaire,
            Arc::new(sink)
        ])
        .enable_ctrlc_handler()
        .build();

    if let Some(webhook) = config.webhook {
        info!(url = %webhook.url, addr = %webhook.addr, "receiving updates via webhook");
        let listener = webhooks::axum(bot, Options::new(webhook.addr, webhook.url)).await?;
        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;
    } else {
        info!("receiving updates via long polling");
        dispatcher.dispatch().await;
    }

    // The dispatcher owns the last sink; dropping it lets the notifier drain and exit.
    drop(dispatcher);
    notifier.await?;
    Ok(())
}
