use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        UpdateFilterExt, UpdateHandler,
    },
    dptree,
    types::Update,
};

use crate::{
    collector,
    commands::{cancel, help, start, Command},
    quiz::ChannelLeadSink,
    runner,
    state::BotState,
};

/// Dispatch tree for the bot. Expects `InMemStorage<BotState>`, a
/// `Questionnaire` and an `Arc<ChannelLeadSink>` among the dependencies.
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::Cancel].endpoint(cancel));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![BotState::Start].endpoint(runner::offer_quiz))
        .branch(
            case![BotState::Contact { flow, field }]
                .endpoint(collector::receive_contact_field::<ChannelLeadSink>),
        )
        .branch(
            case![BotState::Correcting { flow, field }]
                .endpoint(collector::receive_correction::<ChannelLeadSink>),
        )
        .endpoint(runner::invalid_state);

    let callback_handler = Update::filter_callback_query()
        .branch(case![BotState::Answering { flow }].endpoint(runner::take_answer))
        .endpoint(runner::stale_callback);

    dialogue::enter::<Update, InMemStorage<BotState>, BotState, _>()
        .branch(message_handler)
        .branch(callback_handler)
}
