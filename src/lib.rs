use state::BotState;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

pub mod collector;
pub mod commands;
pub mod config;
pub mod keyboard;
pub mod notifier;
pub mod quiz;
pub mod runner;
pub mod schema;
pub mod state;

type UserDialogue = Dialogue<BotState, InMemStorage<BotState>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
