mod node;
mod record;
mod schema;
mod service;

pub(crate) use record::{Expense, ExpensePayload, WebIdProfile};
pub(crate) use service::ExpenseService;
