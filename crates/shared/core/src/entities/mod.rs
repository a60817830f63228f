mod account;
mod order;
mod order_status;
mod side;
mod time_in_force;
mod user_command;

pub use account::{AccountId, Recipient};
pub use order::{Order, OrderId, OrderSpec};
pub use order_status::{DoneReason, OrderStatus};
pub use side::Side;
pub use time_in_force::TimeInForce;
pub use user_command::UserCommand;
