mod account;
mod flow;
mod gate;
mod ticker;

pub use flow::{Flow, FlowSnapshot};

pub(crate) use ticker::{spawn_reset_ticker, TickerHandle};
