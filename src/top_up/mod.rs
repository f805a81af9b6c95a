//! Cash top-ups and the endpoints for handing out and resetting cash.

mod core;
mod create_endpoint;
mod history_endpoint;
mod reset_endpoint;

pub use self::core::{
    CashTopUp, NewTopUp, TOP_UP_HISTORY_LIMIT, TopUpHistoryEntry, create_top_up_table,
    get_top_up_history, get_top_ups, record_top_up,
};
pub use create_endpoint::{TopUpState, create_top_up_endpoint, list_top_ups_endpoint};
pub use history_endpoint::{top_up_history_endpoint, transactions_endpoint};
pub use reset_endpoint::reset_top_ups_endpoint;
