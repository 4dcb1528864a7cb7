pub mod event_registry;
pub mod identifier;
pub mod message;
pub mod timer;
pub mod transaction_table;

pub use event_registry::{EventRegistry, Listener};
pub use identifier::JanusId;
pub use message::{Message, Request};
pub use timer::Timer;
pub use transaction_table::{TransactionInfo, TransactionStatistics, TransactionTable};
