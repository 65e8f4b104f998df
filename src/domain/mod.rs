pub mod account;
pub mod command;
pub mod error;
pub mod funds;
pub mod traits;

pub use account::{Account, AccountId, CurrencyId, MemberId};
pub use command::FundsCommand;
pub use error::Error;
pub use funds::{FundsChange, FundsOperation};
pub use traits::{
    AccountEvent, AccountStore, CommandStream, DeadLetterQueue, EventPublisher, LockedAccount,
};
