/// Account balance management and the [`Account`] handle.
/// `handle_*` checks a command and yields an event, `apply` is the only
/// place a balance changes.
pub mod account;

/// Amount commands, validated before [`account`] handles them.
pub mod command;

/// Where an account gets its authoritative balance from when synchronizing.
///
/// NOTE: the random source only simulates a remote service, embedding
/// applications are expected to supply their own [`source::BalanceSource`].
pub mod source;

pub use account::{Account, AccountError, get_bank_account};
pub use command::AccountCommandError;
pub use source::{
    BalanceSource, FixedBalanceSource, QueuedBalanceSource,
    random::{RandomBalanceSource, RandomSourceConfig, SourceConfigError},
};
