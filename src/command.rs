use rust_decimal::{Decimal, prelude::Zero};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountAction {
    Deposit,
    Withdraw,
    Transfer,
}

#[derive(Debug, Clone, Copy)]
pub struct AmountCommand {
    pub action: AmountAction,
    pub amount: Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountCommandError {
    #[error("Amount must be positive for {action:?}, got {amount}")]
    NonPositiveAmount { action: AmountAction, amount: Decimal },
}

impl AmountCommand {
    pub fn parse_command(
        action: AmountAction,
        amount: Decimal,
    ) -> Result<Self, AccountCommandError> {
        if amount > Decimal::zero() {
            Ok(Self { action, amount })
        } else {
            Err(AccountCommandError::NonPositiveAmount { action, amount })
        }
    }
}
