use std::{cell::RefCell, fmt, rc::Rc, sync::Arc};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    command::{AccountCommandError, AmountAction, AmountCommand},
    source::{BalanceSource, random::RandomBalanceSource},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEventKind {
    Deposited,
    Withdrawn,
    TransferredOut,
    TransferredIn,
    Synchronized,
}

#[derive(Debug, Clone, Copy)]
pub struct AccountEvent {
    amount: Decimal,
    kind: AccountEventKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Insufficient funds: cannot withdraw more than {balance}")]
    InsufficientFunds { balance: Decimal },
    #[error("Transfer failed")]
    TransferFailed,
    #[error("Balance overflow: cannot credit an account holding {balance}")]
    BalanceOverflow { balance: Decimal },
    #[error("Synchronization failed")]
    SynchronizationFailed,
    #[error(transparent)]
    InvalidCommand(#[from] AccountCommandError),
}

/// Balance of a single account.
///
/// Commands are validated by `handle_*` without touching the balance, the
/// resulting event is then applied. A rejected command therefore never leaves
/// a partial change behind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AccountState {
    balance: Decimal,
}

impl AccountState {
    pub fn new(balance: Decimal) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn apply(&mut self, event: &AccountEvent) {
        match event.kind {
            AccountEventKind::Deposited | AccountEventKind::TransferredIn => {
                self.balance += event.amount;
            }
            AccountEventKind::Withdrawn | AccountEventKind::TransferredOut => {
                self.balance -= event.amount;
            }
            AccountEventKind::Synchronized => {
                self.balance = event.amount;
            }
        }
    }

    pub fn handle_amount_command(
        &self,
        command: AmountCommand,
    ) -> Result<AccountEvent, AccountError> {
        let kind = match command.action {
            AmountAction::Deposit => {
                return self.credit(command.amount, AccountEventKind::Deposited);
            }
            AmountAction::Withdraw => AccountEventKind::Withdrawn,
            AmountAction::Transfer => AccountEventKind::TransferredOut,
        };
        if command.amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                balance: self.balance,
            });
        }
        Ok(AccountEvent {
            amount: command.amount,
            kind,
        })
    }

    /// Credit side of a transfer.
    pub fn handle_transfer_in(&self, amount: Decimal) -> Result<AccountEvent, AccountError> {
        self.credit(amount, AccountEventKind::TransferredIn)
    }

    fn credit(
        &self,
        amount: Decimal,
        kind: AccountEventKind,
    ) -> Result<AccountEvent, AccountError> {
        if self.balance.checked_add(amount).is_none() {
            return Err(AccountError::BalanceOverflow {
                balance: self.balance,
            });
        }
        Ok(AccountEvent { amount, kind })
    }

    pub fn handle_synchronize(
        &self,
        fetched: Option<Decimal>,
    ) -> Result<AccountEvent, AccountError> {
        let Some(balance) = fetched else {
            return Err(AccountError::SynchronizationFailed);
        };
        Ok(AccountEvent {
            amount: balance,
            kind: AccountEventKind::Synchronized,
        })
    }
}

struct AccountInner {
    state: RefCell<AccountState>,
    source: Arc<dyn BalanceSource>,
}

/// Handle to a bank account.
///
/// Cloning the handle does not copy the account: all clones observe and
/// mutate the same balance. Two accounts with equal balances are still
/// different accounts, see [`Account::same_account`].
///
/// Accounts are meant for a single caller; the handle is neither `Send` nor
/// `Sync`.
#[derive(Clone)]
pub struct Account {
    inner: Rc<AccountInner>,
}

/// Creates an account backed by the default [`RandomBalanceSource`].
pub fn get_bank_account(initial_balance: Decimal) -> Account {
    Account::new(initial_balance)
}

impl Account {
    pub fn new(initial_balance: Decimal) -> Self {
        Self::with_source(initial_balance, Arc::new(RandomBalanceSource::default()))
    }

    pub fn with_source(initial_balance: Decimal, source: Arc<dyn BalanceSource>) -> Self {
        Self {
            inner: Rc::new(AccountInner {
                state: RefCell::new(AccountState::new(initial_balance)),
                source,
            }),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.inner.state.borrow().balance()
    }

    pub fn same_account(&self, other: &Account) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn deposit(&self, amount: Decimal) -> Result<&Self, AccountError> {
        let command = AmountCommand::parse_command(AmountAction::Deposit, amount)?;
        let event = self.inner.state.borrow().handle_amount_command(command)?;
        self.commit(&event);
        Ok(self)
    }

    pub fn withdraw(&self, amount: Decimal) -> Result<&Self, AccountError> {
        let command = AmountCommand::parse_command(AmountAction::Withdraw, amount)?;
        let event = self.inner.state.borrow().handle_amount_command(command)?;
        self.commit(&event);
        Ok(self)
    }

    /// Moves `amount` from this account to `target` and returns this account.
    ///
    /// Transferring to the same account fails with
    /// [`AccountError::TransferFailed`] whatever the amount.
    pub fn transfer(&self, amount: Decimal, target: &Account) -> Result<&Self, AccountError> {
        if self.same_account(target) {
            return Err(AccountError::TransferFailed);
        }
        let command = AmountCommand::parse_command(AmountAction::Transfer, amount)?;
        let debit = self.inner.state.borrow().handle_amount_command(command)?;
        let credit = target
            .inner
            .state
            .borrow()
            .handle_transfer_in(command.amount)?;
        // both sides validated, nothing below can fail
        self.commit(&debit);
        target.commit(&credit);
        Ok(self)
    }

    pub async fn fetch_balance(&self) -> Option<Decimal> {
        self.inner.source.fetch_balance().await
    }

    /// Replaces the balance with a freshly fetched one.
    ///
    /// Performs exactly one lookup. When it yields nothing the balance is kept
    /// and [`AccountError::SynchronizationFailed`] is returned.
    pub async fn synchronize_balance(&self) -> Result<(), AccountError> {
        let fetched = self.fetch_balance().await;
        let event = match self.inner.state.borrow().handle_synchronize(fetched) {
            Ok(event) => event,
            Err(err) => {
                warn!(balance = %self.balance(), "Balance lookup returned nothing");
                return Err(err);
            }
        };
        self.commit(&event);
        Ok(())
    }

    fn commit(&self, event: &AccountEvent) {
        debug!(kind = ?event.kind, amount = %event.amount, "Applying account event");
        self.inner.state.borrow_mut().apply(event);
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("balance", &self.balance())
            .finish_non_exhaustive()
    }
}
