pub mod auth_interactor;
pub mod password_interactor;
pub mod rewards_interactor;
pub mod send_interactor;
pub mod split_bill_interactor;
pub mod transaction_interactor;
pub mod wallet_interactor;

pub use auth_interactor::{AuthInteractor, AuthInteractorImpl};
pub use password_interactor::{PasswordInteractor, PasswordInteractorImpl};
pub use rewards_interactor::{RewardsInteractor, RewardsInteractorImpl};
pub use send_interactor::{SendInteractor, SendInteractorImpl, SendResult};
pub use split_bill_interactor::{SplitBillDraft, SplitBillInteractor, SplitBillInteractorImpl};
pub use transaction_interactor::{TransactionInteractor, TransactionInteractorImpl};
pub use wallet_interactor::{WalletInteractor, WalletInteractorImpl};
