mod password;
mod payment_request;
mod paylink_error;
mod reward;
mod split_bill;
mod transaction;
mod user;
mod wallet_state;

pub use password::PasswordRecord;
pub use payment_request::{PaymentRequest, QrPaymentData};
pub use paylink_error::{PayLinkError, UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE};
pub use reward::{Redemption, RewardKind, RewardTransaction};
pub use split_bill::{
    FailedPayment, SplitBill, SplitBillOutcome, SplitBillParticipant, SplitBillStats,
    SplitBillStatus, SplitMethod,
};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use user::SessionUser;
pub use wallet_state::{WalletEvent, WalletState};
