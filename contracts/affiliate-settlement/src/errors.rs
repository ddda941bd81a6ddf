use soroban_sdk::contracterror;

/// Failure reasons surfaced by every engine entry point.
///
/// Any error returned from `settle` aborts the invocation, so no ledger,
/// index or log mutation from that call is ever observable.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum SettlementError {
    /// `initialize` has not been called.
    NotInitialized = 1,
    /// `initialize` was already called.
    AlreadyInitialized = 2,
    /// Caller lacks the ADMIN role.
    Unauthorized = 3,
    /// No affiliate record exists for the identity.
    NotFound = 4,
    /// The reporting registry is not listed in the directory.
    UnknownRegistry = 5,
    /// The presented referral code resolves to no affiliate.
    UnknownReferralCode = 6,
    /// The identity already has an affiliate record.
    AlreadyRegistered = 7,
    /// Preferred code is not 3-20 ASCII alphanumerics.
    InvalidCode = 8,
    /// Every suffixed variant of the preferred code is taken.
    CodeSpaceExhausted = 9,
    /// Gross amount is not positive, or a running total would overflow.
    InvalidAmount = 10,
    /// A settlement record already exists for the sale id.
    DuplicateSale = 11,
    /// The reporting registry is listed but deactivated.
    InactiveRegistry = 12,
    /// The payment token rejected a transfer.
    TransferFailed = 13,
    /// The payment token did not complete a transfer.
    TransferTimeout = 14,
    /// Sale id is empty.
    InvalidSaleId = 15,
    /// Another settlement holds the affiliate's critical section.
    SettlementInProgress = 16,
    /// Revoking would leave the engine without any admin.
    LastAdmin = 17,
}

impl SettlementError {
    /// True for failures that left no trace and may be resubmitted with the
    /// same sale id. Everything else is final for that input.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            SettlementError::TransferFailed
                | SettlementError::TransferTimeout
                | SettlementError::SettlementInProgress
        )
    }
}
