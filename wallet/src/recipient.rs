use serde::Serialize;

use crate::network::{AddressFormat, NetworkDescriptor};

/// Donation address used on every EVM-compatible network.
pub const EVM_DONATION_ADDRESS: &str = "0x7Ec3C1f8b2D4aA51C7f6E3B9a8d05c2F4E1b9A63";

/// Donation address shown for Solana; transfers there happen outside this widget.
pub const SOLANA_DONATION_ADDRESS: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecipient {
    pub address_format: AddressFormat,
    pub address: &'static str,
}

pub const RECIPIENTS: [DonationRecipient; 2] = [
    DonationRecipient {
        address_format: AddressFormat::Evm,
        address: EVM_DONATION_ADDRESS,
    },
    DonationRecipient {
        address_format: AddressFormat::Solana,
        address: SOLANA_DONATION_ADDRESS,
    },
];

/// Every donation address, including ones this widget cannot send to.
pub fn donation_recipients() -> &'static [DonationRecipient] {
    &RECIPIENTS
}

pub fn recipient_for_format(format: AddressFormat) -> Option<&'static str> {
    RECIPIENTS
        .iter()
        .find(|recipient| recipient.address_format == format)
        .map(|recipient| recipient.address)
}

/// Recipient for the session's network; an unrecognized network has none.
pub fn recipient_for(network: Option<&NetworkDescriptor>) -> Option<&'static str> {
    network.and_then(|network| recipient_for_format(network.address_format))
}
