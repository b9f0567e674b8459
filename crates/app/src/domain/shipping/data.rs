//! Shipping Data

use serde::{Deserialize, Serialize};

use crate::domain::orders::records::OrderUuid;

/// Recipient and address, persisted as
/// `{recipientName, address, city, country, phoneNumber}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetail {
    pub recipient_name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub phone_number: String,
}

/// Where the buyer wants a paid order delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryAddress {
    pub address: String,
    pub city: String,
    pub country: String,
    pub phone_number: String,
}

impl DeliveryAddress {
    /// Attach the recipient's name.
    #[must_use]
    pub fn for_recipient(self, recipient_name: String) -> ShippingDetail {
        ShippingDetail {
            recipient_name,
            address: self.address,
            city: self.city,
            country: self.country,
            phone_number: self.phone_number,
        }
    }
}

/// New Shipping Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShipping {
    pub order_uuid: OrderUuid,
    pub delivery_code: String,
    pub shipping_unit: String,
    pub detail: ShippingDetail,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn detail_json_uses_camel_case() -> TestResult {
        let detail = DeliveryAddress {
            address: "12 Ly Thuong Kiet".to_string(),
            city: "Hanoi".to_string(),
            country: "Vietnam".to_string(),
            phone_number: "0900000000".to_string(),
        }
        .for_recipient("Tran Thi B".to_string());

        let encoded = serde_json::to_value(&detail)?;

        assert_eq!(encoded["recipientName"], "Tran Thi B");
        assert_eq!(encoded["phoneNumber"], "0900000000");

        let decoded: ShippingDetail = serde_json::from_value(encoded)?;

        assert_eq!(decoded, detail);

        Ok(())
    }
}
