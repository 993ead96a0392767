use serde::{Deserialize, Serialize};

use super::PartnerId;

/// Role of a partner in the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerKind {
    #[default]
    #[serde(alias = "cliente")]
    Client,
    #[serde(alias = "proveedor")]
    Supplier,
}

/// A client or supplier referenced by orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    pub kind: PartnerKind,
    pub contact: String,
}

/// Payload for creating a new partner.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPartner {
    pub name: String,
    pub kind: PartnerKind,
    pub contact: String,
}

impl NewPartner {
    /// Partner typed straight into an order form. Always a client.
    pub fn quick(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            kind: PartnerKind::Client,
            contact: contact.into().trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PartnerPatch {
    pub name: Option<String>,
    pub kind: Option<PartnerKind>,
    pub contact: Option<String>,
}
