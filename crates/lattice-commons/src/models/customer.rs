//! The `Customer` record type.

use crate::errors::{StoreError, StoreResult};
use crate::models::entity::{Entity, RowView};
use crate::models::field_value::FieldValue;
use crate::models::filters::ListFilter;
use crate::models::record_id::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Customer lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Inactive,
    Prospect,
}

impl CustomerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Prospect => "prospect",
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer record.
///
/// Wire format matches the REST convention: camelCase keys, RFC 3339
/// timestamps. `id` and `created_at` are immutable after creation; every
/// successful update refreshes `updated_at`, so `updated_at >= created_at`
/// holds for the record's whole life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub status: CustomerStatus,
    pub total_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload: everything the caller chooses, nothing the store assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub status: CustomerStatus,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<DateTime<Utc>>,
}

/// Partial-update payload. Absent fields are left untouched; `id` and
/// `created_at` cannot be named here at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<DateTime<Utc>>,
}

/// Sortable customer columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    Name,
    Email,
    Company,
    Status,
    TotalValue,
    LastContact,
    CreatedAt,
    UpdatedAt,
}

fn validate_common(name: Option<&str>, email: Option<&str>, total_value: Option<f64>) -> StoreResult<()> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(StoreError::validation("name must not be empty"));
        }
    }
    if let Some(email) = email {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(StoreError::validation(format!(
                "invalid email address: '{email}'"
            )));
        }
    }
    if let Some(v) = total_value {
        if !v.is_finite() || v < 0.0 {
            return Err(StoreError::validation(format!(
                "totalValue must be a non-negative number, got {v}"
            )));
        }
    }
    Ok(())
}

impl Entity for Customer {
    type Draft = CustomerDraft;
    type Patch = CustomerPatch;

    const KIND: &'static str = "customers";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn validate_draft(draft: &Self::Draft) -> StoreResult<()> {
        validate_common(Some(&draft.name), Some(&draft.email), Some(draft.total_value))
    }

    fn validate_patch(patch: &Self::Patch) -> StoreResult<()> {
        validate_common(
            patch.name.as_deref(),
            patch.email.as_deref(),
            patch.total_value,
        )
    }

    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            company: draft.company,
            status: draft.status,
            total_value: draft.total_value,
            last_contact: draft.last_contact,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(company) = &patch.company {
            self.company = Some(company.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(total_value) = patch.total_value {
            self.total_value = total_value;
        }
        if let Some(last_contact) = patch.last_contact {
            self.last_contact = Some(last_contact);
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &ListFilter) -> bool {
        if let Some(status) = filter.status.as_deref() {
            if !status.eq_ignore_ascii_case("all") && !status.eq_ignore_ascii_case(self.status.as_str()) {
                return false;
            }
        }
        match filter.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(search) => {
                let needle = search.to_lowercase();
                self.name.to_lowercase().contains(&needle)
                    || self.email.to_lowercase().contains(&needle)
                    || self
                        .company
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
            }
        }
    }
}

impl RowView for Customer {
    type Field = CustomerField;

    fn cell(&self, field: CustomerField) -> FieldValue {
        match field {
            CustomerField::Name => FieldValue::Text(self.name.clone()),
            CustomerField::Email => FieldValue::Text(self.email.clone()),
            CustomerField::Company => {
                FieldValue::Text(self.company.clone().unwrap_or_default())
            }
            CustomerField::Status => FieldValue::Text(self.status.as_str().to_string()),
            CustomerField::TotalValue => FieldValue::Number(self.total_value),
            CustomerField::LastContact => FieldValue::Timestamp(
                self.last_contact.unwrap_or(DateTime::<Utc>::MIN_UTC),
            ),
            CustomerField::CreatedAt => FieldValue::Timestamp(self.created_at),
            CustomerField::UpdatedAt => FieldValue::Timestamp(self.updated_at),
        }
    }

    fn parse_field(name: &str) -> Option<CustomerField> {
        match name {
            "name" => Some(CustomerField::Name),
            "email" => Some(CustomerField::Email),
            "company" => Some(CustomerField::Company),
            "status" => Some(CustomerField::Status),
            "totalValue" | "total_value" => Some(CustomerField::TotalValue),
            "lastContact" | "last_contact" => Some(CustomerField::LastContact),
            "createdAt" | "created_at" => Some(CustomerField::CreatedAt),
            "updatedAt" | "updated_at" => Some(CustomerField::UpdatedAt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, email: &str) -> CustomerDraft {
        CustomerDraft {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            company: Some("Acme Corporation".to_string()),
            status: CustomerStatus::Active,
            total_value: 45000.0,
            last_contact: None,
        }
    }

    #[test]
    fn test_draft_validation() {
        assert!(Customer::validate_draft(&draft("Acme", "contact@acme.com")).is_ok());
        assert!(matches!(
            Customer::validate_draft(&draft("", "contact@acme.com")),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            Customer::validate_draft(&draft("Acme", "not-an-email")),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_patch_leaves_identity_untouched() {
        let now = Utc::now();
        let mut customer = Customer::from_draft("c-1".into(), draft("Acme", "contact@acme.com"), now);
        let created = customer.created_at;

        let later = now + chrono::Duration::seconds(5);
        customer.apply_patch(
            &CustomerPatch {
                name: Some("Acme Holdings".to_string()),
                total_value: Some(50000.0),
                ..Default::default()
            },
            later,
        );

        assert_eq!(customer.id.as_str(), "c-1");
        assert_eq!(customer.created_at, created);
        assert_eq!(customer.updated_at, later);
        assert_eq!(customer.name, "Acme Holdings");
        assert_eq!(customer.email, "contact@acme.com");
        assert!(customer.updated_at >= customer.created_at);
    }

    #[test]
    fn test_filter_matching_is_conjunctive() {
        let now = Utc::now();
        let customer = Customer::from_draft("c-1".into(), draft("Acme", "contact@acme.com"), now);

        let both = ListFilter {
            status: Some("active".to_string()),
            search: Some("ACME".to_string()),
            ..Default::default()
        };
        assert!(customer.matches(&both));

        let wrong_status = ListFilter {
            status: Some("prospect".to_string()),
            search: Some("acme".to_string()),
            ..Default::default()
        };
        assert!(!customer.matches(&wrong_status));

        let all_sentinel = ListFilter {
            status: Some("all".to_string()),
            ..Default::default()
        };
        assert!(customer.matches(&all_sentinel));
    }

    #[test]
    fn test_search_covers_company_field() {
        let now = Utc::now();
        let customer = Customer::from_draft(
            "c-2".into(),
            CustomerDraft {
                company: Some("Global Solutions Ltd.".to_string()),
                ..draft("Michael Brown", "mike@globalsolutions.com")
            },
            now,
        );
        let filter = ListFilter {
            search: Some("global".to_string()),
            ..Default::default()
        };
        assert!(customer.matches(&filter));
    }

    #[test]
    fn test_wire_format_round_trip() {
        let now = Utc::now();
        let customer = Customer::from_draft("c-1".into(), draft("Acme", "contact@acme.com"), now);
        let json = serde_json::to_value(&customer).unwrap();
        assert!(json.get("totalValue").is_some());
        assert!(json.get("createdAt").is_some());
        let back: Customer = serde_json::from_value(json).unwrap();
        assert_eq!(back, customer);
    }
}
