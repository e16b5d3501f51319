use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type AmendmentId = u64;
pub type ChargeId = u64;

/// Identity of a lease across its amendments
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeaseKey {
    pub property_id: String,
    pub tenant_id: String,
}

impl LeaseKey {
    pub fn new(property_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            tenant_id: tenant_id.into(),
        }
    }
}

impl fmt::Display for LeaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.property_id, self.tenant_id)
    }
}

/// Lower-case a free-text enumeration value and fold `-`, `_` and runs of
/// whitespace into single spaces.
fn normalize_label(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Workflow status of an amendment as exported by the leasing system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AmendmentStatus {
    Activated,
    Superseded,
    Cancelled,
    Pending,
    /// Unrecognized value, kept verbatim for reporting
    Other(String),
}

impl AmendmentStatus {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, AmendmentStatus::Other(_))
    }

    /// Only activated and superseded rows can describe occupancy
    pub fn is_eligible(&self) -> bool {
        matches!(self, AmendmentStatus::Activated | AmendmentStatus::Superseded)
    }
}

impl From<String> for AmendmentStatus {
    fn from(raw: String) -> Self {
        match normalize_label(&raw).as_str() {
            "activated" => AmendmentStatus::Activated,
            "superseded" => AmendmentStatus::Superseded,
            "cancelled" | "canceled" => AmendmentStatus::Cancelled,
            "pending" => AmendmentStatus::Pending,
            _ => AmendmentStatus::Other(raw),
        }
    }
}

impl From<&str> for AmendmentStatus {
    fn from(raw: &str) -> Self {
        AmendmentStatus::from(raw.to_string())
    }
}

impl From<AmendmentStatus> for String {
    fn from(status: AmendmentStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for AmendmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmendmentStatus::Activated => f.write_str("Activated"),
            AmendmentStatus::Superseded => f.write_str("Superseded"),
            AmendmentStatus::Cancelled => f.write_str("Cancelled"),
            AmendmentStatus::Pending => f.write_str("Pending"),
            AmendmentStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// Kind of lease event an amendment records
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AmendmentType {
    OriginalLease,
    NewLease,
    Renewal,
    Expansion,
    Contraction,
    Extension,
    Assignment,
    Modification,
    Termination,
    /// Deal still in negotiation, never committed occupancy
    ProposalInDm,
    /// Unrecognized value, kept verbatim for reporting
    Other(String),
}

impl AmendmentType {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, AmendmentType::Other(_))
    }

    /// Whether the type starts occupancy for a tenant that had none
    pub fn is_new_occupancy(&self) -> bool {
        matches!(self, AmendmentType::OriginalLease | AmendmentType::NewLease)
    }
}

impl From<String> for AmendmentType {
    fn from(raw: String) -> Self {
        match normalize_label(&raw).as_str() {
            "original lease" | "original" => AmendmentType::OriginalLease,
            "new lease" | "new" => AmendmentType::NewLease,
            "renewal" => AmendmentType::Renewal,
            "expansion" => AmendmentType::Expansion,
            "contraction" => AmendmentType::Contraction,
            "extension" => AmendmentType::Extension,
            "assignment" => AmendmentType::Assignment,
            "modification" => AmendmentType::Modification,
            "termination" => AmendmentType::Termination,
            "proposal in dm" => AmendmentType::ProposalInDm,
            _ => AmendmentType::Other(raw),
        }
    }
}

impl From<&str> for AmendmentType {
    fn from(raw: &str) -> Self {
        AmendmentType::from(raw.to_string())
    }
}

impl From<AmendmentType> for String {
    fn from(kind: AmendmentType) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for AmendmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AmendmentType::OriginalLease => "Original Lease",
            AmendmentType::NewLease => "New Lease",
            AmendmentType::Renewal => "Renewal",
            AmendmentType::Expansion => "Expansion",
            AmendmentType::Contraction => "Contraction",
            AmendmentType::Extension => "Extension",
            AmendmentType::Assignment => "Assignment",
            AmendmentType::Modification => "Modification",
            AmendmentType::Termination => "Termination",
            AmendmentType::ProposalInDm => "Proposal in DM",
            AmendmentType::Other(raw) => raw,
        };
        f.write_str(label)
    }
}

/// One revision of a lease for a property/tenant pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amendment {
    pub amendment_id: AmendmentId,
    pub property_id: String,
    pub tenant_id: String,
    pub sequence: i64,
    pub status: AmendmentStatus,
    #[serde(rename = "type")]
    pub amendment_type: AmendmentType,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub leased_area: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_notes: Vec<String>,
}

impl Amendment {
    pub fn key(&self) -> LeaseKey {
        LeaseKey::new(self.property_id.clone(), self.tenant_id.clone())
    }

    /// Date window check; a missing start date never covers anything
    pub fn covers(&self, date: NaiveDate) -> bool {
        match self.start_date {
            Some(start) => start <= date && self.end_date.map_or(true, |end| end >= date),
            None => false,
        }
    }

    /// Date a termination takes effect: its end date, else its start date
    pub fn effective_termination_date(&self) -> Option<NaiveDate> {
        self.end_date.or(self.start_date)
    }

    pub fn has_invalid_date_range(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(start), Some(end)) if end < start)
    }
}

/// One periodic charge attached to an amendment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeLine {
    pub charge_id: ChargeId,
    pub amendment_id: AmendmentId,
    pub charge_code: String,
    pub monthly_amount: Decimal,
    pub from_date: NaiveDate,
    pub to_date: Option<NaiveDate>,
}

impl ChargeLine {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.from_date <= date && self.to_date.map_or(true, |to| date <= to)
    }

    /// Case-insensitive match against the configured rent codes
    pub fn is_rent(&self, rent_codes: &[String]) -> bool {
        let code = self.charge_code.trim();
        rent_codes.iter().any(|c| c.eq_ignore_ascii_case(code))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub property_id: String,
    pub code: String,
    pub name: String,
    pub acquire_date: NaiveDate,
    pub dispose_date: Option<NaiveDate>,
}

impl Property {
    /// Held for the whole interval: acquired before `from`, not disposed by `to`
    pub fn is_same_store(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.acquire_date < from && self.dispose_date.map_or(true, |d| d > to)
    }
}

/// One rent-roll row: the current amendment of a lease with its derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLease {
    pub property_id: String,
    pub property_code: String,
    pub property_name: Option<String>,
    pub tenant_id: String,
    pub tenant_name: Option<String>,
    pub suite: Option<String>,
    pub amendment_id: AmendmentId,
    pub sequence: i64,
    pub amendment_type: AmendmentType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub leased_area: Decimal,
    pub monthly_rent: Decimal,
    pub monthly_other_charges: Decimal,
    pub annual_rent: Decimal,
    pub rent_psf: Decimal,
    /// `None` for open-ended (month-to-month) leases
    pub lease_term_months: Option<u32>,
    pub remaining_term_months: Option<u32>,
}

impl ResolvedLease {
    pub fn key(&self) -> LeaseKey {
        LeaseKey::new(self.property_id.clone(), self.tenant_id.clone())
    }
}
