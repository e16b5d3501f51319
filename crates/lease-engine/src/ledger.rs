//! Immutable, versioned ledger tables
//!
//! A [`Ledger`] is validated once at construction and never edited
//! afterwards; remediation builds the next version instead.

use std::collections::HashMap;

use ledger_types::{fingerprint, Amendment, AmendmentId, ChargeLine, LedgerError, Property};
use serde::{Deserialize, Serialize};

/// On-disk shape of a ledger as supplied by the loader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default = "initial_version")]
    pub version: u32,
    pub amendments: Vec<Amendment>,
    pub charges: Vec<ChargeLine>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

fn initial_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct Ledger {
    version: u32,
    amendments: Vec<Amendment>,
    charges: Vec<ChargeLine>,
    properties: Vec<Property>,
    amendment_index: HashMap<AmendmentId, usize>,
    property_index: HashMap<String, usize>,
}

impl Ledger {
    /// Validate and index the tables
    ///
    /// Rows are kept in identifier order so that two ledgers with the same
    /// content serialize, and fingerprint, identically.
    pub fn new(
        version: u32,
        mut amendments: Vec<Amendment>,
        mut charges: Vec<ChargeLine>,
        mut properties: Vec<Property>,
    ) -> Result<Self, LedgerError> {
        amendments.sort_by_key(|a| a.amendment_id);
        charges.sort_by_key(|c| c.charge_id);
        properties.sort_by(|a, b| a.property_id.cmp(&b.property_id));

        if let Some(pair) = amendments
            .windows(2)
            .find(|w| w[0].amendment_id == w[1].amendment_id)
        {
            return Err(LedgerError::DuplicateAmendment(pair[0].amendment_id));
        }
        if let Some(pair) = charges.windows(2).find(|w| w[0].charge_id == w[1].charge_id) {
            return Err(LedgerError::DuplicateCharge(pair[0].charge_id));
        }
        if let Some(pair) = properties
            .windows(2)
            .find(|w| w[0].property_id == w[1].property_id)
        {
            return Err(LedgerError::DuplicateProperty(pair[0].property_id.clone()));
        }

        let amendment_index = amendments
            .iter()
            .enumerate()
            .map(|(i, a)| (a.amendment_id, i))
            .collect();
        let property_index = properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.property_id.clone(), i))
            .collect();

        Ok(Self {
            version,
            amendments,
            charges,
            properties,
            amendment_index,
            property_index,
        })
    }

    pub fn from_document(doc: LedgerDocument) -> Result<Self, LedgerError> {
        Self::new(doc.version, doc.amendments, doc.charges, doc.properties)
    }

    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let doc: LedgerDocument = serde_json::from_str(json).map_err(|e| {
            LedgerError::schema(format!("line {} column {}", e.line(), e.column()), e.to_string())
        })?;
        Self::from_document(doc)
    }

    pub fn to_document(&self) -> LedgerDocument {
        LedgerDocument {
            version: self.version,
            amendments: self.amendments.clone(),
            charges: self.charges.clone(),
            properties: self.properties.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// SHA-256 over the canonical serialization, version included
    pub fn fingerprint(&self) -> Result<String, LedgerError> {
        let bytes = serde_json::to_vec(&self.to_document())?;
        Ok(fingerprint(&bytes))
    }

    /// Build the successor version from replacement tables
    pub fn next_version(
        &self,
        amendments: Vec<Amendment>,
        charges: Vec<ChargeLine>,
    ) -> Result<Self, LedgerError> {
        Self::new(
            self.version + 1,
            amendments,
            charges,
            self.properties.clone(),
        )
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn amendments(&self) -> &[Amendment] {
        &self.amendments
    }

    pub fn charges(&self) -> &[ChargeLine] {
        &self.charges
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn amendment(&self, id: AmendmentId) -> Option<&Amendment> {
        self.amendment_index.get(&id).map(|&i| &self.amendments[i])
    }

    pub fn property(&self, property_id: &str) -> Option<&Property> {
        self.property_index
            .get(property_id)
            .map(|&i| &self.properties[i])
    }
}
