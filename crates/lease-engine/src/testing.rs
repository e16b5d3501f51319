//! Row builders for unit tests

use chrono::NaiveDate;
use ledger_types::{Amendment, AmendmentId, ChargeId, ChargeLine, Property};
use rust_decimal::Decimal;

use crate::ledger::Ledger;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct AmendmentBuilder(Amendment);

/// Activated original lease from 2024-01-01, open-ended, 1000 SF
pub fn amendment(id: AmendmentId, property: &str, tenant: &str, sequence: i64) -> AmendmentBuilder {
    AmendmentBuilder(Amendment {
        amendment_id: id,
        property_id: property.to_string(),
        tenant_id: tenant.to_string(),
        sequence,
        status: "Activated".into(),
        amendment_type: "Original Lease".into(),
        start_date: Some(date(2024, 1, 1)),
        end_date: None,
        leased_area: Decimal::from(1000),
        sign_date: None,
        tenant_name: None,
        suite: None,
        audit_notes: Vec::new(),
    })
}

impl AmendmentBuilder {
    pub fn status(mut self, status: &str) -> Self {
        self.0.status = status.into();
        self
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.0.amendment_type = kind.into();
        self
    }

    pub fn start(mut self, start: NaiveDate) -> Self {
        self.0.start_date = Some(start);
        self
    }

    pub fn no_start(mut self) -> Self {
        self.0.start_date = None;
        self
    }

    pub fn end(mut self, end: Option<NaiveDate>) -> Self {
        self.0.end_date = end;
        self
    }

    pub fn area(mut self, area: Decimal) -> Self {
        self.0.leased_area = area;
        self
    }

    pub fn suite(mut self, suite: &str) -> Self {
        self.0.suite = Some(suite.to_string());
        self
    }

    pub fn build(self) -> Amendment {
        self.0
    }
}

/// Open-ended charge from 2024-01-01
pub fn charge(id: ChargeId, amendment_id: AmendmentId, code: &str, amount: Decimal) -> ChargeLine {
    ChargeLine {
        charge_id: id,
        amendment_id,
        charge_code: code.to_string(),
        monthly_amount: amount,
        from_date: date(2024, 1, 1),
        to_date: None,
    }
}

pub fn charge_between(
    id: ChargeId,
    amendment_id: AmendmentId,
    amount: Decimal,
    from: NaiveDate,
    to: Option<NaiveDate>,
) -> ChargeLine {
    ChargeLine {
        from_date: from,
        to_date: to,
        ..charge(id, amendment_id, "rent", amount)
    }
}

pub fn property(id: &str, code: &str, acquired: NaiveDate) -> Property {
    Property {
        property_id: id.to_string(),
        code: code.to_string(),
        name: format!("{code} Center"),
        acquire_date: acquired,
        dispose_date: None,
    }
}

pub fn ledger(amendments: Vec<Amendment>, charges: Vec<ChargeLine>, properties: Vec<Property>) -> Ledger {
    Ledger::new(1, amendments, charges, properties).unwrap()
}
