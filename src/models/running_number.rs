//! # Running Number Models
//!
//! Configuration rows behind business-code allocation.
//!
//! A **generator** owns the format of one object class (`Prefix`, `Suffix`, interval
//! granularity). Each generator has counters; exactly one of them is current
//! (`IsCurrent = TRUE`, enforced by a partial unique index) and its `CurrentNumber`
//! is incremented atomically per allocation. A counter may carry the interval it was
//! opened for (`IntervalYear`/`IntervalMonth`/`IntervalDay`).
//!
//! Both tables carry the standard audit columns, so they are ordinary [`Entity`]
//! types and can be maintained through the generic repository.

use super::audit::AuditFields;
use super::entity::{ColumnDef, Entity};
use super::row::RowReader;
use crate::error::{BizError, Result};
use crate::query_builder::{ColumnKind, SqlValue, TableDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interval a counter sequence restarts on, which also fixes the digit width
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalGranularity {
    Day,
    Month,
    Year,
    #[default]
    None,
}

impl IntervalGranularity {
    /// Zero-padded width of the sequence part
    pub fn width(&self) -> usize {
        match self {
            IntervalGranularity::Day => 4,
            IntervalGranularity::Month => 6,
            IntervalGranularity::Year | IntervalGranularity::None => 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalGranularity::Day => "day",
            IntervalGranularity::Month => "month",
            IntervalGranularity::Year => "year",
            IntervalGranularity::None => "none",
        }
    }

    pub fn includes_year(&self) -> bool {
        !matches!(self, IntervalGranularity::None)
    }

    pub fn includes_month(&self) -> bool {
        matches!(self, IntervalGranularity::Day | IntervalGranularity::Month)
    }

    pub fn includes_day(&self) -> bool {
        matches!(self, IntervalGranularity::Day)
    }
}

impl fmt::Display for IntervalGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalGranularity {
    type Err = BizError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(IntervalGranularity::Day),
            "month" | "monthly" => Ok(IntervalGranularity::Month),
            "year" | "yearly" => Ok(IntervalGranularity::Year),
            "" | "none" => Ok(IntervalGranularity::None),
            other => Err(BizError::Mapping(format!(
                "unknown interval granularity '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningNumberGenerator {
    pub audit: AuditFields,
    pub object_class_name: String,
    pub prefix: String,
    pub suffix: String,
    pub interval_type: IntervalGranularity,
}

impl RunningNumberGenerator {
    pub fn new(object_class_name: &str, prefix: &str, interval_type: IntervalGranularity) -> Self {
        Self {
            audit: AuditFields::named(object_class_name),
            object_class_name: object_class_name.to_string(),
            prefix: prefix.to_string(),
            suffix: String::new(),
            interval_type,
        }
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }
}

const GENERATOR_COLUMNS: &[ColumnDef] = &[
    ColumnDef::required("ObjectClassName", ColumnKind::Text),
    ColumnDef::optional("Prefix", ColumnKind::Text),
    ColumnDef::optional("Suffix", ColumnKind::Text),
    ColumnDef::required("IntervalType", ColumnKind::Text),
];

impl Entity for RunningNumberGenerator {
    const OBJECT_TYPE: &'static str = "RunningNumberGenerator";
    const TABLE: TableDescriptor = TableDescriptor::new("RunningNumberGenerator");

    fn columns() -> &'static [ColumnDef] {
        GENERATOR_COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::text(&self.object_class_name),
            SqlValue::text(&self.prefix),
            SqlValue::text(&self.suffix),
            SqlValue::text(self.interval_type.as_str()),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            audit: row.audit_fields()?,
            object_class_name: row.string("ObjectClassName")?,
            prefix: row.opt_string("Prefix")?.unwrap_or_default(),
            suffix: row.opt_string("Suffix")?.unwrap_or_default(),
            interval_type: row.string("IntervalType")?.parse()?,
        })
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningNumberCounter {
    pub audit: AuditFields,
    pub generator_id: i64,
    /// Last number handed out; the next allocation returns `current_number + 1`
    pub current_number: i64,
    pub is_current: bool,
    pub interval_year: Option<i32>,
    pub interval_month: Option<u32>,
    pub interval_day: Option<u32>,
}

impl RunningNumberCounter {
    pub fn current(generator_id: i64) -> Self {
        Self {
            generator_id,
            is_current: true,
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Self {
        self.interval_year = year;
        self.interval_month = month;
        self.interval_day = day;
        self
    }

    pub fn starting_at(mut self, current_number: i64) -> Self {
        self.current_number = current_number;
        self
    }
}

pub(crate) const COUNTER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::required("GeneratorId", ColumnKind::BigInt),
    ColumnDef::required("CurrentNumber", ColumnKind::BigInt),
    ColumnDef::required("IsCurrent", ColumnKind::Bool),
    ColumnDef::optional("IntervalYear", ColumnKind::BigInt),
    ColumnDef::optional("IntervalMonth", ColumnKind::BigInt),
    ColumnDef::optional("IntervalDay", ColumnKind::BigInt),
];

impl Entity for RunningNumberCounter {
    const OBJECT_TYPE: &'static str = "RunningNumberCounter";
    const TABLE: TableDescriptor = TableDescriptor::new("RunningNumberCounter");

    fn columns() -> &'static [ColumnDef] {
        COUNTER_COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Int(self.generator_id),
            SqlValue::Int(self.current_number),
            SqlValue::Bool(self.is_current),
            SqlValue::opt_int(self.interval_year.map(i64::from)),
            SqlValue::opt_int(self.interval_month.map(i64::from)),
            SqlValue::opt_int(self.interval_day.map(i64::from)),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            audit: row.audit_fields()?,
            generator_id: row.i64("GeneratorId")?,
            current_number: row.i64("CurrentNumber")?,
            is_current: row.bool("IsCurrent")?,
            interval_year: narrow(row.opt_i64("IntervalYear")?)?,
            interval_month: narrow(row.opt_i64("IntervalMonth")?)?,
            interval_day: narrow(row.opt_i64("IntervalDay")?)?,
        })
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

pub(crate) fn narrow<T: TryFrom<i64>>(value: Option<i64>) -> Result<Option<T>> {
    value
        .map(|v| {
            T::try_from(v).map_err(|_| BizError::Mapping(format!("interval value {v} out of range")))
        })
        .transpose()
}
