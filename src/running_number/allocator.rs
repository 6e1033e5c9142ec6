use crate::config::ConfigurationError;
use crate::database::{finish_transaction, DatabaseConnection};
use crate::error::{BizError, Result};
use crate::models::audit::now;
use crate::models::running_number::narrow;
use crate::models::{
    Entity, IntervalGranularity, RowReader, RunningNumberCounter, RunningNumberGenerator,
};
use crate::query_builder::{BuiltQuery, Dialect, ParamBag, SqlValue};
use crate::repository::{GenericRepository, SearchCriteria};
use crate::workflow::UserContext;
use chrono::{Datelike, NaiveDate, Utc};
use sqlx::AnyConnection;
use tracing::{debug, info};

/// Interval components printed between prefix and sequence number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalStamp {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl IntervalStamp {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.day.is_none()
    }

    /// Fill missing components from `date`.
    pub fn or_date(self, date: NaiveDate) -> Self {
        Self {
            year: self.year.or(Some(date.year())),
            month: self.month.or(Some(date.month())),
            day: self.day.or(Some(date.day())),
        }
    }

    /// The components of `date` that `granularity` uses.
    pub fn for_granularity(granularity: IntervalGranularity, date: NaiveDate) -> Self {
        Self {
            year: granularity.includes_year().then(|| date.year()),
            month: granularity.includes_month().then(|| date.month()),
            day: granularity.includes_day().then(|| date.day()),
        }
    }
}

/// Format a sequence number: prefix, interval components (`yy`, `mm`, `dd` as the
/// granularity requires), the zero-padded number, suffix.
///
/// A number wider than the granularity's width is an error, never a longer code.
pub fn format_running_number(
    generator: &RunningNumberGenerator,
    number: i64,
    stamp: IntervalStamp,
) -> Result<String> {
    let granularity = generator.interval_type;
    let width = granularity.width();
    let exhausted = || BizError::CounterExhausted {
        object_class: generator.object_class_name.clone(),
        number,
        width,
    };
    if number < 0 {
        return Err(BizError::Validation(format!(
            "running number {number} for '{}' is negative",
            generator.object_class_name
        )));
    }
    let digits = number.to_string();
    if digits.len() > width {
        return Err(exhausted());
    }

    let mut code = String::with_capacity(
        generator.prefix.len() + width + 6 + generator.suffix.len(),
    );
    code.push_str(&generator.prefix);
    if granularity.includes_year() {
        let year = stamp.year.unwrap_or(2000);
        code.push_str(&format!("{:02}", (year - 2000).rem_euclid(100)));
    }
    if granularity.includes_month() {
        code.push_str(&format!("{:02}", stamp.month.unwrap_or(1)));
    }
    if granularity.includes_day() {
        code.push_str(&format!("{:02}", stamp.day.unwrap_or(1)));
    }
    code.push_str(&format!("{digits:0>width$}"));
    code.push_str(&generator.suffix);
    Ok(code)
}

/// Allocates business codes from the current counter of a class's generator.
///
/// Allocation runs inside the caller's transaction. The increment and the read of the
/// new value are one `UPDATE ... RETURNING` statement, so concurrent allocations for
/// the same generator serialize on the counter row lock.
#[derive(Debug, Clone)]
pub struct RunningNumberAllocator {
    db: DatabaseConnection,
    generators: GenericRepository<RunningNumberGenerator>,
    counters: GenericRepository<RunningNumberCounter>,
}

impl RunningNumberAllocator {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            generators: GenericRepository::new(db.clone()),
            counters: GenericRepository::new(db.clone()),
            db,
        }
    }

    fn dialect(&self) -> Dialect {
        self.db.dialect()
    }

    /// Allocate the next code for `object_class`, dated today (UTC).
    pub async fn allocate(&self, conn: &mut AnyConnection, object_class: &str) -> Result<String> {
        self.allocate_on(conn, object_class, Utc::now().date_naive()).await
    }

    /// Allocate the next code; `date` supplies interval components the counter lacks.
    pub async fn allocate_on(
        &self,
        conn: &mut AnyConnection,
        object_class: &str,
        date: NaiveDate,
    ) -> Result<String> {
        let (generator_id, number, stamp) = self.increment(conn, object_class).await?;

        let generator = self
            .generators
            .get_by_id_in(conn, generator_id)
            .await?
            .ok_or_else(|| BizError::MissingCounter {
                object_class: object_class.to_string(),
            })?;

        let stamp = if stamp.is_empty() { stamp.or_date(date) } else { stamp };
        let code = format_running_number(&generator, number, stamp)?;
        info!(
            object_class = %object_class,
            generator_id = generator_id,
            number = number,
            code = %code,
            "Running number allocated"
        );
        Ok(code)
    }

    /// Allocate in a transaction of its own.
    pub async fn allocate_with_pool(&self, object_class: &str) -> Result<String> {
        let mut tx = self.db.begin().await?;
        let result = self.allocate(&mut tx, object_class).await;
        finish_transaction(tx, result, "allocate_running_number").await
    }

    /// Retire the current counter of `object_class` and open a fresh one at zero,
    /// stamped with the interval `date` falls in.
    pub async fn open_interval(
        &self,
        conn: &mut AnyConnection,
        object_class: &str,
        date: NaiveDate,
        acting_user: &dyn UserContext,
    ) -> Result<RunningNumberCounter> {
        let user_id = acting_user.resolved_user_id()?;
        let d = self.dialect();
        let mut params = ParamBag::new(d);
        let retire = format!(
            "UPDATE {} SET {} = {}, {} = {}, {} = {} WHERE {} = {} AND {} = {} AND {} IN ({})",
            d.table_name(&RunningNumberCounter::TABLE),
            d.ident("IsCurrent"),
            d.bool_literal(false),
            d.ident("ModifiedBy"),
            params.push(SqlValue::Int(user_id)),
            d.ident("ModifiedAt"),
            params.push(SqlValue::timestamp(now())),
            d.ident("IsCurrent"),
            d.bool_literal(true),
            d.ident("IsDeleted"),
            d.bool_literal(false),
            d.ident("GeneratorId"),
            self.generator_subquery(&mut params, object_class),
        );
        let retire = BuiltQuery::new(retire, params);
        debug!(sql = %retire.sql, "Retire current counter");
        let retired = retire.query().execute(&mut *conn).await?.rows_affected();

        let generator = self
            .generators
            .search_in(
                conn,
                &SearchCriteria::new().where_eq("ObjectClassName", object_class),
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BizError::not_found(RunningNumberGenerator::OBJECT_TYPE, object_class))?;
        let generator_id = generator
            .id()
            .ok_or_else(|| BizError::Mapping("generator row without id".to_string()))?;

        let stamp = IntervalStamp::for_granularity(generator.interval_type, date);
        let mut counter = RunningNumberCounter::current(generator_id)
            .with_interval(stamp.year, stamp.month, stamp.day);
        self.counters.insert_in(conn, &mut counter, acting_user).await?;

        info!(
            object_class = %object_class,
            generator_id = generator_id,
            retired = retired,
            interval = ?stamp,
            "Running number interval opened"
        );
        Ok(counter)
    }

    /// `UPDATE ... SET CurrentNumber = CurrentNumber + 1 ... RETURNING`, locating the
    /// current counter through a sub-select on the generator.
    async fn increment(
        &self,
        conn: &mut AnyConnection,
        object_class: &str,
    ) -> Result<(i64, i64, IntervalStamp)> {
        let d = self.dialect();
        let current_number = d.ident("CurrentNumber");
        let mut params = ParamBag::new(d);
        let sql = format!(
            "UPDATE {} SET {current_number} = {current_number} + 1, {} = {} \
             WHERE {} = {} AND {} = {} AND {} IN ({}) \
             RETURNING {}, {current_number}, {}, {}, {}",
            d.table_name(&RunningNumberCounter::TABLE),
            d.ident("ModifiedAt"),
            params.push(SqlValue::timestamp(now())),
            d.ident("IsCurrent"),
            d.bool_literal(true),
            d.ident("IsDeleted"),
            d.bool_literal(false),
            d.ident("GeneratorId"),
            self.generator_subquery(&mut params, object_class),
            d.ident("GeneratorId"),
            d.ident("IntervalYear"),
            d.ident("IntervalMonth"),
            d.ident("IntervalDay"),
        );
        let built = BuiltQuery::new(sql, params);
        debug!(object_class = %object_class, sql = %built.sql, "Increment counter");

        let rows = built.query().fetch_all(&mut *conn).await?;
        let row = match rows.as_slice() {
            [row] => row,
            [] => {
                return Err(BizError::MissingCounter {
                    object_class: object_class.to_string(),
                })
            }
            _ => {
                return Err(ConfigurationError::invalid_value(
                    "RunningNumberCounter.IsCurrent",
                    rows.len().to_string(),
                    format!("more than one current counter for '{object_class}'"),
                )
                .into())
            }
        };

        let reader = RowReader::new(row, d);
        let stamp = IntervalStamp {
            year: narrow(reader.opt_i64("IntervalYear")?)?,
            month: narrow(reader.opt_i64("IntervalMonth")?)?,
            day: narrow(reader.opt_i64("IntervalDay")?)?,
        };
        Ok((reader.i64("GeneratorId")?, reader.i64("CurrentNumber")?, stamp))
    }

    fn generator_subquery(&self, params: &mut ParamBag, object_class: &str) -> String {
        let d = self.dialect();
        format!(
            "SELECT {} FROM {} WHERE {} = {} AND {} = {}",
            d.ident("Id"),
            d.table_name(&RunningNumberGenerator::TABLE),
            d.ident("ObjectClassName"),
            params.push(SqlValue::text(object_class)),
            d.ident("IsDeleted"),
            d.bool_literal(false)
        )
    }
}
