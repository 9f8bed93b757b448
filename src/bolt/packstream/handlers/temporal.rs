//! Temporal structure handlers.

use crate::bolt::packstream::error::{DecodeError, PackStreamError, PackStreamResult};
use crate::bolt::packstream::handler::{
    ensure_arity, unexpected_value, Direction, StructHandler, StructReader, StructWriter,
};
use crate::bolt::packstream::marker::{
    DATE_TAG, DATE_TIME_TAG, DURATION_TAG, LOCAL_DATE_TIME_TAG, LOCAL_TIME_TAG, TIME_TAG,
};
use crate::bolt::packstream::temporal::{self, Duration, OffsetTime};
use crate::bolt::packstream::value::Value;

fn out_of_range(tag: u8, field: &'static str, value: i64) -> PackStreamError {
    DecodeError::InvalidField {
        tag,
        field,
        reason: format!("{} is out of range", value),
    }
    .into()
}

fn leap_second(handler: &dyn StructHandler) -> PackStreamError {
    PackStreamError::violation(handler.name(), "cannot carry a leap second")
}

struct_handler! {
    /// Date: days since the Unix epoch.
    DateHandler {
        tag: DATE_TAG,
        name: "Date",
        fields: 1,
        direction: Direction::Both,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let days = reader.read_int()?;
        match temporal::date_from_epoch_days(days) {
            Some(date) => Ok(Value::Date(date)),
            None => Err(out_of_range(DATE_TAG, "days", days)),
        }
    }

    fn encode(&self, value: &Value, writer: &mut dyn StructWriter) -> PackStreamResult<()> {
        let Value::Date(date) = value else {
            return Err(unexpected_value(self, value));
        };
        writer.write_struct_header(self.field_count(), DATE_TAG)?;
        writer.write_int(temporal::date_to_epoch_days(date))
    }
}

struct_handler! {
    /// Time: nanoseconds since midnight, offset seconds.
    TimeHandler {
        tag: TIME_TAG,
        name: "Time",
        fields: 2,
        direction: Direction::Both,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let nanos = reader.read_int()?;
        let offset_seconds = reader.read_int()?;
        let Some(time) = temporal::time_from_nanos(nanos) else {
            return Err(out_of_range(TIME_TAG, "nanoseconds", nanos));
        };
        let Some(offset) = temporal::offset_from_seconds(offset_seconds) else {
            return Err(out_of_range(TIME_TAG, "tz_offset_seconds", offset_seconds));
        };
        Ok(Value::Time(OffsetTime::new(time, offset)))
    }

    fn encode(&self, value: &Value, writer: &mut dyn StructWriter) -> PackStreamResult<()> {
        let Value::Time(time) = value else {
            return Err(unexpected_value(self, value));
        };
        if temporal::is_leap_second(&time.time) {
            return Err(leap_second(self));
        }
        writer.write_struct_header(self.field_count(), TIME_TAG)?;
        writer.write_int(temporal::time_to_nanos(&time.time))?;
        writer.write_int(time.offset.local_minus_utc() as i64)
    }
}

struct_handler! {
    /// LocalTime: nanoseconds since midnight.
    LocalTimeHandler {
        tag: LOCAL_TIME_TAG,
        name: "LocalTime",
        fields: 1,
        direction: Direction::Both,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let nanos = reader.read_int()?;
        match temporal::time_from_nanos(nanos) {
            Some(time) => Ok(Value::LocalTime(time)),
            None => Err(out_of_range(LOCAL_TIME_TAG, "nanoseconds", nanos)),
        }
    }

    fn encode(&self, value: &Value, writer: &mut dyn StructWriter) -> PackStreamResult<()> {
        let Value::LocalTime(time) = value else {
            return Err(unexpected_value(self, value));
        };
        if temporal::is_leap_second(time) {
            return Err(leap_second(self));
        }
        writer.write_struct_header(self.field_count(), LOCAL_TIME_TAG)?;
        writer.write_int(temporal::time_to_nanos(time))
    }
}

struct_handler! {
    /// DateTime: local seconds since the epoch, nanoseconds, offset seconds.
    DateTimeHandler {
        tag: DATE_TIME_TAG,
        name: "DateTime",
        fields: 3,
        direction: Direction::Both,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let seconds = reader.read_int()?;
        let nanos = reader.read_int()?;
        let offset_seconds = reader.read_int()?;
        if temporal::offset_from_seconds(offset_seconds).is_none() {
            return Err(out_of_range(DATE_TIME_TAG, "tz_offset_seconds", offset_seconds));
        }
        match temporal::offset_datetime_from_parts(seconds, nanos, offset_seconds) {
            Some(datetime) => Ok(Value::DateTime(datetime)),
            None => Err(out_of_range(DATE_TIME_TAG, "seconds", seconds)),
        }
    }

    fn encode(&self, value: &Value, writer: &mut dyn StructWriter) -> PackStreamResult<()> {
        let Value::DateTime(datetime) = value else {
            return Err(unexpected_value(self, value));
        };
        if temporal::is_leap_second(&datetime.time()) {
            return Err(leap_second(self));
        }
        let (seconds, nanos, offset_seconds) = temporal::offset_datetime_to_parts(datetime);
        writer.write_struct_header(self.field_count(), DATE_TIME_TAG)?;
        writer.write_int(seconds)?;
        writer.write_int(nanos)?;
        writer.write_int(offset_seconds)
    }
}

struct_handler! {
    /// LocalDateTime: seconds since the epoch, nanoseconds.
    LocalDateTimeHandler {
        tag: LOCAL_DATE_TIME_TAG,
        name: "LocalDateTime",
        fields: 2,
        direction: Direction::Both,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let seconds = reader.read_int()?;
        let nanos = reader.read_int()?;
        match temporal::local_datetime_from_parts(seconds, nanos) {
            Some(datetime) => Ok(Value::LocalDateTime(datetime)),
            None => Err(out_of_range(LOCAL_DATE_TIME_TAG, "seconds", seconds)),
        }
    }

    fn encode(&self, value: &Value, writer: &mut dyn StructWriter) -> PackStreamResult<()> {
        let Value::LocalDateTime(datetime) = value else {
            return Err(unexpected_value(self, value));
        };
        if temporal::is_leap_second(&datetime.time()) {
            return Err(leap_second(self));
        }
        let (seconds, nanos) = temporal::local_datetime_to_parts(datetime);
        writer.write_struct_header(self.field_count(), LOCAL_DATE_TIME_TAG)?;
        writer.write_int(seconds)?;
        writer.write_int(nanos)
    }
}

struct_handler! {
    /// Duration: months, days, seconds, nanoseconds.
    DurationHandler {
        tag: DURATION_TAG,
        name: "Duration",
        fields: 4,
        direction: Direction::Both,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let months = reader.read_int()?;
        let days = reader.read_int()?;
        let seconds = reader.read_int()?;
        let nanoseconds = reader.read_int()?;
        Ok(Value::Duration(Duration::new(months, days, seconds, nanoseconds)))
    }

    fn encode(&self, value: &Value, writer: &mut dyn StructWriter) -> PackStreamResult<()> {
        let Value::Duration(d) = value else {
            return Err(unexpected_value(self, value));
        };
        writer.write_struct_header(self.field_count(), DURATION_TAG)?;
        writer.write_int(d.months)?;
        writer.write_int(d.days)?;
        writer.write_int(d.seconds)?;
        writer.write_int(d.nanoseconds)
    }
}
