//! Point structure handlers.

use crate::bolt::packstream::error::{DecodeError, PackStreamResult};
use crate::bolt::packstream::handler::{
    ensure_arity, unexpected_value, Direction, StructHandler, StructReader, StructWriter,
};
use crate::bolt::packstream::marker::{POINT_2D_TAG, POINT_3D_TAG};
use crate::bolt::packstream::spatial::Point;
use crate::bolt::packstream::value::Value;

fn read_srid(reader: &mut dyn StructReader, tag: u8) -> PackStreamResult<i32> {
    let srid = reader.read_int()?;
    i32::try_from(srid).map_err(|_| {
        DecodeError::InvalidField {
            tag,
            field: "srid",
            reason: format!("{} does not fit in 32 bits", srid),
        }
        .into()
    })
}

struct_handler! {
    /// Point2D: srid, x, y.
    Point2DHandler {
        tag: POINT_2D_TAG,
        name: "Point2D",
        fields: 3,
        direction: Direction::Both,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let srid = read_srid(reader, POINT_2D_TAG)?;
        let x = reader.read_float()?;
        let y = reader.read_float()?;
        Ok(Value::Point(Point::new_2d(srid, x, y)))
    }

    fn encode(&self, value: &Value, writer: &mut dyn StructWriter) -> PackStreamResult<()> {
        let Value::Point(point @ Point { z: None, .. }) = value else {
            return Err(unexpected_value(self, value));
        };
        writer.write_struct_header(self.field_count(), POINT_2D_TAG)?;
        writer.write_int(point.srid as i64)?;
        writer.write_float(point.x)?;
        writer.write_float(point.y)
    }
}

struct_handler! {
    /// Point3D: srid, x, y, z.
    Point3DHandler {
        tag: POINT_3D_TAG,
        name: "Point3D",
        fields: 4,
        direction: Direction::Both,
    }

    fn decode(&self, reader: &mut dyn StructReader, field_count: usize) -> PackStreamResult<Value> {
        ensure_arity(self, field_count)?;
        let srid = read_srid(reader, POINT_3D_TAG)?;
        let x = reader.read_float()?;
        let y = reader.read_float()?;
        let z = reader.read_float()?;
        Ok(Value::Point(Point::new_3d(srid, x, y, z)))
    }

    fn encode(&self, value: &Value, writer: &mut dyn StructWriter) -> PackStreamResult<()> {
        let Value::Point(Point { srid, x, y, z: Some(z) }) = value else {
            return Err(unexpected_value(self, value));
        };
        writer.write_struct_header(self.field_count(), POINT_3D_TAG)?;
        writer.write_int(*srid as i64)?;
        writer.write_float(*x)?;
        writer.write_float(*y)?;
        writer.write_float(*z)
    }
}
