//! Built-in structure handlers.
//!
//! Graph structures are decode-only. Temporal and spatial structures travel
//! both ways. Bolt message envelopes go through [`GenericStructHandler`].

/// Declare a unit handler with its fixed tag, name, arity and direction.
macro_rules! struct_handler {
    (
        $(#[$meta:meta])*
        $ty:ident {
            tag: $tag:expr,
            name: $name:literal,
            fields: $fields:expr,
            direction: $direction:expr,
        }
        $($body:tt)*
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl $crate::bolt::packstream::handler::StructHandler for $ty {
            fn tag(&self) -> u8 {
                $tag
            }

            fn name(&self) -> &'static str {
                $name
            }

            fn field_count(&self) -> usize {
                $fields
            }

            fn direction(&self) -> $crate::bolt::packstream::handler::Direction {
                $direction
            }

            $($body)*
        }
    };
}

mod graph;
mod message;
mod spatial;
mod temporal;

pub use graph::{NodeHandler, PathHandler, RelationshipHandler, UnboundRelationshipHandler};
pub use message::{message_tag, GenericStructHandler};
pub use spatial::{Point2DHandler, Point3DHandler};
pub use temporal::{
    DateHandler, DateTimeHandler, DurationHandler, LocalDateTimeHandler, LocalTimeHandler,
    TimeHandler,
};

use super::handler::StructHandler;

/// Graph, temporal and spatial handlers.
pub(crate) fn value_handlers() -> Vec<Box<dyn StructHandler>> {
    vec![
        Box::new(NodeHandler),
        Box::new(RelationshipHandler),
        Box::new(UnboundRelationshipHandler),
        Box::new(PathHandler),
        Box::new(DateHandler),
        Box::new(TimeHandler),
        Box::new(LocalTimeHandler),
        Box::new(DateTimeHandler),
        Box::new(LocalDateTimeHandler),
        Box::new(DurationHandler),
        Box::new(Point2DHandler),
        Box::new(Point3DHandler),
    ]
}

/// Bolt request and response envelopes.
pub(crate) fn message_handlers() -> Vec<Box<dyn StructHandler>> {
    message::MESSAGE_HANDLERS
        .iter()
        .map(|h| Box::new(*h) as Box<dyn StructHandler>)
        .collect()
}
