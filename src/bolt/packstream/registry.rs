//! Structure handler registry.
//!
//! A fixed table of 256 slots indexed by tag. Built once through
//! [`HandlerRegistryBuilder`], read-only afterwards, and shared between
//! connections behind an `Arc`.

use std::fmt;

use super::error::ConfigurationError;
use super::handler::StructHandler;
use super::handlers;

const SLOTS: usize = 256;

type Slots = Box<[Option<Box<dyn StructHandler>>; SLOTS]>;

fn empty_slots() -> Slots {
    Box::new(std::array::from_fn(|_| None))
}

/// Immutable tag to handler table.
pub struct HandlerRegistry {
    slots: Slots,
    len: usize,
}

impl HandlerRegistry {
    /// Start an empty builder.
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new()
    }

    /// Registry with no handlers. Every structure fails to decode.
    pub fn empty() -> Self {
        HandlerRegistryBuilder::new().build()
    }

    /// Graph, temporal and spatial handlers.
    pub fn values() -> Self {
        HandlerRegistryBuilder::values().build()
    }

    /// Value handlers plus Bolt request and response envelopes.
    pub fn bolt() -> Self {
        HandlerRegistryBuilder::bolt().build()
    }

    /// Look up the handler for `tag`.
    #[inline]
    pub fn resolve(&self, tag: u8) -> Option<&dyn StructHandler> {
        self.slots[tag as usize].as_deref()
    }

    /// Whether `tag` has a handler.
    pub fn contains(&self, tag: u8) -> bool {
        self.slots[tag as usize].is_some()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Registered tags in ascending order.
    pub fn tags(&self) -> impl Iterator<Item = u8> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(tag, _)| tag as u8)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::bolt()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.slots
                    .iter()
                    .enumerate()
                    .filter_map(|(tag, slot)| slot.as_ref().map(|h| (format!("0x{:02X}", tag), h.name()))),
            )
            .finish()
    }
}

/// Builder for [`HandlerRegistry`].
pub struct HandlerRegistryBuilder {
    slots: Slots,
    len: usize,
}

impl HandlerRegistryBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self {
            slots: empty_slots(),
            len: 0,
        }
    }

    /// Builder preloaded with graph, temporal and spatial handlers.
    pub fn values() -> Self {
        let mut builder = Self::new();
        builder.preload(handlers::value_handlers());
        builder
    }

    /// Builder preloaded with value handlers and Bolt message envelopes.
    pub fn bolt() -> Self {
        let mut builder = Self::values();
        builder.preload(handlers::message_handlers());
        builder
    }

    // Built-in tables are disjoint (checked in tests below).
    fn preload(&mut self, handlers: Vec<Box<dyn StructHandler>>) {
        for handler in handlers {
            let tag = handler.tag() as usize;
            if self.slots[tag].replace(handler).is_none() {
                self.len += 1;
            }
        }
    }

    /// Register a handler.
    ///
    /// Fails if another handler already owns the tag.
    pub fn register<H>(mut self, handler: H) -> Result<Self, ConfigurationError>
    where
        H: StructHandler + 'static,
    {
        let tag = handler.tag();
        let slot = &mut self.slots[tag as usize];
        if let Some(existing) = slot {
            return Err(ConfigurationError::DuplicateTag {
                tag,
                existing: existing.name(),
                rejected: handler.name(),
            });
        }

        tracing::debug!(
            "Registered structure handler {} for tag 0x{:02X} ({} fields, {:?})",
            handler.name(),
            tag,
            handler.field_count(),
            handler.direction()
        );
        *slot = Some(Box::new(handler));
        self.len += 1;
        Ok(self)
    }

    /// Finish building.
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            slots: self.slots,
            len: self.len,
        }
    }
}

impl Default for HandlerRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistryBuilder")
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::packstream::error::{PackStreamError, PackStreamResult};
    use crate::bolt::packstream::handler::Direction;
    use crate::bolt::packstream::handlers::{
        message_tag, GenericStructHandler, NodeHandler, RelationshipHandler,
    };
    use crate::bolt::packstream::marker::*;

    #[test]
    fn test_register_and_resolve() {
        let registry = HandlerRegistry::builder()
            .register(RelationshipHandler)
            .unwrap()
            .build();

        let handler = registry.resolve(RELATIONSHIP_TAG).unwrap();
        assert_eq!(handler.tag(), RELATIONSHIP_TAG);
        assert_eq!(handler.field_count(), 5);
        assert_eq!(handler.direction(), Direction::DecodeOnly);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_unregistered() {
        let registry = HandlerRegistry::builder()
            .register(NodeHandler)
            .unwrap()
            .build();
        assert!(registry.resolve(RELATIONSHIP_TAG).is_none());
        assert!(HandlerRegistry::empty().resolve(NODE_TAG).is_none());
        assert!(HandlerRegistry::empty().is_empty());
    }

    #[test]
    fn test_duplicate_tag() {
        let err = HandlerRegistry::builder()
            .register(RelationshipHandler)
            .unwrap()
            .register(GenericStructHandler::new(
                RELATIONSHIP_TAG,
                "CustomRelationship",
                5,
                Direction::Both,
            ))
            .unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::DuplicateTag {
                tag: RELATIONSHIP_TAG,
                existing: "Relationship",
                rejected: "CustomRelationship",
            }
        );
    }

    #[test]
    fn test_duplicate_tag_propagates_as_packstream_error() {
        fn custom_registry() -> PackStreamResult<HandlerRegistry> {
            Ok(HandlerRegistry::builder()
                .register(NodeHandler)?
                .register(GenericStructHandler::new(NODE_TAG, "CustomNode", 3, Direction::Both))?
                .build())
        }

        let err = custom_registry().unwrap_err();
        assert!(matches!(
            err,
            PackStreamError::Configuration(ConfigurationError::DuplicateTag {
                tag: NODE_TAG,
                existing: "Node",
                rejected: "CustomNode",
            })
        ));
        assert!(err.as_decode().is_none());
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_presets_are_disjoint() {
        // preload would silently overwrite, so every built-in must own its tag
        assert_eq!(HandlerRegistry::values().len(), handlers::value_handlers().len());
        assert_eq!(
            HandlerRegistry::bolt().len(),
            handlers::value_handlers().len() + handlers::message_handlers().len()
        );
    }

    #[test]
    fn test_bolt_preset() {
        let registry = HandlerRegistry::bolt();
        assert!(registry.contains(message_tag::SUCCESS));
        assert!(registry.contains(message_tag::RUN));
        assert!(registry.contains(POINT_3D_TAG));
        assert!(!HandlerRegistry::values().contains(message_tag::RUN));

        let tags: Vec<u8> = registry.tags().collect();
        let mut sorted = tags.clone();
        sorted.sort_unstable();
        assert_eq!(tags, sorted);
    }

    #[test]
    fn test_extend_preset() {
        let registry = HandlerRegistryBuilder::values()
            .register(GenericStructHandler::new(0x20, "Custom", 2, Direction::Both))
            .unwrap()
            .build();
        assert!(registry.contains(0x20));
        assert!(registry.contains(NODE_TAG));

        let err = HandlerRegistryBuilder::values()
            .register(GenericStructHandler::new(DATE_TAG, "MyDate", 1, Direction::Both))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateTag { existing: "Date", .. }));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HandlerRegistry>();
    }
}
