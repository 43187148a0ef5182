//! Domain events emitted by mutating operations.
//!
//! Delivery is fire-and-forget: the configurator hands each event to an
//! injected [`EventSink`] and never waits on or inspects the outcome.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::catalog::MaterialDraw;
use crate::ids::{ProductId, VariantId};

/// Something that changed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DomainEvent {
    /// New variants were created for a product.
    #[serde(rename = "variant.generated")]
    VariantsGenerated {
        product_id: ProductId,
        variant_ids: Vec<VariantId>,
        occurred_at: DateTime<Utc>,
    },

    /// Raw-material stock was drawn for a production batch.
    #[serde(rename = "stock.consumed")]
    StockConsumed {
        variant_id: VariantId,
        units: u64,
        draws: Vec<MaterialDraw>,
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::VariantsGenerated { .. } => "variant.generated",
            DomainEvent::StockConsumed { .. } => "stock.consumed",
        }
    }
}

/// Receives domain events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: DomainEvent) {}
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<DomainEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, oldest first.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: DomainEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_name() {
        let event = DomainEvent::VariantsGenerated {
            product_id: ProductId::new("tote"),
            variant_ids: vec![VariantId::new("v-1")],
            occurred_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "variant.generated");
        assert_eq!(json["product_id"], "tote");
        assert_eq!(event.name(), "variant.generated");
    }

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemoryEventSink::new();
        assert!(sink.is_empty());
        sink.emit(DomainEvent::StockConsumed {
            variant_id: VariantId::new("v-1"),
            units: 2,
            draws: vec![],
            occurred_at: Utc::now(),
        });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].name(), "stock.consumed");
    }
}
