//! Bill of materials.
//!
//! Four rule layers resolve into a variant's material list:
//!
//! 1. product baseline entries
//! 2. option modifiers (2b), then option additions (2a)
//! 3. variant overrides
//!
//! Arithmetic is exact decimal throughout; rounding happens only in
//! [`ResolvedBom::rounded`].

mod pipeline;
mod resolver;
mod rules;

pub use pipeline::{BomStep, Layer, PlannedStep, WorkingBom, WorkingLine};
pub use resolver::{BomResolver, ResolvedBom, ResolvedLine};
pub use rules::{
    BomRules, ModifierType, OptionBomEntry, OptionBomModifier, OverrideType, ProductBomEntry,
    VariantBomOverride,
};
