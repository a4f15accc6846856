//! Record classification: turning dataset records into tiles and grid rows.
//!
//! - [`machines`]: routes machine records into category containers.
//! - [`orders`]: builds WIP, quality and MRB table rows.

pub mod machines;
pub mod orders;

/// Output of one classification pass.
///
/// `dropped` counts records that matched no branch (unknown category, status
/// outside the displayed set). `skipped` counts records that did match but
/// had a blank key field. `missing_fields` counts columns a displayed record
/// did not carry at all; those cells render empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified<T> {
    pub items: Vec<T>,
    pub dropped: usize,
    pub skipped: usize,
    pub missing_fields: usize,
}

impl<T> Default for Classified<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            dropped: 0,
            skipped: 0,
            missing_fields: 0,
        }
    }
}
