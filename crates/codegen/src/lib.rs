//! Cypress script generation
//!
//! Pure functions from recorded events to script lines:
//!
//! ```text
//! URL          → create_visit → cy.visit('...');
//! ParsedEvent  → create_block → cy.get('...').click();   (or nothing)
//! URL          → create_url   → cy.url().should('contains', '...');
//! ```
//!
//! Putting the lines together into a Cypress test file is left to the caller.

pub mod error;
pub mod generator;

pub use error::{CodegenError, Result};
pub use generator::{create_block, create_url, create_visit, Locator, SpecialKey};
