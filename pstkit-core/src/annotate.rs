//! Hook for the comment and translation columns of a pst line

use crate::context::RunContext;
use alloc::string::String;

/// Supplies the free-text columns printed after each value.
///
/// Implementations look values up by region identifier; date-dependent
/// lookups read the starting year from the run context. Output is copied
/// into the line verbatim and ignored again when packing.
pub trait Annotator {
    /// Comment column for a decoded value
    fn comment(&self, region: &str, value: &str, ctx: &RunContext) -> String;

    /// Translation column for a decoded value
    fn translation(&self, region: &str, value: &str, ctx: &RunContext) -> String;
}

/// Leaves both columns empty
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnnotations;

impl Annotator for NoAnnotations {
    fn comment(&self, _region: &str, _value: &str, _ctx: &RunContext) -> String {
        String::new()
    }

    fn translation(&self, _region: &str, _value: &str, _ctx: &RunContext) -> String {
        String::new()
    }
}

impl<A: Annotator + ?Sized> Annotator for &A {
    fn comment(&self, region: &str, value: &str, ctx: &RunContext) -> String {
        (**self).comment(region, value, ctx)
    }

    fn translation(&self, region: &str, value: &str, ctx: &RunContext) -> String {
        (**self).translation(region, value, ctx)
    }
}
