//! NSQLite value types.

mod value;

pub use value::NsqliteValue;

/// A result row: one value per column, in column order.
pub type Row = Vec<NsqliteValue>;
