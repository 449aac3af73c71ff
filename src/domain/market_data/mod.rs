//! Market data entities and value objects carried by the two feeds.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
