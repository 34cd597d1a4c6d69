//! VelocyPack: a compact, self-describing binary format for JSON-like data.
//!
//! Values are read in place through [`Slice`] views and written with the
//! append-only [`Builder`]. JSON conversion lives in [`json`], higher-level
//! algorithms in [`collection`].
//!
//! ```
//! use velocypack::{Builder, Slice};
//!
//! let mut b = Builder::new();
//! b.open_object().unwrap();
//! b.add_key_value("name", "velocypack").unwrap();
//! b.add_key_value("answer", 42u64).unwrap();
//! b.close().unwrap();
//!
//! let s: Slice<'_> = b.slice().unwrap();
//! assert_eq!(s.get("answer").unwrap().get_uint().unwrap(), 42);
//! assert!(s.get("missing").unwrap().is_none());
//! ```

pub mod array;
pub mod builder;
pub mod collection;
pub mod encode;
pub mod error;
pub mod hash;
pub mod head;
pub mod json;
pub mod object;
pub mod options;
pub mod owned;
pub mod slice;
pub mod string_ref;

pub use array::ArrayIterator;
pub use builder::Builder;
pub use collection::VisitationOrder;
pub use encode::Encode;
pub use error::{Error, Result};
pub use head::ValueType;
pub use json::{Dumper, Parser};
pub use object::{ObjectIterator, ObjectPair};
pub use options::{AttributeExcludeHandler, CustomTypeHandler, Options, UnsupportedTypeBehavior};
pub use owned::OwnedSlice;
pub use slice::{Slice, TypedValue};
pub use string_ref::{HashedStringRef, StringRef};
