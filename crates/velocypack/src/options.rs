//! Options shared by slices, builders, the JSON parser and the dumper.
//!
//! `Options` derives `Deserialize` with `#[serde(default)]`, so applications
//! can keep it in their own configuration files. The two handler hooks are
//! not serializable and have to be installed in code.

use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::head::custom_byte_size;
use crate::slice::Slice;

/// What the JSON dumper does with values that JSON cannot express.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedTypeBehavior {
    /// Return `Error::NoJsonEquivalent`.
    #[default]
    Fail,
    /// Emit `null`.
    Nullify,
    /// Emit a best-effort representation (base64 for binaries, the integer
    /// for dates, `null` for the rest).
    Convert,
}

/// Hook for values in the custom head range `0xf0..=0xff`.
pub trait CustomTypeHandler: Send + Sync {
    /// Total byte size of the custom value.
    fn byte_size(&self, value: &Slice<'_>) -> usize {
        custom_byte_size(value.start())
    }

    /// JSON representation of the custom value. `base` is the compound the
    /// value was found in, or the value itself at top level.
    fn to_json(&self, value: &Slice<'_>, base: &Slice<'_>) -> Result<serde_json::Value>;
}

/// Hook deciding which object keys are skipped when dumping or copying.
pub trait AttributeExcludeHandler: Send + Sync {
    /// `nesting` is 0 for keys of the outermost object.
    fn should_exclude(&self, key: &Slice<'_>, nesting: usize) -> bool;
}

static DEFAULT_OPTIONS: LazyLock<Options> = LazyLock::new(Options::default);

/// Options for reading, building and dumping values.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Reject objects with duplicate keys when they are closed.
    pub check_attribute_uniqueness: bool,
    /// Emit sorted index tables for objects (enables binary search).
    pub sort_attribute_names: bool,
    /// Close every non-empty array with the compact encoding.
    pub build_unindexed_arrays: bool,
    /// Close every non-empty object with the compact encoding.
    pub build_unindexed_objects: bool,
    /// Reject custom values in `Builder::add_custom`.
    pub disallow_custom_types: bool,
    /// How the JSON dumper treats types without a JSON counterpart.
    pub unsupported_type_behavior: UnsupportedTypeBehavior,
    #[serde(skip)]
    pub custom_type_handler: Option<Arc<dyn CustomTypeHandler>>,
    #[serde(skip)]
    pub attribute_exclude_handler: Option<Arc<dyn AttributeExcludeHandler>>,
}

impl Options {
    /// Process-wide default options, used by `Slice::new` and `Builder::new`.
    #[must_use]
    pub fn defaults() -> &'static Options {
        &DEFAULT_OPTIONS
    }

    pub(crate) fn excludes(&self, key: &Slice<'_>, nesting: usize) -> bool {
        self.attribute_exclude_handler
            .as_ref()
            .is_some_and(|handler| handler.should_exclude(key, nesting))
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            check_attribute_uniqueness: false,
            sort_attribute_names: true,
            build_unindexed_arrays: false,
            build_unindexed_objects: false,
            disallow_custom_types: false,
            unsupported_type_behavior: UnsupportedTypeBehavior::Fail,
            custom_type_handler: None,
            attribute_exclude_handler: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("check_attribute_uniqueness", &self.check_attribute_uniqueness)
            .field("sort_attribute_names", &self.sort_attribute_names)
            .field("build_unindexed_arrays", &self.build_unindexed_arrays)
            .field("build_unindexed_objects", &self.build_unindexed_objects)
            .field("disallow_custom_types", &self.disallow_custom_types)
            .field("unsupported_type_behavior", &self.unsupported_type_behavior)
            .field("custom_type_handler", &self.custom_type_handler.is_some())
            .field(
                "attribute_exclude_handler",
                &self.attribute_exclude_handler.is_some(),
            )
            .finish()
    }
}
