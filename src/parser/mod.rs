//! Type schema extraction from generated TypeScript SDKs.

pub mod extractor;
pub mod source;

pub use extractor::{
    extract_operations_schema, extract_operations_schema_from_source, is_type_custom,
    DEFAULT_SDK_FUNCTION,
};
pub use source::{Declarations, SdkSource};
