//! Form state for a sheet-to-MIDI conversion: field values, per-row tempo
//! overrides, the attached sheet, and derived validation errors.

pub mod attachment;
pub mod model;
pub mod validation;

pub use attachment::{suggested_name, AttachmentChanged, FileAttachment};
pub use model::{
    FieldValue, FormConfig, FormError, FormField, FormModel, FormSnapshot, FormValues, NamePolicy,
};
pub use validation::{FieldErrors, ValidationSchema};
