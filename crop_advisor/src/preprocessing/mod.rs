pub mod validator;

pub use validator::{
    validate_field, validate_field_legacy, FieldValidationResult, FormValidation, FormValidator,
    ValidatorMode,
};
