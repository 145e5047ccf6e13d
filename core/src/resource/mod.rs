#![deny(missing_docs)]

//! # Resource Analysis Module
//!
//! - **params**: Input classification and body selection.
//! - **responses**: Expectations, handler contract, result wrapper, exception dispatch.
//! - **builder**: The `ResourceAnalyzer` tying it together.

pub mod builder;
pub mod params;
pub mod responses;

pub use builder::{
    split_template, AuthRequirement, ResolvedResource, ResourceAnalyzer, TemplatePart,
    DEFAULT_MEDIA_TYPE,
};
pub use params::{ParamBinding, ResolvedParam};
pub use responses::{
    Dispatch, ExceptionBranch, ExceptionDispatch, Expectations, HandlerReturn, ResultWrapper,
    StatusCode, WrapperHeader, FALLBACK_ERROR_CLASS,
};
