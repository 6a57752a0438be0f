//! Handler, route and parameter model shared by annotation parsing, the
//! framework plugins and the code generator.

mod params;
mod types;

pub use params::{params_from_signature, parse_method, parse_route, SUPPORTED_METHODS};
pub use types::{
    is_predeclared, HandlerRef, ParamDescriptor, ParamSource, Route, RouteBinding,
    PREDECLARED_TYPES,
};
