//! # API Client Core
//!
//! Everything between a page's "call the server" and "show the user what
//! happened".
//!
//! ## Overview
//!
//! Every endpoint answers with a [`ResponseEnvelope`] `{code, message, data}`.
//! The pieces of this crate interpret that envelope in a fixed order:
//!
//! 1. [`ApiClient`] sends the request, attaching the session token, and hands
//!    back an envelope or an [`ApiError`] when no envelope was obtained.
//! 2. [`Dispatcher`] runs the side effects for a failed code: session reset
//!    and navigation on 401, a notice otherwise, or a caller-supplied handler.
//! 3. [`classify`] turns the envelope into a [`Classification`] with the text
//!    to display, resolved through the [`StatusCode`] table.
//! 4. [`CallWrapper`] ties the three together around any async call.
//!
//! ## Usage
//!
//! ```ignore
//! use core_api::{CallWrapper, WrapOptions, resources::CementPlantApi};
//!
//! let plants = CementPlantApi::new(client.clone());
//! let result = wrapper
//!     .call(plants.list(), &WrapOptions::default().show_success(false))
//!     .await?;
//!
//! if result.success {
//!     render(result.data.unwrap_or_default());
//! } else {
//!     show_inline(&result.message);
//! }
//! ```
//!
//! Endpoint wrappers live in [`resources`]; map layer settings in [`geo`].

pub mod classify;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod geo;
pub mod models;
pub mod resources;
pub mod status;
pub mod transport;
pub mod wrapper;

pub use classify::{classify, Classification};
pub use dispatch::{CodeCategory, DispatchOutcome, Dispatcher, Failure, FailureHandler, StatusHandlers};
pub use envelope::ResponseEnvelope;
pub use error::{ApiError, Result};
pub use geo::{GeoError, MapServiceConfig};
pub use status::{
    resolve_default_message, resolve_user_message, StatusCode, StatusFamily,
    NETWORK_ERROR_MESSAGE, SUCCESS_MESSAGE, UNKNOWN_DEFAULT_MESSAGE, UNKNOWN_USER_MESSAGE,
};
pub use transport::{ApiClient, ApiRequest, RequestBody};
pub use wrapper::{CallWrapper, ErrorCallback, ErrorReport, SuccessCallback, WrapOptions, Wrapped};
