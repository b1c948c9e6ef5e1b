//! REST transport: negotiation, dispatch and error mapping.
//!
//! # Data Flow
//! ```text
//! axum handler
//!     → context.rs (immutable RequestContext)
//!     → dispatcher.rs (authenticate, negotiate, dispatch)
//!         → negotiation.rs (input/output Format)
//!         → converter.rs (converters for those formats)
//!         → descriptor.rs (route-relative RequestDescriptor)
//!         → handler.rs (DataHandler → ResponseOutcome)
//!     → errors.rs (typed failures and faults → HTTP)
//! ```
//!
//! # Design Decisions
//! - Only single, non-batched requests are supported
//! - Error bodies bypass the output converter, which may be the thing that failed
//! - Faults are translated to a 500 in exactly one place

pub mod context;
pub mod converter;
pub mod descriptor;
pub mod dispatcher;
pub mod errors;
pub mod handler;
pub mod negotiation;
pub mod outcome;

pub use context::RequestContext;
pub use converter::{ConverterError, ConverterRegistry, InputConverter, JsonConverter, OutputConverter};
pub use descriptor::RequestDescriptor;
pub use dispatcher::Dispatcher;
pub use errors::{BoxError, ErrorResponder, Fault};
pub use handler::{DataHandler, ServiceRouter};
pub use negotiation::{Format, FormatNegotiator, UnknownFormat};
pub use outcome::{ErrorKind, ResponseOutcome};
