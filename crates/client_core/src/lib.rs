//! Client core for the users screen: the remote users gateway and the list controller
//! that curates and mutates the fetched collection.

pub mod controller;
pub mod curation;
pub mod error;
pub mod gateway;
pub mod session;
pub mod sink;

pub use controller::{ControllerEvent, SaveOutcome, UserListController, ViewSnapshot};
pub use curation::{PageSize, SortKey};
pub use error::GatewayError;
pub use gateway::{HttpUsersGateway, UsersGateway, DEFAULT_USERS_URL};
pub use session::{SessionMode, SessionSnapshot};
pub use sink::{ErrorSink, TracingErrorSink};
