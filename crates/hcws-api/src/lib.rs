// hcws-api: wire messages and the session send primitive for appliance links

pub mod error;
pub mod message;
pub mod session;

pub use error::Error;
pub use message::{Action, Message};
pub use session::{ChannelSession, Outbound, Session, SessionConfig};
