pub mod config;
pub mod event;
pub mod forwarder;
pub mod message;
pub mod mime;
pub mod sender;
pub mod storage;
pub mod transformer;
pub mod transformers;

pub use config::*;
pub use event::*;
pub use forwarder::*;
pub use message::*;
pub use mime::*;
pub use sender::*;
pub use storage::*;
pub use transformer::*;
pub use transformers::*;
