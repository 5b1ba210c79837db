//! TCP server for the rowmax offload service.
//!
//! The listener accepts any number of concurrent clients; every connection
//! gets its own session state machine, and every started computation runs on
//! a background worker that fans the matrix rows out across OS threads.

pub mod listener;
mod session;
mod worker;
