//! Status codes the dispatcher can produce.
//!
//! The dispatcher answers with a handful of outcomes, so this is not a full
//! IANA table: success, the not-found listing, a rejected verb, and a
//! handler or render failure.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,                  // 200
    NotFound,            // 404
    MethodNotAllowed,    // 405
    InternalServerError, // 500
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::NotFound            => 404,
            Status::MethodNotAllowed    => 405,
            Status::InternalServerError => 500,
        }
    }
}
