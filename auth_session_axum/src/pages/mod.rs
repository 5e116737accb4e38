mod login;
mod logout;
mod router;
mod user;

pub(crate) use router::router;
